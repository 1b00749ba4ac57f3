//! Adapters for the assembly ports

mod clock;
mod mempool;
mod oracle;
mod validator;

pub use clock::SystemClock;
pub use mempool::InMemoryMempool;
pub use oracle::StaticDifficultyOracle;
pub use validator::CoinviewBlockValidator;
