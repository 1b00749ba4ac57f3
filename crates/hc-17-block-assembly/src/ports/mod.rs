//! Ports layer (Hexagonal Architecture)

pub mod inbound;
pub mod outbound;

pub use inbound::BlockTemplateProvider;
pub use outbound::{BlockValidator, Clock, MempoolLock, StakeDifficultyOracle, TxMempool};
