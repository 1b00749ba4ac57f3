//! Domain layer for the consensus rule core
//!
//! - reward: emission schedule
//! - versionbits: BIP9 deployment state machine and cache
//! - witness: segwit commitment discovery and nonce injection
//! - deployments: per-tip script flags
//! - difficulty: proof-of-work retargeting

mod deployments;
mod difficulty;
mod error;
mod reward;
mod versionbits;
mod witness;

pub use deployments::*;
pub use difficulty::*;
pub use error::*;
pub use reward::*;
pub use versionbits::*;
pub use witness::*;
