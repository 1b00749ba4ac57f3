//! Error types for block assembly

use hc_08_consensus_rules::ConsensusError;
use thiserror::Error;

/// Result type alias for block assembly operations
pub type Result<T> = std::result::Result<T, AssemblyError>;

/// Errors that can occur while assembling a block template
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// The assembled block failed consensus validation
    #[error("Consensus error: {0}")]
    Consensus(#[from] ConsensusError),

    /// Mempool could not be read
    #[error("Mempool unavailable: {0}")]
    MempoolUnavailable(String),

    /// Template inconsistent with its own invariants
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Payout script missing for a template request
    #[error("No payout script configured")]
    MissingPayoutScript,
}

impl AssemblyError {
    /// Check if error is recoverable (a later attempt may succeed)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MempoolUnavailable(_) | Self::Consensus(_))
    }

    /// Check if error is critical (assembly cannot work until fixed)
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::InvalidConfig(_) | Self::MissingPayoutScript)
    }
}
