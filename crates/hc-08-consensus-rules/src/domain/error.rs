//! Error types for the consensus rule core
//!
//! Display strings are the short reject reasons returned to RPC callers.

use shared_types::{Amount, Hash256};

/// Result alias for consensus rule checks.
pub type ConsensusResult<T> = std::result::Result<T, ConsensusError>;

/// Named consensus violations. Any of these invalidates the block.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsensusError {
    #[error("bad-cb-amount")]
    BadCoinbaseAmount { actual: Amount, allowed: Amount },

    #[error("bad-cb-missing")]
    BadCoinbaseMissing,

    #[error("bad-cb-multiple")]
    BadMultipleCoinbase,

    #[error("bad-cb-length")]
    BadCoinbaseLength(usize),

    #[error("bad-txns-premature-spend-of-coinbase")]
    BadTransactionPrematureCoinbaseSpending { coin_height: u32, spend_height: u32 },

    #[error("bad-txns-premature-spend-of-coinstake")]
    BadTransactionPrematureCoinstakeSpending { coin_height: u32, spend_height: u32 },

    #[error("bad-txns-inputs-missingorspent")]
    BadTransactionMissingInput(Hash256),

    #[error("bad-txns-in-belowout")]
    BadTransactionInBelowOut { value_in: Amount, value_out: Amount },

    #[error("bad-txns-inputvalues-outofrange")]
    BadTransactionInputValueOutOfRange,

    #[error("bad-txns-vout-negative")]
    BadTransactionNegativeOutput,

    #[error("bad-txns-vout-toolarge")]
    BadTransactionTooLargeOutput,

    #[error("bad-txns-txouttotal-toolarge")]
    BadTransactionTooLargeTotalOutput,

    #[error("bad-blk-weight")]
    BadBlockWeight { weight: usize, max: usize },

    #[error("bad-prevblk")]
    BadPrevBlock,

    #[error("high-hash")]
    HighHash,
}

impl ConsensusError {
    /// Short reject reason (same as the display string).
    pub fn reject_reason(&self) -> String {
        self.to_string()
    }

    /// Violations caused by spending immature generation outputs.
    pub fn is_maturity_violation(&self) -> bool {
        matches!(
            self,
            Self::BadTransactionPrematureCoinbaseSpending { .. }
                | Self::BadTransactionPrematureCoinstakeSpending { .. }
        )
    }
}
