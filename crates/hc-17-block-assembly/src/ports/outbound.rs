//! Outbound ports (driven side - SPI)
//!
//! Assembly runs synchronously on the caller's thread, so these ports are
//! plain `Send + Sync` traits rather than async ones.

use crate::domain::MempoolEntry;
use crate::error::Result;
use hc_08_consensus_rules::ConsensusResult;
use parking_lot::Mutex;
use shared_types::{Block, ChainedHeader, ConsensusParams};
use std::sync::Arc;

/// Gate serialising mempool readers and writers.
///
/// The assembler holds it while taking its snapshot so the selected
/// transactions and their fees come from one consistent mempool state.
pub type MempoolLock = Arc<Mutex<()>>;

/// Port: read candidate transactions from the mempool
pub trait TxMempool: Send + Sync {
    /// Candidates in inclusion order (parents before children).
    /// Called with the [`MempoolLock`] held.
    fn candidates(&self) -> Result<Vec<MempoolEntry>>;

    /// Number of transactions in the pool
    fn size(&self) -> usize;
}

/// Port: difficulty for hybrid/staking templates
///
/// Owns the stake chain; `proof_of_stake` selects the PoS or PoW target.
pub trait StakeDifficultyOracle: Send + Sync {
    /// Compact target for the block built on `tip`
    fn next_target_required(
        &self,
        tip: &ChainedHeader,
        params: &ConsensusParams,
        proof_of_stake: bool,
    ) -> u32;
}

/// Port: re-validate an assembled block through the consensus pipeline
pub trait BlockValidator: Send + Sync {
    /// Full validation of `block` as a child of `prev`
    fn validate_block(&self, block: &Block, prev: &ChainedHeader) -> ConsensusResult<()>;
}

/// Port: adjusted network time in seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> u32;
}
