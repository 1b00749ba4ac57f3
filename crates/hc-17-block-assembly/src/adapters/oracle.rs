//! Fixed stake-difficulty oracle

use crate::ports::StakeDifficultyOracle;
use shared_types::{ChainedHeader, ConsensusParams};

/// Returns configured targets regardless of chain history.
///
/// Used for regtest and for wiring tests where the real stake chain is not
/// available.
#[derive(Clone, Copy, Debug)]
pub struct StaticDifficultyOracle {
    pow_bits: u32,
    pos_bits: u32,
}

impl StaticDifficultyOracle {
    pub fn new(pow_bits: u32, pos_bits: u32) -> Self {
        Self { pow_bits, pos_bits }
    }
}

impl StakeDifficultyOracle for StaticDifficultyOracle {
    fn next_target_required(
        &self,
        _tip: &ChainedHeader,
        _params: &ConsensusParams,
        proof_of_stake: bool,
    ) -> u32 {
        if proof_of_stake {
            self.pos_bits
        } else {
            self.pow_bits
        }
    }
}
