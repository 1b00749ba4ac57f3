//! Block validator backed by the coin-view rule

use crate::ports::BlockValidator;
use hc_08_consensus_rules::{ConsensusError, ConsensusResult, CoinviewRule, InMemoryCoinView};
use shared_types::{Block, ChainedHeader};
use std::sync::Arc;
use tracing::debug;

/// Runs [`CoinviewRule::execute_block`] against a throwaway copy of the
/// coin view so a rejected template leaves the real set untouched.
pub struct CoinviewBlockValidator {
    rule: CoinviewRule,
    coins: Arc<InMemoryCoinView>,
    max_block_weight: usize,
}

impl CoinviewBlockValidator {
    pub fn new(rule: CoinviewRule, coins: Arc<InMemoryCoinView>, max_block_weight: usize) -> Self {
        Self {
            rule,
            coins,
            max_block_weight,
        }
    }
}

impl BlockValidator for CoinviewBlockValidator {
    fn validate_block(&self, block: &Block, prev: &ChainedHeader) -> ConsensusResult<()> {
        if block.header.prev_block_hash != prev.hash() {
            return Err(ConsensusError::BadPrevBlock);
        }
        let weight = block.weight();
        if weight > self.max_block_weight {
            return Err(ConsensusError::BadBlockWeight {
                weight,
                max: self.max_block_weight,
            });
        }

        let staging = self.coins.snapshot();
        let fees = self.rule.execute_block(&staging, block, prev.height() + 1)?;
        debug!("[hc-17] template passed validation (fees {})", fees);
        Ok(())
    }
}
