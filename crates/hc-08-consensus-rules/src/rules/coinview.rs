//! Coin-view consensus rule: reward, maturity and UTXO sequencing for a block.

use crate::domain::{subsidy, ConsensusError, ConsensusResult, ThresholdConditionCache, WitnessCommitments};
use crate::ports::{CoinView, UnspentOutputs};
use shared_types::{money_range, Amount, Block, ChainedHeader, ConsensusParams, Transaction, MAX_MONEY};
use std::sync::Arc;
use tracing::{debug, warn};

/// Allowed coinbase `script_sig` length.
pub const COINBASE_SCRIPT_MIN_LEN: usize = 2;
pub const COINBASE_SCRIPT_MAX_LEN: usize = 100;

/// Executes a block against a coin view and enforces the emission rules.
///
/// The coin view passed to [`CoinviewRule::execute_block`] should be a
/// staging set the caller can discard when a rule fails part-way.
#[derive(Clone)]
pub struct CoinviewRule {
    params: Arc<ConsensusParams>,
    witness: WitnessCommitments,
}

impl CoinviewRule {
    pub fn new(params: Arc<ConsensusParams>, thresholds: Arc<ThresholdConditionCache>) -> Self {
        Self {
            params,
            witness: WitnessCommitments::new(thresholds),
        }
    }

    pub fn params(&self) -> &ConsensusParams {
        &self.params
    }

    pub fn witness(&self) -> &WitnessCommitments {
        &self.witness
    }

    /// Proof-of-work subsidy at `height`.
    pub fn get_proof_of_work_reward(&self, height: u32) -> Amount {
        subsidy(height, &self.params)
    }

    /// Reject a coinbase paying more than `fees + subsidy(height)`.
    pub fn check_block_reward(&self, fees: Amount, height: u32, block: &Block) -> ConsensusResult<()> {
        let coinbase = block.coinbase().ok_or(ConsensusError::BadCoinbaseMissing)?;
        self.check_output_values(coinbase)?;
        let allowed = fees.saturating_add(self.get_proof_of_work_reward(height));
        let actual = coinbase.total_output_value();
        if actual > allowed {
            warn!(
                "[hc-08] coinbase pays {} but only {} allowed at height {}",
                actual, allowed, height
            );
            return Err(ConsensusError::BadCoinbaseAmount { actual, allowed });
        }
        Ok(())
    }

    /// Coinbase and coinstake outputs need `coinbase_maturity` confirmations.
    pub fn check_maturity(&self, coins: &UnspentOutputs, spend_height: u32) -> ConsensusResult<()> {
        let depth = spend_height as i64 - coins.height as i64;
        if depth >= self.params.coinbase_maturity as i64 {
            return Ok(());
        }
        if coins.is_coinbase {
            debug!("[hc-08] premature coinbase spend of {}", coins.txid);
            return Err(ConsensusError::BadTransactionPrematureCoinbaseSpending {
                coin_height: coins.height,
                spend_height,
            });
        }
        if coins.is_coinstake {
            debug!("[hc-08] premature coinstake spend of {}", coins.txid);
            return Err(ConsensusError::BadTransactionPrematureCoinstakeSpending {
                coin_height: coins.height,
                spend_height,
            });
        }
        Ok(())
    }

    /// First transaction is the only coinbase and its script length is sane.
    pub fn check_coinbase_structure(&self, block: &Block) -> ConsensusResult<()> {
        let coinbase = block.coinbase().ok_or(ConsensusError::BadCoinbaseMissing)?;
        if block.transactions.iter().skip(1).any(Transaction::is_coinbase) {
            return Err(ConsensusError::BadMultipleCoinbase);
        }
        let len = coinbase.inputs[0].script_sig.len();
        if !(COINBASE_SCRIPT_MIN_LEN..=COINBASE_SCRIPT_MAX_LEN).contains(&len) {
            return Err(ConsensusError::BadCoinbaseLength(len));
        }
        Ok(())
    }

    /// Every output value, and the sum of them, lies in `0..=MAX_MONEY`.
    pub fn check_output_values(&self, tx: &Transaction) -> ConsensusResult<()> {
        let mut total: Amount = 0;
        for output in &tx.outputs {
            if output.value < 0 {
                debug!("[hc-08] negative output in {}", tx.txid());
                return Err(ConsensusError::BadTransactionNegativeOutput);
            }
            if output.value > MAX_MONEY {
                debug!("[hc-08] oversized output in {}", tx.txid());
                return Err(ConsensusError::BadTransactionTooLargeOutput);
            }
            total += output.value;
            if !money_range(total) {
                debug!("[hc-08] output total out of range in {}", tx.txid());
                return Err(ConsensusError::BadTransactionTooLargeTotalOutput);
            }
        }
        Ok(())
    }

    /// Check `tx`'s outputs and inputs, then apply it to `view`. Returns the
    /// fee paid.
    ///
    /// Coinbase transactions pay no fee. Coinstake outputs may exceed their
    /// inputs (the stake reward), so they contribute no fee either.
    pub fn update_coin_view(
        &self,
        view: &dyn CoinView,
        tx: &Transaction,
        height: u32,
    ) -> ConsensusResult<Amount> {
        self.check_output_values(tx)?;
        if tx.is_coinbase() {
            view.update(tx, height);
            return Ok(0);
        }

        let mut value_in: Amount = 0;
        for input in &tx.inputs {
            let prevout = input.previous_output;
            let coins = view
                .access_coins(&prevout.txid)
                .ok_or(ConsensusError::BadTransactionMissingInput(prevout.txid))?;
            self.check_maturity(&coins, height)?;
            let spent = coins
                .try_get_output(prevout.vout)
                .ok_or(ConsensusError::BadTransactionMissingInput(prevout.txid))?;
            value_in = value_in
                .checked_add(spent.value)
                .filter(|v| money_range(spent.value) && money_range(*v))
                .ok_or(ConsensusError::BadTransactionInputValueOutOfRange)?;
        }

        let fee = if tx.is_coinstake() {
            0
        } else {
            let value_out = tx.total_output_value();
            if value_in < value_out {
                return Err(ConsensusError::BadTransactionInBelowOut {
                    value_in,
                    value_out,
                });
            }
            value_in - value_out
        };

        view.update(tx, height);
        Ok(fee)
    }

    /// Run every transaction of `block` at `height` through the view and
    /// enforce the block reward. Returns the total fees.
    pub fn execute_block(&self, view: &dyn CoinView, block: &Block, height: u32) -> ConsensusResult<Amount> {
        self.check_coinbase_structure(block)?;
        let mut fees: Amount = 0;
        for tx in &block.transactions {
            let fee = self.update_coin_view(view, tx, height)?;
            fees = fees.saturating_add(fee);
        }
        self.check_block_reward(fees, height, block)?;
        debug!(
            "[hc-08] executed block {} at height {} ({} txs, fees {})",
            block.hash(),
            height,
            block.transactions.len(),
            fees
        );
        Ok(fees)
    }

    /// Fill structures not covered by the header commitment (the coinbase
    /// witness nonce). Called once after assembly, before mining or staking.
    pub fn update_uncommitted_block_structures(&self, block: &mut Block, prev: Option<&ChainedHeader>) -> bool {
        self.witness.inject_commitment_nonce(block, prev)
    }
}
