//! Block assembly entities

use serde::Deserialize;
use shared_types::{Amount, Block, Transaction};

/// Per-call assembly options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct AssemblerOptions {
    /// Build a staking (PoS) template instead of a mining (PoW) one
    pub is_proof_of_stake: bool,

    /// Include witness transactions and a witness commitment
    pub mine_witness_tx: bool,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            is_proof_of_stake: false,
            mine_witness_tx: true,
        }
    }
}

impl AssemblerOptions {
    /// Options for a mining template.
    pub fn proof_of_work() -> Self {
        Self::default()
    }

    /// Options for a staking template.
    pub fn proof_of_stake() -> Self {
        Self {
            is_proof_of_stake: true,
            ..Self::default()
        }
    }
}

/// A mempool transaction offered to the assembler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MempoolEntry {
    pub tx: Transaction,
    /// Absolute fee paid
    pub fee: Amount,
}

impl MempoolEntry {
    pub fn new(tx: Transaction, fee: Amount) -> Self {
        Self { tx, fee }
    }

    pub fn weight(&self) -> usize {
        self.tx.weight()
    }

    /// Fee per thousand weight units.
    pub fn fee_rate(&self) -> f64 {
        let weight = self.weight().max(1);
        self.fee as f64 * 1000.0 / weight as f64
    }
}

/// Candidate block ready for mining or staking.
///
/// `tx_fees[i]` is the fee of `block.transactions[i]`; slot 0 (the coinbase)
/// holds the negated total of all fees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockTemplate {
    pub block: Block,
    pub tx_fees: Vec<Amount>,
    /// Witness commitment output script, when one was added
    pub coinbase_commitment: Option<Vec<u8>>,
    /// Height of the block being built
    pub height: u32,
}

impl BlockTemplate {
    /// Sum of fees paid by the non-coinbase transactions.
    pub fn total_fees(&self) -> Amount {
        self.tx_fees.iter().skip(1).sum()
    }

    /// Coinbase value (subsidy + fees, or zero when cleared for staking).
    pub fn coinbase_value(&self) -> Amount {
        self.block
            .coinbase()
            .map(|cb| cb.total_output_value())
            .unwrap_or(0)
    }

    /// Fees list and transactions line up one to one.
    pub fn is_consistent(&self) -> bool {
        self.tx_fees.len() == self.block.transactions.len()
            && self.tx_fees.first().copied() == Some(-self.total_fees())
    }
}
