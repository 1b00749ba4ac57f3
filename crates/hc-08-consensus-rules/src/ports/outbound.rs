//! Driven ports (Outbound dependencies)

use shared_types::{Hash256, Transaction, TxOut};

/// Unspent outputs of one transaction as seen by the coin view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnspentOutputs {
    pub txid: Hash256,
    /// Height of the block that created the outputs.
    pub height: u32,
    pub is_coinbase: bool,
    pub is_coinstake: bool,
    /// `None` marks a spent output.
    pub outputs: Vec<Option<TxOut>>,
}

impl UnspentOutputs {
    /// Outputs created by `tx` at `height`.
    pub fn from_transaction(tx: &Transaction, height: u32) -> Self {
        Self {
            txid: tx.txid(),
            height,
            is_coinbase: tx.is_coinbase(),
            is_coinstake: tx.is_coinstake(),
            outputs: tx.outputs.iter().cloned().map(Some).collect(),
        }
    }

    pub fn try_get_output(&self, vout: u32) -> Option<&TxOut> {
        self.outputs.get(vout as usize).and_then(Option::as_ref)
    }

    /// Mark `vout` spent, returning the output if it was unspent.
    pub fn spend(&mut self, vout: u32) -> Option<TxOut> {
        self.outputs.get_mut(vout as usize).and_then(Option::take)
    }

    /// Every output has been spent.
    pub fn is_fully_spent(&self) -> bool {
        self.outputs.iter().all(Option::is_none)
    }
}

/// UTXO-set contract used while executing a block.
///
/// Storage is owned by the caller; the rule only reads coins and asks the
/// view to apply a transaction once its inputs have passed the checks.
pub trait CoinView: Send + Sync {
    /// Unspent outputs of `txid`, if any remain.
    fn access_coins(&self, txid: &Hash256) -> Option<UnspentOutputs>;

    /// Spend `tx`'s inputs and add its outputs at `height`.
    fn update(&self, tx: &Transaction, height: u32);
}
