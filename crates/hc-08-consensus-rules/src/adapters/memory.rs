//! In-memory coin view for tests and single-process tooling.

use crate::ports::{CoinView, UnspentOutputs};
use parking_lot::RwLock;
use shared_types::{Hash256, Transaction};
use std::collections::HashMap;

/// UTXO set held in a `HashMap` behind a lock.
#[derive(Default)]
pub struct InMemoryCoinView {
    coins: RwLock<HashMap<Hash256, UnspentOutputs>>,
}

impl InMemoryCoinView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the view with the outputs of `tx` at `height`.
    pub fn insert(&self, tx: &Transaction, height: u32) {
        let coins = UnspentOutputs::from_transaction(tx, height);
        self.coins.write().insert(coins.txid, coins);
    }

    /// Independent copy of the current coins, used as a staging set.
    pub fn snapshot(&self) -> InMemoryCoinView {
        InMemoryCoinView {
            coins: RwLock::new(self.coins.read().clone()),
        }
    }

    pub fn len(&self) -> usize {
        self.coins.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.read().is_empty()
    }
}

impl CoinView for InMemoryCoinView {
    fn access_coins(&self, txid: &Hash256) -> Option<UnspentOutputs> {
        self.coins.read().get(txid).cloned()
    }

    fn update(&self, tx: &Transaction, height: u32) {
        let mut coins = self.coins.write();
        if !tx.is_coinbase() {
            for input in &tx.inputs {
                let prevout = input.previous_output;
                let fully_spent = match coins.get_mut(&prevout.txid) {
                    Some(entry) => {
                        entry.spend(prevout.vout);
                        entry.is_fully_spent()
                    }
                    None => false,
                };
                if fully_spent {
                    coins.remove(&prevout.txid);
                }
            }
        }
        let created = UnspentOutputs::from_transaction(tx, height);
        coins.insert(created.txid, created);
    }
}
