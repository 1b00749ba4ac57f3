//! In-memory transaction pool

use crate::domain::MempoolEntry;
use crate::error::Result;
use crate::ports::{MempoolLock, TxMempool};
use parking_lot::RwLock;
use shared_types::{Block, Hash256};
use std::collections::HashSet;
use tracing::debug;

/// Arrival-ordered pool guarded by the shared [`MempoolLock`].
///
/// Writers take the gate themselves. [`TxMempool::candidates`] does not,
/// since the assembler already holds it when taking its snapshot.
pub struct InMemoryMempool {
    gate: MempoolLock,
    entries: RwLock<Vec<MempoolEntry>>,
}

impl InMemoryMempool {
    pub fn new(gate: MempoolLock) -> Self {
        Self {
            gate,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Add `entry` unless a transaction with the same txid is present.
    pub fn add(&self, entry: MempoolEntry) -> bool {
        let _gate = self.gate.lock();
        let txid = entry.tx.txid();
        let mut entries = self.entries.write();
        if entries.iter().any(|e| e.tx.txid() == txid) {
            return false;
        }
        entries.push(entry);
        true
    }

    /// Drop every transaction confirmed by `block`.
    pub fn remove_for_block(&self, block: &Block) -> usize {
        let _gate = self.gate.lock();
        let confirmed: HashSet<Hash256> = block.transactions.iter().map(|tx| tx.txid()).collect();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| !confirmed.contains(&e.tx.txid()));
        let removed = before - entries.len();
        if removed > 0 {
            debug!("[hc-17] removed {} confirmed transactions from mempool", removed);
        }
        removed
    }
}

impl TxMempool for InMemoryMempool {
    fn candidates(&self) -> Result<Vec<MempoolEntry>> {
        Ok(self.entries.read().clone())
    }

    fn size(&self) -> usize {
        self.entries.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use shared_types::{OutPoint, Script, Transaction, TxIn, TxOut};
    use std::sync::Arc;

    fn entry(tag: u8, fee: i64) -> MempoolEntry {
        let tx = Transaction {
            inputs: vec![TxIn::new(OutPoint::new(Hash256([tag; 32]), 0), Script::new())],
            outputs: vec![TxOut::new(1, Script::new())],
            ..Default::default()
        };
        MempoolEntry::new(tx, fee)
    }

    #[test]
    fn test_add_dedups_and_keeps_order() {
        let pool = InMemoryMempool::new(Arc::new(Mutex::new(())));
        assert!(pool.add(entry(1, 10)));
        assert!(pool.add(entry(2, 20)));
        assert!(!pool.add(entry(1, 99)));

        let fees: Vec<i64> = pool.candidates().unwrap().iter().map(|e| e.fee).collect();
        assert_eq!(fees, vec![10, 20]);
        assert_eq!(pool.size(), 2);
    }

    #[test]
    fn test_remove_for_block() {
        let pool = InMemoryMempool::new(Arc::new(Mutex::new(())));
        let confirmed = entry(1, 10);
        pool.add(confirmed.clone());
        pool.add(entry(2, 20));

        let block = Block {
            transactions: vec![confirmed.tx],
            ..Default::default()
        };
        assert_eq!(pool.remove_for_block(&block), 1);
        assert_eq!(pool.size(), 1);
    }
}
