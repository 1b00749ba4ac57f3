//! Metrics collection for block assembly

use shared_types::Amount;
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for block assembly
#[derive(Debug, Default)]
pub struct AssemblyMetrics {
    /// Total templates assembled
    pub blocks_assembled: AtomicU64,

    /// Total transactions included (excluding coinbase)
    pub transactions_included: AtomicU64,

    /// Total fees collected
    pub total_fees_collected: AtomicU64,

    /// Serialized size of the last assembled block
    pub last_block_size: AtomicU64,

    /// Weight of the last assembled block
    pub last_block_weight: AtomicU64,

    /// Transaction count of the last assembled block
    pub last_block_tx_count: AtomicU64,
}

impl AssemblyMetrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an assembled block
    pub fn record_block_assembled(&self, tx_count: usize, size: usize, weight: usize, fees: Amount) {
        self.blocks_assembled.fetch_add(1, Ordering::Relaxed);
        self.transactions_included
            .fetch_add(tx_count as u64, Ordering::Relaxed);
        self.total_fees_collected
            .fetch_add(fees.max(0) as u64, Ordering::Relaxed);
        self.last_block_size.store(size as u64, Ordering::Relaxed);
        self.last_block_weight.store(weight as u64, Ordering::Relaxed);
        self.last_block_tx_count
            .store(tx_count as u64, Ordering::Relaxed);
    }

    /// Get blocks assembled
    pub fn get_blocks_assembled(&self) -> u64 {
        self.blocks_assembled.load(Ordering::Relaxed)
    }

    /// Size of the last assembled block
    pub fn get_last_block_size(&self) -> u64 {
        self.last_block_size.load(Ordering::Relaxed)
    }

    /// Weight of the last assembled block
    pub fn get_last_block_weight(&self) -> u64 {
        self.last_block_weight.load(Ordering::Relaxed)
    }

    /// Get average transactions per block
    pub fn get_avg_transactions_per_block(&self) -> f64 {
        let blocks = self.blocks_assembled.load(Ordering::Relaxed);
        if blocks == 0 {
            return 0.0;
        }
        let txs = self.transactions_included.load(Ordering::Relaxed);
        txs as f64 / blocks as f64
    }
}
