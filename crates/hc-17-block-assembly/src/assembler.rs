//! Block assembler pipeline
//!
//! A [`BlockAssembler`] is built for one template and consumed by
//! [`BlockAssembler::build`]. The stages run in a fixed order; the ones
//! that vary by proof mode are delegated to [`AssemblerStrategies`].

use crate::config::MinerSettings;
use crate::domain::{
    create_coinbase_transaction, AssemblerOptions, AssemblerStrategies, AssemblyContext,
    BlockTemplate,
};
use crate::error::{AssemblyError, Result};
use crate::metrics::AssemblyMetrics;
use crate::ports::{BlockValidator, Clock, MempoolLock, StakeDifficultyOracle, TxMempool};
use crate::{COINBASE_RESERVED_SIZE, COINBASE_RESERVED_WEIGHT};
use hc_08_consensus_rules::{
    build_commitment_output, subsidy, ThresholdConditionCache, WitnessCommitments,
};
use shared_types::{Amount, Block, ChainedHeader, ConsensusParams, Hash256, Script, Transaction};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, trace};

/// Shared collaborators handed to every assembler.
#[derive(Clone)]
pub struct AssemblerDeps {
    pub params: Arc<ConsensusParams>,
    pub thresholds: Arc<ThresholdConditionCache>,
    pub mempool: Arc<dyn TxMempool>,
    pub mempool_lock: MempoolLock,
    pub oracle: Arc<dyn StakeDifficultyOracle>,
    pub validator: Arc<dyn BlockValidator>,
    pub clock: Arc<dyn Clock>,
    pub metrics: Arc<AssemblyMetrics>,
}

/// Single-use block template builder.
pub struct BlockAssembler {
    deps: AssemblerDeps,
    settings: MinerSettings,
    strategies: AssemblerStrategies,
    tip: Arc<ChainedHeader>,
    options: Option<AssemblerOptions>,

    block: Block,
    tx_fees: Vec<Amount>,
    block_weight: usize,
    block_size: usize,
    fees: Amount,
    height: u32,
    include_witness: bool,
    coinbase_commitment: Option<Vec<u8>>,
}

impl BlockAssembler {
    /// Bind a fresh assembler to `tip` and the per-call `options`.
    pub fn new(
        deps: AssemblerDeps,
        settings: MinerSettings,
        strategies: AssemblerStrategies,
        tip: Arc<ChainedHeader>,
        options: Option<AssemblerOptions>,
    ) -> Self {
        let effective = options.unwrap_or_default();
        let witness_active =
            WitnessCommitments::new(Arc::clone(&deps.thresholds)).is_witness_enabled(Some(&tip));
        let include_witness = effective.mine_witness_tx && settings.mine_witness_tx && witness_active;
        let height = tip.height() + 1;

        // Slot 0 is reserved for the coinbase, filled once fees are known.
        let block = Block {
            transactions: vec![Transaction::default()],
            ..Default::default()
        };

        Self {
            deps,
            settings,
            strategies,
            tip,
            options,
            block,
            tx_fees: vec![0],
            block_weight: COINBASE_RESERVED_WEIGHT,
            block_size: COINBASE_RESERVED_SIZE,
            fees: 0,
            height,
            include_witness,
            coinbase_commitment: None,
        }
    }

    /// Height of the block being assembled.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether witness transactions and a commitment will be included.
    pub fn include_witness(&self) -> bool {
        self.include_witness
    }

    fn context(&self) -> AssemblyContext<'_> {
        AssemblyContext {
            tip: &self.tip,
            options: self.options.as_ref(),
            params: &self.deps.params,
            thresholds: &self.deps.thresholds,
            oracle: self.deps.oracle.as_ref(),
            validator: self.deps.validator.as_ref(),
        }
    }

    /// Run the pipeline and hand back the finished template.
    #[instrument(skip_all, fields(height = self.height))]
    pub fn build(mut self, payout_script: &Script) -> Result<BlockTemplate> {
        self.add_transactions()?;
        self.create_coinbase(payout_script);
        self.add_witness_commitment();

        let version = (self.strategies.compute_version)(&self.context());
        self.block.header.version = version;

        (self.strategies.finalize_coinbase)(&mut self.block);
        self.update_headers();

        (self.strategies.validate_before_return)(&self.context(), &self.block)?;

        self.finish()
    }

    /// Take the mempool snapshot under the gate and fill the block body.
    fn add_transactions(&mut self) -> Result<()> {
        let candidates = {
            let _gate = self.deps.mempool_lock.lock();
            self.deps.mempool.candidates()?
        };
        trace!("[hc-17] {} mempool candidates", candidates.len());

        let mut seen: HashSet<Hash256> = HashSet::with_capacity(candidates.len());
        for entry in candidates {
            if entry.tx.is_coinbase() {
                continue;
            }
            if !self.include_witness && entry.tx.has_witness() {
                continue;
            }
            if entry.fee < self.settings.block_min_tx_fee {
                continue;
            }
            let weight = entry.weight();
            let size = entry.tx.total_size();
            if self.block_weight + weight >= self.settings.block_max_weight
                || self.block_size + size >= self.settings.block_max_size
            {
                continue;
            }
            if !seen.insert(entry.tx.txid()) {
                continue;
            }

            self.block_weight += weight;
            self.block_size += size;
            self.fees = self.fees.saturating_add(entry.fee);
            self.tx_fees.push(entry.fee);
            self.block.transactions.push(entry.tx);
        }

        debug!(
            "[hc-17] selected {} transactions, fees {}",
            self.block.transactions.len() - 1,
            self.fees
        );
        Ok(())
    }

    /// Coinbase paying subsidy plus fees to `payout_script`.
    fn create_coinbase(&mut self, payout_script: &Script) {
        let value = subsidy(self.height, &self.deps.params).saturating_add(self.fees);
        self.block.transactions[0] = create_coinbase_transaction(self.height, value, payout_script);
        self.tx_fees[0] = -self.fees;
    }

    fn add_witness_commitment(&mut self) {
        if !self.include_witness {
            return;
        }
        let output = build_commitment_output(&self.block);
        self.coinbase_commitment = Some(output.script_pubkey.as_bytes().to_vec());
        self.block.transactions[0].outputs.push(output);
    }

    fn update_headers(&mut self) {
        let time = self
            .tip
            .median_time_past()
            .saturating_add(1)
            .max(self.deps.clock.now());
        let bits = (self.strategies.compute_difficulty)(&self.context(), time);

        let header = &mut self.block.header;
        header.prev_block_hash = self.tip.hash();
        header.time = time;
        header.bits = bits;
        header.nonce = 0;
        self.block.header.merkle_root = self.block.compute_merkle_root();
    }

    fn finish(self) -> Result<BlockTemplate> {
        let template = BlockTemplate {
            block: self.block,
            tx_fees: self.tx_fees,
            coinbase_commitment: self.coinbase_commitment,
            height: self.height,
        };
        if !template.is_consistent() {
            return Err(AssemblyError::InvalidTemplate(
                "fee list does not match transactions".into(),
            ));
        }

        let tx_count = template.block.transactions.len();
        let size = template.block.total_size();
        let weight = template.block.weight();
        self.deps
            .metrics
            .record_block_assembled(tx_count - 1, size, weight, self.fees);

        info!(
            "[hc-17] assembled block template at height {} ({} txs, fees {}, weight {})",
            self.height, tx_count, self.fees, weight
        );
        Ok(template)
    }
}
