//! Assembler factory
//!
//! Picks the strategy set for the configured mining mode and hands out a
//! new [`BlockAssembler`] per call.

use crate::assembler::{AssemblerDeps, BlockAssembler};
use crate::config::{MinerSettings, MiningMode};
use crate::domain::{AssemblerOptions, AssemblerStrategies, BlockTemplate};
use crate::error::Result;
use crate::metrics::AssemblyMetrics;
use crate::ports::BlockTemplateProvider;
use shared_types::{ChainedHeader, Script};
use std::sync::Arc;
use tracing::{debug, info};

/// Builds assemblers bound to the node's collaborators.
pub struct AssemblerFactory {
    deps: AssemblerDeps,
    settings: MinerSettings,
    payout_script: Option<Script>,
}

impl AssemblerFactory {
    /// Validates `settings` once; every assembler shares them afterwards.
    pub fn new(deps: AssemblerDeps, settings: MinerSettings) -> Result<Self> {
        settings.validate()?;
        let payout_script = settings.payout_script()?;
        info!(
            "[hc-17] Block assembly ready (mode: {:?}, max weight: {}, witness: {})",
            settings.mining_mode, settings.block_max_weight, settings.mine_witness_tx
        );
        Ok(Self {
            deps,
            settings,
            payout_script,
        })
    }

    pub fn mining_mode(&self) -> MiningMode {
        self.settings.mining_mode
    }

    pub fn settings(&self) -> &MinerSettings {
        &self.settings
    }

    pub fn metrics(&self) -> &Arc<AssemblyMetrics> {
        &self.deps.metrics
    }

    /// New assembler for a block on `tip`.
    pub fn create(&self, tip: Arc<ChainedHeader>, options: Option<AssemblerOptions>) -> BlockAssembler {
        let strategies = AssemblerStrategies::for_mode(self.settings.mining_mode);
        debug!(
            "[hc-17] creating {:?} assembler on height {}",
            self.settings.mining_mode,
            tip.height()
        );
        BlockAssembler::new(
            self.deps.clone(),
            self.settings.clone(),
            strategies,
            tip,
            options,
        )
    }
}

impl BlockTemplateProvider for AssemblerFactory {
    fn build_template(
        &self,
        tip: &Arc<ChainedHeader>,
        payout_script: &Script,
        options: Option<AssemblerOptions>,
    ) -> Result<BlockTemplate> {
        self.create(Arc::clone(tip), options).build(payout_script)
    }

    fn default_payout_script(&self) -> Option<Script> {
        self.payout_script.clone()
    }
}
