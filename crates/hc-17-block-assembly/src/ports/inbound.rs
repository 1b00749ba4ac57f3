//! Inbound ports (driving side - API)

use crate::domain::{AssemblerOptions, BlockTemplate};
use crate::error::Result;
use shared_types::{ChainedHeader, Script};
use std::sync::Arc;

/// Primary port: build block templates on demand
pub trait BlockTemplateProvider: Send + Sync {
    /// Assemble a fresh template on `tip` paying to `payout_script`.
    ///
    /// `options = None` keeps the assembler defaults; in hybrid mode such a
    /// template does not vote for deployments.
    fn build_template(
        &self,
        tip: &Arc<ChainedHeader>,
        payout_script: &Script,
        options: Option<AssemblerOptions>,
    ) -> Result<BlockTemplate>;

    /// Payout script from configuration, if any
    fn default_payout_script(&self) -> Option<Script>;
}
