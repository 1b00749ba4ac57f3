//! Assembly strategies
//!
//! The pipeline stages that differ between proof-of-work, proof-of-stake and
//! hybrid assembly are plain function pointers chosen once per build by
//! [`AssemblerStrategies::for_mode`]. Everything else in the pipeline is
//! shared.

use crate::config::MiningMode;
use crate::domain::coinbase::clear_coinbase;
use crate::domain::AssemblerOptions;
use crate::ports::{BlockValidator, StakeDifficultyOracle};
use crate::CURRENT_BLOCK_VERSION;
use hc_08_consensus_rules::{next_work_required, ConsensusResult, ThresholdConditionCache};
use shared_types::{Block, ChainedHeader, ConsensusParams};
use tracing::debug;

/// Read-only view of the collaborators a strategy may consult.
pub struct AssemblyContext<'a> {
    /// Tip the block is built on
    pub tip: &'a ChainedHeader,
    /// Options passed by the caller, `None` when defaults apply
    pub options: Option<&'a AssemblerOptions>,
    pub params: &'a ConsensusParams,
    pub thresholds: &'a ThresholdConditionCache,
    pub oracle: &'a dyn StakeDifficultyOracle,
    pub validator: &'a dyn BlockValidator,
}

impl AssemblyContext<'_> {
    /// True when the caller asked for a staking template.
    pub fn is_proof_of_stake(&self) -> bool {
        self.options.map(|o| o.is_proof_of_stake).unwrap_or(false)
    }
}

pub type ComputeVersionFn = fn(&AssemblyContext<'_>) -> i32;
pub type FinalizeCoinbaseFn = fn(&mut Block);
pub type ComputeDifficultyFn = fn(&AssemblyContext<'_>, u32) -> u32;
pub type ValidateBeforeReturnFn = fn(&AssemblyContext<'_>, &Block) -> ConsensusResult<()>;

/// The four variable stages of the assembly pipeline.
#[derive(Clone, Copy)]
pub struct AssemblerStrategies {
    /// Header version, including any deployment votes
    pub compute_version: ComputeVersionFn,
    /// Last touch on the coinbase before the header is filled
    pub finalize_coinbase: FinalizeCoinbaseFn,
    /// Compact target for the new block, given its timestamp
    pub compute_difficulty: ComputeDifficultyFn,
    /// Check run on the finished block before it is returned
    pub validate_before_return: ValidateBeforeReturnFn,
}

impl AssemblerStrategies {
    /// Pure proof-of-work chain.
    pub fn proof_of_work() -> Self {
        Self {
            compute_version: base_version,
            finalize_coinbase: keep_coinbase,
            compute_difficulty: pow_retarget,
            validate_before_return: validate_full,
        }
    }

    /// Staking template. Validation is skipped before return.
    pub fn proof_of_stake() -> Self {
        Self {
            compute_version: base_version,
            finalize_coinbase: clear_coinbase,
            compute_difficulty: stake_target,
            validate_before_return: skip_validation,
        }
    }

    /// Hybrid chain, mining or staking.
    ///
    /// Builds on the staking set: the coinbase is cleared and validation is
    /// skipped for every template. Only the version differs, and the
    /// options still pick the oracle target.
    pub fn hybrid() -> Self {
        Self {
            compute_version: hybrid_version,
            ..Self::proof_of_stake()
        }
    }

    /// Strategy set for the configured mode. Per-call options are read by
    /// the strategies themselves through [`AssemblyContext`].
    pub fn for_mode(mode: MiningMode) -> Self {
        match mode {
            MiningMode::ProofOfWork => Self::proof_of_work(),
            MiningMode::ProofOfStake => Self::proof_of_stake(),
            MiningMode::Hybrid => Self::hybrid(),
        }
    }
}

/// Node protocol version, no deployment votes.
pub fn base_version(_ctx: &AssemblyContext<'_>) -> i32 {
    CURRENT_BLOCK_VERSION
}

/// Versionbits votes for mining templates only.
///
/// Staking templates, and calls without options, fall back to
/// [`base_version`].
pub fn hybrid_version(ctx: &AssemblyContext<'_>) -> i32 {
    match ctx.options {
        Some(options) if !options.is_proof_of_stake => {
            ctx.thresholds.compute_block_version(Some(ctx.tip))
        }
        _ => base_version(ctx),
    }
}

/// Leaves the coinbase reward untouched.
pub fn keep_coinbase(_block: &mut Block) {}

/// Standard proof-of-work retarget.
pub fn pow_retarget(ctx: &AssemblyContext<'_>, block_time: u32) -> u32 {
    next_work_required(Some(ctx.tip), block_time, ctx.params)
}

/// Target from the stake-difficulty oracle, PoS or PoW per the options.
pub fn stake_target(ctx: &AssemblyContext<'_>, _block_time: u32) -> u32 {
    ctx.oracle
        .next_target_required(ctx.tip, ctx.params, ctx.is_proof_of_stake())
}

/// Full re-validation through the consensus pipeline.
pub fn validate_full(ctx: &AssemblyContext<'_>, block: &Block) -> ConsensusResult<()> {
    ctx.validator.validate_block(block, ctx.tip)
}

/// Staking-chain templates are returned without re-validation.
pub fn skip_validation(ctx: &AssemblyContext<'_>, _block: &Block) -> ConsensusResult<()> {
    debug!(
        "[hc-17] skipping template validation on height {}",
        ctx.tip.height() + 1
    );
    Ok(())
}
