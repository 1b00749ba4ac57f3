//! # Hybrid Chain - Block Assembly (Subsystem 17)
//!
//! Builds candidate blocks for mining (PoW) and staking (PoS) on the hybrid
//! chain.
//!
//! ## Pipeline
//!
//! Every template is produced by a fresh [`BlockAssembler`]:
//!
//! ```text
//!  initialize ─▶ populate ─▶ coinbase ─▶ witness commitment
//!                                               │
//!   ┌───────────────────────────────────────────┘
//!   ▼
//!  compute_version* ─▶ finalize_coinbase* ─▶ update_headers (compute_difficulty*)
//!                                               │
//!                          validate_before_return* ─▶ BlockTemplate
//! ```
//!
//! Stages marked `*` come from [`AssemblerStrategies`], selected by
//! [`AssemblerFactory`] from the configured [`MiningMode`] and the per-call
//! [`AssemblerOptions`]:
//!
//! | Mode / options        | version        | coinbase | difficulty | validation |
//! |-----------------------|----------------|----------|------------|------------|
//! | pow                   | base           | kept     | retarget   | full       |
//! | pos                   | base           | cleared  | oracle     | skipped    |
//! | hybrid, PoW           | versionbits    | cleared  | oracle     | skipped    |
//! | hybrid, no options    | base           | cleared  | oracle     | skipped    |
//! | hybrid, PoS           | base           | cleared  | oracle     | skipped    |
//!
//! The mempool is read once per template under the shared [`MempoolLock`].
//! The coinbase witness nonce is not part of the template; callers run
//! `CoinviewRule::update_uncommitted_block_structures` before mining or
//! submitting.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let factory = AssemblerFactory::new(deps, MinerSettings::from_env())?;
//! let template = factory.build_template(&tip, &payout, Some(AssemblerOptions::proof_of_work()))?;
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod assembler;
pub mod domain;
pub mod factory;
pub mod ports;

mod config;
mod error;
mod metrics;

pub use config::{MinerSettings, MiningMode};
pub use error::{AssemblyError, Result};
pub use metrics::AssemblyMetrics;

pub use adapters::{CoinviewBlockValidator, InMemoryMempool, StaticDifficultyOracle, SystemClock};
pub use assembler::{AssemblerDeps, BlockAssembler};
pub use domain::{AssemblerOptions, AssemblerStrategies, AssemblyContext, BlockTemplate, MempoolEntry};
pub use factory::AssemblerFactory;
pub use ports::{
    BlockTemplateProvider, BlockValidator, Clock, MempoolLock, StakeDifficultyOracle, TxMempool,
};

/// Header version for blocks that do not vote on deployments
pub const CURRENT_BLOCK_VERSION: i32 = 7;

/// Consensus limit on block weight
pub const MAX_BLOCK_WEIGHT: usize = 4_000_000;

/// Default configured block weight
pub const DEFAULT_BLOCK_MAX_WEIGHT: usize = MAX_BLOCK_WEIGHT;

/// Default configured serialized block size
pub const DEFAULT_BLOCK_MAX_SIZE: usize = 1_000_000;

/// Weight held back for the coinbase during population
pub const COINBASE_RESERVED_WEIGHT: usize = 4_000;

/// Bytes held back for the header and coinbase during population
pub const COINBASE_RESERVED_SIZE: usize = 1_000;
