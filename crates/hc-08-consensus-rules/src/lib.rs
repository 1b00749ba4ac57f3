//! # hc-08-consensus-rules
//!
//! Consensus rule core for the hybrid proof-of-work/proof-of-stake chain.
//!
//! ## Architecture
//!
//! Pure rule logic shared by block assembly (subsystem 17) and the mining
//! RPC surface (subsystem 16):
//!
//! ```text
//!            ┌──────────────────────────┐
//!            │  CoinviewRule            │  reward, maturity, coinbase shape
//!            └──────┬─────────────┬─────┘
//!                   │             │
//!        ┌──────────▼───┐   ┌─────▼──────────────┐
//!        │ subsidy()    │   │ WitnessCommitments │
//!        └──────────────┘   └─────┬──────────────┘
//!                                 │
//!                    ┌────────────▼──────────────┐
//!                    │ ThresholdConditionCache   │  BIP9 states per window
//!                    └───────────────────────────┘
//! ```
//!
//! The UTXO set is reached only through the [`ports::CoinView`] contract.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hc_08_consensus_rules::{CoinviewRule, ThresholdConditionCache};
//!
//! let thresholds = Arc::new(ThresholdConditionCache::new(params.clone()));
//! let rule = CoinviewRule::new(params, thresholds);
//! let fees = rule.execute_block(&coin_view, &block, height)?;
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod rules;

pub use adapters::InMemoryCoinView;
pub use domain::{
    build_commitment_output, calculate_next_work_required, check_proof_of_work,
    find_commitment_output_index, next_work_required, signals, subsidy, witness_commitment_hash,
    ConsensusError, ConsensusResult, NodeDeployments, ScriptFlags, ThresholdConditionCache, ThresholdState,
    WitnessCommitments, MINIMUM_WITNESS_COMMITMENT, VERSIONBITS_TOP_BITS, VERSIONBITS_TOP_MASK,
    WITNESS_COMMITMENT_HEADER,
};
pub use ports::{CoinView, UnspentOutputs};
pub use rules::CoinviewRule;
