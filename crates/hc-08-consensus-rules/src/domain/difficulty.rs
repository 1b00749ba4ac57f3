//! Proof-of-work difficulty retargeting.
//!
//! Epoch-based (Bitcoin-style) adjustment: every
//! `difficulty_adjustment_interval` blocks the target is scaled by the ratio
//! of actual to expected timespan, clamped to a factor of 4 either way.
//!
//! **Reminder**: a HIGHER target is EASIER.

use super::{ConsensusError, ConsensusResult};
use primitive_types::U256;
use shared_types::{compact_to_target, target_to_compact, BlockHeader, ChainedHeader, ConsensusParams};
use tracing::debug;

/// Maximum adjustment factor per retarget.
pub const MAX_ADJUSTMENT_FACTOR: u64 = 4;

/// Compact target required for the block built on `prev` with `block_time`.
pub fn next_work_required(
    prev: Option<&ChainedHeader>,
    block_time: u32,
    params: &ConsensusParams,
) -> u32 {
    let limit_bits = target_to_compact(params.pow_limit);
    let Some(prev) = prev else {
        return limit_bits;
    };

    let interval = params.difficulty_adjustment_interval().max(1);
    let next_height = prev.height() as u64 + 1;

    if next_height % interval != 0 {
        if params.pow_allow_min_difficulty_blocks {
            // Allow a min-difficulty block after twice the target spacing.
            let stalled_after = prev.header().time as u64 + params.pow_target_spacing * 2;
            if block_time as u64 > stalled_after {
                return limit_bits;
            }
            // Otherwise return the last non-special-min-difficulty target.
            return prev
                .iter_back()
                .find(|n| n.height() as u64 % interval == 0 || n.header().bits != limit_bits)
                .map(|n| n.header().bits)
                .unwrap_or(limit_bits);
        }
        return prev.header().bits;
    }

    let first_height = (next_height - interval) as u32;
    let first_time = prev
        .get_ancestor(first_height)
        .map(|n| n.header().time)
        .unwrap_or(prev.header().time);
    calculate_next_work_required(prev, first_time, params)
}

/// Scale `prev`'s target by the observed timespan since `first_block_time`.
pub fn calculate_next_work_required(
    prev: &ChainedHeader,
    first_block_time: u32,
    params: &ConsensusParams,
) -> u32 {
    if params.pow_no_retargeting {
        return prev.header().bits;
    }

    let timespan = params.pow_target_timespan.max(1);
    let actual = (prev.header().time as u64)
        .saturating_sub(first_block_time as u64)
        .clamp(timespan / MAX_ADJUSTMENT_FACTOR, timespan * MAX_ADJUSTMENT_FACTOR);

    let target = compact_to_target(prev.header().bits).target;
    let scaled = match target.checked_mul(U256::from(actual)) {
        Some(product) => product / U256::from(timespan),
        None => (target / U256::from(timespan)) * U256::from(actual),
    };
    target_to_compact(scaled.min(params.pow_limit))
}

/// Header hash must not exceed the target encoded in its own `bits`, and
/// that target must be positive and within the pow limit.
pub fn check_proof_of_work(header: &BlockHeader, params: &ConsensusParams) -> ConsensusResult<()> {
    let compact = compact_to_target(header.bits);
    if !compact.is_valid() || compact.target > params.pow_limit {
        debug!("[hc-08] bits {:08x} out of range", header.bits);
        return Err(ConsensusError::HighHash);
    }
    if header.hash().to_u256() > compact.target {
        return Err(ConsensusError::HighHash);
    }
    Ok(())
}
