//! Network hash-rate estimate.

use shared_types::ChainedHeader;

/// Estimated network hashes per second over `lookup` blocks ending at
/// `height` (or at `tip` when `height` is negative or not below the tip).
///
/// `lookup <= 0` means "since the last difficulty change". Returns `0.0`
/// for an empty chain, a genesis-only chain, or a window with no time
/// spread.
pub fn network_hashps(
    tip: Option<&ChainedHeader>,
    difficulty_adjustment_interval: u64,
    lookup: i64,
    height: i64,
) -> f64 {
    let Some(mut tip) = tip else {
        return 0.0;
    };
    if height >= 0 && height < tip.height() as i64 {
        match tip.get_ancestor(height as u32) {
            Some(ancestor) => tip = ancestor,
            None => return 0.0,
        }
    }
    if tip.height() == 0 {
        return 0.0;
    }

    let mut lookup = if lookup <= 0 {
        tip.height() as i64 % difficulty_adjustment_interval.max(1) as i64 + 1
    } else {
        lookup
    };
    lookup = lookup.min(tip.height() as i64);

    let first = tip.height() - lookup as u32;
    let (min_time, max_time) = tip
        .iter_back()
        .take(lookup as usize + 1)
        .map(|h| h.header().time)
        .fold((u32::MAX, u32::MIN), |(lo, hi), t| (lo.min(t), hi.max(t)));
    if min_time == max_time {
        return 0.0;
    }

    let Some(start) = tip.get_ancestor(first) else {
        return 0.0;
    };
    let work_diff = tip
        .chain_work()
        .low_u64()
        .wrapping_sub(start.chain_work().low_u64());
    work_diff as f64 / (max_time - min_time) as f64
}
