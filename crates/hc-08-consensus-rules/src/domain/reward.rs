//! Block reward schedule.

use shared_types::{Amount, ConsensusParams};

/// Halvings after which the subsidy is zero.
pub const MAX_HALVINGS: u32 = 64;

/// Block subsidy at `height`.
///
/// `proof_of_work_reward >> (height / subsidy_halving_interval)`, and exactly
/// zero once 64 halvings have happened (a 64-bit shift is not relied upon).
pub fn subsidy(height: u32, params: &ConsensusParams) -> Amount {
    let interval = params.subsidy_halving_interval.max(1);
    let halvings = height / interval;
    if halvings >= MAX_HALVINGS {
        return 0;
    }
    params.proof_of_work_reward >> halvings
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params() -> ConsensusParams {
        ConsensusParams {
            subsidy_halving_interval: 210_000,
            proof_of_work_reward: 5_000_000_000,
            ..ConsensusParams::main()
        }
    }

    #[test]
    fn test_subsidy_at_genesis() {
        assert_eq!(subsidy(0, &params()), 5_000_000_000);
        assert_eq!(subsidy(209_999, &params()), 5_000_000_000);
        assert_eq!(subsidy(210_000, &params()), 2_500_000_000);
    }

    #[test]
    fn test_subsidy_after_three_halvings() {
        assert_eq!(subsidy(3 * 210_000, &params()), 625_000_000);
    }

    #[test]
    fn test_subsidy_zero_after_64_halvings() {
        assert_eq!(subsidy(64 * 210_000, &params()), 0);
        assert_eq!(subsidy(u32::MAX, &ConsensusParams {
            subsidy_halving_interval: 1,
            ..params()
        }), 0);
    }

    proptest! {
        #[test]
        fn prop_subsidy_non_increasing(h in 0u32..(70 * 210_000)) {
            let p = params();
            prop_assert!(subsidy(h + 1, &p) <= subsidy(h, &p));
        }

        #[test]
        fn prop_subsidy_matches_shift(h in 0u32..(64 * 210_000)) {
            let p = params();
            prop_assert_eq!(subsidy(h, &p), 5_000_000_000i64 >> (h / 210_000));
        }
    }
}
