//! Network consensus parameters and the soft-fork deployment table.

use crate::chain::ChainedHeader;
use crate::entities::{Amount, COIN};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Soft-fork deployments tracked through versionbits signalling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentId {
    TestDummy,
    Csv,
    Segwit,
}

impl DeploymentId {
    /// Every known deployment, in table order.
    pub const ALL: [DeploymentId; 3] = [
        DeploymentId::TestDummy,
        DeploymentId::Csv,
        DeploymentId::Segwit,
    ];

    /// Rule name used by `getblocktemplate`.
    pub fn name(&self) -> &'static str {
        match self {
            DeploymentId::TestDummy => "testdummy",
            DeploymentId::Csv => "csv",
            DeploymentId::Segwit => "segwit",
        }
    }
}

/// When a deployment starts or times out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationBound {
    /// Satisfied from genesis.
    Always,
    /// Never satisfied.
    Never,
    /// Satisfied once the next block height reaches the value.
    Height(u32),
    /// Satisfied once the median-time-past of the previous block reaches the value.
    MedianTime(u32),
}

impl ActivationBound {
    /// Whether the bound holds for the block built on `prev`.
    pub fn reached(&self, prev: &ChainedHeader) -> bool {
        match *self {
            ActivationBound::Always => true,
            ActivationBound::Never => false,
            ActivationBound::Height(h) => prev.height() + 1 >= h,
            ActivationBound::MedianTime(t) => prev.median_time_past() >= t,
        }
    }
}

/// One row of the deployment table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: DeploymentId,
    /// Version bit (0..=28).
    pub bit: u8,
    pub start: ActivationBound,
    pub timeout: ActivationBound,
}

impl Deployment {
    /// Version bit mask, `1 << bit`.
    pub fn mask(&self) -> u32 {
        1u32 << self.bit
    }
}

/// Immutable deployment table fixed at node start.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentTable {
    deployments: Vec<Deployment>,
}

impl DeploymentTable {
    pub fn new(deployments: Vec<Deployment>) -> Self {
        Self { deployments }
    }

    pub fn get(&self, id: DeploymentId) -> Option<&Deployment> {
        self.deployments.iter().find(|d| d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Deployment> {
        self.deployments.iter()
    }
}

/// Consensus parameters of one network.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsensusParams {
    /// Network name reported by RPC (`main`, `test`, `regtest`).
    pub network: String,
    pub subsidy_halving_interval: u32,
    /// Block reward before any halving.
    pub proof_of_work_reward: Amount,
    /// Confirmations before coinbase/coinstake outputs may be spent.
    pub coinbase_maturity: u32,
    pub miner_confirmation_window: u32,
    pub rule_change_activation_threshold: u32,
    pub pow_limit: U256,
    /// Seconds per retarget period.
    pub pow_target_timespan: u64,
    /// Target seconds between blocks.
    pub pow_target_spacing: u64,
    pub pow_no_retargeting: bool,
    pub pow_allow_min_difficulty_blocks: bool,
    /// Last height at which proof-of-work blocks are accepted.
    pub last_pow_block: u32,
    pub deployments: DeploymentTable,
}

const TESTDUMMY_START: u32 = 1_199_145_601; // 2008-01-01
const TESTDUMMY_TIMEOUT: u32 = 1_230_767_999; // 2008-12-31

impl ConsensusParams {
    /// Main network.
    pub fn main() -> Self {
        Self {
            network: "main".to_string(),
            subsidy_halving_interval: 210_000,
            proof_of_work_reward: 50 * COIN,
            coinbase_maturity: 50,
            miner_confirmation_window: 720,
            rule_change_activation_threshold: 684,
            pow_limit: U256::MAX >> 24,
            pow_target_timespan: 10 * 60,
            pow_target_spacing: 2 * 60,
            pow_no_retargeting: false,
            pow_allow_min_difficulty_blocks: false,
            last_pow_block: 788_400,
            deployments: Self::default_deployments(),
        }
    }

    /// Public test network.
    pub fn test() -> Self {
        Self {
            network: "test".to_string(),
            pow_limit: U256::MAX >> 20,
            ..Self::main()
        }
    }

    /// Local regression-test network with short windows and trivial work.
    pub fn regtest() -> Self {
        Self {
            network: "regtest".to_string(),
            subsidy_halving_interval: 150,
            coinbase_maturity: 10,
            miner_confirmation_window: 144,
            rule_change_activation_threshold: 108,
            pow_limit: U256::MAX >> 1,
            pow_no_retargeting: true,
            pow_allow_min_difficulty_blocks: true,
            deployments: DeploymentTable::new(vec![
                Deployment {
                    id: DeploymentId::TestDummy,
                    bit: 28,
                    start: ActivationBound::Height(0),
                    timeout: ActivationBound::Never,
                },
                Deployment {
                    id: DeploymentId::Csv,
                    bit: 0,
                    start: ActivationBound::Always,
                    timeout: ActivationBound::Never,
                },
                Deployment {
                    id: DeploymentId::Segwit,
                    bit: 1,
                    start: ActivationBound::Always,
                    timeout: ActivationBound::Never,
                },
            ]),
            ..Self::main()
        }
    }

    /// Difficulty adjustment interval in blocks.
    pub fn difficulty_adjustment_interval(&self) -> u64 {
        self.pow_target_timespan / self.pow_target_spacing.max(1)
    }

    fn default_deployments() -> DeploymentTable {
        DeploymentTable::new(vec![
            Deployment {
                id: DeploymentId::TestDummy,
                bit: 28,
                start: ActivationBound::MedianTime(TESTDUMMY_START),
                timeout: ActivationBound::MedianTime(TESTDUMMY_TIMEOUT),
            },
            Deployment {
                id: DeploymentId::Csv,
                bit: 0,
                start: ActivationBound::MedianTime(1_462_060_800),
                timeout: ActivationBound::MedianTime(1_493_596_800),
            },
            Deployment {
                id: DeploymentId::Segwit,
                bit: 1,
                start: ActivationBound::MedianTime(1_479_168_000),
                timeout: ActivationBound::MedianTime(1_510_704_000),
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::BlockHeader;

    #[test]
    fn test_main_params_match_network() {
        let params = ConsensusParams::main();
        assert_eq!(params.miner_confirmation_window, 720);
        assert_eq!(params.rule_change_activation_threshold, 684);
        assert_eq!(params.difficulty_adjustment_interval(), 5);
        assert_eq!(params.pow_limit.leading_zeros(), 24);
    }

    #[test]
    fn test_test_network_limit() {
        // 00000fff...
        assert_eq!(ConsensusParams::test().pow_limit.leading_zeros(), 20);
    }

    #[test]
    fn test_deployment_masks() {
        let params = ConsensusParams::main();
        let segwit = params.deployments.get(DeploymentId::Segwit).unwrap();
        assert_eq!(segwit.mask(), 0b10);
        assert_eq!(
            params.deployments.get(DeploymentId::TestDummy).unwrap().mask(),
            1 << 28
        );
    }

    #[test]
    fn test_height_bound_uses_next_height() {
        let genesis = ChainedHeader::genesis(BlockHeader::default());
        assert!(ActivationBound::Height(1).reached(&genesis));
        assert!(!ActivationBound::Height(2).reached(&genesis));
        assert!(ActivationBound::Always.reached(&genesis));
        assert!(!ActivationBound::Never.reached(&genesis));
    }

    #[test]
    fn test_params_deserialize_from_json() {
        let json = serde_json::to_string(&ConsensusParams::regtest()).unwrap();
        let params: ConsensusParams = serde_json::from_str(&json).unwrap();
        assert_eq!(params.network, "regtest");
        assert_eq!(params.deployments.iter().count(), 3);
    }
}
