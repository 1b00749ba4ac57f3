//! Per-tip rule flags derived from buried and versionbits deployments.

use super::versionbits::{ThresholdConditionCache, ThresholdState};
use serde::Serialize;
use shared_types::{ChainedHeader, DeploymentId};
use std::sync::Arc;

/// Script verification flags enforced for a block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScriptFlags(u32);

impl ScriptFlags {
    pub const NONE: ScriptFlags = ScriptFlags(0);
    pub const P2SH: ScriptFlags = ScriptFlags(1 << 0);
    pub const DERSIG: ScriptFlags = ScriptFlags(1 << 2);
    pub const CHECKLOCKTIMEVERIFY: ScriptFlags = ScriptFlags(1 << 9);
    pub const CHECKSEQUENCEVERIFY: ScriptFlags = ScriptFlags(1 << 10);
    pub const WITNESS: ScriptFlags = ScriptFlags(1 << 11);

    const NAMED: [(ScriptFlags, &'static str); 5] = [
        (Self::P2SH, "P2SH"),
        (Self::DERSIG, "DERSIG"),
        (Self::CHECKLOCKTIMEVERIFY, "CHECKLOCKTIMEVERIFY"),
        (Self::CHECKSEQUENCEVERIFY, "CHECKSEQUENCEVERIFY"),
        (Self::WITNESS, "WITNESS"),
    ];

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, other: ScriptFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: ScriptFlags) {
        self.0 |= other.0;
    }

    /// Names of the set flags joined by `", "`.
    pub fn names(&self) -> String {
        Self::NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::ops::BitOr for ScriptFlags {
    type Output = ScriptFlags;

    fn bitor(self, rhs: ScriptFlags) -> ScriptFlags {
        ScriptFlags(self.0 | rhs.0)
    }
}

impl std::fmt::Display for ScriptFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.names())
    }
}

/// Computes which rules are enforced at a chain position.
///
/// BIP34/65/66 are buried from genesis on every network, so DERSIG and
/// CHECKLOCKTIMEVERIFY are always on; CSV and segwit follow versionbits.
#[derive(Clone)]
pub struct NodeDeployments {
    thresholds: Arc<ThresholdConditionCache>,
}

impl NodeDeployments {
    pub fn new(thresholds: Arc<ThresholdConditionCache>) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Arc<ThresholdConditionCache> {
        &self.thresholds
    }

    /// Script flags for the block built on `prev`.
    pub fn script_flags(&self, prev: Option<&ChainedHeader>) -> ScriptFlags {
        let mut flags = ScriptFlags::P2SH | ScriptFlags::DERSIG | ScriptFlags::CHECKLOCKTIMEVERIFY;
        if self.thresholds.get_state(prev, DeploymentId::Csv) == ThresholdState::Active {
            flags.insert(ScriptFlags::CHECKSEQUENCEVERIFY);
        }
        if self.thresholds.get_state(prev, DeploymentId::Segwit) == ThresholdState::Active {
            flags.insert(ScriptFlags::WITNESS);
        }
        flags
    }
}
