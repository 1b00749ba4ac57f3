//! BIP9 versionbits deployment tracking.
//!
//! A deployment's state only changes on window boundaries: every block in a
//! window of `miner_confirmation_window` blocks shares the state computed on
//! the last block of the previous window. States are memoised per
//! (deployment, boundary block hash) and never rewritten.
//!
//! ```text
//!  DEFINED ──start──▶ STARTED ──count ≥ threshold──▶ LOCKED_IN ──▶ ACTIVE
//!     │                  │
//!     └────timeout───────┴──timeout (no lock-in)──▶ FAILED
//! ```

use parking_lot::RwLock;
use serde::Serialize;
use shared_types::{ActivationBound, ChainedHeader, ConsensusParams, DeploymentId, Hash256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Top three version bits must equal [`VERSIONBITS_TOP_BITS`] to signal.
pub const VERSIONBITS_TOP_MASK: u32 = 0xE000_0000;

/// Version prefix marking a versionbits-aware block.
pub const VERSIONBITS_TOP_BITS: u32 = 0x2000_0000;

/// Number of usable signalling bits.
pub const VERSIONBITS_NUM_BITS: u8 = 29;

/// Activation state of a deployment at a chain position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdState {
    Defined,
    Started,
    LockedIn,
    Active,
    Failed,
}

impl ThresholdState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdState::Defined => "defined",
            ThresholdState::Started => "started",
            ThresholdState::LockedIn => "locked_in",
            ThresholdState::Active => "active",
            ThresholdState::Failed => "failed",
        }
    }

    /// No further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ThresholdState::Active | ThresholdState::Failed)
    }

    /// Miners should set the deployment bit in this state.
    pub fn is_signalling(&self) -> bool {
        matches!(self, ThresholdState::Started | ThresholdState::LockedIn)
    }
}

/// Whether `version` signals for the deployment with `mask`.
pub fn signals(version: i32, mask: u32) -> bool {
    let version = version as u32;
    (version & VERSIONBITS_TOP_MASK) == VERSIONBITS_TOP_BITS && (version & mask) != 0
}

type CacheKey = (DeploymentId, Option<Hash256>);

/// Memoised BIP9 state machine over chained headers.
pub struct ThresholdConditionCache {
    params: Arc<ConsensusParams>,
    cache: RwLock<HashMap<CacheKey, ThresholdState>>,
}

impl ThresholdConditionCache {
    pub fn new(params: Arc<ConsensusParams>) -> Self {
        Self {
            params,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn params(&self) -> &ConsensusParams {
        &self.params
    }

    /// `1 << bit` for a known deployment, `0` otherwise.
    pub fn mask(&self, id: DeploymentId) -> u32 {
        self.params
            .deployments
            .get(id)
            .map(|d| d.mask())
            .unwrap_or(0)
    }

    /// Number of memoised window states.
    pub fn cached_entries(&self) -> usize {
        self.cache.read().len()
    }

    /// State of `id` for the block that would be built on `prev`.
    ///
    /// `None` means the block being evaluated is genesis.
    pub fn get_state(&self, prev: Option<&ChainedHeader>, id: DeploymentId) -> ThresholdState {
        let Some(deployment) = self.params.deployments.get(id).copied() else {
            return ThresholdState::Defined;
        };
        if deployment.start == ActivationBound::Always {
            return ThresholdState::Active;
        }

        let window = self.params.miner_confirmation_window.max(1);
        let threshold = self.params.rule_change_activation_threshold as usize;
        let boundary = prev.and_then(|p| window_boundary(p, window));

        if let Some(state) = self.cache.read().get(&(id, boundary.map(|b| b.hash()))) {
            return *state;
        }

        // Slow path: walk back to a known window under the write lock so a
        // window is only ever computed once.
        let mut cache = self.cache.write();
        let mut cursor = boundary;
        let mut to_compute: Vec<&ChainedHeader> = Vec::new();
        let mut state = loop {
            let key = (id, cursor.map(|c| c.hash()));
            if let Some(state) = cache.get(&key) {
                break *state;
            }
            match cursor {
                None => {
                    cache.insert(key, ThresholdState::Defined);
                    break ThresholdState::Defined;
                }
                Some(node) if !deployment.start.reached(node) => {
                    cache.insert(key, ThresholdState::Defined);
                    break ThresholdState::Defined;
                }
                Some(node) => {
                    to_compute.push(node);
                    cursor = node
                        .height()
                        .checked_sub(window)
                        .and_then(|h| node.get_ancestor(h));
                }
            }
        };

        while let Some(node) = to_compute.pop() {
            let next = match state {
                ThresholdState::Defined => {
                    if deployment.timeout.reached(node) {
                        ThresholdState::Failed
                    } else if deployment.start.reached(node) {
                        ThresholdState::Started
                    } else {
                        ThresholdState::Defined
                    }
                }
                ThresholdState::Started => {
                    let count = node
                        .iter_back()
                        .take(window as usize)
                        .filter(|n| signals(n.header().version, deployment.mask()))
                        .count();
                    if count >= threshold {
                        ThresholdState::LockedIn
                    } else if deployment.timeout.reached(node) {
                        ThresholdState::Failed
                    } else {
                        ThresholdState::Started
                    }
                }
                ThresholdState::LockedIn => ThresholdState::Active,
                ThresholdState::Active | ThresholdState::Failed => state,
            };
            if next != state {
                debug!(
                    "[hc-08] deployment {} {} -> {} at height {}",
                    id.name(),
                    state.as_str(),
                    next.as_str(),
                    node.height() + 1
                );
            }
            cache.insert((id, Some(node.hash())), next);
            state = next;
        }

        state
    }

    /// States of every deployment in the table.
    pub fn get_states(&self, prev: Option<&ChainedHeader>) -> Vec<(DeploymentId, ThresholdState)> {
        self.params
            .deployments
            .iter()
            .map(|d| (d.id, self.get_state(prev, d.id)))
            .collect()
    }

    /// Versionbits header version voting for every started or locked-in deployment.
    pub fn compute_block_version(&self, prev: Option<&ChainedHeader>) -> i32 {
        let version = self
            .get_states(prev)
            .into_iter()
            .filter(|(_, state)| state.is_signalling())
            .fold(VERSIONBITS_TOP_BITS, |acc, (id, _)| acc | self.mask(id));
        version as i32
    }
}

/// Last block of the window preceding the block built on `prev`.
fn window_boundary(prev: &ChainedHeader, window: u32) -> Option<&ChainedHeader> {
    let height = prev.height();
    let back = (height + 1) % window;
    height.checked_sub(back).and_then(|h| prev.get_ancestor(h))
}
