//! Segregated-witness commitment handling for coinbase transactions.

use super::versionbits::{ThresholdConditionCache, ThresholdState};
use rand::Rng;
use shared_types::hashing::sha256d;
use shared_types::{Block, ChainedHeader, DeploymentId, Hash256, Script, TxOut};
use std::sync::Arc;
use tracing::trace;

/// `OP_RETURN`, push 36, then the `aa21a9ed` commitment tag.
pub const WITNESS_COMMITMENT_HEADER: [u8; 6] = [0x6a, 0x24, 0xaa, 0x21, 0xa9, 0xed];

/// Header plus a 32-byte commitment hash.
pub const MINIMUM_WITNESS_COMMITMENT: usize = 38;

/// Witness reserved value assumed when building the commitment.
pub const WITNESS_RESERVED_VALUE: [u8; 32] = [0u8; 32];

/// Whether a script is a witness commitment output script.
pub fn is_commitment_script(script: &Script) -> bool {
    let bytes = script.as_bytes();
    bytes.len() >= MINIMUM_WITNESS_COMMITMENT && bytes.starts_with(&WITNESS_COMMITMENT_HEADER)
}

/// Index of the witness commitment output in the coinbase.
///
/// Every output is scanned and the last qualifying one wins.
pub fn find_commitment_output_index(block: &Block) -> Option<usize> {
    let coinbase = block.transactions.first()?;
    coinbase
        .outputs
        .iter()
        .rposition(|out| is_commitment_script(&out.script_pubkey))
}

/// Commitment hash `dSHA256(witness_root || reserved_value)`.
pub fn witness_commitment_hash(block: &Block, reserved_value: &[u8]) -> Hash256 {
    let root = block.compute_witness_merkle_root();
    let mut buf = Vec::with_capacity(32 + reserved_value.len());
    buf.extend_from_slice(root.as_bytes());
    buf.extend_from_slice(reserved_value);
    sha256d(&buf)
}

/// Zero-value commitment output for `block`'s current transactions.
pub fn build_commitment_output(block: &Block) -> TxOut {
    let hash = witness_commitment_hash(block, &WITNESS_RESERVED_VALUE);
    let mut script = Vec::with_capacity(MINIMUM_WITNESS_COMMITMENT);
    script.extend_from_slice(&WITNESS_COMMITMENT_HEADER);
    script.extend_from_slice(hash.as_bytes());
    TxOut::new(0, Script::from_bytes(script))
}

/// Locates and fills witness commitment data on assembled blocks.
#[derive(Clone)]
pub struct WitnessCommitments {
    thresholds: Arc<ThresholdConditionCache>,
}

impl WitnessCommitments {
    pub fn new(thresholds: Arc<ThresholdConditionCache>) -> Self {
        Self { thresholds }
    }

    /// Segwit rules apply to the block built on `prev`.
    pub fn is_witness_enabled(&self, prev: Option<&ChainedHeader>) -> bool {
        self.thresholds.get_state(prev, DeploymentId::Segwit) == ThresholdState::Active
    }

    /// Attach a fresh random nonce as the coinbase input's only witness item.
    ///
    /// No-op (returns `false`) unless the block has a commitment output,
    /// segwit is active at `prev`, and the coinbase input has no witness yet.
    pub fn inject_commitment_nonce(&self, block: &mut Block, prev: Option<&ChainedHeader>) -> bool {
        if find_commitment_output_index(block).is_none() || !self.is_witness_enabled(prev) {
            return false;
        }
        let Some(coinbase) = block.coinbase_mut() else {
            return false;
        };
        let input = &mut coinbase.inputs[0];
        if !input.witness.is_empty() {
            return false;
        }

        let nonce: u64 = rand::thread_rng().gen();
        input.witness = vec![nonce.to_string().into_bytes()];
        trace!("[hc-08] injected witness nonce into coinbase");
        true
    }
}
