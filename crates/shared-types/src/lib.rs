//! # Shared Types Crate
//!
//! Chain primitives used by every subsystem of the node.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: transactions, blocks and chained headers are
//!   defined once here and consumed by consensus, assembly and RPC alike.
//! - **Consensus Encoding**: [`encoding`] implements the Bitcoin wire format
//!   with BIP144 witness serialization; hashes are double SHA-256.
//! - **Immutable Chain Nodes**: a [`ChainedHeader`] owns a link to exactly one
//!   previous node and is never mutated after construction.

pub mod chain;
pub mod encoding;
pub mod entities;
pub mod errors;
pub mod hashing;
pub mod params;
pub mod target;

pub use chain::ChainedHeader;
pub use encoding::{deserialize, deserialize_hex, serialize, Decodable, Encodable};
pub use entities::*;
pub use errors::*;
pub use params::{ActivationBound, ConsensusParams, Deployment, DeploymentId, DeploymentTable};
pub use target::{
    block_proof, compact_to_target, difficulty_from_bits, target_hex, target_to_compact, CompactTarget,
};
