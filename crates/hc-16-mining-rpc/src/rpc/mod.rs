//! RPC method handlers.

pub mod mining;

pub use mining::{MiningRpc, MiningRpcDeps, GENERATE_MAX_TRIES};
