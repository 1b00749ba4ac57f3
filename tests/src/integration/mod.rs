//! Cross-crate integration flows.

mod mining_flows;
mod rpc_flows;
