//! Adapters for the mining RPC surface.

pub mod error_conversions;
