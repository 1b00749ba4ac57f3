//! # Hybrid-Chain Test Suite
//!
//! Unified test crate for cross-crate flows.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Template assembly throughput
//! └── src/
//!     ├── node.rs       # In-process regtest node (chain, coins, mempool, RPC)
//!     └── integration/  # Assemble → inject → solve → submit flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p hc-tests
//! cargo test -p hc-tests integration::
//! cargo bench -p hc-tests
//! ```

pub mod integration;
pub mod node;

pub use node::{init_tracing, op_true, solve, unfunded_spend, TestNode, TEST_BITS};
