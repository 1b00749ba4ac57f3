//! Domain layer for block assembly
//!
//! Pure logic: template entities, coinbase construction and the per-mode
//! pipeline strategies.

pub mod coinbase;
pub mod entities;
pub mod strategies;

pub use coinbase::{clear_coinbase, coinbase_script_sig, create_coinbase_transaction};
pub use entities::{AssemblerOptions, BlockTemplate, MempoolEntry};
pub use strategies::{AssemblerStrategies, AssemblyContext};
