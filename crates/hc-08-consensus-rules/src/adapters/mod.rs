//! Adapters for the consensus rule ports

mod memory;

pub use memory::InMemoryCoinView;
