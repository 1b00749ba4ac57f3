//! Consensus rules executed against a full block.

mod coinview;

pub use coinview::{CoinviewRule, COINBASE_SCRIPT_MAX_LEN, COINBASE_SCRIPT_MIN_LEN};
