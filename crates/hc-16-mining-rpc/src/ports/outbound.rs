//! Outbound ports - collaborators the RPC surface drives.

use crate::domain::StakingInfo;
use async_trait::async_trait;
use hc_08_consensus_rules::ConsensusResult;
use shared_types::{Block, ChainedHeader, Hash256, Script};
use std::sync::Arc;
use thiserror::Error;

/// A block header the node already knows about.
#[derive(Debug, Clone)]
pub struct KnownBlock {
    pub header: Arc<ChainedHeader>,
    /// Full block data was validated
    pub validated: bool,
}

/// Read access to the node's chain view.
pub trait ChainState: Send + Sync {
    /// Current consensus tip, `None` before genesis is loaded
    fn tip(&self) -> Option<Arc<ChainedHeader>>;

    /// Header lookup by hash
    fn lookup(&self, hash: &Hash256) -> Option<KnownBlock>;
}

/// Block acceptance path. The single serialisation point for new blocks.
#[async_trait]
pub trait ConsensusLoop: Send + Sync {
    async fn accept_block(&self, block: Block) -> ConsensusResult<()>;
}

/// Local proof-of-work miner.
#[async_trait]
pub trait PowMiner: Send + Sync {
    /// Mine up to `count` blocks paying to `script`; returns their hashes.
    async fn generate_blocks(&self, script: Script, count: u64, max_tries: u64) -> Vec<Hash256>;
}

/// Proof-of-stake minting service.
#[async_trait]
pub trait StakingService: Send + Sync {
    fn staking_info(&self) -> StakingInfo;

    async fn start_staking(&self, wallet_name: &str, password: &str);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("Wallet not found: {0}")]
    NotFound(String),

    #[error("Invalid password")]
    InvalidPassword,

    #[error("No unused address in account {0}")]
    NoUnusedAddress(String),
}

/// Wallet access needed by `generate` and `startstaking`.
pub trait WalletManager: Send + Sync {
    fn wallet_names(&self) -> Vec<String>;

    fn account_names(&self, wallet_name: &str) -> Vec<String>;

    /// Payout script of the next unused receive address
    fn unused_address_script(&self, wallet_name: &str, account: &str) -> Result<Script, WalletError>;

    /// Decrypt the wallet seed with `password`
    fn check_password(&self, wallet_name: &str, password: &str) -> Result<(), WalletError>;
}
