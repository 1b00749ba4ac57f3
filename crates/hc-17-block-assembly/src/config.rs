//! Configuration types for block assembly

use crate::error::{AssemblyError, Result};
use serde::Deserialize;
use shared_types::{Amount, Script};
use tracing::{info, warn};

/// Consensus-rule-set variant the node assembles blocks for
#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq)]
pub enum MiningMode {
    /// Pure proof-of-work chain
    #[serde(rename = "pow")]
    ProofOfWork,

    /// Pure proof-of-stake chain
    #[serde(rename = "pos")]
    ProofOfStake,

    /// Hybrid chain: per-call options pick mining or staking
    #[serde(rename = "hybrid")]
    Hybrid,
}

impl MiningMode {
    /// Parse the configuration spelling (`pow`, `pos`, `hybrid`)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pow" => Some(Self::ProofOfWork),
            "pos" => Some(Self::ProofOfStake),
            "hybrid" | "powpos" => Some(Self::Hybrid),
            _ => None,
        }
    }
}

/// Runtime configuration for block assembly
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MinerSettings {
    /// Which assembler variant the factory builds
    pub mining_mode: MiningMode,

    /// Hex payout script used when the caller does not supply one
    pub mine_address_script: Option<String>,

    /// Maximum block weight (BIP141 units)
    pub block_max_weight: usize,

    /// Maximum serialized block size in bytes
    pub block_max_size: usize,

    /// Minimum absolute fee for a mempool transaction to be included
    pub block_min_tx_fee: Amount,

    /// Include witness transactions and a commitment when segwit is active
    pub mine_witness_tx: bool,
}

impl Default for MinerSettings {
    fn default() -> Self {
        Self {
            mining_mode: MiningMode::Hybrid,
            mine_address_script: None,
            block_max_weight: crate::DEFAULT_BLOCK_MAX_WEIGHT,
            block_max_size: crate::DEFAULT_BLOCK_MAX_SIZE,
            block_min_tx_fee: 0,
            mine_witness_tx: true,
        }
    }
}

impl MinerSettings {
    /// Defaults overridden by `HC_*` environment variables
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Ok(mode) = std::env::var("HC_MINING_MODE") {
            match MiningMode::parse(&mode) {
                Some(m) => settings.mining_mode = m,
                None => warn!("HC_MINING_MODE must be one of pow, pos, hybrid"),
            }
        }
        if let Ok(script) = std::env::var("HC_MINE_ADDRESS_SCRIPT") {
            settings.mine_address_script = Some(script);
            info!("Loaded payout script from environment");
        }
        if let Ok(weight) = std::env::var("HC_BLOCK_MAX_WEIGHT") {
            if let Ok(w) = weight.parse() {
                settings.block_max_weight = w;
            }
        }
        if let Ok(size) = std::env::var("HC_BLOCK_MAX_SIZE") {
            if let Ok(s) = size.parse() {
                settings.block_max_size = s;
            }
        }
        if let Ok(fee) = std::env::var("HC_BLOCK_MIN_TX_FEE") {
            if let Ok(f) = fee.parse() {
                settings.block_min_tx_fee = f;
            }
        }
        if let Ok(val) = std::env::var("HC_MINE_WITNESS_TX") {
            settings.mine_witness_tx = val == "1" || val.to_lowercase() == "true";
        }

        settings
    }

    /// Reject settings that cannot produce a valid block
    pub fn validate(&self) -> Result<()> {
        if self.block_max_weight <= crate::COINBASE_RESERVED_WEIGHT
            || self.block_max_weight > crate::MAX_BLOCK_WEIGHT
        {
            return Err(AssemblyError::InvalidConfig(format!(
                "block_max_weight must be in ({}, {}]",
                crate::COINBASE_RESERVED_WEIGHT,
                crate::MAX_BLOCK_WEIGHT
            )));
        }
        if self.block_max_size <= crate::COINBASE_RESERVED_SIZE {
            return Err(AssemblyError::InvalidConfig(format!(
                "block_max_size must exceed {}",
                crate::COINBASE_RESERVED_SIZE
            )));
        }
        if self.block_min_tx_fee < 0 {
            return Err(AssemblyError::InvalidConfig(
                "block_min_tx_fee cannot be negative".into(),
            ));
        }
        self.payout_script()?;
        Ok(())
    }

    /// Decoded configured payout script, if any
    pub fn payout_script(&self) -> Result<Option<Script>> {
        self.mine_address_script
            .as_deref()
            .map(|hex| {
                Script::from_hex(hex)
                    .map_err(|e| AssemblyError::InvalidConfig(format!("mine_address_script: {}", e)))
            })
            .transpose()
    }
}
