//! Request and response shapes of the mining RPC surface.
//!
//! Field names are the lowercase spellings mining software expects.

use serde::{Deserialize, Serialize};

/// Full 32-bit nonce space, as advertised in templates.
pub const NONCE_RANGE: &str = "00000000ffffffff";

/// `getblocktemplate` request object (BIP22/BIP23).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BlockTemplateRequest {
    pub mode: Option<String>,
    pub capabilities: Vec<String>,
    /// Rules the client supports, e.g. `"segwit"`
    pub rules: Vec<String>,
    pub data: Option<String>,
}

impl BlockTemplateRequest {
    /// Client declared support for `rule` (case-insensitive substring).
    pub fn declares_rule(&self, rule: &str) -> bool {
        let rule = rule.to_ascii_lowercase();
        self.rules
            .iter()
            .any(|r| r.to_ascii_lowercase().contains(&rule))
    }
}

/// Non-coinbase transaction of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateTransaction {
    /// Raw transaction hex, witness included
    pub data: String,
    pub txid: String,
    /// Witness hash
    pub hash: String,
    /// Fee in base units
    pub fee: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinbaseAux {
    /// Hex of the script-flag summary string
    pub flags: String,
}

/// `getblocktemplate` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockTemplateResponse {
    pub version: u32,
    pub previousblockhash: String,
    pub coinbasevalue: i64,
    /// 256-bit target, big-endian hex
    pub target: String,
    pub noncerange: String,
    pub curtime: u32,
    /// Compact target as 8 hex digits
    pub bits: String,
    pub height: u32,
    pub transactions: Vec<TemplateTransaction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coinbaseaux: Option<CoinbaseAux>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_witness_commitment: Option<String>,
}

/// `getmininginfo` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningInfo {
    pub blocks: u32,
    pub currentblocksize: u64,
    pub currentblockweight: u64,
    pub difficulty: f64,
    pub networkhashps: f64,
    pub chain: String,
}

/// `getstakinginfo` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StakingInfo {
    pub enabled: bool,
    pub staking: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<String>,
    pub currentblocksize: u64,
    pub currentblocktx: u64,
    pub pooledtx: u64,
    pub difficulty: f64,
    pub searchinterval: u32,
    pub weight: u64,
    pub netstakeweight: u64,
    pub expectedtime: u64,
}

/// Outcome of `submitblock` that is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// New block became the tip
    Accepted,
    /// Known block, already valid or not the tip after re-acceptance
    Duplicate,
    /// Known block re-accepted without error but not the tip
    DuplicateInconclusive,
    /// New block accepted but another tip remains
    Inconclusive,
}

impl SubmitOutcome {
    /// RPC result: `null` on acceptance, a status string otherwise.
    pub fn as_rpc_result(&self) -> Option<&'static str> {
        match self {
            Self::Accepted => None,
            Self::Duplicate => Some("duplicate"),
            Self::DuplicateInconclusive => Some("duplicate-inconclusive"),
            Self::Inconclusive => Some("inconclusive"),
        }
    }
}
