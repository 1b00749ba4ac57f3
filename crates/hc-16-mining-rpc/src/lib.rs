//! HC-16 Mining RPC - JSON-RPC surface for miners and stakers.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      MINING RPC (hc-16)                        │
//! ├────────────────────────────────────────────────────────────────┤
//! │   route_method ──► MiningRpc                                   │
//! │                      │                                         │
//! │    ┌─────────────────┼──────────────────┬──────────────────┐   │
//! │    ▼                 ▼                  ▼                  ▼   │
//! │ BlockTemplate    ConsensusLoop      PowMiner /        WalletManager
//! │ Provider (hc-17) (submitblock)      StakingService               │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Methods
//!
//! | Method                  | Result                                        |
//! |-------------------------|-----------------------------------------------|
//! | `getblocktemplate`      | template for external PoW miners              |
//! | `submitblock`           | `null`, `"duplicate"`, `"inconclusive"`, ...  |
//! | `getmininginfo`         | height, last template size, difficulty        |
//! | `getnetworkhashps`      | hash rate estimate                            |
//! | `generate`              | hashes of locally mined blocks                |
//! | `getstakinginfo`        | staking status                                |
//! | `startstaking`          | `true` once staking starts                    |
//! | `prioritisetransaction` | always `false`                                |
//!
//! Errors use Bitcoin-compatible codes (see [`codes`]).

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod router;
pub mod rpc;

pub use domain::{
    codes, get_method_info, method_names, network_hashps, BlockTemplateRequest,
    BlockTemplateResponse, CoinbaseAux, MethodInfo, MiningInfo, RpcError, RpcResult, StakingInfo,
    SubmitOutcome, TemplateTransaction, METHOD_REGISTRY, NONCE_RANGE,
};
pub use ports::{
    ChainState, ConsensusLoop, KnownBlock, PowMiner, StakingService, WalletError, WalletManager,
};
pub use router::route_method;
pub use rpc::{MiningRpc, MiningRpcDeps, GENERATE_MAX_TRIES};
