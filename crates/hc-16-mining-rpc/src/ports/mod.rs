//! Ports layer

pub mod outbound;

pub use outbound::{
    ChainState, ConsensusLoop, KnownBlock, PowMiner, StakingService, WalletError, WalletManager,
};
