//! Error conversions from collaborator error types.

use crate::domain::RpcError;
use crate::ports::WalletError;
use hc_08_consensus_rules::ConsensusError;
use hc_17_block_assembly::AssemblyError;

impl From<AssemblyError> for RpcError {
    fn from(e: AssemblyError) -> Self {
        match e {
            AssemblyError::Consensus(inner) => inner.into(),
            AssemblyError::InvalidTemplate(details) => RpcError::internal(details),
            other => RpcError::misc(other.to_string()),
        }
    }
}

impl From<ConsensusError> for RpcError {
    fn from(e: ConsensusError) -> Self {
        RpcError::verify(e.reject_reason())
    }
}

impl From<WalletError> for RpcError {
    fn from(e: WalletError) -> Self {
        RpcError::wallet(e.to_string())
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(e: serde_json::Error) -> Self {
        RpcError::internal(e.to_string())
    }
}
