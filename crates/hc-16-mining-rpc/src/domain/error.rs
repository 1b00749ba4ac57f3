//! RPC errors with Bitcoin-compatible JSON-RPC codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes understood by mining-pool software.
pub mod codes {
    // JSON-RPC 2.0 standard errors
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Node application errors
    pub const MISC_ERROR: i32 = -1;
    pub const WALLET_ERROR: i32 = -4;
    pub const INVALID_PARAMETER: i32 = -8;
    pub const DESERIALIZATION_ERROR: i32 = -22;
    pub const VERIFY_ERROR: i32 = -25;
}

/// Request-scoped RPC failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(code: i32, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::new(codes::PARSE_ERROR, format!("Parse error: {}", details.into()))
    }

    /// Request is well-formed but cannot be served (no wallet, bad count)
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_REQUEST, message)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(codes::METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::new(codes::INVALID_PARAMS, format!("Invalid params: {}", details.into()))
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL_ERROR, format!("Internal error: {}", details.into()))
    }

    pub fn misc(message: impl Into<String>) -> Self {
        Self::new(codes::MISC_ERROR, message)
    }

    pub fn wallet(message: impl Into<String>) -> Self {
        Self::new(codes::WALLET_ERROR, message)
    }

    /// A named argument is missing or empty
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_PARAMETER, message)
    }

    /// Submitted bytes do not form a usable block
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::new(codes::DESERIALIZATION_ERROR, message)
    }

    /// Block rejected by consensus; carries the reject reason
    pub fn verify(message: impl Into<String>) -> Self {
        Self::new(codes::VERIFY_ERROR, message)
    }

    pub fn not_implemented(what: &str) -> Self {
        Self::new(codes::MISC_ERROR, format!("{} is not implemented", what))
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for RpcError {}

/// Result type for RPC handlers
pub type RpcResult<T> = Result<T, RpcError>;
