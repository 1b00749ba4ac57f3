//! Domain layer for the mining RPC surface

pub mod error;
pub mod hashrate;
pub mod methods;
pub mod types;

pub use error::{codes, RpcError, RpcResult};
pub use hashrate::network_hashps;
pub use methods::{get_method_info, method_names, MethodInfo, METHOD_REGISTRY};
pub use types::*;
