//! Supported mining RPC methods.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Method metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: &'static str,
    /// Changes node state (submits, mines or starts staking)
    pub is_write: bool,
    /// Positional parameter names, in order
    pub params: &'static [&'static str],
    pub description: &'static str,
}

impl MethodInfo {
    const fn read(
        name: &'static str,
        params: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self {
            name,
            is_write: false,
            params,
            description,
        }
    }

    const fn write(
        name: &'static str,
        params: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self {
            name,
            is_write: true,
            params,
            description,
        }
    }
}

/// Method registry - every method the dispatcher accepts
pub static METHOD_REGISTRY: LazyLock<HashMap<&'static str, MethodInfo>> = LazyLock::new(|| {
    let methods = [
        MethodInfo::read(
            "getblocktemplate",
            &["template_request"],
            "Get the template for PoW mining blocks",
        ),
        MethodInfo::write(
            "submitblock",
            &["hexdata", "dummy"],
            "Accept, verify and broadcast a block to the network",
        ),
        MethodInfo::read("getmininginfo", &[], "Get mining-related information"),
        MethodInfo::read(
            "getnetworkhashps",
            &["nblocks", "height"],
            "Estimated network hashes per second over the last blocks",
        ),
        MethodInfo::write(
            "generate",
            &["nblocks"],
            "Mine blocks and return their header hashes",
        ),
        MethodInfo::read("getstakinginfo", &["json"], "Get the staking information"),
        MethodInfo::write(
            "startstaking",
            &["walletname", "walletpassword"],
            "Start staking a wallet",
        ),
        MethodInfo::write(
            "prioritisetransaction",
            &["txid", "dummy", "fee_delta"],
            "Accepts the transaction into mined blocks",
        ),
    ];
    methods.into_iter().map(|m| (m.name, m)).collect()
});

/// Look up a method by name.
pub fn get_method_info(name: &str) -> Option<&'static MethodInfo> {
    METHOD_REGISTRY.get(name)
}

/// Sorted method names, for help output.
pub fn method_names() -> Vec<&'static str> {
    let mut names: Vec<_> = METHOD_REGISTRY.keys().copied().collect();
    names.sort_unstable();
    names
}
