use crate::domain::{get_method_info, BlockTemplateRequest, RpcError, RpcResult};
use crate::rpc::MiningRpc;
use serde::Serialize;
use serde_json::Value;

/// Route a JSON-RPC method to the mining handler.
///
/// `params` may be a positional array or an object keyed by the parameter
/// names registered in [`METHOD_REGISTRY`](crate::domain::METHOD_REGISTRY).
pub async fn route_method(rpc: &MiningRpc, method: &str, params: Option<&Value>) -> RpcResult<Value> {
    let info = get_method_info(method).ok_or_else(|| RpcError::method_not_found(method))?;
    let args = Params {
        raw: params,
        names: info.params,
    };

    match method {
        "getblocktemplate" => {
            let request: BlockTemplateRequest = args.optional(0)?.unwrap_or_default();
            to_value(rpc.get_block_template(request).await?)
        }
        "submitblock" => {
            let hex: String = args.required(0)?;
            let dummy: Option<Value> = args.optional(1)?;
            to_value(rpc.submit_block(&hex, dummy).await?)
        }
        "getmininginfo" => to_value(rpc.get_mining_info().await?),
        "getnetworkhashps" => {
            let lookup = args.optional(0)?.unwrap_or(120);
            let height = args.optional(1)?.unwrap_or(-1);
            to_value(rpc.get_network_hashps(lookup, height).await?)
        }
        "generate" => {
            let count: i64 = args.required(0)?;
            to_value(rpc.generate(count).await?)
        }
        "getstakinginfo" => {
            let is_json = args.optional(0)?.unwrap_or(true);
            to_value(rpc.get_staking_info(is_json).await?)
        }
        "startstaking" => {
            let name: String = args.required(0)?;
            let password: String = args.required(1)?;
            to_value(rpc.start_staking(&name, &password).await?)
        }
        "prioritisetransaction" => {
            let txid: String = args.required(0)?;
            let fee_delta: i64 = args.optional(2)?.unwrap_or(0);
            to_value(rpc.prioritise_transaction(&txid, fee_delta).await?)
        }
        _ => Err(RpcError::method_not_found(method)),
    }
}

fn to_value<T: Serialize>(value: T) -> RpcResult<Value> {
    Ok(serde_json::to_value(value)?)
}

struct Params<'a> {
    raw: Option<&'a Value>,
    names: &'static [&'static str],
}

impl Params<'_> {
    fn get(&self, index: usize) -> Option<&Value> {
        let value = match self.raw? {
            Value::Array(items) => items.get(index),
            Value::Object(map) => self.names.get(index).and_then(|name| map.get(*name)),
            _ => None,
        };
        value.filter(|v| !v.is_null())
    }

    fn name(&self, index: usize) -> &'static str {
        self.names.get(index).copied().unwrap_or("param")
    }

    fn optional<T: serde::de::DeserializeOwned>(&self, index: usize) -> RpcResult<Option<T>> {
        self.get(index)
            .map(|v| {
                serde_json::from_value(v.clone()).map_err(|e| {
                    RpcError::invalid_params(format!("{} ({}): {}", self.name(index), index, e))
                })
            })
            .transpose()
    }

    fn required<T: serde::de::DeserializeOwned>(&self, index: usize) -> RpcResult<T> {
        self.optional(index)?.ok_or_else(|| {
            RpcError::invalid_params(format!("missing {} at index {}", self.name(index), index))
        })
    }
}
