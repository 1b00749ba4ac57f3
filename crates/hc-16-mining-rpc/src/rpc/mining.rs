//! Mining and staking RPC methods.

use crate::domain::{
    network_hashps, BlockTemplateRequest, BlockTemplateResponse, CoinbaseAux, MiningInfo,
    RpcError, RpcResult, StakingInfo, SubmitOutcome, TemplateTransaction, NONCE_RANGE,
};
use crate::ports::{ChainState, ConsensusLoop, PowMiner, StakingService, WalletManager};
use hc_08_consensus_rules::{CoinviewRule, NodeDeployments};
use hc_17_block_assembly::{AssemblyError, AssemblyMetrics, BlockTemplate, BlockTemplateProvider};
use shared_types::{
    compact_to_target, deserialize_hex, difficulty_from_bits, serialize, target_hex, Block,
    ChainedHeader, ConsensusParams, DeploymentId,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Upper bound on nonce attempts for `generate`.
pub const GENERATE_MAX_TRIES: u64 = i32::MAX as u64;

/// Collaborators of [`MiningRpc`].
#[derive(Clone)]
pub struct MiningRpcDeps {
    pub params: Arc<ConsensusParams>,
    pub chain: Arc<dyn ChainState>,
    pub templates: Arc<dyn BlockTemplateProvider>,
    pub metrics: Arc<AssemblyMetrics>,
    pub consensus: Arc<dyn ConsensusLoop>,
    pub rule: CoinviewRule,
    pub deployments: NodeDeployments,
    pub miner: Arc<dyn PowMiner>,
    /// `None` when staking is not enabled on this node
    pub staking: Option<Arc<dyn StakingService>>,
    pub wallets: Arc<dyn WalletManager>,
}

/// Mining/staking RPC handler.
pub struct MiningRpc {
    deps: MiningRpcDeps,
    /// Holds submissions so the tip comparison sees this block's result
    submit_gate: Mutex<()>,
}

impl MiningRpc {
    pub fn new(deps: MiningRpcDeps) -> Self {
        info!(
            "[hc-16] Mining RPC ready on {} (staking: {})",
            deps.params.network,
            deps.staking.is_some()
        );
        Self {
            deps,
            submit_gate: Mutex::new(()),
        }
    }

    fn tip(&self) -> RpcResult<Arc<ChainedHeader>> {
        self.deps
            .chain
            .tip()
            .ok_or_else(|| RpcError::misc("Chain has no tip yet"))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // MINING
    // ═══════════════════════════════════════════════════════════════════════

    /// getblocktemplate - Template for external PoW miners
    #[instrument(skip(self, request), fields(rules = ?request.rules))]
    pub async fn get_block_template(
        &self,
        request: BlockTemplateRequest,
    ) -> RpcResult<BlockTemplateResponse> {
        let tip = self.tip()?;
        let payout = self
            .deps
            .templates
            .default_payout_script()
            .ok_or(AssemblyError::MissingPayoutScript)?;
        let template = self.deps.templates.build_template(&tip, &payout, None)?;

        let header = &template.block.header;
        let coinbase_value = template
            .block
            .coinbase()
            .and_then(|cb| cb.outputs.first())
            .map(|out| out.value)
            .unwrap_or(0);

        Ok(BlockTemplateResponse {
            version: header.version as u32,
            previousblockhash: tip.hash().to_hex(),
            coinbasevalue: coinbase_value,
            target: target_hex(compact_to_target(header.bits).target),
            noncerange: NONCE_RANGE.to_string(),
            curtime: header.time,
            bits: format!("{:08x}", header.bits),
            height: tip.height() + 1,
            transactions: template_transactions(&template),
            coinbaseaux: Some(self.coinbase_flags(&tip)),
            default_witness_commitment: witness_commitment(&template, &request),
        })
    }

    /// Script-flag summary for blocks built on `tip`, hex encoded.
    fn coinbase_flags(&self, tip: &ChainedHeader) -> CoinbaseAux {
        let flags = self.deps.deployments.script_flags(Some(tip)).names();
        CoinbaseAux {
            flags: hex::encode(flags.as_bytes()),
        }
    }

    /// submitblock - Accept, verify and broadcast a block
    #[instrument(skip(self, block_hex, _params))]
    pub async fn submit_block(
        &self,
        block_hex: &str,
        _params: Option<serde_json::Value>,
    ) -> RpcResult<Option<&'static str>> {
        let mut block: Block = deserialize_hex(block_hex).map_err(|e| {
            debug!("[hc-16] submitted block does not decode: {}", e);
            RpcError::deserialization("Block decode failed")
        })?;
        if block.coinbase().is_none() {
            return Err(RpcError::deserialization(
                "Block does not start with a coinbase",
            ));
        }

        let hash = block.hash();
        let known = self.deps.chain.lookup(&hash);
        if let Some(known) = &known {
            if known.validated {
                return Ok(SubmitOutcome::Duplicate.as_rpc_result());
            }
        }

        let prev = self.deps.chain.lookup(&block.header.prev_block_hash);
        if let Some(prev) = &prev {
            self.deps
                .rule
                .update_uncommitted_block_structures(&mut block, Some(prev.header.as_ref()));
        }

        let _gate = self.submit_gate.lock().await;
        let accepted = self.deps.consensus.accept_block(block).await;
        let is_tip = self
            .deps
            .chain
            .tip()
            .map(|tip| tip.hash() == hash)
            .unwrap_or(false);

        let outcome = if known.is_some() {
            if accepted.is_ok() && !is_tip {
                SubmitOutcome::DuplicateInconclusive
            } else {
                SubmitOutcome::Duplicate
            }
        } else {
            if let Err(e) = accepted {
                warn!("[hc-16] submitted block {} rejected: {}", hash, e);
                return Err(RpcError::verify(e.reject_reason()));
            }
            if is_tip {
                SubmitOutcome::Accepted
            } else {
                SubmitOutcome::Inconclusive
            }
        };

        info!("[hc-16] submitblock {} -> {:?}", hash, outcome);
        Ok(outcome.as_rpc_result())
    }

    /// getmininginfo - Chain and last-template statistics
    #[instrument(skip(self))]
    pub async fn get_mining_info(&self) -> RpcResult<MiningInfo> {
        let tip = self.deps.chain.tip();
        let height = tip.as_ref().map(|t| t.height()).unwrap_or(0);
        Ok(MiningInfo {
            blocks: height,
            currentblocksize: self.deps.metrics.get_last_block_size(),
            currentblockweight: self.deps.metrics.get_last_block_weight(),
            difficulty: tip
                .as_ref()
                .map(|t| difficulty_from_bits(t.header().bits))
                .unwrap_or(0.0),
            networkhashps: network_hashps(
                tip.as_deref(),
                self.deps.params.difficulty_adjustment_interval(),
                -1,
                height as i64,
            ),
            chain: self.deps.params.network.clone(),
        })
    }

    /// getnetworkhashps - Hash rate estimate over `lookup` blocks at `height`
    #[instrument(skip(self))]
    pub async fn get_network_hashps(&self, lookup: i64, height: i64) -> RpcResult<f64> {
        let tip = self.deps.chain.tip();
        Ok(network_hashps(
            tip.as_deref(),
            self.deps.params.difficulty_adjustment_interval(),
            lookup,
            height,
        ))
    }

    /// generate - Mine blocks to the first wallet's first account
    #[instrument(skip(self))]
    pub async fn generate(&self, block_count: i64) -> RpcResult<Vec<String>> {
        if block_count <= 0 {
            return Err(RpcError::invalid_request(
                "The number of blocks to mine must be higher than zero.",
            ));
        }

        let (wallet, account) = self.first_account()?;
        let script = self.deps.wallets.unused_address_script(&wallet, &account)?;
        let hashes = self
            .deps
            .miner
            .generate_blocks(script, block_count as u64, GENERATE_MAX_TRIES)
            .await;

        debug!("[hc-16] generated {} of {} blocks", hashes.len(), block_count);
        Ok(hashes.iter().map(|h| h.to_hex()).collect())
    }

    fn first_account(&self) -> RpcResult<(String, String)> {
        let wallet = self
            .deps
            .wallets
            .wallet_names()
            .into_iter()
            .next()
            .ok_or_else(|| RpcError::invalid_request("No wallet found"))?;
        let account = self
            .deps
            .wallets
            .account_names(&wallet)
            .into_iter()
            .next()
            .ok_or_else(|| RpcError::invalid_request("No account found on wallet"))?;
        Ok((wallet, account))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // STAKING
    // ═══════════════════════════════════════════════════════════════════════

    /// getstakinginfo - Staking status; only the JSON form is supported
    #[instrument(skip(self))]
    pub async fn get_staking_info(&self, is_json: bool) -> RpcResult<StakingInfo> {
        if !is_json {
            warn!("[hc-16] binary serialization requested for getstakinginfo");
            return Err(RpcError::not_implemented("Binary getstakinginfo"));
        }
        Ok(self
            .deps
            .staking
            .as_ref()
            .map(|s| s.staking_info())
            .unwrap_or_default())
    }

    /// startstaking - Unlock a wallet and begin staking with it
    #[instrument(skip(self, wallet_password))]
    pub async fn start_staking(&self, wallet_name: &str, wallet_password: &str) -> RpcResult<bool> {
        if wallet_name.is_empty() {
            return Err(RpcError::invalid_parameter("walletName cannot be empty"));
        }
        if wallet_password.is_empty() {
            return Err(RpcError::invalid_parameter("walletPassword cannot be empty"));
        }

        self.deps
            .wallets
            .check_password(wallet_name, wallet_password)?;

        let staking = self
            .deps
            .staking
            .as_ref()
            .ok_or_else(|| RpcError::misc("Staking is not enabled on this node"))?;
        staking.start_staking(wallet_name, wallet_password).await;

        info!("[hc-16] staking started for wallet {}", wallet_name);
        Ok(true)
    }

    /// prioritisetransaction - Not supported; always reports failure
    #[instrument(skip(self))]
    pub async fn prioritise_transaction(&self, txid: &str, fee_delta: i64) -> RpcResult<bool> {
        debug!("[hc-16] ignoring priority delta {} for {}", fee_delta, txid);
        Ok(false)
    }

    /// Name used by `getblocktemplate` clients for the witness rule.
    pub fn segwit_rule_name() -> &'static str {
        DeploymentId::Segwit.name()
    }
}

fn template_transactions(template: &BlockTemplate) -> Vec<TemplateTransaction> {
    template
        .block
        .transactions
        .iter()
        .zip(template.tx_fees.iter())
        .filter(|(tx, _)| !tx.is_coinbase())
        .map(|(tx, fee)| TemplateTransaction {
            data: hex::encode(serialize(tx)),
            txid: tx.txid().to_hex(),
            hash: tx.wtxid().to_hex(),
            fee: *fee,
        })
        .collect()
}

/// Commitment script hex, only for clients that declared the segwit rule.
fn witness_commitment(template: &BlockTemplate, request: &BlockTemplateRequest) -> Option<String> {
    if !request.declares_rule(MiningRpc::segwit_rule_name()) {
        return None;
    }
    template
        .coinbase_commitment
        .as_ref()
        .filter(|c| !c.is_empty())
        .map(hex::encode)
}
