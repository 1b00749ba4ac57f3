//! # In-process test node
//!
//! Wires the real assembler, consensus rule and mining RPC together over an
//! in-memory chain, coin view and mempool. Blocks are accepted only when
//! they meet their own proof-of-work target, pass full validation and
//! extend the active tip; valid blocks on another parent are stored as
//! side-chain headers without being connected.

use async_trait::async_trait;
use hc_08_consensus_rules::{
    check_proof_of_work, ConsensusError, ConsensusResult, CoinviewRule, InMemoryCoinView,
    NodeDeployments, ThresholdConditionCache,
};
use hc_16_mining_rpc::{
    ChainState, ConsensusLoop, KnownBlock, MiningRpc, MiningRpcDeps, PowMiner, WalletError,
    WalletManager,
};
use hc_17_block_assembly::{
    AssemblerDeps, AssemblerFactory, AssemblerOptions, AssemblyMetrics, BlockTemplate,
    BlockTemplateProvider, BlockValidator, CoinviewBlockValidator, InMemoryMempool,
    MempoolEntry, MinerSettings, MiningMode, StaticDifficultyOracle, SystemClock,
    MAX_BLOCK_WEIGHT,
};
use parking_lot::{Mutex, RwLock};
use shared_types::{
    Amount, Block, BlockHeader, ChainedHeader, ConsensusParams, Hash256, OutPoint, Script,
    Transaction, TxIn, TxOut,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Compact target used for every block on the test chain.
pub const TEST_BITS: u32 = 0x207fffff;

/// Anyone-can-spend payout script (`OP_TRUE`).
pub fn op_true() -> Script {
    Script::from_bytes(vec![0x51])
}

/// Install a tracing subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// =============================================================================
// CHAIN
// =============================================================================

/// Active chain plus every header seen so far.
pub struct NodeChain {
    tip: Mutex<Arc<ChainedHeader>>,
    headers: RwLock<HashMap<Hash256, Arc<ChainedHeader>>>,
    blocks: RwLock<Vec<Block>>,
}

impl NodeChain {
    fn new(genesis: Block) -> Self {
        let tip = ChainedHeader::genesis(genesis.header);
        let mut headers = HashMap::new();
        headers.insert(tip.hash(), Arc::clone(&tip));
        Self {
            tip: Mutex::new(tip),
            headers: RwLock::new(headers),
            blocks: RwLock::new(vec![genesis]),
        }
    }

    /// Block connected at `height` on the active chain.
    pub fn block_at(&self, height: u32) -> Option<Block> {
        self.blocks.read().get(height as usize).cloned()
    }

    pub fn height(&self) -> u32 {
        self.tip.lock().height()
    }

    fn header(&self, hash: &Hash256) -> Option<Arc<ChainedHeader>> {
        self.headers.read().get(hash).cloned()
    }
}

impl ChainState for NodeChain {
    fn tip(&self) -> Option<Arc<ChainedHeader>> {
        Some(self.tip.lock().clone())
    }

    fn lookup(&self, hash: &Hash256) -> Option<KnownBlock> {
        self.header(hash).map(|header| KnownBlock {
            header,
            validated: true,
        })
    }
}

// =============================================================================
// CONSENSUS LOOP
// =============================================================================

/// Accepts blocks into [`NodeChain`], updating coins and mempool.
pub struct NodeConsensus {
    params: Arc<ConsensusParams>,
    rule: CoinviewRule,
    validator: CoinviewBlockValidator,
    chain: Arc<NodeChain>,
    coins: Arc<InMemoryCoinView>,
    mempool: Arc<InMemoryMempool>,
}

impl NodeConsensus {
    fn connect(&self, block: Block, prev: &Arc<ChainedHeader>) -> ConsensusResult<()> {
        let height = prev.height() + 1;
        self.rule.execute_block(self.coins.as_ref(), &block, height)?;
        self.mempool.remove_for_block(&block);

        let chained = ChainedHeader::extend(prev, block.header);
        self.chain
            .headers
            .write()
            .insert(chained.hash(), Arc::clone(&chained));
        *self.chain.tip.lock() = chained;
        self.chain.blocks.write().push(block);
        debug!("[hc-tests] connected block at height {}", height);
        Ok(())
    }
}

#[async_trait]
impl ConsensusLoop for NodeConsensus {
    async fn accept_block(&self, block: Block) -> ConsensusResult<()> {
        let prev = self
            .chain
            .header(&block.header.prev_block_hash)
            .ok_or(ConsensusError::BadPrevBlock)?;
        check_proof_of_work(&block.header, &self.params)?;

        let tip = self.chain.tip().ok_or(ConsensusError::BadPrevBlock)?;
        if prev.hash() != tip.hash() {
            // Side chain: remember the header, do not connect.
            let chained = ChainedHeader::extend(&prev, block.header);
            self.chain.headers.write().insert(chained.hash(), chained);
            return Ok(());
        }

        self.validator.validate_block(&block, &prev)?;
        self.connect(block, &prev)
    }
}

// =============================================================================
// MINER
// =============================================================================

/// Increment the nonce until the header meets its target.
pub fn solve(block: &mut Block, params: &ConsensusParams, max_tries: u64) -> bool {
    for _ in 0..max_tries {
        if check_proof_of_work(&block.header, params).is_ok() {
            return true;
        }
        block.header.nonce = block.header.nonce.wrapping_add(1);
    }
    false
}

/// Mines PoW templates from the factory and feeds them to the consensus loop.
pub struct NodeMiner {
    params: Arc<ConsensusParams>,
    rule: CoinviewRule,
    factory: Arc<AssemblerFactory>,
    chain: Arc<NodeChain>,
    consensus: Arc<NodeConsensus>,
}

#[async_trait]
impl PowMiner for NodeMiner {
    async fn generate_blocks(&self, script: Script, count: u64, max_tries: u64) -> Vec<Hash256> {
        let mut hashes = Vec::new();
        while (hashes.len() as u64) < count {
            let Some(tip) = self.chain.tip() else { break };
            let template = match self.factory.build_template(
                &tip,
                &script,
                Some(AssemblerOptions::proof_of_work()),
            ) {
                Ok(template) => template,
                Err(e) => {
                    debug!("[hc-tests] template failed: {}", e);
                    break;
                }
            };

            let mut block = template.block;
            self.rule
                .update_uncommitted_block_structures(&mut block, Some(tip.as_ref()));
            if !solve(&mut block, &self.params, max_tries) {
                break;
            }
            let hash = block.hash();
            if self.consensus.accept_block(block).await.is_err() {
                break;
            }
            hashes.push(hash);
        }
        hashes
    }
}

// =============================================================================
// WALLET
// =============================================================================

/// One wallet, one account, paying to `OP_TRUE`.
pub struct SingleWallet {
    pub name: String,
    pub password: String,
}

impl WalletManager for SingleWallet {
    fn wallet_names(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn account_names(&self, _wallet_name: &str) -> Vec<String> {
        vec!["account 0".to_string()]
    }

    fn unused_address_script(&self, wallet_name: &str, _account: &str) -> Result<Script, WalletError> {
        if wallet_name != self.name {
            return Err(WalletError::NotFound(wallet_name.to_string()));
        }
        Ok(op_true())
    }

    fn check_password(&self, wallet_name: &str, password: &str) -> Result<(), WalletError> {
        if wallet_name != self.name {
            return Err(WalletError::NotFound(wallet_name.to_string()));
        }
        if password != self.password {
            return Err(WalletError::InvalidPassword);
        }
        Ok(())
    }
}

// =============================================================================
// NODE
// =============================================================================

/// Fully wired regtest node.
pub struct TestNode {
    pub params: Arc<ConsensusParams>,
    pub thresholds: Arc<ThresholdConditionCache>,
    pub rule: CoinviewRule,
    pub chain: Arc<NodeChain>,
    pub coins: Arc<InMemoryCoinView>,
    pub mempool: Arc<InMemoryMempool>,
    pub factory: Arc<AssemblerFactory>,
    pub consensus: Arc<NodeConsensus>,
    pub rpc: MiningRpc,
}

impl TestNode {
    /// Regtest node with hybrid mining and an `OP_TRUE` payout.
    ///
    /// Hybrid templates carry a cleared coinbase, so nothing this node mines
    /// is spendable. Use [`TestNode::pow_regtest`] for flows that spend
    /// coinbase outputs.
    pub fn regtest() -> Self {
        Self::with_mode(ConsensusParams::regtest(), MiningMode::Hybrid)
    }

    /// Regtest node mining pure proof-of-work blocks that keep their reward.
    pub fn pow_regtest() -> Self {
        Self::with_mode(ConsensusParams::regtest(), MiningMode::ProofOfWork)
    }

    pub fn with_mode(params: ConsensusParams, mining_mode: MiningMode) -> Self {
        let params = Arc::new(params);
        let thresholds = Arc::new(ThresholdConditionCache::new(Arc::clone(&params)));
        let rule = CoinviewRule::new(Arc::clone(&params), Arc::clone(&thresholds));
        let coins = Arc::new(InMemoryCoinView::new());
        let gate = Arc::new(Mutex::new(()));
        let mempool = Arc::new(InMemoryMempool::new(Arc::clone(&gate)));
        let metrics = Arc::new(AssemblyMetrics::new());

        let genesis = Block {
            header: BlockHeader {
                version: 1,
                time: 1_296_688_602,
                bits: TEST_BITS,
                ..Default::default()
            },
            transactions: Vec::new(),
        };
        let chain = Arc::new(NodeChain::new(genesis));

        let validator = || {
            CoinviewBlockValidator::new(rule.clone(), Arc::clone(&coins), MAX_BLOCK_WEIGHT)
        };
        let deps = AssemblerDeps {
            params: Arc::clone(&params),
            thresholds: Arc::clone(&thresholds),
            mempool: Arc::clone(&mempool) as _,
            mempool_lock: gate,
            oracle: Arc::new(StaticDifficultyOracle::new(TEST_BITS, TEST_BITS)),
            validator: Arc::new(validator()),
            clock: Arc::new(SystemClock),
            metrics: Arc::clone(&metrics),
        };
        let settings = MinerSettings {
            mine_address_script: Some(op_true().to_hex()),
            mining_mode,
            ..Default::default()
        };
        let factory = Arc::new(
            AssemblerFactory::new(deps, settings).expect("default settings with a payout script"),
        );

        let consensus = Arc::new(NodeConsensus {
            params: Arc::clone(&params),
            rule: rule.clone(),
            validator: validator(),
            chain: Arc::clone(&chain),
            coins: Arc::clone(&coins),
            mempool: Arc::clone(&mempool),
        });
        let miner = Arc::new(NodeMiner {
            params: Arc::clone(&params),
            rule: rule.clone(),
            factory: Arc::clone(&factory),
            chain: Arc::clone(&chain),
            consensus: Arc::clone(&consensus),
        });

        let rpc = MiningRpc::new(MiningRpcDeps {
            params: Arc::clone(&params),
            chain: Arc::clone(&chain) as _,
            templates: Arc::clone(&factory) as _,
            metrics,
            consensus: Arc::clone(&consensus) as _,
            rule: rule.clone(),
            deployments: NodeDeployments::new(Arc::clone(&thresholds)),
            miner,
            staking: None,
            wallets: Arc::new(SingleWallet {
                name: "mywallet".to_string(),
                password: "password".to_string(),
            }),
        });

        info!("[hc-tests] regtest node ready ({:?})", mining_mode);
        Self {
            params,
            thresholds,
            rule,
            chain,
            coins,
            mempool,
            factory,
            consensus,
            rpc,
        }
    }

    pub fn tip(&self) -> Arc<ChainedHeader> {
        self.chain.tip.lock().clone()
    }

    /// Template on the current tip paying to `OP_TRUE`.
    pub fn template(&self, options: Option<AssemblerOptions>) -> hc_17_block_assembly::Result<BlockTemplate> {
        self.factory.build_template(&self.tip(), &op_true(), options)
    }

    /// Spend output 0 of the coinbase at `height`, leaving `fee` unclaimed.
    pub fn spend_coinbase(&self, height: u32, fee: Amount) -> Option<MempoolEntry> {
        let block = self.chain.block_at(height)?;
        let coinbase = block.coinbase()?;
        let value = coinbase.outputs.first()?.value;
        let tx = Transaction {
            inputs: vec![TxIn::new(OutPoint::new(coinbase.txid(), 0), Script::new())],
            outputs: vec![TxOut::new(value - fee, op_true())],
            ..Default::default()
        };
        Some(MempoolEntry::new(tx, fee))
    }
}

/// Spend of an output that does not exist. Only templates that skip
/// validation will carry it.
pub fn unfunded_spend(tag: u8, fee: Amount) -> MempoolEntry {
    let tx = Transaction {
        inputs: vec![TxIn::new(OutPoint::new(Hash256([tag; 32]), 0), Script::new())],
        outputs: vec![TxOut::new(1_000, op_true())],
        ..Default::default()
    };
    MempoolEntry::new(tx, fee)
}
