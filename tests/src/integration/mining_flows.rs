//! # Mining Flows
//!
//! Template assembly against a live regtest node:
//!
//! 1. **Maturity**: coinbase outputs become spendable after `coinbase_maturity`
//!    blocks; earlier spends make full validation reject the template.
//! 2. **Fees**: mempool fees flow into the coinbase and leave the mempool once
//!    the block connects.
//! 3. **Hybrid templates**: cleared coinbase and no validation for both
//!    staking and mining; only the version tells them apart.
//! 4. **Versionbits**: hybrid PoW templates vote for started deployments and
//!    drive them through lock-in to activation.

#[cfg(test)]
mod tests {
    use crate::node::{init_tracing, solve, unfunded_spend, TestNode, TEST_BITS};
    use hc_08_consensus_rules::{
        signals, subsidy, ConsensusError, ThresholdState, VERSIONBITS_TOP_BITS,
    };
    use hc_17_block_assembly::{AssemblerOptions, AssemblyError, TxMempool, CURRENT_BLOCK_VERSION};
    use shared_types::{serialize, DeploymentId};

    const TEST_DUMMY_MASK: u32 = 1 << 28;

    /// Inject the witness nonce, solve and submit through `submitblock`.
    async fn mine_template(node: &TestNode, options: Option<AssemblerOptions>) -> Option<&'static str> {
        let tip = node.tip();
        let mut block = node.template(options).unwrap().block;
        node.rule
            .update_uncommitted_block_structures(&mut block, Some(tip.as_ref()));
        assert!(solve(&mut block, &node.params, 1_000_000));
        node.rpc
            .submit_block(&hex::encode(serialize(&block)), None)
            .await
            .unwrap()
    }

    // =============================================================================
    // MATURITY AND FEES
    // =============================================================================

    #[tokio::test]
    async fn test_generate_extends_chain() {
        init_tracing();
        let node = TestNode::regtest();

        let hashes = node.rpc.generate(5).await.unwrap();

        assert_eq!(hashes.len(), 5);
        assert_eq!(node.chain.height(), 5);
        assert_eq!(node.tip().hash().to_hex(), hashes[4]);
        assert_eq!(node.coins.len(), 5);
    }

    #[tokio::test]
    async fn test_mature_coinbase_spend_is_mined_with_fee() {
        init_tracing();
        let node = TestNode::pow_regtest();
        let maturity = node.params.coinbase_maturity;
        node.rpc.generate(maturity as i64 + 1).await.unwrap();

        let entry = node.spend_coinbase(1, 1_000).unwrap();
        assert!(node.mempool.add(entry));

        let template = node.template(None).unwrap();
        let height = maturity + 2;
        assert_eq!(template.height, height);
        assert_eq!(template.block.transactions.len(), 2);
        assert_eq!(template.total_fees(), 1_000);
        assert_eq!(
            template.coinbase_value(),
            subsidy(height, &node.params) + 1_000
        );
        assert!(template.is_consistent());

        assert_eq!(mine_template(&node, None).await, None);
        assert_eq!(node.chain.height(), height);
        assert_eq!(node.mempool.size(), 0);
    }

    #[tokio::test]
    async fn test_premature_coinbase_spend_fails_validation() {
        init_tracing();
        let node = TestNode::pow_regtest();
        node.rpc.generate(3).await.unwrap();

        node.mempool.add(node.spend_coinbase(1, 500).unwrap());

        match node.template(None) {
            Err(AssemblyError::Consensus(e)) => {
                assert!(e.is_maturity_violation());
                assert!(matches!(
                    e,
                    ConsensusError::BadTransactionPrematureCoinbaseSpending { .. }
                ));
            }
            other => panic!("expected maturity violation, got {:?}", other.map(|t| t.height)),
        }
        assert_eq!(node.chain.height(), 3);
    }

    // =============================================================================
    // HYBRID TEMPLATES
    // =============================================================================

    #[tokio::test]
    async fn test_stake_template_clears_coinbase_and_skips_validation() {
        init_tracing();
        let node = TestNode::regtest();
        node.rpc.generate(3).await.unwrap();
        node.mempool.add(unfunded_spend(7, 500));

        let template = node
            .template(Some(AssemblerOptions::proof_of_stake()))
            .unwrap();

        let coinbase = template.block.coinbase().unwrap();
        assert!(coinbase.outputs[0].is_empty());
        assert_eq!(template.block.header.version, CURRENT_BLOCK_VERSION);
        assert_eq!(template.block.header.bits, TEST_BITS);
        // The spend of a missing coin is still present: nothing re-validated it.
        assert_eq!(template.block.transactions.len(), 2);
    }

    #[tokio::test]
    async fn test_hybrid_mining_template_clears_coinbase_and_skips_validation() {
        init_tracing();
        let node = TestNode::regtest();
        node.rpc.generate(3).await.unwrap();
        node.mempool.add(unfunded_spend(7, 500));

        for options in [Some(AssemblerOptions::proof_of_work()), None] {
            let template = node.template(options).unwrap();
            assert!(template.block.coinbase().unwrap().outputs[0].is_empty());
            assert_eq!(template.coinbase_value(), 0);
            assert_eq!(template.total_fees(), 500);
            assert_eq!(template.block.transactions.len(), 2);
        }

        let pow = TestNode::pow_regtest();
        pow.rpc.generate(3).await.unwrap();
        pow.mempool.add(unfunded_spend(7, 500));
        assert!(matches!(
            pow.template(Some(AssemblerOptions::proof_of_work())),
            Err(AssemblyError::Consensus(ConsensusError::BadTransactionMissingInput(_)))
        ));
    }

    // =============================================================================
    // VERSIONBITS
    // =============================================================================

    #[tokio::test]
    async fn test_only_explicit_pow_templates_vote() {
        init_tracing();
        let node = TestNode::regtest();
        let window = node.params.miner_confirmation_window;
        node.rpc.generate(window as i64 - 1).await.unwrap();

        let tip = node.tip();
        assert_eq!(
            node.thresholds
                .get_state(Some(tip.as_ref()), DeploymentId::TestDummy),
            ThresholdState::Started
        );

        let voting = node
            .template(Some(AssemblerOptions::proof_of_work()))
            .unwrap();
        let version = voting.block.header.version;
        assert_eq!(version as u32 & VERSIONBITS_TOP_BITS, VERSIONBITS_TOP_BITS);
        assert!(signals(version, TEST_DUMMY_MASK));

        let plain = node.template(None).unwrap();
        assert_eq!(plain.block.header.version, CURRENT_BLOCK_VERSION);
        assert!(!signals(plain.block.header.version, TEST_DUMMY_MASK));
    }

    #[tokio::test]
    async fn test_signalling_deployment_locks_in_then_activates() {
        init_tracing();
        let node = TestNode::regtest();
        let window = node.params.miner_confirmation_window as i64;
        let state = |node: &TestNode| {
            node.thresholds
                .get_state(Some(node.tip().as_ref()), DeploymentId::TestDummy)
        };

        node.rpc.generate(window - 1).await.unwrap();
        assert_eq!(state(&node), ThresholdState::Started);

        // A full window of signalling blocks from the node miner.
        node.rpc.generate(window).await.unwrap();
        assert_eq!(state(&node), ThresholdState::LockedIn);

        // Locked-in deployments keep signalling until they activate.
        let template = node
            .template(Some(AssemblerOptions::proof_of_work()))
            .unwrap();
        assert!(signals(template.block.header.version, TEST_DUMMY_MASK));

        node.rpc.generate(window).await.unwrap();
        assert_eq!(state(&node), ThresholdState::Active);

        // Active deployments no longer set their bit.
        let template = node
            .template(Some(AssemblerOptions::proof_of_work()))
            .unwrap();
        assert!(!signals(template.block.header.version, TEST_DUMMY_MASK));
    }

    #[tokio::test]
    async fn test_non_voting_blocks_keep_deployment_started() {
        init_tracing();
        let node = TestNode::regtest();
        let window = node.params.miner_confirmation_window;
        node.rpc.generate(window as i64 - 1).await.unwrap();

        for _ in 0..window {
            assert_eq!(mine_template(&node, None).await, None);
        }

        let tip = node.tip();
        assert_eq!(
            node.thresholds
                .get_state(Some(tip.as_ref()), DeploymentId::TestDummy),
            ThresholdState::Started
        );
    }
}
