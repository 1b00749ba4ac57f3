//! # RPC Flows
//!
//! JSON-RPC round trips through [`route_method`] against a live regtest node:
//! template fetch, block reconstruction by an external miner, submission,
//! and the duplicate / stale / invalid submission outcomes.

#[cfg(test)]
mod tests {
    use crate::node::{init_tracing, op_true, solve, TestNode};
    use hc_16_mining_rpc::{codes, route_method, BlockTemplateResponse, MiningInfo};
    use serde_json::{json, Value};
    use shared_types::{
        serialize, Block, BlockHeader, Hash256, OutPoint, Script, Transaction, TxIn, TxOut,
    };

    async fn call(node: &TestNode, method: &str, params: Value) -> Result<Value, hc_16_mining_rpc::RpcError> {
        route_method(&node.rpc, method, Some(&params)).await
    }

    /// Build a block the way an external miner would from the JSON template.
    fn block_from_template(template: &BlockTemplateResponse) -> Block {
        let mut coinbase_script = Script::new();
        coinbase_script.push_int(template.height as i64).push_opcode(0x00);
        let mut coinbase = Transaction {
            inputs: vec![TxIn::new(OutPoint::null(), coinbase_script)],
            outputs: vec![TxOut::new(template.coinbasevalue, op_true())],
            ..Default::default()
        };
        if let Some(commitment) = &template.default_witness_commitment {
            let script = Script::from_hex(commitment).unwrap();
            coinbase.outputs.push(TxOut::new(0, script));
        }

        let mut block = Block {
            header: BlockHeader {
                version: template.version as i32,
                prev_block_hash: Hash256::from_hex(&template.previousblockhash).unwrap(),
                time: template.curtime,
                bits: u32::from_str_radix(&template.bits, 16).unwrap(),
                ..Default::default()
            },
            transactions: vec![coinbase],
        };
        for tx in &template.transactions {
            block
                .transactions
                .push(shared_types::deserialize_hex(&tx.data).unwrap());
        }
        block.header.merkle_root = block.compute_merkle_root();
        block
    }

    async fn fetch_template(node: &TestNode) -> BlockTemplateResponse {
        let value = call(node, "getblocktemplate", json!([{"rules": ["segwit"]}]))
            .await
            .unwrap();
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_external_miner_round_trip() {
        init_tracing();
        let node = TestNode::pow_regtest();
        call(&node, "generate", json!([11])).await.unwrap();
        node.mempool.add(node.spend_coinbase(1, 2_500).unwrap());

        let template = fetch_template(&node).await;
        assert_eq!(template.height, 12);
        assert_eq!(template.transactions.len(), 1);
        assert_eq!(template.transactions[0].fee, 2_500);
        assert!(template.default_witness_commitment.is_some());

        let mut block = block_from_template(&template);
        assert!(solve(&mut block, &node.params, 1_000_000));
        let hex = hex::encode(serialize(&block));

        let result = call(&node, "submitblock", json!([hex.clone()])).await.unwrap();
        assert_eq!(result, Value::Null);
        assert_eq!(node.chain.height(), 12);

        // Connected blocks are validated, so a resubmission is a plain duplicate.
        let result = call(&node, "submitblock", json!({"hexdata": hex})).await.unwrap();
        assert_eq!(result, json!("duplicate"));
    }

    #[tokio::test]
    async fn test_stale_template_is_inconclusive() {
        init_tracing();
        let node = TestNode::regtest();
        call(&node, "generate", json!([2])).await.unwrap();

        let template = fetch_template(&node).await;
        call(&node, "generate", json!([1])).await.unwrap();

        let mut block = block_from_template(&template);
        assert!(solve(&mut block, &node.params, 1_000_000));
        let result = call(&node, "submitblock", json!([hex::encode(serialize(&block))]))
            .await
            .unwrap();

        assert_eq!(result, json!("inconclusive"));
        assert_eq!(node.chain.height(), 3);
    }

    #[tokio::test]
    async fn test_unsolved_block_is_rejected_with_reason() {
        init_tracing();
        let node = TestNode::regtest();
        let template = fetch_template(&node).await;

        let mut block = block_from_template(&template);
        while hc_08_consensus_rules::check_proof_of_work(&block.header, &node.params).is_ok() {
            block.header.nonce += 1;
        }
        let err = call(&node, "submitblock", json!([hex::encode(serialize(&block))]))
            .await
            .unwrap_err();

        assert_eq!(err.code, codes::VERIFY_ERROR);
        assert_eq!(err.message, "high-hash");
    }

    #[tokio::test]
    async fn test_overpaying_coinbase_is_rejected() {
        init_tracing();
        let node = TestNode::pow_regtest();
        let mut template = fetch_template(&node).await;
        template.coinbasevalue += 1;

        let mut block = block_from_template(&template);
        assert!(solve(&mut block, &node.params, 1_000_000));
        let err = call(&node, "submitblock", json!([hex::encode(serialize(&block))]))
            .await
            .unwrap_err();

        assert_eq!(err.code, codes::VERIFY_ERROR);
        assert_eq!(err.message, "bad-cb-amount");
        assert_eq!(node.chain.height(), 0);
    }

    #[tokio::test]
    async fn test_mining_info_tracks_chain() {
        init_tracing();
        let node = TestNode::regtest();
        call(&node, "generate", json!([4])).await.unwrap();

        let info: MiningInfo =
            serde_json::from_value(call(&node, "getmininginfo", json!([])).await.unwrap()).unwrap();

        assert_eq!(info.blocks, 4);
        assert_eq!(info.chain, "regtest");
        assert!(info.currentblocksize > 0);
        assert!(info.networkhashps >= 0.0);
    }

    #[tokio::test]
    async fn test_dispatch_errors() {
        init_tracing();
        let node = TestNode::regtest();

        let err = call(&node, "getwork", json!([])).await.unwrap_err();
        assert_eq!(err.code, codes::METHOD_NOT_FOUND);

        let err = call(&node, "generate", json!([0])).await.unwrap_err();
        assert_eq!(err.code, codes::INVALID_REQUEST);

        let err = call(&node, "submitblock", json!(["00"])).await.unwrap_err();
        assert_eq!(err.code, codes::DESERIALIZATION_ERROR);

        let err = call(&node, "startstaking", json!(["mywallet", "password"]))
            .await
            .unwrap_err();
        assert_eq!(err.code, codes::MISC_ERROR);

        let err = call(&node, "startstaking", json!(["mywallet", "nope"]))
            .await
            .unwrap_err();
        assert_eq!(err.code, codes::WALLET_ERROR);

        let refused = call(&node, "prioritisetransaction", json!(["00", 0, 100]))
            .await
            .unwrap();
        assert_eq!(refused, json!(false));
    }
}
