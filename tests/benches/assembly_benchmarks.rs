//! # Block Assembly Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | hc-17 Block Assembly | template build with N mempool transactions |
//! | hc-08 Consensus Rules | versionbits state lookup (cached) |
//! | hc-08 Consensus Rules | full block execution on a coin-view snapshot |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hc_17_block_assembly::AssemblerOptions;
use hc_tests::{unfunded_spend, TestNode};
use shared_types::DeploymentId;
use std::time::Duration;

/// Proof-of-work node with `spendable` mature coinbases and one mempool
/// spend per coinbase.
fn loaded_node(spendable: u32) -> TestNode {
    let node = TestNode::pow_regtest();
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let blocks = node.params.coinbase_maturity + spendable;
    runtime.block_on(node.rpc.generate(blocks as i64)).unwrap();

    for height in 1..=spendable {
        let entry = node.spend_coinbase(height, 1_000).unwrap();
        node.mempool.add(entry);
    }
    node
}

/// Hybrid node whose mempool holds `count` spends. Staking templates skip
/// validation, so the spends need no funding.
fn loaded_hybrid_node(count: u32) -> TestNode {
    let node = TestNode::regtest();
    for tag in 0..count {
        node.mempool.add(unfunded_spend(tag as u8, 1_000));
    }
    node
}

fn bench_template_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("hc-17-block-assembly");
    group.measurement_time(Duration::from_secs(10));

    for size in [10u32, 50, 100] {
        let node = loaded_node(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("build_template", size), &node, |b, node| {
            b.iter(|| black_box(node.template(Some(AssemblerOptions::proof_of_work())).unwrap()))
        });
        let hybrid = loaded_hybrid_node(size);
        group.bench_with_input(BenchmarkId::new("build_stake_template", size), &hybrid, |b, node| {
            b.iter(|| black_box(node.template(Some(AssemblerOptions::proof_of_stake())).unwrap()))
        });
    }
    group.finish();
}

fn bench_consensus_rules(c: &mut Criterion) {
    let mut group = c.benchmark_group("hc-08-consensus-rules");
    let node = loaded_node(50);
    let tip = node.tip();

    group.bench_function("threshold_state_cached", |b| {
        b.iter(|| {
            black_box(
                node.thresholds
                    .get_state(Some(tip.as_ref()), DeploymentId::TestDummy),
            )
        })
    });

    let block = node.template(None).unwrap().block;
    let height = tip.height() + 1;
    group.bench_function("execute_block_50_spends", |b| {
        b.iter(|| {
            let staging = node.coins.snapshot();
            black_box(node.rule.execute_block(&staging, &block, height).unwrap())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_template_build, bench_consensus_rules);
criterion_main!(benches);
