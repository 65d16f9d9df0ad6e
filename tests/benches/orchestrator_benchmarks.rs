//! # Radquorum Hot-Path Benchmarks
//!
//! | Subsystem | Operation | Runs per |
//! |-----------|-----------|----------|
//! | rq-02 Miner Selection | weighted sampling | dispatch attempt |
//! | rq-03 Consensus Verifier | evaluation | accepted response |
//! | rq-05 Rewards | budget split | resolved task |

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rq_02_miner_selection::{selection_weight, weighted_sample, Candidate};
use rq_03_consensus_verifier::{ConsensusVerifier, StakeWeightedVerifier, VerificationInput};
use rq_05_rewards::split_budget;
use shared_types::{Fingerprint, MinerId, ResponseRecord, TaskId};

fn miner(i: usize) -> MinerId {
    MinerId::new(format!("miner-{i:05}"))
}

// ============================================================================
// RQ-02: Weighted selection over the eligible population
// ============================================================================

fn bench_weighted_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("rq-02-miner-selection");
    let mut rng = StdRng::seed_from_u64(1);

    for population in [64usize, 256, 1024] {
        let candidates: Vec<Candidate> = (0..population)
            .map(|i| Candidate {
                miner_id: miner(i),
                weight: selection_weight(rng.gen(), 1.0, rng.gen_range(0..10_000), 0.05),
            })
            .collect();

        group.throughput(Throughput::Elements(population as u64));
        group.bench_with_input(
            BenchmarkId::new("weighted_sample_rf5", population),
            &candidates,
            |b, candidates| {
                b.iter(|| black_box(weighted_sample(candidates.clone(), 5, 42)))
            },
        );
    }
    group.finish();
}

// ============================================================================
// RQ-03: Verdict over a task's responses
// ============================================================================

fn bench_verifier(c: &mut Criterion) {
    let mut group = c.benchmark_group("rq-03-consensus-verifier");
    let verifier = StakeWeightedVerifier::default();
    let mut rng = StdRng::seed_from_u64(2);

    for responders in [3usize, 15, 63] {
        let task_id = TaskId::new();
        let mut stakes = HashMap::new();
        let responses: Vec<ResponseRecord> = (0..responders)
            .map(|i| {
                stakes.insert(miner(i), rng.gen_range(1..1_000u128));
                let fingerprint = if rng.gen_bool(0.8) { "H" } else { "X" };
                ResponseRecord {
                    task_id,
                    miner_id: miner(i),
                    fingerprint: Fingerprint::new(fingerprint),
                    artifact_ref: format!("rad:artifact/{i}"),
                    received_at: i as u64,
                    latency_ms: 10,
                    arrival_seq: i as u64,
                }
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::new("evaluate", responders),
            &responses,
            |b, responses| {
                b.iter(|| {
                    black_box(verifier.evaluate(&VerificationInput {
                        task_id,
                        redundancy_factor: responders as u32,
                        responses,
                        stakes: &stakes,
                        pending: &[],
                        now: 0,
                    }))
                })
            },
        );
    }
    group.finish();
}

// ============================================================================
// RQ-05: Proportional budget split
// ============================================================================

fn bench_split_budget(c: &mut Criterion) {
    let mut group = c.benchmark_group("rq-05-rewards");
    let mut rng = StdRng::seed_from_u64(3);

    for agreeing in [2usize, 16, 64] {
        let stakes: Vec<(MinerId, u128)> = (0..agreeing)
            .map(|i| (miner(i), rng.gen_range(0..u128::from(u64::MAX))))
            .collect();
        group.bench_with_input(
            BenchmarkId::new("split_budget", agreeing),
            &stakes,
            |b, stakes| b.iter(|| black_box(split_budget(1_000_000_000_000_000_000, stakes))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_weighted_sample, bench_verifier, bench_split_budget);
criterion_main!(benches);
