//! # Cross-Subsystem Properties
//!
//! Invariants that must hold for any input, checked against randomized
//! (seeded) inputs and concurrent load.

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};
    use std::sync::Arc;
    use std::time::Duration;

    use futures::future::join_all;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use rq_01_miner_registry::{
        InMemoryRegistryStore, MinerRegistry, MinerRegistryApi, RegistryConfig,
    };
    use rq_02_miner_selection::SelectionConfig;
    use rq_03_consensus_verifier::{ConsensusVerifier, StakeWeightedVerifier, VerificationInput};
    use rq_06_task_dispatch::{
        OrchestratorApi, OrchestratorError, OutboundMessage, ResponseAck,
    };
    use shared_types::{
        DispatchRequest, FailureReason, Fingerprint, MinerId, OperationKind, ResponseRecord,
        TaskId, TaskStatus,
    };

    use crate::fixtures::{unanimous, Stack, StackConfig, PAYLOAD, REPOSITORY};

    // =============================================================================
    // REPUTATION BOUNDS
    // =============================================================================

    #[test]
    fn test_reputation_stays_within_bounds() {
        let config = RegistryConfig {
            max_score: 2.0,
            ..Default::default()
        };
        let registry =
            MinerRegistry::open(config, Arc::new(InMemoryRegistryStore::new())).unwrap();
        let miners: Vec<MinerId> = (0..5).map(|i| MinerId::new(format!("m{i}"))).collect();
        for id in &miners {
            registry.register(id.clone(), 1).unwrap();
        }

        let mut rng = StdRng::seed_from_u64(7);
        for step in 0..5_000 {
            let id = &miners[rng.gen_range(0..miners.len())];
            let delta = match step % 500 {
                0 => f64::MAX,
                1 => f64::MIN,
                2 => f64::NAN,
                3 => f64::NEG_INFINITY,
                _ => rng.gen_range(-0.6..0.6),
            };
            let record = registry.apply_delta(id, delta, rng.gen_bool(0.3)).unwrap();
            assert!(
                (0.0..=2.0).contains(&record.reputation_score),
                "step {step}: score {} out of bounds",
                record.reputation_score
            );
        }
    }

    // =============================================================================
    // QUORUM
    // =============================================================================

    fn random_round(
        rng: &mut StdRng,
        task_id: TaskId,
        equal_stakes: bool,
    ) -> (u32, Vec<ResponseRecord>, HashMap<MinerId, u128>) {
        let rf = rng.gen_range(1..=7u32);
        let responders = rng.gen_range(0..=rf);
        let mut responses = Vec::new();
        let mut stakes = HashMap::new();
        for i in 0..responders {
            let miner_id = MinerId::new(format!("m{i}"));
            let fingerprint = ["A", "B", "C"][rng.gen_range(0..3)];
            let stake = if equal_stakes { 10 } else { rng.gen_range(0..100) };
            stakes.insert(miner_id.clone(), stake);
            responses.push(ResponseRecord {
                task_id,
                miner_id,
                fingerprint: Fingerprint::new(fingerprint),
                artifact_ref: format!("{fingerprint}@m{i}"),
                received_at: u64::from(i),
                latency_ms: 1,
                arrival_seq: u64::from(i),
            });
        }
        (rf, responses, stakes)
    }

    #[test]
    fn test_quorum_iff_canonical_group_is_a_majority() {
        let verifier = StakeWeightedVerifier::default();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..2_000 {
            let task_id = TaskId::new();
            let (rf, responses, stakes) = random_round(&mut rng, task_id, false);
            let verdict = verifier.evaluate(&VerificationInput {
                task_id,
                redundancy_factor: rf,
                responses: &responses,
                stakes: &stakes,
                pending: &[],
                now: 1,
            });
            let result = verdict.result;

            assert!(verdict.settled);
            assert_eq!(
                result.quorum_reached,
                result.agreeing_miners.len() * 2 > rf as usize,
                "rf {rf}, agreeing {:?}",
                result.agreeing_miners
            );
            assert!(result.agreeing_miners.is_disjoint(&result.divergent_miners));
            let responders: BTreeSet<MinerId> =
                responses.iter().map(|r| r.miner_id.clone()).collect();
            let judged: BTreeSet<MinerId> = result
                .agreeing_miners
                .union(&result.divergent_miners)
                .cloned()
                .collect();
            assert_eq!(judged, responders);
        }
    }

    #[test]
    fn test_equal_stake_majority_is_canonical() {
        let verifier = StakeWeightedVerifier::default();
        let mut rng = StdRng::seed_from_u64(12);

        for _ in 0..2_000 {
            let task_id = TaskId::new();
            let (rf, responses, stakes) = random_round(&mut rng, task_id, true);
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for response in &responses {
                *counts.entry(response.fingerprint.as_str()).or_default() += 1;
            }
            let Some((majority, _)) = counts.iter().find(|(_, n)| **n * 2 > rf as usize) else {
                continue;
            };

            let result = verifier
                .evaluate(&VerificationInput {
                    task_id,
                    redundancy_factor: rf,
                    responses: &responses,
                    stakes: &stakes,
                    pending: &[],
                    now: 1,
                })
                .result;
            assert!(result.quorum_reached);
            assert_eq!(result.canonical_fingerprint, Some(Fingerprint::new(*majority)));
        }
    }

    // =============================================================================
    // RESPONSES AND DISPATCH
    // =============================================================================

    async fn next_dispatches(stack: &mut Stack, n: usize) -> Vec<DispatchRequest> {
        let outbound = stack.outbound.as_mut().unwrap();
        let mut requests = Vec::new();
        while requests.len() < n {
            match outbound.recv().await {
                Some(OutboundMessage::Dispatch(request)) => requests.push(request),
                Some(OutboundMessage::Cancel { .. }) => {}
                None => panic!("transport closed"),
            }
        }
        requests.sort_by(|a, b| a.miner_id.cmp(&b.miner_id));
        requests
    }

    #[tokio::test]
    async fn test_at_most_one_response_per_miner() {
        let dir = tempfile::tempdir().unwrap();
        let mut stack = Stack::open(
            dir.path(),
            &[("m1", 10), ("m2", 10), ("m3", 10)],
            StackConfig::default(),
        )
        .await;
        let task = stack.submit(3).await;
        let requests = next_dispatches(&mut stack, 3).await;
        let first = requests[0].miner_id.clone();

        let respond = |miner: MinerId, fp: &'static str| {
            let orchestrator = Arc::clone(&stack.orchestrator);
            async move {
                orchestrator
                    .submit_response(task.id, miner, Fingerprint::new(fp), "rad:artifact".into())
                    .await
            }
        };

        assert_eq!(respond(first.clone(), "X").await.unwrap(), ResponseAck::Accepted);
        for fp in ["X", "H"] {
            assert!(matches!(
                respond(first.clone(), fp).await,
                Err(OrchestratorError::DuplicateResponse { .. })
            ));
        }
        for request in &requests[1..] {
            respond(request.miner_id.clone(), "H").await.unwrap();
        }

        let report = stack.orchestrator.await_result(task.id).await.unwrap();
        let consensus = report.consensus.unwrap();
        assert_eq!(consensus.canonical_fingerprint, Some(Fingerprint::new("H")));
        assert_eq!(consensus.divergent_miners, BTreeSet::from([first]));
        assert_eq!(
            consensus.agreeing_miners.len() + consensus.divergent_miners.len(),
            3
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_cap_holds_under_concurrent_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let miners: Vec<(String, u128)> = (0..6).map(|i| (format!("m{i}"), 10 + i)).collect();
        let miners: Vec<(&str, u128)> = miners.iter().map(|(id, s)| (id.as_str(), *s)).collect();
        let config = StackConfig {
            selection: SelectionConfig {
                concurrency_cap: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut stack = Stack::open(dir.path(), &miners, config).await;
        let fleet = stack.spawn_fleet(unanimous("H"));

        let submissions = (0..24).map(|i| {
            let orchestrator = Arc::clone(&stack.orchestrator);
            async move {
                orchestrator
                    .submit(
                        OperationKind::Pull,
                        REPOSITORY.into(),
                        format!("{PAYLOAD}-{i}"),
                        3,
                    )
                    .await
                    .unwrap()
            }
        });
        let tasks = join_all(submissions).await;

        let mut resolved = 0;
        for task in tasks {
            let report = tokio::time::timeout(
                Duration::from_secs(30),
                stack.orchestrator.await_result(task.id),
            )
            .await
            .unwrap()
            .unwrap();
            match report.task.status {
                TaskStatus::Resolved => resolved += 1,
                TaskStatus::Failed(FailureReason::InsufficientMiners) => {}
                other => panic!("unexpected status {other}"),
            }
        }

        assert!(resolved > 0);
        assert!(fleet.log().peak_outstanding <= 2);
        assert_eq!(stack.selector.slots().total_outstanding(), 0);
        fleet.stop().await;
    }

    #[tokio::test]
    async fn test_identical_submission_selects_same_miners() {
        let population = [
            ("m1", 5),
            ("m2", 80),
            ("m3", 13),
            ("m4", 400),
            ("m5", 1),
            ("m6", 42),
            ("m7", 42),
            ("m8", 9),
        ];
        let config = || StackConfig {
            selection: SelectionConfig {
                seed: 99,
                ..Default::default()
            },
            ..Default::default()
        };

        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        let mut a = Stack::open(dir_a.path(), &population, config()).await;
        let mut b = Stack::open(dir_b.path(), &population, config()).await;

        let selected = |requests: Vec<DispatchRequest>| -> Vec<MinerId> {
            requests.into_iter().map(|r| r.miner_id).collect()
        };

        a.submit(3).await;
        let from_a = selected(next_dispatches(&mut a, 3).await);
        b.submit(3).await;
        let from_b = selected(next_dispatches(&mut b, 3).await);
        assert_eq!(from_a, from_b);

        // Same stack, unchanged population: the resubmission lands on the same set.
        a.submit(3).await;
        let again = selected(next_dispatches(&mut a, 3).await);
        assert_eq!(from_a, again);
    }
}
