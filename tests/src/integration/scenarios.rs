//! # End-to-End Scenarios
//!
//! Full task lifecycles on the file-backed stack:
//!
//! 1. **Majority agreement**: {H,H,X} resolves to H, X is flagged divergent
//! 2. **Even split**: {H,H,X,X} fails with no quorum, nothing is paid
//! 3. **Silent miners**: the deadline triggers a retry with replacements
//! 4. **Too few miners**: selection fails before anything is dispatched

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::time::Duration;

    use rq_01_miner_registry::{
        InMemoryRegistryStore, MinerRegistry, MinerRegistryApi, RegistryConfig,
    };
    use rq_02_miner_selection::{
        MinerSelector, SelectionConfig, SelectionError, SelectionRequest, WeightedSelector,
    };
    use rq_03_consensus_verifier::VerifierConfig;
    use rq_05_rewards::{JsonlLedger, LedgerEntry};
    use rq_06_task_dispatch::{
        DispatchConfig, JsonlTaskHistory, OrchestratorApi, TaskHistory, TaskReport,
    };
    use shared_types::{FailureReason, Fingerprint, MinerId, OperationKind, TaskId, TaskStatus};
    use std::sync::Arc;

    use crate::fixtures::{answers, Script, Stack, StackConfig, BUDGET};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn ids(list: &[&str]) -> BTreeSet<MinerId> {
        list.iter().map(|id| MinerId::new(*id)).collect()
    }

    /// Wait for every response before judging, so outcomes do not depend on
    /// response interleaving.
    fn patient() -> StackConfig {
        StackConfig {
            verifier: VerifierConfig {
                early_resolution: false,
            },
            ..Default::default()
        }
    }

    fn with_deadline(timeout: Duration, retry_budget: u32) -> StackConfig {
        StackConfig {
            dispatch: DispatchConfig {
                task_timeout: timeout,
                retry_budget,
                ..Default::default()
            },
            ..patient()
        }
    }

    async fn settle(stack: &Stack, task_id: TaskId) -> TaskReport {
        tokio::time::timeout(
            Duration::from_secs(60),
            stack.orchestrator.await_result(task_id),
        )
        .await
        .expect("task did not finish")
        .expect("task unknown")
    }

    fn score(stack: &Stack, id: &str) -> f64 {
        stack
            .registry
            .get(&MinerId::new(id))
            .unwrap()
            .reputation_score
    }

    async fn ledger_rewards(path: &std::path::Path) -> Vec<(String, u128)> {
        JsonlLedger::read_entries(path)
            .await
            .unwrap()
            .into_iter()
            .filter_map(|entry| match entry {
                LedgerEntry::Rewards { instructions } => Some(instructions),
                LedgerEntry::Weights(_) => None,
            })
            .flatten()
            .map(|r| (r.miner_id.to_string(), r.amount))
            .collect()
    }

    // =============================================================================
    // SCENARIO A: MAJORITY AGREEMENT
    // =============================================================================

    #[tokio::test]
    async fn test_majority_agreement_resolves_and_pays_agreeing_miners() {
        let dir = tempfile::tempdir().unwrap();
        let mut stack =
            Stack::open(dir.path(), &[("m1", 10), ("m2", 10), ("m3", 10)], patient()).await;
        let fleet = stack.spawn_fleet(answers(&[("m1", "H"), ("m2", "H"), ("m3", "X")]));

        let task = stack.submit(3).await;
        let report = settle(&stack, task.id).await;

        assert_eq!(report.task.status, TaskStatus::Resolved);
        let consensus = report.consensus.clone().unwrap();
        assert!(consensus.quorum_reached);
        assert_eq!(consensus.canonical_fingerprint, Some(Fingerprint::new("H")));
        assert_eq!(consensus.agreeing_miners, ids(&["m1", "m2"]));
        assert_eq!(consensus.divergent_miners, ids(&["m3"]));

        let paid = ledger_rewards(&stack.ledger_path()).await;
        assert_eq!(paid, vec![("m1".into(), 500), ("m2".into(), 500)]);
        assert_eq!(paid.iter().map(|(_, a)| a).sum::<u128>(), BUDGET);

        assert!((score(&stack, "m1") - 0.52).abs() < 1e-9);
        assert!((score(&stack, "m2") - 0.52).abs() < 1e-9);
        assert!((score(&stack, "m3") - 0.40).abs() < 1e-9);
        assert_eq!(stack.tracker.get(&MinerId::new("m3")), Some(0.0));

        let status = stack.orchestrator.get_status(task.id).await.unwrap();
        assert_eq!(status.artifact_ref.as_deref(), Some("rad:artifact/H/m1"));
        fleet.stop().await;
    }

    #[tokio::test]
    async fn test_heavy_lone_dissenter_blocks_quorum() {
        let dir = tempfile::tempdir().unwrap();
        let mut stack =
            Stack::open(dir.path(), &[("m1", 1), ("m2", 2), ("m3", 50)], patient()).await;
        let fleet = stack.spawn_fleet(answers(&[("m1", "H"), ("m2", "H"), ("m3", "X")]));

        let task = stack.submit(3).await;
        let report = settle(&stack, task.id).await;

        // X outweighs H on stake but a single member is no quorum.
        let consensus = report.consensus.unwrap();
        assert_eq!(consensus.canonical_fingerprint, Some(Fingerprint::new("X")));
        assert!(!consensus.quorum_reached);
        assert_eq!(
            report.task.status,
            TaskStatus::Failed(FailureReason::NoQuorum)
        );
        assert!(report.rewards.is_empty());
        assert!((score(&stack, "m3") - 0.52).abs() < 1e-9);
        assert!((score(&stack, "m1") - 0.40).abs() < 1e-9);
        fleet.stop().await;
    }

    // =============================================================================
    // SCENARIO B: EVEN SPLIT
    // =============================================================================

    #[tokio::test]
    async fn test_even_split_fails_without_rewards() {
        let dir = tempfile::tempdir().unwrap();
        let miners = [("m1", 10), ("m2", 10), ("m3", 10), ("m4", 10)];
        let mut stack = Stack::open(dir.path(), &miners, patient()).await;
        let fleet = stack.spawn_fleet(answers(&[
            ("m1", "H"),
            ("m2", "H"),
            ("m3", "X"),
            ("m4", "X"),
        ]));

        let task = stack.submit(4).await;
        let report = settle(&stack, task.id).await;

        assert_eq!(
            report.task.status,
            TaskStatus::Failed(FailureReason::NoQuorum)
        );
        let consensus = report.consensus.unwrap();
        assert!(!consensus.quorum_reached);
        assert!(report.rewards.is_empty());
        assert!(ledger_rewards(&stack.ledger_path()).await.is_empty());

        // The earlier pair is canonical; reputation still moves both ways.
        assert_eq!(consensus.agreeing_miners.len(), 2);
        assert_eq!(consensus.divergent_miners.len(), 2);
        for id in &consensus.agreeing_miners {
            assert!((score(&stack, id.as_str()) - 0.52).abs() < 1e-9);
        }
        for id in &consensus.divergent_miners {
            assert!((score(&stack, id.as_str()) - 0.40).abs() < 1e-9);
        }
        fleet.stop().await;
    }

    // =============================================================================
    // SCENARIO C: SILENT MINERS
    // =============================================================================

    /// Only the first request of the first attempt is answered; every retry
    /// request is answered when `answer_retries` is set.
    fn first_then_retries(answer_retries: bool) -> Script {
        Box::new(move |request, nth| {
            let answered = nth == 0 || (answer_retries && request.attempt > 0);
            answered.then(|| "H".to_string())
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_retries_with_replacement_miners() {
        let dir = tempfile::tempdir().unwrap();
        let miners = [("m1", 10), ("m2", 10), ("m3", 10), ("m4", 10), ("m5", 10)];
        let mut stack =
            Stack::open(dir.path(), &miners, with_deadline(Duration::from_secs(5), 1)).await;
        let fleet = stack.spawn_fleet(first_then_retries(true));

        let task = stack.submit(3).await;
        let report = settle(&stack, task.id).await;

        let (first, retry) = {
            let log = fleet.log();
            (log.requests(task.id, 0), log.requests(task.id, 1))
        };
        assert_eq!(first.len(), 3);
        assert_eq!(retry.len(), 2);
        for request in &retry {
            assert!(first.iter().all(|f| f.miner_id != request.miner_id));
        }

        assert_eq!(report.task.status, TaskStatus::Resolved);
        assert_eq!(report.task.attempt, 1);
        assert_eq!(report.consensus.unwrap().agreeing_miners.len(), 3);
        assert_eq!(report.rewards.len(), 3);

        let silent: Vec<&MinerId> = first
            .iter()
            .map(|r| &r.miner_id)
            .filter(|id| report.rewards.iter().all(|r| &r.miner_id != *id))
            .collect();
        assert_eq!(silent.len(), 2);
        for id in silent {
            let record = stack.registry.get(id).unwrap();
            assert!((record.reputation_score - 0.45).abs() < 1e-9);
            assert_eq!(record.consecutive_failures, 1);
        }
        fleet.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_retry_ends_timed_out() {
        let dir = tempfile::tempdir().unwrap();
        let miners = [("m1", 10), ("m2", 10), ("m3", 10), ("m4", 10), ("m5", 10)];
        let mut stack =
            Stack::open(dir.path(), &miners, with_deadline(Duration::from_secs(5), 1)).await;
        let fleet = stack.spawn_fleet(first_then_retries(false));

        let task = stack.submit(3).await;
        let report = settle(&stack, task.id).await;

        assert_eq!(report.task.status, TaskStatus::TimedOut);
        assert_eq!(report.task.attempt, 1);
        assert!(report.rewards.is_empty());

        // The answered request is the first one the fleet received. Its lone
        // fingerprint is canonical, so it counts as agreeing.
        let responder = fleet
            .log()
            .dispatched
            .iter()
            .find(|r| r.task_id == task.id)
            .map(|r| r.miner_id.clone())
            .unwrap();
        for (id, _) in miners {
            let expected = if MinerId::new(id) == responder { 0.52 } else { 0.45 };
            assert!((score(&stack, id) - expected).abs() < 1e-9, "{id}");
        }
        assert_eq!(stack.selector.slots().total_outstanding(), 0);
        fleet.stop().await;
    }

    // =============================================================================
    // SCENARIO D: TOO FEW MINERS
    // =============================================================================

    #[test]
    fn test_selector_refuses_when_quorum_is_unreachable() {
        let registry = Arc::new(
            MinerRegistry::open(RegistryConfig::default(), Arc::new(InMemoryRegistryStore::new()))
                .unwrap(),
        );
        registry.register(MinerId::new("m1"), 10).unwrap();
        let selector = WeightedSelector::new(registry, SelectionConfig::default());

        let request = SelectionRequest::new(OperationKind::Merge, "rad:z1", "commit:1", 3);
        assert_eq!(
            selector.select(&request),
            Err(SelectionError::InsufficientMiners {
                available: 1,
                required: 2
            })
        );
    }

    #[tokio::test]
    async fn test_submit_with_one_miner_fails_and_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let mut stack = Stack::open(dir.path(), &[("m1", 10)], StackConfig::default()).await;
        let fleet = stack.spawn_fleet(answers(&[("m1", "H")]));

        let task = stack.submit(3).await;
        assert_eq!(
            task.status,
            TaskStatus::Failed(FailureReason::InsufficientMiners)
        );

        let report = settle(&stack, task.id).await;
        assert!(report.consensus.is_none());
        assert!(fleet.log().dispatched.is_empty());
        assert_eq!(score(&stack, "m1"), 0.5);

        let history = JsonlTaskHistory::open(stack.history_path()).await.unwrap();
        let recorded = history.load_all().await.unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].task.id, task.id);
        fleet.stop().await;
    }
}
