//! # Persistence Across Restarts
//!
//! Reputation, the task history and the incentive ledger are written to the
//! data directory and must read back identically after a restart.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rq_01_miner_registry::{FileRegistryStore, MinerRegistryApi, StoreError};
    use rq_03_consensus_verifier::VerifierConfig;
    use rq_05_rewards::{JsonlLedger, LedgerEntry};
    use rq_06_task_dispatch::{JsonlTaskHistory, OrchestratorApi, TaskHistory};
    use shared_types::{MinerId, TaskStatus};

    use crate::fixtures::{answers, Stack, StackConfig};

    fn patient() -> StackConfig {
        StackConfig {
            verifier: VerifierConfig {
                early_resolution: false,
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_outcomes_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let task_id = {
            let mut stack =
                Stack::open(dir.path(), &[("m1", 10), ("m2", 10), ("m3", 10)], patient()).await;
            let fleet = stack.spawn_fleet(answers(&[("m1", "H"), ("m2", "H"), ("m3", "X")]));

            let task = stack.submit(3).await;
            let report = stack.orchestrator.await_result(task.id).await.unwrap();
            assert_eq!(report.task.status, TaskStatus::Resolved);

            stack
                .orchestrator
                .shutdown(Duration::from_secs(1))
                .await
                .unwrap();
            fleet.stop().await;
            task.id
        };

        let stack = Stack::open(dir.path(), &[], patient()).await;
        let score = |id: &str| {
            stack
                .registry
                .get(&MinerId::new(id))
                .unwrap()
                .reputation_score
        };
        assert!((score("m1") - 0.52).abs() < 1e-9);
        assert!((score("m2") - 0.52).abs() < 1e-9);
        assert!((score("m3") - 0.40).abs() < 1e-9);

        let history = JsonlTaskHistory::open(stack.history_path()).await.unwrap();
        let reports = history.load_all().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].task.id, task_id);
        assert_eq!(reports[0].task.status, TaskStatus::Resolved);
        assert_eq!(reports[0].rewards.len(), 2);

        let entries = JsonlLedger::read_entries(stack.ledger_path()).await.unwrap();
        assert_eq!(entries.len(), 1);
        match &entries[0] {
            LedgerEntry::Rewards { instructions } => {
                assert_eq!(instructions, &reports[0].rewards);
            }
            other => panic!("expected rewards, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_benched_miner_stays_benched_after_restart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let stack = Stack::open(dir.path(), &[("m1", 10), ("m2", 10)], patient()).await;
            let benched = MinerId::new("m2");
            for _ in 0..4 {
                stack.registry.apply_delta(&benched, -0.05, true).unwrap();
            }
            stack.registry.flush().unwrap();
        }

        let stack = Stack::open(dir.path(), &[], patient()).await;
        let available: Vec<MinerId> = stack
            .registry
            .list_available()
            .into_iter()
            .map(|r| r.miner_id)
            .collect();
        assert_eq!(available, vec![MinerId::new("m1")]);
        let record = stack.registry.get(&MinerId::new("m2")).unwrap();
        assert_eq!(record.consecutive_failures, 4);
        assert!((record.reputation_score - 0.30).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_registry_file_is_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        let _stack = Stack::open(dir.path(), &[("m1", 10)], StackConfig::default()).await;
        assert!(matches!(
            FileRegistryStore::open(dir.path().join("registry.json")),
            Err(StoreError::Locked(_))
        ));
    }
}
