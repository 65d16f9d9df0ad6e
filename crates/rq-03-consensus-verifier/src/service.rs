//! Stake-weighted consensus verifier.

use crate::domain::{group_responses, FingerprintGroup, VerifierConfig};
use crate::ports::{ConsensusVerifier, Verdict, VerificationInput};
use shared_types::ConsensusResult;
use tracing::debug;

/// Canonical group = heaviest fingerprint group; see the crate docs.
#[derive(Debug, Clone, Default)]
pub struct StakeWeightedVerifier {
    config: VerifierConfig,
}

impl StakeWeightedVerifier {
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// True when no assignment of the pending miners' responses can
    /// displace `head` as the canonical group.
    fn is_locked(head: &FingerprintGroup, rivals: &[FingerprintGroup], pending_stake: u128) -> bool {
        // A group formed only by pending miners arrives after everything
        // already recorded.
        let fresh_group_loses = head.outweighs(0, u64::MAX, pending_stake);
        fresh_group_loses
            && rivals
                .iter()
                .all(|rival| head.outweighs(rival.stake, rival.first_arrival, pending_stake))
    }
}

impl ConsensusVerifier for StakeWeightedVerifier {
    fn evaluate(&self, input: &VerificationInput<'_>) -> Verdict {
        let groups = group_responses(input.responses, input.stakes);
        let Some((head, rivals)) = groups.split_first() else {
            return Verdict {
                result: ConsensusResult::empty(input.task_id, input.now),
                settled: input.pending.is_empty(),
            };
        };

        let threshold = input.redundancy_factor as usize / 2 + 1;
        let quorum_reached = head.len() >= threshold;

        let settled = if input.pending.is_empty() {
            true
        } else if self.config.early_resolution && quorum_reached {
            let pending_stake = input
                .pending
                .iter()
                .map(|id| input.stakes.get(id).copied().unwrap_or(0))
                .fold(0u128, u128::saturating_add);
            Self::is_locked(head, rivals, pending_stake)
        } else {
            false
        };

        let divergent_miners = rivals
            .iter()
            .flat_map(|group| group.members.iter().cloned())
            .collect();

        debug!(
            task_id = %input.task_id,
            canonical = %head.fingerprint,
            agreeing = head.len(),
            groups = groups.len(),
            quorum_reached,
            settled,
            "[rq-03] Responses evaluated"
        );

        Verdict {
            result: ConsensusResult {
                task_id: input.task_id,
                canonical_fingerprint: Some(head.fingerprint.clone()),
                canonical_artifact: Some(head.first_artifact.clone()),
                agreeing_miners: head.members.clone(),
                divergent_miners,
                quorum_reached,
                resolved_at: input.now,
            },
            settled,
        }
    }
}
