//! Grouping of responses by fingerprint and canonical ordering.

use shared_types::{Fingerprint, MinerId, ResponseRecord};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// All miners that reported the same fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintGroup {
    pub fingerprint: Fingerprint,
    pub members: BTreeSet<MinerId>,
    /// Cumulative stake weight of the members.
    pub stake: u128,
    /// Arrival sequence of the group's earliest response.
    pub first_arrival: u64,
    /// Artifact reference carried by that earliest response.
    pub first_artifact: String,
}

impl FingerprintGroup {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Canonical order: heavier stake first, then earlier first arrival,
    /// then smaller fingerprint.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        other
            .stake
            .cmp(&self.stake)
            .then_with(|| self.first_arrival.cmp(&other.first_arrival))
            .then_with(|| self.fingerprint.cmp(&other.fingerprint))
    }

    /// Whether this group stays ahead of `rival` even if `extra_stake`
    /// joins the rival. Late joiners never improve the rival's first arrival.
    pub fn outweighs(&self, rival_stake: u128, rival_first_arrival: u64, extra_stake: u128) -> bool {
        let rival_total = rival_stake.saturating_add(extra_stake);
        match self.stake.cmp(&rival_total) {
            Ordering::Greater => true,
            Ordering::Equal => self.first_arrival < rival_first_arrival,
            Ordering::Less => false,
        }
    }
}

/// Group responses by fingerprint, ordered canonically (head = canonical).
///
/// Miners missing from `stakes` count with zero stake.
pub fn group_responses(
    responses: &[ResponseRecord],
    stakes: &HashMap<MinerId, u128>,
) -> Vec<FingerprintGroup> {
    let mut groups: HashMap<&Fingerprint, FingerprintGroup> = HashMap::new();

    for response in responses {
        let stake = stakes.get(&response.miner_id).copied().unwrap_or(0);
        let group = groups
            .entry(&response.fingerprint)
            .or_insert_with(|| FingerprintGroup {
                fingerprint: response.fingerprint.clone(),
                members: BTreeSet::new(),
                stake: 0,
                first_arrival: response.arrival_seq,
                first_artifact: response.artifact_ref.clone(),
            });

        if group.members.insert(response.miner_id.clone()) {
            group.stake = group.stake.saturating_add(stake);
        }
        if response.arrival_seq < group.first_arrival {
            group.first_arrival = response.arrival_seq;
            group.first_artifact = response.artifact_ref.clone();
        }
    }

    let mut ordered: Vec<FingerprintGroup> = groups.into_values().collect();
    ordered.sort_by(FingerprintGroup::canonical_cmp);
    ordered
}
