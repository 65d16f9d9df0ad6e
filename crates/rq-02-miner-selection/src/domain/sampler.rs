//! Seeded weighted sampling without replacement.

use super::SelectionRequest;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha3::{Digest, Sha3_256};
use shared_types::MinerId;
use std::cmp::Ordering;

/// An eligible miner and its sampling weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub miner_id: MinerId,
    pub weight: f64,
}

/// Sampling weight of a miner.
///
/// `(floor + score / max_score) * (1 + ln(1 + stake))`: strictly increasing in
/// both reputation and stake, and never zero.
pub fn selection_weight(score: f64, max_score: f64, stake: u128, floor: f64) -> f64 {
    let normalized = if max_score > 0.0 {
        (score / max_score).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let stake_factor = 1.0 + (stake as f64).ln_1p();
    (floor.max(f64::MIN_POSITIVE) + normalized) * stake_factor
}

/// Seed for one selection, stable for identical task content and attempt.
pub fn derive_seed(base_seed: u64, request: &SelectionRequest) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update(base_seed.to_le_bytes());
    hasher.update(request.operation.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(request.repository_ref.as_bytes());
    hasher.update([0u8]);
    hasher.update(request.payload_ref.as_bytes());
    hasher.update([0u8]);
    hasher.update(request.attempt.to_le_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Draw up to `count` candidates without replacement, weighted by `weight`.
///
/// Each candidate gets the key `ln(u) / weight` with `u` uniform in (0, 1];
/// the `count` largest keys win. Keys are drawn in miner-id order so the
/// result only depends on the candidate set and the seed. Equal keys are
/// ordered by miner id ascending.
pub fn weighted_sample(mut candidates: Vec<Candidate>, count: usize, seed: u64) -> Vec<MinerId> {
    candidates.sort_by(|a, b| a.miner_id.cmp(&b.miner_id));
    let mut rng = StdRng::seed_from_u64(seed);

    let mut keyed: Vec<(f64, MinerId)> = candidates
        .into_iter()
        .map(|c| {
            let u: f64 = 1.0 - rng.gen::<f64>();
            (u.ln() / c.weight, c.miner_id)
        })
        .collect();

    keyed.sort_by(|(key_a, id_a), (key_b, id_b)| {
        key_b
            .partial_cmp(key_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| id_a.cmp(id_b))
    });

    keyed.into_iter().take(count).map(|(_, id)| id).collect()
}
