//! Stake-proportional budget split.

use shared_types::MinerId;

/// `floor(value * numerator / denominator)` without intermediate overflow
/// for realistic stakes. Falls back to float arithmetic when the exact
/// product does not fit; callers cap the result against the budget.
fn mul_div_floor(value: u128, numerator: u128, denominator: u128) -> u128 {
    debug_assert!(denominator > 0);
    let whole = value / denominator;
    let rest = value % denominator;
    let head = whole.saturating_mul(numerator);
    let tail = match rest.checked_mul(numerator) {
        Some(product) => product / denominator,
        None => ((rest as f64) * (numerator as f64 / denominator as f64)).floor() as u128,
    };
    head.saturating_add(tail)
}

/// Split `budget` across `shares` (miner, stake) proportionally to stake.
///
/// Output follows miner id order and has one entry per distinct miner. The
/// remainder left by flooring goes to the largest stake, ties broken by the
/// smaller miner id. When every stake is zero the budget is split equally.
pub fn split_budget(budget: u128, shares: &[(MinerId, u128)]) -> Vec<(MinerId, u128)> {
    let mut shares: Vec<(MinerId, u128)> = shares.to_vec();
    shares.sort_by(|a, b| a.0.cmp(&b.0));
    shares.dedup_by(|a, b| a.0 == b.0);
    if shares.is_empty() {
        return Vec::new();
    }

    let equal_split = shares.iter().all(|(_, stake)| *stake == 0);
    let weight = |stake: u128| if equal_split { 1 } else { stake };
    let total = shares
        .iter()
        .map(|(_, stake)| weight(*stake))
        .fold(0u128, u128::saturating_add);

    let mut remaining = budget;
    let mut amounts: Vec<(MinerId, u128)> = shares
        .iter()
        .map(|(miner_id, stake)| {
            let amount = mul_div_floor(budget, weight(*stake), total).min(remaining);
            remaining -= amount;
            (miner_id.clone(), amount)
        })
        .collect();

    if remaining > 0 {
        // `max_by` keeps the last of equal maxima; reversed, that is the smallest id.
        if let Some(index) = shares
            .iter()
            .enumerate()
            .rev()
            .max_by(|(_, a), (_, b)| a.1.cmp(&b.1))
            .map(|(index, _)| index)
        {
            amounts[index].1 += remaining;
        }
    }
    amounts
}
