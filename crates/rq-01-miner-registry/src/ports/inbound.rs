//! Driving ports (Inbound API)

use crate::domain::RegistryResult;
use shared_types::{MinerId, MinerRecord};

/// Registry access used by selection and scoring.
///
/// Implementations must make `apply_delta` an atomic read-modify-write per
/// miner: concurrent callers never lose an update.
pub trait MinerRegistryApi: Send + Sync {
    /// Get a copy of one miner's record
    fn get(&self, miner_id: &MinerId) -> RegistryResult<MinerRecord>;

    /// Records of every available miner, ordered by miner id
    fn list_available(&self) -> Vec<MinerRecord>;

    /// Records of every known miner, ordered by miner id
    fn snapshot(&self) -> Vec<MinerRecord>;

    /// Adjust a miner's reputation and failure streak, returning the new record
    fn apply_delta(
        &self,
        miner_id: &MinerId,
        score_delta: f64,
        failure: bool,
    ) -> RegistryResult<MinerRecord>;

    /// Record that a miner was heard from
    fn touch(&self, miner_id: &MinerId) -> RegistryResult<()>;

    /// Persist every record
    fn flush(&self) -> RegistryResult<()>;

    /// Upper bound of reputation scores
    fn max_score(&self) -> f64;
}
