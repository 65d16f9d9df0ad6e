//! Driving ports (Inbound API)

use crate::domain::{SelectionRequest, SelectionResult};
use shared_types::MinerId;

/// Strategy that picks the miners a task is dispatched to.
pub trait MinerSelector: Send + Sync {
    /// Choose `min(request.count, eligible)` miners, in selection order.
    ///
    /// Every returned miner has one dispatch slot reserved; the caller must
    /// hand it back with [`MinerSelector::release`] once the request is
    /// answered, cancelled or abandoned.
    ///
    /// Fails with `InsufficientMiners` when fewer than
    /// `max(1, count / 2 + 1)` miners are eligible.
    fn select(&self, request: &SelectionRequest) -> SelectionResult<Vec<MinerId>>;

    /// Return the dispatch slot held for `miner_id`
    fn release(&self, miner_id: &MinerId);
}
