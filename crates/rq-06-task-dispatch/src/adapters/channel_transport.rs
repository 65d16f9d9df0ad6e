//! In-process transport over a tokio channel.
//!
//! The network layer (or a test) owns the receiving end, forwards requests
//! to miners and feeds their replies back through the orchestrator API.

use crate::ports::{MinerTransport, TransportError};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{DispatchRequest, MinerId, TaskId};
use std::collections::HashSet;
use tokio::sync::mpsc;
use tracing::debug;

/// Message emitted towards miners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    Dispatch(DispatchRequest),
    Cancel { task_id: TaskId, miner_id: MinerId },
}

pub struct ChannelTransport {
    sender: mpsc::UnboundedSender<OutboundMessage>,
    unreachable: RwLock<HashSet<MinerId>>,
}

impl ChannelTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender,
                unreachable: RwLock::new(HashSet::new()),
            },
            receiver,
        )
    }

    /// Refuse delivery to `miner_id` until cleared.
    pub fn set_unreachable(&self, miner_id: MinerId, unreachable: bool) {
        let mut set = self.unreachable.write();
        if unreachable {
            set.insert(miner_id);
        } else {
            set.remove(&miner_id);
        }
    }
}

#[async_trait]
impl MinerTransport for ChannelTransport {
    async fn dispatch(&self, request: DispatchRequest) -> Result<(), TransportError> {
        if self.unreachable.read().contains(&request.miner_id) {
            return Err(TransportError::Unreachable(request.miner_id));
        }
        debug!(
            task_id = %request.task_id,
            miner_id = %request.miner_id,
            "[rq-06] Request handed to transport"
        );
        self.sender
            .send(OutboundMessage::Dispatch(request))
            .map_err(|_| TransportError::Closed)
    }

    async fn cancel(&self, task_id: TaskId, miner_id: &MinerId) -> Result<(), TransportError> {
        self.sender
            .send(OutboundMessage::Cancel {
                task_id,
                miner_id: miner_id.clone(),
            })
            .map_err(|_| TransportError::Closed)
    }
}
