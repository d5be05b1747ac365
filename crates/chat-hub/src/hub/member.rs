//! Hub membership records

use bytes::Bytes;
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Identity of one connection. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ClientId(Uuid);

impl ClientId {
    /// Generate a fresh id
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// What the hub keeps for a registered client: its id and the only
/// producer of its outbound queue.
///
/// Registration moves the `Member` into the hub, and removal drops it,
/// which closes the queue for good.
pub struct Member {
    id: ClientId,
    outbound: mpsc::Sender<Bytes>,
}

impl Member {
    pub fn new(id: ClientId, outbound: mpsc::Sender<Bytes>) -> Self {
        Self { id, outbound }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub(crate) fn into_parts(self) -> (ClientId, mpsc::Sender<Bytes>) {
        (self.id, self.outbound)
    }
}

impl std::fmt::Debug for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Member")
            .field("id", &self.id)
            .field("queued", &(self.outbound.max_capacity() - self.outbound.capacity()))
            .finish()
    }
}

/// Point-in-time view of the hub
#[derive(Debug, Clone, Default, Serialize)]
pub struct HubSnapshot {
    /// Current members, sorted
    pub members: Vec<ClientId>,
    /// Payloads enqueued onto member queues since start
    pub delivered: u64,
    /// Members dropped because their queue was full
    pub shed: u64,
}

impl HubSnapshot {
    pub fn contains(&self, id: ClientId) -> bool {
        self.members.binary_search(&id).is_ok()
    }

    pub fn stats(&self) -> HubStats {
        HubStats {
            members: self.members.len(),
            delivered: self.delivered,
            shed: self.shed,
        }
    }
}

/// Counters reported by `/stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HubStats {
    pub members: usize,
    pub delivered: u64,
    pub shed: u64,
}
