//! Hub handle and coordination loop

use super::{ClientId, HubSnapshot, Member};
use bytes::Bytes;
use chat_common::HubConfig;
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// The hub task is gone; requests can no longer be served
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Broadcast hub has stopped")]
pub struct HubClosed;

/// Cloneable handle for sending requests to the hub task
///
/// The task keeps running while at least one handle exists.
#[derive(Clone)]
pub struct Hub {
    registrations: mpsc::UnboundedSender<Member>,
    deregistrations: mpsc::UnboundedSender<ClientId>,
    inbox: mpsc::Sender<Bytes>,
    queries: mpsc::UnboundedSender<oneshot::Sender<HubSnapshot>>,
}

impl Hub {
    /// Create a hub handle and the runner that serves it
    pub fn new(config: &HubConfig) -> (Self, HubRunner) {
        let (registrations_tx, registrations) = mpsc::unbounded_channel();
        let (deregistrations_tx, deregistrations) = mpsc::unbounded_channel();
        let (inbox_tx, inbox) = mpsc::channel(config.inbox_buffer);
        let (queries_tx, queries) = mpsc::unbounded_channel();

        let hub = Self {
            registrations: registrations_tx,
            deregistrations: deregistrations_tx,
            inbox: inbox_tx,
            queries: queries_tx,
        };

        let runner = HubRunner {
            members: HashMap::new(),
            registrations,
            deregistrations,
            inbox,
            queries,
            delivered: 0,
            shed: 0,
        };

        (hub, runner)
    }

    /// Create a hub and spawn its coordination loop
    pub fn spawn(config: &HubConfig) -> (Self, JoinHandle<()>) {
        let (hub, runner) = Self::new(config);
        let task = tokio::spawn(runner.run());
        (hub, task)
    }

    /// Ask the hub to add a member
    pub fn register(&self, member: Member) {
        let id = member.id();
        if self.registrations.send(member).is_err() {
            tracing::debug!(client_id = %id, "Hub stopped, registration dropped");
        }
    }

    /// Ask the hub to remove a member. Unknown or already removed ids are ignored.
    pub fn unregister(&self, id: ClientId) {
        if self.deregistrations.send(id).is_err() {
            tracing::trace!(client_id = %id, "Hub stopped, deregistration dropped");
        }
    }

    /// Queue a payload for every member
    ///
    /// Waits only while the hub's inbox is full.
    pub async fn broadcast(&self, payload: impl Into<Bytes>) -> Result<(), HubClosed> {
        self.inbox.send(payload.into()).await.map_err(|_| HubClosed)
    }

    /// Current members and counters
    ///
    /// Requests enqueued earlier from the same task are applied first.
    pub async fn snapshot(&self) -> Result<HubSnapshot, HubClosed> {
        let (reply, response) = oneshot::channel();
        self.queries.send(reply).map_err(|_| HubClosed)?;
        response.await.map_err(|_| HubClosed)
    }
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("closed", &self.inbox.is_closed())
            .finish()
    }
}

/// The coordination loop. Owns the member set exclusively.
pub struct HubRunner {
    members: HashMap<ClientId, mpsc::Sender<Bytes>>,
    registrations: mpsc::UnboundedReceiver<Member>,
    deregistrations: mpsc::UnboundedReceiver<ClientId>,
    inbox: mpsc::Receiver<Bytes>,
    queries: mpsc::UnboundedReceiver<oneshot::Sender<HubSnapshot>>,
    delivered: u64,
    shed: u64,
}

impl HubRunner {
    /// Serve requests until every [`Hub`] handle is dropped
    ///
    /// Ready requests are taken in a fixed order: registrations,
    /// deregistrations, broadcasts, then snapshots.
    pub async fn run(mut self) {
        tracing::info!("Broadcast hub started");

        loop {
            tokio::select! {
                biased;

                Some(member) = self.registrations.recv() => self.handle_register(member),
                Some(id) = self.deregistrations.recv() => {
                    self.handle_unregister(id);
                }
                Some(payload) = self.inbox.recv() => {
                    self.handle_broadcast(&payload);
                }
                Some(reply) = self.queries.recv() => {
                    let _ = reply.send(self.snapshot());
                }
                else => break,
            }
        }

        // Dropping the remaining senders closes every member's queue.
        tracing::info!(members = self.members.len(), "Broadcast hub stopped");
    }

    fn handle_register(&mut self, member: Member) {
        let (id, outbound) = member.into_parts();

        if self.members.insert(id, outbound).is_some() {
            tracing::warn!(client_id = %id, "Client registered twice, previous queue closed");
        } else {
            tracing::debug!(client_id = %id, members = self.members.len(), "Client registered");
        }
    }

    /// Remove a member and close its queue. Returns whether it was present.
    fn handle_unregister(&mut self, id: ClientId) -> bool {
        if self.members.remove(&id).is_some() {
            tracing::debug!(client_id = %id, members = self.members.len(), "Client unregistered");
            true
        } else {
            tracing::trace!(client_id = %id, "Client already unregistered");
            false
        }
    }

    /// Fan a payload out to every member without waiting on any of them.
    ///
    /// A member whose queue is full is removed on the spot, which closes its
    /// queue; its own pumps notice and tear the connection down. Returns the
    /// number of members that received the payload.
    fn handle_broadcast(&mut self, payload: &Bytes) -> usize {
        let mut delivered = 0;
        let mut shed = 0;

        self.members.retain(|id, outbound| match outbound.try_send(payload.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(client_id = %id, "Outbound queue full, dropping slow client");
                shed += 1;
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(client_id = %id, "Outbound queue already closed, removing client");
                false
            }
        });

        self.delivered += delivered as u64;
        self.shed += shed;

        tracing::trace!(
            size = payload.len(),
            delivered = delivered,
            shed = shed,
            "Payload broadcast"
        );

        delivered
    }

    fn snapshot(&self) -> HubSnapshot {
        let mut members: Vec<ClientId> = self.members.keys().copied().collect();
        members.sort_unstable();

        HubSnapshot {
            members,
            delivered: self.delivered,
            shed: self.shed,
        }
    }
}

impl std::fmt::Debug for HubRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubRunner")
            .field("members", &self.members.len())
            .field("delivered", &self.delivered)
            .field("shed", &self.shed)
            .finish()
    }
}
