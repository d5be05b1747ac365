//! Session bootstrap
//!
//! Turns an established transport into a hub member with running pumps.

use super::state::{ClientState, Lifecycle};
use super::{inbound, outbound};
use crate::hub::{ClientId, Hub, Member};
use crate::transport::Transport;
use chat_common::HubConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Per-connection limits, resolved from [`HubConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientLimits {
    /// Largest inbound data frame, in bytes
    pub max_message_size: usize,
    /// Read deadline budget, re-armed on every pong
    pub pong_wait: Duration,
    /// Interval between pings; shorter than `pong_wait`
    pub ping_period: Duration,
    /// Deadline for any single write
    pub write_wait: Duration,
    /// Outbound queue capacity
    pub send_buffer: usize,
}

impl From<&HubConfig> for ClientLimits {
    fn from(config: &HubConfig) -> Self {
        Self {
            max_message_size: config.max_message_size,
            pong_wait: config.pong_wait(),
            ping_period: config.ping_period(),
            write_wait: config.write_wait(),
            send_buffer: config.send_buffer,
        }
    }
}

impl Default for ClientLimits {
    fn default() -> Self {
        Self::from(&HubConfig::default())
    }
}

/// Observer for an accepted client
#[derive(Debug, Clone)]
pub struct ClientHandle {
    id: ClientId,
    state: watch::Receiver<ClientState>,
}

impl ClientHandle {
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Current lifecycle state
    pub fn state(&self) -> ClientState {
        *self.state.borrow()
    }

    /// Wait until both pumps have exited
    pub async fn closed(&mut self) {
        // The sender lives until the last pump is done, after publishing `Closed`.
        let _ = self
            .state
            .wait_for(|state| *state == ClientState::Closed)
            .await;
    }
}

/// Register a new connection with the hub and start its two pumps.
///
/// Must be called from within a tokio runtime. Call it exactly once per
/// transport; the returned handle only observes the client.
pub fn accept<T: Transport>(hub: &Hub, transport: T, limits: ClientLimits) -> ClientHandle {
    let id = ClientId::generate();
    let lifecycle = Arc::new(Lifecycle::new());
    let handle = ClientHandle {
        id,
        state: lifecycle.subscribe(),
    };

    let (queue_tx, queue_rx) = mpsc::channel(limits.send_buffer);
    hub.register(Member::new(id, queue_tx));
    lifecycle.advance(ClientState::Registered);

    let (source, sink) = transport.split();
    tokio::spawn(outbound::run(id, sink, queue_rx, lifecycle.clone(), limits));
    tokio::spawn(inbound::run(id, source, hub.clone(), lifecycle.clone(), limits));
    lifecycle.advance(ClientState::Active);

    tracing::info!(client_id = %id, "Client connected");

    handle
}
