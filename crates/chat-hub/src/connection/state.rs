//! Connection lifecycle

use serde::Serialize;
use tokio::sync::watch;

/// Lifecycle of one client, in order. States only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ClientState {
    /// Transport accepted, not yet known to the hub
    Created,
    /// Registration sent to the hub
    Registered,
    /// Both pumps running
    Active,
    /// One pump has exited
    Closing,
    /// Both pumps have exited; transport released
    Closed,
}

/// Shared by both pumps of a client. Publishes every transition.
#[derive(Debug)]
pub(crate) struct Lifecycle {
    state: watch::Sender<ClientState>,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        let (state, _) = watch::channel(ClientState::Created);
        Self { state }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ClientState> {
        self.state.subscribe()
    }

    /// Move forward to `next`; ignored if the client is already past it.
    pub(crate) fn advance(&self, next: ClientState) {
        self.state.send_if_modified(|current| {
            if next > *current {
                *current = next;
                true
            } else {
                false
            }
        });
    }

    /// Record that one pump stopped: the first exit means `Closing`, the second `Closed`.
    /// Returns the state this call wrote, so exactly one caller sees `Closed`.
    pub(crate) fn pump_exited(&self) -> ClientState {
        let mut next = ClientState::Closing;
        self.state.send_modify(|current| {
            if *current >= ClientState::Closing {
                next = ClientState::Closed;
            }
            *current = next;
        });
        next
    }
}
