//! Server state
//!
//! Application state shared by the HTTP handlers.

use crate::connection::ClientLimits;
use crate::hub::Hub;

/// Hub server application state
#[derive(Debug, Clone)]
pub struct HubState {
    /// Handle to the broadcast hub task
    hub: Hub,
    /// Limits applied to every accepted connection
    limits: ClientLimits,
}

impl HubState {
    /// Create a new hub state
    pub fn new(hub: Hub, limits: ClientLimits) -> Self {
        Self { hub, limits }
    }

    /// Get the hub handle
    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    /// Get the per-connection limits
    pub fn limits(&self) -> ClientLimits {
        self.limits
    }
}
