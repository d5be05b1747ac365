//! # chat-hub
//!
//! WebSocket broadcast hub for real-time chat. Every text or binary message a
//! client sends is normalized and relayed to all connected clients.

pub mod connection;
pub mod hub;
pub mod protocol;
pub mod server;
pub mod transport;

pub use connection::{accept, ClientHandle, ClientLimits, ClientState};
pub use hub::{ClientId, Hub, HubClosed, HubSnapshot, HubStats};
pub use server::{create_app, run, HubState};
