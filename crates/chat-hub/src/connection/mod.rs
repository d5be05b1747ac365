//! Connection adapter
//!
//! Each accepted connection gets two tasks: an inbound pump (the only reader)
//! that forwards frames to the hub, and an outbound pump (the only writer)
//! that drains the client's queue and keeps the peer alive with pings.

mod client;
mod inbound;
mod outbound;
mod state;

pub use client::{accept, ClientHandle, ClientLimits};
pub use inbound::normalize;
pub use state::ClientState;
