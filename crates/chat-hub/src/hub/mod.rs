//! Broadcast hub
//!
//! A single coordination task owns the set of connected clients. Every
//! membership change and every broadcast goes through its request queues,
//! so the member set needs no locking.

mod hub;
mod member;

pub use hub::{Hub, HubClosed, HubRunner};
pub use member::{ClientId, HubSnapshot, HubStats, Member};
