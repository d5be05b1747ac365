//! Wire vocabulary
//!
//! Frame kinds exchanged with a peer and the close codes that end a session.

mod close_codes;
mod frame;

pub use close_codes::CloseCode;
pub use frame::Frame;
