//! Transport boundary
//!
//! A connection is split into a [`FrameSource`] and a [`FrameSink`] so that
//! exactly one task reads and exactly one task writes. Deadlines are applied
//! by the callers, not by the transports.

mod error;
pub mod memory;
pub mod websocket;

pub use error::TransportError;
pub use memory::{MemoryPeer, MemoryTransport};
pub use websocket::WebSocketTransport;

use crate::protocol::Frame;
use async_trait::async_trait;

/// Read half of a connection
#[async_trait]
pub trait FrameSource: Send + 'static {
    /// Wait for the next frame. `None` means the stream ended without a close frame.
    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>>;
}

/// Write half of a connection
#[async_trait]
pub trait FrameSink: Send + 'static {
    /// Write one frame
    async fn send_frame(&mut self, frame: Frame) -> Result<(), TransportError>;

    /// Release the connection. Closing an already closed sink is a no-op.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// An established bidirectional connection
pub trait Transport: Send + 'static {
    type Source: FrameSource;
    type Sink: FrameSink;

    /// Hand out the two halves
    fn split(self) -> (Self::Source, Self::Sink);
}
