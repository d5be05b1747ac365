//! In-process transport
//!
//! A pair of bounded channels standing in for a network connection. The
//! [`MemoryPeer`] plays the remote client: whatever it sends is read by the
//! hub side, and whatever the hub side writes can be received from it.

use super::{FrameSink, FrameSource, Transport, TransportError};
use crate::protocol::Frame;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Hub side of an in-process connection
#[derive(Debug)]
pub struct MemoryTransport {
    inbound: mpsc::Receiver<Frame>,
    outbound: mpsc::Sender<Frame>,
}

/// Remote side of an in-process connection
#[derive(Debug)]
pub struct MemoryPeer {
    to_hub: mpsc::Sender<Frame>,
    from_hub: mpsc::Receiver<Frame>,
}

impl MemoryTransport {
    /// Create a connected transport/peer pair.
    ///
    /// `capacity` bounds each direction; a peer that stops receiving
    /// eventually blocks the writer once that many frames are in flight.
    pub fn pair(capacity: usize) -> (Self, MemoryPeer) {
        let (to_hub, inbound) = mpsc::channel(capacity);
        let (outbound, from_hub) = mpsc::channel(capacity);

        (Self { inbound, outbound }, MemoryPeer { to_hub, from_hub })
    }
}

impl Transport for MemoryTransport {
    type Source = MemorySource;
    type Sink = MemorySink;

    fn split(self) -> (Self::Source, Self::Sink) {
        (
            MemorySource {
                inbound: self.inbound,
            },
            MemorySink {
                outbound: Some(self.outbound),
            },
        )
    }
}

/// Read half of a [`MemoryTransport`]
#[derive(Debug)]
pub struct MemorySource {
    inbound: mpsc::Receiver<Frame>,
}

#[async_trait]
impl FrameSource for MemorySource {
    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>> {
        self.inbound.recv().await.map(Ok)
    }
}

/// Write half of a [`MemoryTransport`]
#[derive(Debug)]
pub struct MemorySink {
    outbound: Option<mpsc::Sender<Frame>>,
}

#[async_trait]
impl FrameSink for MemorySink {
    async fn send_frame(&mut self, frame: Frame) -> Result<(), TransportError> {
        let outbound = self.outbound.as_ref().ok_or(TransportError::SinkClosed)?;
        outbound
            .send(frame)
            .await
            .map_err(|_| TransportError::Io("peer dropped".to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.outbound.take();
        Ok(())
    }
}

impl MemoryPeer {
    /// Send a frame to the hub side
    pub async fn send(&self, frame: Frame) -> Result<(), TransportError> {
        self.to_hub
            .send(frame)
            .await
            .map_err(|_| TransportError::Io("hub side dropped".to_string()))
    }

    /// Send a text frame to the hub side
    pub async fn send_text(&self, text: &str) -> Result<(), TransportError> {
        self.send(Frame::text(text)).await
    }

    /// Receive the next frame written by the hub side.
    ///
    /// Returns `None` once the sink is closed and every frame was received.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.from_hub.recv().await
    }

    /// Receive a frame if one is already waiting
    pub fn try_recv(&mut self) -> Option<Frame> {
        self.from_hub.try_recv().ok()
    }
}
