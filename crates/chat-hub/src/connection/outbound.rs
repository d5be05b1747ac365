//! Outbound pump: the only writer of a connection

use super::client::ClientLimits;
use super::state::{ClientState, Lifecycle};
use crate::hub::ClientId;
use crate::protocol::Frame;
use crate::transport::{FrameSink, TransportError};
use bytes::{BufMut, Bytes, BytesMut};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};

/// Separator between payloads merged into one frame
const PAYLOAD_SEPARATOR: u8 = b'\n';

pub(super) async fn run<K: FrameSink>(
    id: ClientId,
    mut sink: K,
    mut queue: mpsc::Receiver<Bytes>,
    lifecycle: Arc<Lifecycle>,
    limits: ClientLimits,
) {
    match write_loop(&mut sink, &mut queue, limits).await {
        Ok(()) => tracing::debug!(client_id = %id, "Outbound queue closed by hub"),
        Err(e) => tracing::debug!(client_id = %id, error = %e, "Client write failed"),
    }

    // A stalled peer can block the close handshake as well.
    match timeout(limits.write_wait, sink.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::trace!(client_id = %id, error = %e, "Error while closing transport"),
        Err(_) => tracing::trace!(client_id = %id, "Transport close timed out"),
    }
    drop(sink);
    drop(queue);

    if lifecycle.pump_exited() == ClientState::Closed {
        tracing::info!(client_id = %id, "Client closed");
    }
}

/// Returns `Ok` only when the hub closed the queue.
async fn write_loop<K: FrameSink>(
    sink: &mut K,
    queue: &mut mpsc::Receiver<Bytes>,
    limits: ClientLimits,
) -> Result<(), TransportError> {
    let mut ticker = interval_at(Instant::now() + limits.ping_period, limits.ping_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            next = queue.recv() => {
                let Some(first) = next else {
                    // Best effort: the peer may already be gone.
                    let _ = write_within(sink, Frame::Close(None), limits.write_wait).await;
                    return Ok(());
                };
                let payload = coalesce(first, queue, limits.send_buffer);
                write_within(sink, Frame::message(payload), limits.write_wait).await?;
            }
            _ = ticker.tick() => {
                write_within(sink, Frame::Ping(Bytes::new()), limits.write_wait).await?;
            }
        }
    }
}

async fn write_within<K: FrameSink>(
    sink: &mut K,
    frame: Frame,
    wait: Duration,
) -> Result<(), TransportError> {
    timeout(wait, sink.send_frame(frame))
        .await
        .map_err(|_| TransportError::WriteTimeout)?
}

/// Merge payloads that are already waiting behind `first` into one buffer,
/// separated by newlines and in queue order. Takes at most `limit` extra
/// payloads so a busy hub cannot grow a frame without bound.
fn coalesce(first: Bytes, queue: &mut mpsc::Receiver<Bytes>, limit: usize) -> Bytes {
    let mut pending = Vec::new();
    while pending.len() < limit {
        match queue.try_recv() {
            Ok(payload) => pending.push(payload),
            Err(_) => break,
        }
    }

    if pending.is_empty() {
        return first;
    }

    let size = first.len() + pending.iter().map(|p| p.len() + 1).sum::<usize>();
    let mut buf = BytesMut::with_capacity(size);
    buf.put_slice(&first);
    for payload in pending {
        buf.put_u8(PAYLOAD_SEPARATOR);
        buf.put_slice(&payload);
    }
    buf.freeze()
}
