//! Inbound pump: the only reader of a connection

use super::client::ClientLimits;
use super::state::{ClientState, Lifecycle};
use crate::hub::{ClientId, Hub};
use crate::protocol::{CloseCode, Frame};
use crate::transport::{FrameSource, TransportError};
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{timeout_at, Instant};

/// Flatten a chat line: every `\n` becomes a space, then surrounding
/// whitespace is trimmed. Valid UTF-8 is trimmed of Unicode whitespace;
/// anything else only of ASCII whitespace.
pub fn normalize(payload: &[u8]) -> Bytes {
    let flattened: Vec<u8> = payload
        .iter()
        .map(|&byte| if byte == b'\n' { b' ' } else { byte })
        .collect();

    match std::str::from_utf8(&flattened) {
        Ok(text) => Bytes::copy_from_slice(text.trim().as_bytes()),
        Err(_) => Bytes::copy_from_slice(trim_ascii_space(&flattened)),
    }
}

/// Like `<[u8]>::trim_ascii`, but vertical tab counts as whitespace too.
fn trim_ascii_space(bytes: &[u8]) -> &[u8] {
    let is_space = |byte: &u8| byte.is_ascii_whitespace() || *byte == 0x0b;
    let start = bytes.iter().position(|b| !is_space(b)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !is_space(b)).map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// Why the read loop stopped without a transport error
#[derive(Debug)]
enum Stop {
    /// The outbound pump already exited
    Closing,
    /// The hub is gone
    HubStopped,
}

pub(super) async fn run<S: FrameSource>(
    id: ClientId,
    mut source: S,
    hub: Hub,
    lifecycle: Arc<Lifecycle>,
    limits: ClientLimits,
) {
    let mut state = lifecycle.subscribe();

    match read_loop(&mut source, &hub, &mut state, limits).await {
        Ok(stop) => tracing::debug!(client_id = %id, reason = ?stop, "Inbound pump stopped"),
        Err(e) if e.is_expected_closure() => {
            tracing::debug!(client_id = %id, error = %e, "Client disconnected");
        }
        Err(e) => tracing::warn!(client_id = %id, error = %e, "Client read failed"),
    }

    hub.unregister(id);
    drop(source);

    if lifecycle.pump_exited() == ClientState::Closed {
        tracing::info!(client_id = %id, "Client closed");
    }
}

async fn read_loop<S: FrameSource>(
    source: &mut S,
    hub: &Hub,
    state: &mut watch::Receiver<ClientState>,
    limits: ClientLimits,
) -> Result<Stop, TransportError> {
    let mut deadline = Instant::now() + limits.pong_wait;

    loop {
        let next = tokio::select! {
            _ = state.wait_for(|s| *s >= ClientState::Closing) => return Ok(Stop::Closing),
            next = timeout_at(deadline, source.next_frame()) => next,
        };

        let frame = match next {
            Err(_elapsed) => return Err(TransportError::ReadTimeout),
            Ok(None) => return Err(TransportError::closed(CloseCode::Abnormal)),
            Ok(Some(frame)) => frame?,
        };

        match frame {
            Frame::Text(payload) | Frame::Binary(payload) => {
                if payload.len() > limits.max_message_size {
                    return Err(TransportError::FrameTooLarge {
                        size: payload.len(),
                        limit: limits.max_message_size,
                    });
                }
                if hub.broadcast(normalize(&payload)).await.is_err() {
                    return Ok(Stop::HubStopped);
                }
            }
            Frame::Pong(_) => deadline = Instant::now() + limits.pong_wait,
            // The transport answers pings on its own.
            Frame::Ping(_) => {}
            Frame::Close(code) => {
                return Err(TransportError::Closed {
                    code: code.unwrap_or(CloseCode::NoStatus.as_u16()),
                })
            }
        }
    }
}
