//! axum WebSocket transport

use super::{FrameSink, FrameSource, Transport, TransportError};
use crate::protocol::Frame;
use async_trait::async_trait;
use axum::extract::ws::{CloseFrame, Message, WebSocket};
use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::borrow::Cow;

/// An upgraded WebSocket connection
pub struct WebSocketTransport {
    socket: WebSocket,
}

impl WebSocketTransport {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

impl Transport for WebSocketTransport {
    type Source = WebSocketSource;
    type Sink = WebSocketSink;

    fn split(self) -> (Self::Source, Self::Sink) {
        let (sink, stream) = self.socket.split();
        (
            WebSocketSource { stream },
            WebSocketSink {
                sink,
                closed: false,
            },
        )
    }
}

/// Read half of a WebSocket
pub struct WebSocketSource {
    stream: SplitStream<WebSocket>,
}

#[async_trait]
impl FrameSource for WebSocketSource {
    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>> {
        let message = self.stream.next().await?;
        Some(
            message
                .map(frame_from_message)
                .map_err(|e| TransportError::Io(e.to_string())),
        )
    }
}

/// Write half of a WebSocket
pub struct WebSocketSink {
    sink: SplitSink<WebSocket, Message>,
    closed: bool,
}

#[async_trait]
impl FrameSink for WebSocketSink {
    async fn send_frame(&mut self, frame: Frame) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::SinkClosed);
        }

        let message = message_from_frame(frame)?;
        self.sink
            .send(message)
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        self.sink
            .close()
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }
}

fn frame_from_message(message: Message) -> Frame {
    match message {
        Message::Text(text) => Frame::Text(Bytes::from(text)),
        Message::Binary(data) => Frame::Binary(Bytes::from(data)),
        Message::Ping(data) => Frame::Ping(Bytes::from(data)),
        Message::Pong(data) => Frame::Pong(Bytes::from(data)),
        Message::Close(close) => Frame::Close(close.map(|c| c.code)),
    }
}

fn message_from_frame(frame: Frame) -> Result<Message, TransportError> {
    let message = match frame {
        Frame::Text(payload) => {
            let text = String::from_utf8(payload.to_vec())
                .map_err(|_| TransportError::Io("text frame is not valid UTF-8".to_string()))?;
            Message::Text(text)
        }
        Frame::Binary(payload) => Message::Binary(payload.to_vec()),
        Frame::Ping(payload) => Message::Ping(payload.to_vec()),
        Frame::Pong(payload) => Message::Pong(payload.to_vec()),
        Frame::Close(code) => Message::Close(code.map(|code| CloseFrame {
            code,
            reason: Cow::Borrowed(""),
        })),
    };
    Ok(message)
}
