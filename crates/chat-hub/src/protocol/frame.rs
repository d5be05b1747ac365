//! Transport-neutral frames

use bytes::Bytes;

/// One frame read from or written to a peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 data
    Text(Bytes),
    /// Arbitrary data
    Binary(Bytes),
    /// Liveness probe
    Ping(Bytes),
    /// Answer to a probe
    Pong(Bytes),
    /// Close handshake, with the status code if the peer sent one
    Close(Option<u16>),
}

impl Frame {
    /// Wrap an outbound payload as text when it is valid UTF-8, binary otherwise
    #[must_use]
    pub fn message(payload: Bytes) -> Self {
        if std::str::from_utf8(&payload).is_ok() {
            Self::Text(payload)
        } else {
            Self::Binary(payload)
        }
    }

    /// Create a text frame from a string
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(Bytes::from(text.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_picks_frame_kind() {
        assert_eq!(
            Frame::message(Bytes::from_static(b"hello")),
            Frame::Text(Bytes::from_static(b"hello"))
        );
        assert_eq!(
            Frame::message(Bytes::from_static(&[0xff, 0xfe])),
            Frame::Binary(Bytes::from_static(&[0xff, 0xfe]))
        );
    }
}
