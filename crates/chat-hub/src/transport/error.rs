//! Transport error types

use crate::protocol::CloseCode;
use thiserror::Error;

/// Failures that end a single connection
#[derive(Debug, Error)]
pub enum TransportError {
    /// Peer closed the connection, or it dropped
    #[error("Connection closed by peer (code {code})")]
    Closed { code: u16 },

    /// Inbound frame larger than the configured limit
    #[error("Frame of {size} bytes exceeds the {limit} byte limit")]
    FrameTooLarge { size: usize, limit: usize },

    /// Nothing arrived from the peer before the read deadline
    #[error("Read deadline exceeded")]
    ReadTimeout,

    /// A write did not finish before the write deadline
    #[error("Write deadline exceeded")]
    WriteTimeout,

    /// Write attempted after the sink was closed
    #[error("Sink already closed")]
    SinkClosed,

    /// Underlying I/O or protocol failure
    #[error("Transport error: {0}")]
    Io(String),
}

impl TransportError {
    /// Close with a known code
    #[must_use]
    pub fn closed(code: CloseCode) -> Self {
        Self::Closed { code: code.as_u16() }
    }

    /// Routine closures are logged quietly; everything else is a warning.
    #[must_use]
    pub fn is_expected_closure(&self) -> bool {
        match self {
            Self::Closed { code } => CloseCode::from_u16(*code).is_some_and(CloseCode::is_routine),
            _ => false,
        }
    }
}
