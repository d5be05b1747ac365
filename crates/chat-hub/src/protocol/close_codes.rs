//! WebSocket close codes
//!
//! The subset of RFC 6455 close codes the hub sends or has to classify.

use serde::Serialize;

/// Standard WebSocket close codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u16)]
pub enum CloseCode {
    /// Purpose of the connection fulfilled
    Normal = 1000,
    /// Endpoint is going away (page navigation, server shutdown)
    GoingAway = 1001,
    /// Protocol violation
    ProtocolError = 1002,
    /// Data type the endpoint cannot accept
    Unsupported = 1003,
    /// Close frame carried no status code
    NoStatus = 1005,
    /// Connection dropped without a close frame
    Abnormal = 1006,
    /// Payload inconsistent with the message type
    InvalidPayload = 1007,
    /// Generic policy violation
    PolicyViolation = 1008,
    /// Message too big to process
    MessageTooBig = 1009,
    /// Server hit an unexpected condition
    InternalError = 1011,
}

impl CloseCode {
    /// Create a `CloseCode` from a raw u16 value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1000 => Some(Self::Normal),
            1001 => Some(Self::GoingAway),
            1002 => Some(Self::ProtocolError),
            1003 => Some(Self::Unsupported),
            1005 => Some(Self::NoStatus),
            1006 => Some(Self::Abnormal),
            1007 => Some(Self::InvalidPayload),
            1008 => Some(Self::PolicyViolation),
            1009 => Some(Self::MessageTooBig),
            1011 => Some(Self::InternalError),
            _ => None,
        }
    }

    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Closures that happen in ordinary operation: peers leaving, tabs
    /// closing, networks dropping. Anything else deserves a warning.
    #[must_use]
    pub const fn is_routine(self) -> bool {
        matches!(
            self,
            Self::Normal | Self::GoingAway | Self::NoStatus | Self::Abnormal
        )
    }

    /// Get the description for this close code
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Normal => "Normal closure",
            Self::GoingAway => "Going away",
            Self::ProtocolError => "Protocol error",
            Self::Unsupported => "Unsupported data",
            Self::NoStatus => "No status received",
            Self::Abnormal => "Abnormal closure",
            Self::InvalidPayload => "Invalid frame payload data",
            Self::PolicyViolation => "Policy violation",
            Self::MessageTooBig => "Message too big",
            Self::InternalError => "Internal server error",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_u16())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}
