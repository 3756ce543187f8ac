//! Domain-specific error types for the lumberjack client.
//!
//! All fallible operations return `Result<T, LumberError>`.
//! No panics on invalid input — every error is typed and recoverable.

use std::time::Duration;
use thiserror::Error;

/// The canonical error type for the lumberjack v2 client.
#[derive(Debug, Error)]
pub enum LumberError {
    // ── Protocol Errors ──────────────────────────────────────────
    /// An ACK frame arrived with wrong marker bytes. The stream is
    /// desynchronized and the connection must not be reused.
    #[error("invalid ack header: version {version:#04x}, code {code:#04x}")]
    InvalidAckHeader { version: u8, code: u8 },

    /// The server acknowledged more events than the window declared.
    #[error("ack overran window: acked {acked}, expected {expected}")]
    AckOverrun { acked: u32, expected: u32 },

    /// The ACK loop failed before the window was fully confirmed.
    /// Carries how many events the server had acknowledged so far.
    #[error("ack stream failed after {acked} acked event(s)")]
    AckInterrupted {
        acked: u32,
        #[source]
        source: Box<LumberError>,
    },

    // ── Configuration Errors ─────────────────────────────────────
    /// Compression level outside the zlib range 0..=9.
    #[error("compression level must be within 0 and 9, got {0}")]
    InvalidCompressionLevel(u32),

    // ── Connection Errors ────────────────────────────────────────
    /// The TCP/IO layer reported an error.
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// An operation exceeded its deadline.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    // ── Serialization Errors ─────────────────────────────────────
    /// The event encoder failed; the batch was never transmitted.
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl LumberError {
    /// How many events were confirmed before this error, if it came
    /// out of the ACK loop.
    pub fn acked(&self) -> Option<u32> {
        match self {
            LumberError::AckInterrupted { acked, .. } => Some(*acked),
            LumberError::AckOverrun { expected, .. } => Some(*expected),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LumberError {
    fn from(e: serde_json::Error) -> Self {
        LumberError::Encoding(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = LumberError::InvalidAckHeader {
            version: 0x32,
            code: 0x58,
        };
        assert!(e.to_string().contains("0x32"));

        let e = LumberError::AckOverrun {
            acked: 11,
            expected: 10,
        };
        assert!(e.to_string().contains("11"));
        assert!(e.to_string().contains("10"));
    }

    #[test]
    fn from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broke");
        let e: LumberError = io_err.into();
        assert!(matches!(e, LumberError::Connection(_)));
    }

    #[test]
    fn interrupted_reports_progress() {
        let e = LumberError::AckInterrupted {
            acked: 7,
            source: Box::new(LumberError::Timeout(Duration::from_secs(1))),
        };
        assert_eq!(e.acked(), Some(7));
        assert!(std::error::Error::source(&e).is_some());
    }
}
