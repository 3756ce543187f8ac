//! Client configuration.
//!
//! Validation happens once, when a client is constructed — an invalid
//! value can never surface mid-send.

use std::time::Duration;

use crate::error::LumberError;

/// Highest zlib compression level.
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Configuration for [`Client`](crate::Client).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Read/write deadline applied per network operation. Zero
    /// disables deadlines entirely. Also bounds `dial`.
    pub timeout: Duration,
    /// zlib compression level, 0 (off, the default) through 9.
    pub compression: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            compression: 0,
        }
    }
}

impl ClientConfig {
    /// Check the configuration before any network activity.
    pub fn validate(&self) -> Result<(), LumberError> {
        if self.compression > MAX_COMPRESSION_LEVEL {
            return Err(LumberError::InvalidCompressionLevel(self.compression));
        }
        Ok(())
    }
}
