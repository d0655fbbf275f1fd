//! # Error Types
//!
//! Custom error types for the ADCS driver using `thiserror`.
//!
//! The four transaction failure kinds (transport, checksum, protocol, processing timeout) are kept
//! as separate variants because the caller's remedy differs for each of them.

use thiserror::Error;

use crate::protocol::frame::ErrorFlag;
use crate::transport::TransportError;

/// Main error type for the ADCS driver
#[derive(Debug, Error)]
pub enum AdcsError {
    /// The bus itself failed (no device, bus busy, NACK, timeout)
    #[error("Bus transport error: {0}")]
    Transport(#[from] TransportError),

    /// CRC mismatch persisted through the whole retry budget
    #[error("Checksum failure on id 0x{id:02X} after {attempts} attempts")]
    Checksum { id: u8, attempts: u32 },

    /// The device rejected the command
    #[error("ADCS rejected command 0x{id:02X}: {flag} (error index {index})")]
    Protocol { id: u8, flag: ErrorFlag, index: u8 },

    /// The device never reported the command as processed
    #[error("Command 0x{id:02X} not processed after {polls} acknowledgment polls; wait before sending another command")]
    ProcessingTimeout { id: u8, polls: u32 },

    /// Payload did not match the record layout
    #[error("Codec error: {0}")]
    Codec(String),

    /// Caller supplied an argument the wire format cannot carry
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The SD card file list ended before the requested file
    #[error("File not found on ADCS SD card: {0}")]
    FileNotFound(String),

    /// A walk of the SD card file list ran past its overall limit
    #[error("File list walk exceeded {timeout_ms} ms")]
    FileWalkTimeout { timeout_ms: u64 },

    /// The device rejected the offset or length of a staged download block
    #[error("ADCS rejected download block {block}: parameter error")]
    BlockRejected { block: u32 },

    /// A staged download block never became ready
    #[error("Download block {block} not ready after {polls} polls")]
    BlockNotReady { block: u32, polls: u32 },

    /// Packets were still missing after every hole-map retry
    #[error("Download block {block} still missing {missing} packets after hole-map retries")]
    DownloadIncomplete { block: u32, missing: usize },

    /// The task running a transaction panicked or was cancelled
    #[error("Transaction task failed: {0}")]
    Task(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Telemetry log serialisation errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AdcsError {
    /// True for failures that leave the device's command buffer in an unknown state
    #[must_use]
    pub fn is_processing_timeout(&self) -> bool {
        matches!(self, AdcsError::ProcessingTimeout { .. })
    }
}

/// Result type alias for the ADCS driver
pub type Result<T> = std::result::Result<T, AdcsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_render_distinctly() {
        let transport = AdcsError::from(TransportError::Nack { device: 0x57 });
        let checksum = AdcsError::Checksum { id: 0x93, attempts: 3 };
        let protocol = AdcsError::Protocol { id: 0x0A, flag: ErrorFlag::InvalidParams, index: 1 };
        let timeout = AdcsError::ProcessingTimeout { id: 0x0A, polls: 1000 };

        let messages: Vec<String> = [transport, checksum, protocol, timeout]
            .iter()
            .map(|e| e.to_string())
            .collect();

        assert!(messages[0].contains("transport"));
        assert!(messages[1].contains("0x93"));
        assert!(messages[1].contains("3 attempts"));
        assert!(messages[2].contains("invalid parameter"));
        assert!(messages[3].contains("1000"));
    }

    #[test]
    fn test_is_processing_timeout() {
        assert!(AdcsError::ProcessingTimeout { id: 1, polls: 2 }.is_processing_timeout());
        assert!(!AdcsError::Checksum { id: 1, attempts: 2 }.is_processing_timeout());
    }

    #[test]
    fn test_download_errors_name_the_block() {
        let incomplete = AdcsError::DownloadIncomplete { block: 2, missing: 7 };
        assert!(incomplete.to_string().contains("block 2"));
        assert!(incomplete.to_string().contains("7 packets"));

        let walk = AdcsError::FileWalkTimeout { timeout_ms: 60000 };
        assert!(walk.to_string().contains("60000 ms"));
    }
}
