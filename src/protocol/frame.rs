//! # Wire Frame Definitions
//!
//! Wire identifiers, the acknowledgment record and checksum framing for the ADCS bus.
//!
//! ## Frame Structure
//!
//! ```text
//! [payload (N bytes)] [CRC8 (optional, 1 byte)]
//! ```
//!
//! The register address carries the wire identifier: bit 7 clear for telecommands, set for
//! telemetry requests.

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use super::crc::Crc8;
use crate::error::{AdcsError, Result};

/// Seven-bit bus address of the ADCS
pub const ADCS_I2C_ADDRESS: u8 = 0x57;

/// Magic byte guarding destructive commands (reset, SD format)
pub const ADCS_MAGIC_NUMBER: u8 = 0x5A;

/// Bit 7 of a wire identifier marks a telemetry request
pub const TELEMETRY_ID_BIT: u8 = 0x80;

/// Acknowledgment payload length
pub const ACK_PAYLOAD_LEN: usize = 4;

/// Transfer direction of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    /// Host writes a telecommand
    Command,
    /// Host reads a telemetry frame
    Telemetry,
}

/// 8-bit register identifier of one command or telemetry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct WireId(u8);

impl WireId {
    #[must_use]
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Direction encoded in bit 7
    #[must_use]
    pub const fn direction(self) -> Direction {
        if self.0 & TELEMETRY_ID_BIT != 0 {
            Direction::Telemetry
        } else {
            Direction::Command
        }
    }

    /// Identifier without the direction bit
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0 & !TELEMETRY_ID_BIT
    }
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

/// Telecommand error flag reported in the acknowledgment frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum ErrorFlag {
    None = 0,
    InvalidId = 1,
    WrongLength = 2,
    InvalidParams = 3,
    Crc = 4,
}

impl ErrorFlag {
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::None),
            1 => Some(Self::InvalidId),
            2 => Some(Self::WrongLength),
            3 => Some(Self::InvalidParams),
            4 => Some(Self::Crc),
            _ => None,
        }
    }

    /// Flags that end the command transaction without a resend
    #[must_use]
    pub const fn is_rejection(self) -> bool {
        !matches!(self, Self::None | Self::Crc)
    }
}

impl fmt::Display for ErrorFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::None => "no error",
            Self::InvalidId => "invalid telecommand id",
            Self::WrongLength => "wrong parameter length",
            Self::InvalidParams => "invalid parameter value",
            Self::Crc => "checksum failure",
        };
        f.write_str(text)
    }
}

/// Telecommand acknowledgment record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ack {
    /// Wire id of the last telecommand the device received
    pub last_id: u8,
    /// True once the device finished processing it
    pub processed: bool,
    pub error_flag: ErrorFlag,
    /// Index of the offending parameter byte
    pub error_index: u8,
}

impl Ack {
    /// Decode the 4-byte acknowledgment payload
    ///
    /// # Errors
    ///
    /// Returns `AdcsError::Codec` if the payload is not 4 bytes or the error flag is unknown
    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() != ACK_PAYLOAD_LEN {
            return Err(AdcsError::Codec(format!(
                "acknowledgment needs {} bytes, got {}",
                ACK_PAYLOAD_LEN,
                payload.len()
            )));
        }

        let error_flag = ErrorFlag::from_raw(payload[2]).ok_or_else(|| {
            AdcsError::Codec(format!("unknown acknowledgment error flag {}", payload[2]))
        })?;

        Ok(Self {
            last_id: payload[0],
            processed: payload[1] & 0x01 != 0,
            error_flag,
            error_index: payload[3],
        })
    }

    #[must_use]
    pub fn encode(&self) -> [u8; ACK_PAYLOAD_LEN] {
        [
            self.last_id,
            u8::from(self.processed),
            self.error_flag as u8,
            self.error_index,
        ]
    }
}

/// Frame-level failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame length mismatch: expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("CRC mismatch: computed 0x{computed:02X}, received 0x{received:02X}")]
    ChecksumMismatch { computed: u8, received: u8 },
}

/// Number of bytes on the wire for a payload
#[must_use]
pub const fn frame_len(payload_len: usize, include_checksum: bool) -> usize {
    payload_len + include_checksum as usize
}

/// Build a wire frame, appending the CRC8 of the payload when requested
///
/// # Examples
///
/// ```no_run
/// use adcs_driver::protocol::crc::CRC8;
/// use adcs_driver::protocol::frame::encode_frame;
///
/// let frame = encode_frame(&[0x01], true, &CRC8);
/// assert_eq!(frame.len(), 2);
/// ```
#[must_use]
pub fn encode_frame(payload: &[u8], include_checksum: bool, crc: &Crc8) -> Bytes {
    let mut frame = BytesMut::with_capacity(frame_len(payload.len(), include_checksum));
    frame.put_slice(payload);

    if include_checksum {
        frame.put_u8(crc.checksum(payload));
    }

    frame.freeze()
}

/// Strip and verify the trailing checksum of a received frame
///
/// # Errors
///
/// Returns `FrameError::Length` if the frame size disagrees with the expected payload length and
/// `FrameError::ChecksumMismatch` if the CRC does not match.
pub fn decode_frame<'a>(
    frame: &'a [u8],
    payload_len: usize,
    include_checksum: bool,
    crc: &Crc8,
) -> std::result::Result<&'a [u8], FrameError> {
    let expected = frame_len(payload_len, include_checksum);
    if frame.len() != expected {
        return Err(FrameError::Length { expected, actual: frame.len() });
    }

    let payload = &frame[..payload_len];

    if include_checksum {
        let received = frame[payload_len];
        let computed = crc.checksum(payload);
        if computed != received {
            return Err(FrameError::ChecksumMismatch { computed, received });
        }
    }

    Ok(payload)
}
