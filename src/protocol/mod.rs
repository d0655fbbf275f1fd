//! # Protocol Module
//!
//! Wire-level building blocks shared by every ADCS exchange.
//!
//! This module handles:
//! - Little-endian split/merge of multi-byte integers
//! - The CRC8 engine (polynomial 0x91)
//! - Wire identifiers, checksum framing and the acknowledgment record

pub mod bytes;
pub mod crc;
pub mod frame;
