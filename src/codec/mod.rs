//! # Payload Codec
//!
//! Fixed-layout records for every ADCS command and telemetry kind.
//!
//! Integer fields are carried in engineering units (milli-degrees, nano-tesla, micro-amps and
//! so on) as the raw wire integer multiplied by the field's scale factor, so no precision is lost
//! to floating point. Floats on the wire stay floats.
//!
//! This module handles:
//! - Length checks (`Decode` consumes exactly the declared payload length)
//! - Sign extension before scaling
//! - Bit-packed flags and enumerations through explicit field tables
//! - Range checks when scaling engineering values back down for encoding

use bytes::Bytes;

use crate::error::{AdcsError, Result};

/// Defines a wire enumeration with a checked `from_raw` conversion
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
        #[repr(u8)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value),+
        }

        impl $name {
            /// Convert a raw wire value, `None` if out of range
            #[must_use]
            pub const fn from_raw(raw: u8) -> Option<Self> {
                match raw {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            #[must_use]
            pub const fn raw(self) -> u8 {
                self as u8
            }

            /// Convert a raw wire value, rejecting out-of-range values with a codec error
            pub fn decode_raw(raw: u8) -> $crate::error::Result<Self> {
                Self::from_raw(raw).ok_or_else(|| {
                    $crate::error::AdcsError::Codec(format!(
                        "invalid {} value {}",
                        stringify!($name),
                        raw
                    ))
                })
            }
        }
    };
}

/// Defines a 6-byte record of three little-endian `i16` fields scaled into `i32`
macro_rules! vector_record {
    (
        $(#[$meta:meta])*
        $name:ident { $x:ident, $y:ident, $z:ident } x $scale:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
        pub struct $name {
            pub $x: i32,
            pub $y: i32,
            pub $z: i32,
        }

        impl $crate::codec::Decode for $name {
            fn decode(payload: &[u8]) -> $crate::error::Result<Self> {
                $crate::codec::expect_len(payload, 6, stringify!($name))?;
                Ok(Self {
                    $x: i32::from($crate::protocol::bytes::i16_at(payload, 0)) * $scale,
                    $y: i32::from($crate::protocol::bytes::i16_at(payload, 2)) * $scale,
                    $z: i32::from($crate::protocol::bytes::i16_at(payload, 4)) * $scale,
                })
            }
        }
    };
}

pub mod bits;
pub mod commands;
pub mod enums;
pub mod files;
pub mod params;
pub mod sensors;
pub mod status;
pub mod vectors;

/// Build a typed record from a telemetry payload
pub trait Decode: Sized {
    /// # Errors
    ///
    /// Returns `AdcsError::Codec` if the payload length differs from the record's declared length
    /// or an enumerated field holds an out-of-range value.
    fn decode(payload: &[u8]) -> Result<Self>;
}

/// Serialise a command argument record into its wire payload
pub trait Encode {
    /// # Errors
    ///
    /// Returns `AdcsError::InvalidArgument` if a value does not fit its wire field.
    fn encode(&self) -> Result<Bytes>;
}

/// Reject a payload whose length differs from the record's layout
pub(crate) fn expect_len(payload: &[u8], expected: usize, record: &str) -> Result<()> {
    if payload.len() != expected {
        return Err(AdcsError::Codec(format!(
            "{} needs {} bytes, got {}",
            record,
            expected,
            payload.len()
        )));
    }
    Ok(())
}

/// Scale an engineering value down by `factor` and narrow it to `i16`
///
/// Division truncates toward zero, matching how the device firmware converts.
pub(crate) fn narrow_i16(value: i32, factor: i32, field: &str) -> Result<i16> {
    i16::try_from(value / factor).map_err(|_| {
        AdcsError::InvalidArgument(format!("{} = {} does not fit the wire field", field, value))
    })
}

/// Scale an engineering value down by `factor` and narrow it to `u8`
pub(crate) fn narrow_u8(value: u32, factor: u32, field: &str) -> Result<u8> {
    u8::try_from(value / factor).map_err(|_| {
        AdcsError::InvalidArgument(format!("{} = {} does not fit the wire field", field, value))
    })
}

/// Scale an engineering value down by `factor` and narrow it to `i32`
pub(crate) fn narrow_i32(value: i64, factor: i64, field: &str) -> Result<i32> {
    i32::try_from(value / factor).map_err(|_| {
        AdcsError::InvalidArgument(format!("{} = {} does not fit the wire field", field, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_len() {
        assert!(expect_len(&[0; 6], 6, "record").is_ok());
        let err = expect_len(&[0; 5], 6, "record").unwrap_err();
        assert!(err.to_string().contains("needs 6 bytes, got 5"));
    }

    #[test]
    fn test_narrow_truncates_toward_zero() {
        assert_eq!(narrow_i16(-219_995, 10, "x").unwrap(), -21_999);
        assert_eq!(narrow_i16(87_389, 10, "x").unwrap(), 8_738);
        assert_eq!(narrow_u8(7_799, 100, "x").unwrap(), 77);
    }

    #[test]
    fn test_narrow_rejects_overflow() {
        assert!(matches!(narrow_i16(400_000, 10, "x"), Err(AdcsError::InvalidArgument(_))));
        assert!(matches!(narrow_u8(25_600, 100, "x"), Err(AdcsError::InvalidArgument(_))));
        assert!(matches!(
            narrow_i32(300_000_000_000, 100, "x"),
            Err(AdcsError::InvalidArgument(_))
        ));
    }
}
