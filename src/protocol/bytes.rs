//! # Byte Codec Primitives
//!
//! Split and merge multi-byte integers in the ADCS wire order (least-significant byte first),
//! independent of the host's byte order.
//!
//! Signed values are always rebuilt as the unsigned word first and then reinterpreted as two's
//! complement, so scaling applied afterwards keeps the sign.

/// Split a `u16` into `[low, high]`
#[inline]
#[must_use]
pub const fn split_u16(value: u16) -> [u8; 2] {
    [(value & 0xFF) as u8, (value >> 8) as u8]
}

/// Split a `u32` into `[b0, b1, b2, b3]`, `b0` least significant
#[inline]
#[must_use]
pub const fn split_u32(value: u32) -> [u8; 4] {
    [
        (value & 0xFF) as u8,
        ((value >> 8) & 0xFF) as u8,
        ((value >> 16) & 0xFF) as u8,
        (value >> 24) as u8,
    ]
}

/// Split an `i16` through its two's complement bit pattern
#[inline]
#[must_use]
pub const fn split_i16(value: i16) -> [u8; 2] {
    split_u16(value as u16)
}

/// Split an `i32` through its two's complement bit pattern
#[inline]
#[must_use]
pub const fn split_i32(value: i32) -> [u8; 4] {
    split_u32(value as u32)
}

/// Merge `low, high` into a `u16`
#[inline]
#[must_use]
pub const fn merge_u16(low: u8, high: u8) -> u16 {
    (high as u16) << 8 | low as u16
}

/// Merge four bytes (least significant first) into a `u32`
#[inline]
#[must_use]
pub const fn merge_u32(b0: u8, b1: u8, b2: u8, b3: u8) -> u32 {
    (b3 as u32) << 24 | (b2 as u32) << 16 | (b1 as u32) << 8 | b0 as u32
}

/// Merge `low, high` into an `i16`
#[inline]
#[must_use]
pub const fn merge_i16(low: u8, high: u8) -> i16 {
    merge_u16(low, high) as i16
}

/// Merge four bytes (least significant first) into an `i32`
#[inline]
#[must_use]
pub const fn merge_i32(b0: u8, b1: u8, b2: u8, b3: u8) -> i32 {
    merge_u32(b0, b1, b2, b3) as i32
}

/// Read a `u16` starting at `offset`
///
/// # Panics
///
/// Panics if `offset + 2` exceeds the slice; record decoders check the payload length first.
#[inline]
pub fn u16_at(data: &[u8], offset: usize) -> u16 {
    merge_u16(data[offset], data[offset + 1])
}

/// Read an `i16` starting at `offset`
#[inline]
pub fn i16_at(data: &[u8], offset: usize) -> i16 {
    merge_i16(data[offset], data[offset + 1])
}

/// Read a `u32` starting at `offset`
#[inline]
pub fn u32_at(data: &[u8], offset: usize) -> u32 {
    merge_u32(data[offset], data[offset + 1], data[offset + 2], data[offset + 3])
}

/// Read an `i32` starting at `offset`
#[inline]
pub fn i32_at(data: &[u8], offset: usize) -> i32 {
    merge_i32(data[offset], data[offset + 1], data[offset + 2], data[offset + 3])
}

/// Read an IEEE-754 single stored in wire order
#[inline]
pub fn f32_at(data: &[u8], offset: usize) -> f32 {
    f32::from_bits(u32_at(data, offset))
}

/// Read an IEEE-754 double stored in wire order
#[inline]
pub fn f64_at(data: &[u8], offset: usize) -> f64 {
    let low = u32_at(data, offset) as u64;
    let high = u32_at(data, offset + 4) as u64;
    f64::from_bits(high << 32 | low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_u16_low_byte_first() {
        assert_eq!(split_u16(0x1234), [0x34, 0x12]);
        assert_eq!(split_u16(0x00FF), [0xFF, 0x00]);
    }

    #[test]
    fn test_split_u32_low_byte_first() {
        assert_eq!(split_u32(0x1234_5678), [0x78, 0x56, 0x34, 0x12]);
    }

    #[test]
    fn test_merge_split_inverse_u16() {
        for value in (0..=u16::MAX).step_by(7) {
            let [lo, hi] = split_u16(value);
            assert_eq!(merge_u16(lo, hi), value);
        }
        let [lo, hi] = split_u16(u16::MAX);
        assert_eq!(merge_u16(lo, hi), u16::MAX);
    }

    #[test]
    fn test_merge_split_inverse_u32() {
        let samples = [0u32, 1, 0xFF, 0x100, 0xDEAD_BEEF, 0x8000_0000, u32::MAX, 3_164_239_958];
        for value in samples {
            let [b0, b1, b2, b3] = split_u32(value);
            assert_eq!(merge_u32(b0, b1, b2, b3), value);
        }
    }

    #[test]
    fn test_signed_reconstruction() {
        assert_eq!(merge_i16(0x00, 0x80), i16::MIN);
        assert_eq!(merge_i16(0xFF, 0xFF), -1);
        assert_eq!(merge_i32(0x00, 0x3A, 0xC1, 0xFA), -88_000_000);
        assert_eq!(split_i16(-1), [0xFF, 0xFF]);
        assert_eq!(split_i32(-88_000_000), [0x00, 0x3A, 0xC1, 0xFA]);
    }

    #[test]
    fn test_sign_survives_scaling() {
        // int16 -32768 scaled by 10 must stay negative
        let scaled = i32::from(merge_i16(0x00, 0x80)) * 10;
        assert_eq!(scaled, -327_680);
    }

    #[test]
    fn test_float_readers() {
        // 110.4f32 = 0x42DCCCCD
        let data = [0xCD, 0xCC, 0xDC, 0x42];
        assert_eq!(f32_at(&data, 0), 110.4f32);

        let bytes = 1.2f64.to_le_bytes();
        assert_eq!(f64_at(&bytes, 0), 1.2);
    }

    #[test]
    fn test_offset_readers() {
        let data = [0x00, 0x12, 0x34, 0x56, 0x78];
        assert_eq!(u16_at(&data, 1), 0x3412);
        assert_eq!(u32_at(&data, 1), 0x7856_3412);
        assert_eq!(i16_at(&[0x18, 0xFC], 0), -1000);
    }
}
