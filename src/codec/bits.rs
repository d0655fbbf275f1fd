//! # Bit Fields
//!
//! Explicit (byte, shift, width) descriptors for bit-packed payload fields.
//!
//! Each record declares its layout as a table of `BitField` constants instead of inline
//! shift-and-mask arithmetic, so reversed or irregular layouts stay visible in one place.

/// Location of a packed field inside a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    /// Byte index in the payload
    pub byte: usize,
    /// Bit offset from the least significant bit
    pub shift: u8,
    /// Field width in bits (1..=8)
    pub width: u8,
}

impl BitField {
    #[must_use]
    pub const fn new(byte: usize, shift: u8, width: u8) -> Self {
        Self { byte, shift, width }
    }

    /// One-bit flag
    #[must_use]
    pub const fn flag(byte: usize, shift: u8) -> Self {
        Self::new(byte, shift, 1)
    }

    #[must_use]
    pub const fn mask(&self) -> u8 {
        ((1u16 << self.width) - 1) as u8
    }

    /// Extract the field value
    #[must_use]
    pub fn get(&self, data: &[u8]) -> u8 {
        (data[self.byte] >> self.shift) & self.mask()
    }

    /// Extract a one-bit field as a boolean
    #[must_use]
    pub fn is_set(&self, data: &[u8]) -> bool {
        self.get(data) != 0
    }

    /// Write the field value, leaving the other bits of the byte untouched
    pub fn put(&self, data: &mut [u8], value: u8) {
        let mask = self.mask() << self.shift;
        data[self.byte] = (data[self.byte] & !mask) | ((value << self.shift) & mask);
    }

    pub fn put_flag(&self, data: &mut [u8], value: bool) {
        self.put(data, u8::from(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_fields() {
        let data = [0b1010_1011];

        assert_eq!(BitField::new(0, 0, 2).get(&data), 0b11);
        assert_eq!(BitField::new(0, 2, 2).get(&data), 0b10);
        assert_eq!(BitField::new(0, 4, 4).get(&data), 0b1010);
        assert!(BitField::flag(0, 7).is_set(&data));
        assert!(!BitField::flag(0, 6).is_set(&data));
    }

    #[test]
    fn test_full_byte_field() {
        let field = BitField::new(0, 0, 8);
        assert_eq!(field.mask(), 0xFF);
        assert_eq!(field.get(&[0xA5]), 0xA5);
    }

    #[test]
    fn test_put_preserves_neighbours() {
        let mut data = [0b1111_1111, 0x00];

        BitField::new(0, 2, 2).put(&mut data, 0b00);
        assert_eq!(data[0], 0b1111_0011);

        BitField::flag(1, 4).put_flag(&mut data, true);
        assert_eq!(data[1], 0b0001_0000);

        // Values wider than the field are masked
        BitField::new(1, 0, 2).put(&mut data, 0xFF);
        assert_eq!(data[1], 0b0001_0011);
    }
}
