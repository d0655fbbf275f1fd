//! # CRC8 Implementation
//!
//! 8-bit checksum used by the ADCS on every checksummed telecommand and telemetry frame.
//!
//! **Polynomial**: 0x91 (reflected, table-driven)
//! **Initial Value**: 0x00
//! **Empty buffer**: 0xFF

/// ADCS CRC8 polynomial
pub const CRC8_POLY: u8 = 0x91;

/// Checksum returned for a zero-length buffer
pub const CRC8_EMPTY: u8 = 0xFF;

/// Process-wide table, built at compile time and never mutated
pub static CRC8: Crc8 = Crc8::init();

/// CRC8 lookup table
///
/// Construction is the `Uninitialized -> Ready` transition; a `Crc8` value is always `Ready`.
#[derive(Clone, PartialEq, Eq)]
pub struct Crc8 {
    table: [u8; 256],
}

impl std::fmt::Debug for Crc8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crc8")
            .field("poly", &format_args!("0x{:02X}", CRC8_POLY))
            .finish_non_exhaustive()
    }
}

impl Crc8 {
    /// Build the lookup table
    ///
    /// Idempotent: every call yields an identical table.
    #[must_use]
    pub const fn init() -> Self {
        let mut table = [0u8; 256];
        let mut i = 0;

        while i < 256 {
            let mut val = i as u8;
            let mut j = 0;

            while j < 8 {
                if (val & 1) != 0 {
                    val ^= CRC8_POLY;
                }
                val >>= 1;
                j += 1;
            }

            table[i] = val;
            i += 1;
        }

        Self { table }
    }

    /// Calculate the checksum of a buffer
    ///
    /// # Arguments
    ///
    /// * `data` - Payload bytes (without any trailing checksum byte)
    ///
    /// # Returns
    ///
    /// * `u8` - Checksum, or `0xFF` for an empty buffer
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use adcs_driver::protocol::crc::CRC8;
    ///
    /// let crc = CRC8.checksum(&[0x5A]);
    /// assert_eq!(CRC8.checksum(&[]), 0xFF);
    /// ```
    #[must_use]
    pub fn checksum(&self, data: &[u8]) -> u8 {
        if data.is_empty() {
            return CRC8_EMPTY;
        }

        data.iter()
            .fold(0u8, |crc, &byte| self.table[(crc ^ byte) as usize])
    }

    /// Check a payload against the checksum byte that followed it on the wire
    #[must_use]
    pub fn verify(&self, data: &[u8], expected: u8) -> bool {
        self.checksum(data) == expected
    }
}
