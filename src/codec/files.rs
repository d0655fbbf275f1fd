//! # SD Card Files and Logging
//!
//! Records for the ADCS SD card: the file list, block downloads, hole maps, format progress and
//! the two periodic SD logs.

use std::ops::BitOr;

use bytes::{BufMut, Bytes, BytesMut};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::bits::BitField;
use super::enums::{FileType, SdLogDestination};
use super::{expect_len, Decode, Encode};
use crate::error::{AdcsError, Result};
use crate::protocol::bytes::{split_u16, split_u32, u16_at, u32_at};

/// One entry of the SD card file list
///
/// The device marks the end of the list with an entry whose size, timestamp and CRC are all zero.
/// Such an entry carries no file type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub file_type: Option<FileType>,
    pub busy_updating: bool,
    /// Nth file of this type
    pub counter: u8,
    pub size: u32,
    /// MS-DOS packed date and time
    pub date_time_msdos: u32,
    pub crc16: u16,
}

const FILE_TYPE: BitField = BitField::new(0, 0, 4);
const BUSY_UPDATING: BitField = BitField::flag(0, 4);

impl FileInfo {
    /// True for the end-of-list marker
    #[must_use]
    pub fn is_end_of_list(&self) -> bool {
        self.size == 0 && self.date_time_msdos == 0 && self.crc16 == 0
    }

    /// Decode the MS-DOS timestamp, `None` if it does not name a valid calendar time
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use adcs_driver::codec::files::FileInfo;
    /// # fn show(info: &FileInfo) {
    /// if let Some(when) = info.modified() {
    ///     println!("last written {}", when);
    /// }
    /// # }
    /// ```
    #[must_use]
    pub fn modified(&self) -> Option<NaiveDateTime> {
        let v = self.date_time_msdos;
        let seconds = (v & 0x1F) << 1;
        let minutes = (v >> 5) & 0x3F;
        let hours = (v >> 11) & 0x1F;
        let day = (v >> 16) & 0x1F;
        let month = (v >> 21) & 0x0F;
        // Seven bits, always fits
        let year = (v >> 25) as i32 + 1980;

        NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hours, minutes, seconds)
    }
}

impl Decode for FileInfo {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 12, "file info")?;

        let mut info = Self {
            file_type: None,
            busy_updating: BUSY_UPDATING.is_set(payload),
            counter: payload[1],
            size: u32_at(payload, 2),
            date_time_msdos: u32_at(payload, 6),
            crc16: u16_at(payload, 10),
        };
        if !info.is_end_of_list() {
            info.file_type = Some(FileType::decode_raw(FILE_TYPE.get(payload))?);
        }
        Ok(info)
    }
}

/// Status of the block staged by a load-download-block command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DownloadBlockReady {
    pub ready: bool,
    pub parameter_error: bool,
    pub crc16: u16,
    pub length: u16,
}

impl Decode for DownloadBlockReady {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 5, "download block ready")?;
        Ok(Self {
            ready: BitField::flag(0, 0).is_set(payload),
            parameter_error: BitField::flag(0, 1).is_set(payload),
            crc16: u16_at(payload, 1),
            length: u16_at(payload, 3),
        })
    }
}

/// SD card format and erase-all progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SdFormatProgress {
    pub format_busy: bool,
    pub erase_all_busy: bool,
}

impl Decode for SdFormatProgress {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 1, "SD format progress")?;
        Ok(Self {
            format_busy: BitField::flag(0, 0).is_set(payload),
            erase_all_busy: BitField::flag(0, 1).is_set(payload),
        })
    }
}

/// Bytes of one download burst packet
pub const DOWNLOAD_PACKET_LEN: usize = 20;

/// One packet of a file download burst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DownloadBuffer {
    pub packet_counter: u16,
    pub data: [u8; DOWNLOAD_PACKET_LEN],
}

impl Decode for DownloadBuffer {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 2 + DOWNLOAD_PACKET_LEN, "download buffer")?;
        let mut data = [0u8; DOWNLOAD_PACKET_LEN];
        data.copy_from_slice(&payload[2..]);
        Ok(Self { packet_counter: u16_at(payload, 0), data })
    }
}

/// Packets covered by one hole map (16 bytes, one bit per packet)
pub const HOLE_MAP_PACKETS: usize = 128;

/// Received-packet bitmap for one slice of a download block
///
/// Bit `n % 8` of byte `n / 8` is set once packet `n` has arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HoleMap {
    pub bits: [u8; 16],
}

impl HoleMap {
    #[must_use]
    pub fn is_received(&self, packet: usize) -> bool {
        packet < HOLE_MAP_PACKETS && self.bits[packet / 8] & (1 << (packet % 8)) != 0
    }

    /// Mark `packet` as received; packets past the map are ignored
    pub fn mark_received(&mut self, packet: usize) {
        if packet < HOLE_MAP_PACKETS {
            self.bits[packet / 8] |= 1 << (packet % 8);
        }
    }

    /// Packets not yet received, in order
    pub fn holes(&self) -> impl Iterator<Item = usize> + '_ {
        (0..HOLE_MAP_PACKETS).filter(move |&p| !self.is_received(p))
    }
}

impl Decode for HoleMap {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 16, "hole map")?;
        let mut bits = [0u8; 16];
        bits.copy_from_slice(payload);
        Ok(Self { bits })
    }
}

impl Encode for HoleMap {
    fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(&self.bits))
    }
}

/// Selection of telemetry frames written by an SD log
///
/// Masks for individual frames combine with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SdLogMask(pub [u8; 10]);

impl SdLogMask {
    /// Logs nothing
    pub const EMPTY: Self = Self([0; 10]);

    /// OR several masks into one selection
    #[must_use]
    pub fn combine(masks: &[SdLogMask]) -> Self {
        masks.iter().fold(Self::EMPTY, |acc, mask| acc | *mask)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl BitOr for SdLogMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        let mut out = self.0;
        for (byte, other) in out.iter_mut().zip(rhs.0) {
            *byte |= other;
        }
        Self(out)
    }
}

/// Which of the two SD logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SdLogSlot {
    Log1,
    Log2,
}

impl TryFrom<u8> for SdLogSlot {
    type Error = AdcsError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Log1),
            2 => Ok(Self::Log2),
            other => Err(AdcsError::InvalidArgument(format!("SD log {} does not exist", other))),
        }
    }
}

/// Configuration of one SD log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SdLogConfig {
    pub mask: SdLogMask,
    /// Zero disables the log
    pub period_s: u16,
    pub destination: SdLogDestination,
}

impl SdLogConfig {
    /// Empty selection, period zero, primary card
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            mask: SdLogMask::EMPTY,
            period_s: 0,
            destination: SdLogDestination::PrimarySd,
        }
    }
}

impl Decode for SdLogConfig {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 13, "SD log config")?;
        let mut mask = [0u8; 10];
        mask.copy_from_slice(&payload[..10]);
        Ok(Self {
            mask: SdLogMask(mask),
            period_s: u16_at(payload, 10),
            destination: SdLogDestination::decode_raw(payload[12])?,
        })
    }
}

impl Encode for SdLogConfig {
    fn encode(&self) -> Result<Bytes> {
        let mut payload = BytesMut::with_capacity(13);
        payload.put_slice(&self.mask.0);
        payload.put_slice(&split_u16(self.period_s));
        payload.put_u8(self.destination.raw());
        Ok(payload.freeze())
    }
}

/// Stage a block of a file for download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadDownloadBlock {
    pub file_type: FileType,
    pub counter: u8,
    pub offset: u32,
    pub block_length: u16,
}

impl Encode for LoadDownloadBlock {
    fn encode(&self) -> Result<Bytes> {
        let mut payload = BytesMut::with_capacity(8);
        payload.put_u8(self.file_type.raw());
        payload.put_u8(self.counter);
        payload.put_slice(&split_u32(self.offset));
        payload.put_slice(&split_u16(self.block_length));
        Ok(payload.freeze())
    }
}

/// Erase one file, or every file when `erase_all` is set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EraseFile {
    pub file_type: FileType,
    pub counter: u8,
    pub erase_all: bool,
}

impl Encode for EraseFile {
    fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(&[
            self.file_type.raw(),
            self.counter,
            u8::from(self.erase_all),
        ]))
    }
}

/// Start streaming the staged block as download buffer packets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DownloadBurst {
    pub ignore_hole_map: bool,
}

impl Encode for DownloadBurst {
    fn encode(&self) -> Result<Bytes> {
        // Message length is fixed at the download packet size
        Ok(Bytes::copy_from_slice(&[
            DOWNLOAD_PACKET_LEN as u8,
            u8::from(self.ignore_hole_map),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_decode_file_info() {
        let payload = [
            0x12, // busy, telemetry log
            0x34, // counter
            0x56, 0x78, 0x9a, 0xbc, // size
            0x12, 0x34, 0x56, 0x78, // MS-DOS date/time
            0x9a, 0xbc, // CRC16
        ];

        let info = FileInfo::decode(&payload).unwrap();

        assert_eq!(info.file_type, Some(FileType::TelemetryLog));
        assert!(info.busy_updating);
        assert_eq!(info.counter, 52);
        assert_eq!(info.size, 3_164_239_958);
        assert_eq!(info.date_time_msdos, 2_018_915_346);
        assert_eq!(info.crc16, 48282);
        assert!(!info.is_end_of_list());
    }

    #[test]
    fn test_file_info_end_of_list() {
        let info = FileInfo::decode(&[0u8; 12]).unwrap();
        assert!(info.is_end_of_list());
        assert_eq!(info.file_type, None);
    }

    #[test]
    fn test_file_info_rejects_unknown_type() {
        let mut payload = [0u8; 12];
        payload[0] = 0x05;
        payload[2] = 0x01;
        assert!(matches!(FileInfo::decode(&payload), Err(AdcsError::Codec(_))));
    }

    #[test]
    fn test_msdos_timestamp() {
        // 2024-03-15 13:45:30
        let date: u32 = ((2024 - 1980) << 9) | (3 << 5) | 15;
        let time: u32 = (13 << 11) | (45 << 5) | (30 >> 1);
        let mut info = FileInfo::decode(&[0u8; 12]).unwrap();
        info.date_time_msdos = (date << 16) | time;

        let when = info.modified().unwrap();

        assert_eq!((when.year(), when.month(), when.day()), (2024, 3, 15));
        assert_eq!((when.hour(), when.minute(), when.second()), (13, 45, 30));

        info.date_time_msdos = 0;
        assert_eq!(info.modified(), None);
    }

    #[test]
    fn test_decode_download_block_ready() {
        let ready = DownloadBlockReady::decode(&[0x12, 0x34, 0x56, 0x78, 0x9a]).unwrap();

        assert!(!ready.ready);
        assert!(ready.parameter_error);
        assert_eq!(ready.crc16, 22068);
        assert_eq!(ready.length, 39544);
    }

    #[test]
    fn test_decode_sd_format_progress() {
        let erase = SdFormatProgress::decode(&[0x02]).unwrap();
        assert!(erase.erase_all_busy && !erase.format_busy);

        let both = SdFormatProgress::decode(&[0x03]).unwrap();
        assert!(both.erase_all_busy && both.format_busy);

        let neither = SdFormatProgress::decode(&[0x04]).unwrap();
        assert!(!neither.erase_all_busy && !neither.format_busy);
    }

    #[test]
    fn test_decode_download_buffer() {
        let payload = [
            0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0x12, 0x34, 0x56,
            0x78, 0x9a, 0xbc, 0x12, 0x34, 0x56, 0x78,
        ];

        let buffer = DownloadBuffer::decode(&payload).unwrap();

        assert_eq!(buffer.packet_counter, 13330);
        assert_eq!(
            buffer.data,
            [86, 120, 154, 188, 18, 52, 86, 120, 154, 188, 18, 52, 86, 120, 154, 188, 18, 52, 86, 120]
        );
    }

    #[test]
    fn test_hole_map_bits() {
        let mut map = HoleMap::default();
        map.mark_received(0);
        map.mark_received(9);
        map.mark_received(500);

        assert_eq!(map.bits[0], 0x01);
        assert_eq!(map.bits[1], 0x02);
        assert!(map.is_received(9));
        assert!(!map.is_received(8));
        assert_eq!(map.holes().take(3).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(map.holes().count(), HOLE_MAP_PACKETS - 2);
    }

    #[test]
    fn test_combine_sd_log_masks() {
        let rates = SdLogMask([0x00, 0x20, 0, 0, 0, 0, 0, 0, 0, 0]);
        let rate_sensor = SdLogMask([0, 0, 0, 0x40, 0, 0, 0, 0, 0, 0]);
        let raw_mag = SdLogMask([0, 0, 0, 0, 0, 0, 0x08, 0, 0, 0]);

        let combined = SdLogMask::combine(&[rates, rate_sensor, raw_mag]);

        assert_eq!(combined.0, [0x00, 0x20, 0x00, 0x40, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00]);
        assert!(SdLogMask::combine(&[]).is_empty());
    }

    #[test]
    fn test_decode_sd_log_config() {
        let payload = [
            0x56, 0x8b, 0x21, 0x67, 0x62, 0x02, 0x8c, 0x11, 0x62, 0x02, // mask
            0x8c, 0x11, // period
            0x01, // secondary card
        ];

        let config = SdLogConfig::decode(&payload).unwrap();

        assert_eq!(config.mask.0, payload[..10]);
        assert_eq!(config.period_s, 4492);
        assert_eq!(config.destination, SdLogDestination::SecondarySd);
        assert_eq!(config.encode().unwrap().as_ref(), &payload[..]);
    }

    #[test]
    fn test_disabled_sd_log_config() {
        let payload = SdLogConfig::disabled().encode().unwrap();
        assert_eq!(payload.as_ref(), &[0u8; 13]);
    }

    #[test]
    fn test_sd_log_slot_from_number() {
        assert_eq!(SdLogSlot::try_from(2).unwrap(), SdLogSlot::Log2);
        assert!(matches!(SdLogSlot::try_from(3), Err(AdcsError::InvalidArgument(_))));
    }

    #[test]
    fn test_encode_file_commands() {
        let load = LoadDownloadBlock {
            file_type: FileType::JpgImage,
            counter: 4,
            offset: 20480,
            block_length: 1024,
        };
        assert_eq!(load.encode().unwrap().as_ref(), &[0x03, 0x04, 0x00, 0x50, 0x00, 0x00, 0x00, 0x04]);

        let erase = EraseFile { file_type: FileType::TelemetryLog, counter: 7, erase_all: false };
        assert_eq!(erase.encode().unwrap().as_ref(), &[0x02, 0x07, 0x00]);

        let burst = DownloadBurst { ignore_hole_map: true };
        assert_eq!(burst.encode().unwrap().as_ref(), &[20, 1]);
    }
}
