//! # Simulated ADCS
//!
//! In-memory device behind the [`BusTransport`] trait. Serves every telemetry register in the
//! catalog, acknowledges telecommands the way the real unit does and mirrors configuration
//! writes into their telemetry counterparts, so a value set is a value read back.
//!
//! Files added with contents can be downloaded: a staged block is served one download-buffer
//! packet per read after a burst, honouring the uploaded hole maps on re-bursts.
//!
//! Clones share one device, so a test can keep a handle for fault injection and inspection
//! after handing the transport to the driver.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::{debug, trace};

use super::{BusTransport, TransportError};
use crate::catalog::{self, tc, tlm, CatalogEntry, CATALOG};
use crate::codec::enums::FileType;
use crate::codec::files::{DOWNLOAD_PACKET_LEN, HOLE_MAP_PACKETS};
use crate::protocol::bytes::{split_u16, split_u32, u16_at, u32_at};
use crate::protocol::crc::Crc8;
use crate::protocol::frame::{frame_len, Ack, Direction, ErrorFlag, ADCS_I2C_ADDRESS};

/// Identification reported by a fresh simulator: CubeACP node, interface 1, firmware 7.4
const IDENTIFICATION: [u8; 8] = [10, 1, 7, 4, 0, 0, 0, 0];

/// Power-on reset, one boot, ADCS program running firmware 7.4
const PROGRAM_STATUS: [u8; 6] = [0x00, 1, 0, 1, 7, 4];

/// Telecommand to the telemetry register that reads its value back
fn mirror_of(command: &CatalogEntry) -> Option<&'static CatalogEntry> {
    let settings: [(&'static CatalogEntry, &'static CatalogEntry); 12] = [
        (&tc::SET_UNIX_TIME, &tlm::UNIX_TIME),
        (&tc::UNIX_TIME_SAVE_MODE, &tlm::UNIX_TIME_SAVE_MODE),
        (&tc::POWER_CONTROL, &tlm::POWER_CONTROL),
        (&tc::COMMANDED_ATTITUDE, &tlm::COMMANDED_ATTITUDE),
        (&tc::MAGNETOMETER_CONFIG, &tlm::MAGNETOMETER_CONFIG),
        (&tc::ESTIMATION_PARAMS, &tlm::ESTIMATION_PARAMS),
        (&tc::ASGP4_PARAMS, &tlm::ASGP4_PARAMS),
        (&tc::RATE_GYRO_CONFIG, &tlm::RATE_GYRO_CONFIG),
        (&tc::SGP4_ORBIT_PARAMS, &tlm::SGP4_ORBIT_PARAMS),
        (&tc::TRACKING_TARGET, &tlm::TRACKING_TARGET),
        (&tc::SD_LOG1_CONFIG, &tlm::SD_LOG1_CONFIG),
        (&tc::SD_LOG2_CONFIG, &tlm::SD_LOG2_CONFIG),
    ];

    settings
        .into_iter()
        .chain(tc::SET_HOLE_MAP.iter().zip(tlm::HOLE_MAP.iter()))
        .find(|(set, _)| set.id.raw() == command.id.raw())
        .map(|(_, get)| get)
}

/// Non-zero MS-DOS timestamp given to files added with contents
const FILE_DATE_TIME: u32 = 0x595A_6021;

const FILE_RECORD_LEN: usize = 12;

/// Download-buffer record: packet counter then one packet of file bytes
const PACKET_RECORD_LEN: usize = 2 + DOWNLOAD_PACKET_LEN;

/// Block staged by a load-download-block command
struct StagedBlock {
    first_packet: usize,
    data: Vec<u8>,
    rejected: bool,
}

struct SimState {
    address: u8,
    crc: Crc8,
    registers: HashMap<u8, Vec<u8>>,
    ack: Ack,
    processing_polls: u32,
    pending_polls: u32,
    corrupt_reads: u32,
    bus_error: Option<TransportError>,
    written: Vec<(u8, Vec<u8>)>,
    files: Vec<[u8; FILE_RECORD_LEN]>,
    file_cursor: usize,
    contents: HashMap<(u8, u8), Vec<u8>>,
    staged: Option<StagedBlock>,
    ready_polls: u32,
    ready_countdown: u32,
    burst: VecDeque<Vec<u8>>,
    last_packet: Vec<u8>,
    bursts: u32,
    dropped: HashSet<usize>,
    drop_bursts: u32,
}

impl SimState {
    fn new() -> Self {
        let mut registers: HashMap<u8, Vec<u8>> = CATALOG
            .iter()
            .filter(|entry| entry.direction() == Direction::Telemetry)
            .map(|entry| (entry.id.raw(), vec![0u8; entry.length]))
            .collect();
        registers.insert(tlm::IDENTIFICATION.id.raw(), IDENTIFICATION.to_vec());
        registers.insert(tlm::PROGRAM_STATUS.id.raw(), PROGRAM_STATUS.to_vec());

        Self {
            address: ADCS_I2C_ADDRESS,
            crc: Crc8::init(),
            registers,
            ack: Ack { last_id: 0, processed: true, error_flag: ErrorFlag::None, error_index: 0 },
            processing_polls: 0,
            pending_polls: 0,
            corrupt_reads: 0,
            bus_error: None,
            written: Vec::new(),
            files: Vec::new(),
            file_cursor: 0,
            contents: HashMap::new(),
            staged: None,
            ready_polls: 0,
            ready_countdown: 0,
            burst: VecDeque::new(),
            last_packet: vec![0; PACKET_RECORD_LEN],
            bursts: 0,
            dropped: HashSet::new(),
            drop_bursts: 0,
        }
    }

    fn payload(&mut self, id: u8) -> Option<Vec<u8>> {
        if id == tlm::ACK.id.raw() {
            let mut ack = self.ack;
            if self.pending_polls > 0 {
                self.pending_polls -= 1;
                ack.processed = false;
            }
            return Some(ack.encode().to_vec());
        }
        if id == tlm::FILE_INFO.id.raw() {
            let record = self.files.get(self.file_cursor).copied().unwrap_or([0; FILE_RECORD_LEN]);
            return Some(record.to_vec());
        }
        if id == tlm::DOWNLOAD_BLOCK_READY.id.raw() {
            return Some(self.block_ready());
        }
        if id == tlm::DOWNLOAD_BUFFER.id.raw() {
            // Past the end of a burst the buffer keeps its last packet
            if let Some(record) = self.burst.pop_front() {
                self.last_packet = record;
            }
            return Some(self.last_packet.clone());
        }
        self.registers.get(&id).cloned()
    }

    fn block_ready(&mut self) -> Vec<u8> {
        let (rejected, length) = match &self.staged {
            None => return vec![0; tlm::DOWNLOAD_BLOCK_READY.length],
            Some(staged) => (staged.rejected, staged.data.len()),
        };
        if rejected {
            return vec![0b10, 0, 0, 0, 0];
        }
        if self.ready_countdown > 0 {
            self.ready_countdown -= 1;
            return vec![0; tlm::DOWNLOAD_BLOCK_READY.length];
        }

        let length = split_u16(u16::try_from(length).unwrap_or(u16::MAX));
        vec![0b01, 0, 0, length[0], length[1]]
    }

    fn stage_block(&mut self, payload: &[u8]) {
        let key = (payload[0], payload[1]);
        let offset = u32_at(payload, 2) as usize;
        let length = usize::from(u16_at(payload, 6)) * DOWNLOAD_PACKET_LEN;

        let staged = match self.contents.get(&key) {
            Some(data) if offset < data.len() && offset % DOWNLOAD_PACKET_LEN == 0 => StagedBlock {
                first_packet: offset / DOWNLOAD_PACKET_LEN,
                data: data[offset..(offset + length).min(data.len())].to_vec(),
                rejected: false,
            },
            _ => StagedBlock { first_packet: 0, data: Vec::new(), rejected: true },
        };

        debug!("sim staged {} bytes of file {:?}", staged.data.len(), key);
        self.staged = Some(staged);
        self.ready_countdown = self.ready_polls;
        self.burst.clear();
        self.last_packet = vec![0; PACKET_RECORD_LEN];
    }

    fn hole_map_has(&self, packet: usize) -> bool {
        tlm::HOLE_MAP
            .get(packet / HOLE_MAP_PACKETS)
            .and_then(|entry| self.registers.get(&entry.id.raw()))
            .and_then(|bits| bits.get((packet % HOLE_MAP_PACKETS) / 8))
            .is_some_and(|byte| byte & (1 << (packet % 8)) != 0)
    }

    fn start_burst(&mut self, ignore_hole_map: bool) {
        self.bursts += 1;
        let dropping = self.drop_bursts > 0;
        if dropping {
            self.drop_bursts -= 1;
        }

        let Some(staged) = self.staged.as_ref().filter(|s| !s.rejected) else {
            return;
        };

        let packets = staged.data.len().div_ceil(DOWNLOAD_PACKET_LEN);
        let burst: VecDeque<Vec<u8>> = (0..packets)
            .filter(|&p| ignore_hole_map || !self.hole_map_has(p))
            .filter(|p| !(dropping && self.dropped.contains(p)))
            .map(|p| {
                let start = p * DOWNLOAD_PACKET_LEN;
                let end = (start + DOWNLOAD_PACKET_LEN).min(staged.data.len());
                let counter = (staged.first_packet + p) as u16;

                let mut record = split_u16(counter).to_vec();
                record.extend_from_slice(&staged.data[start..end]);
                record.resize(PACKET_RECORD_LEN, 0);
                record
            })
            .collect();

        trace!("sim burst {} with {} packets", self.bursts, burst.len());
        self.burst = burst;
    }

    fn execute(&mut self, entry: &'static CatalogEntry, payload: &[u8]) {
        let id = entry.id.raw();

        if id == tc::RESET_FILE_LIST_POINTER.id.raw() {
            self.file_cursor = 0;
        } else if id == tc::ADVANCE_FILE_LIST_POINTER.id.raw() {
            self.file_cursor += 1;
        } else if id == tc::FORMAT_SD.id.raw() {
            self.files.clear();
            self.file_cursor = 0;
        } else if id == tc::ERASE_FILE.id.raw() {
            let (file_type, counter, erase_all) = (payload[0], payload[1], payload[2] != 0);
            self.files.retain(|record| {
                !(erase_all || (record[0] & 0x0F == file_type && record[1] == counter))
            });
        } else if id == tc::LOAD_DOWNLOAD_BLOCK.id.raw() {
            self.stage_block(payload);
        } else if id == tc::INITIATE_DOWNLOAD_BURST.id.raw() {
            self.start_burst(payload[1] != 0);
        }

        if let Some(register) = mirror_of(entry) {
            self.registers.insert(register.id.raw(), payload.to_vec());
        }
    }

    fn receive(&mut self, id: u8, frame: &[u8]) {
        let Some(entry) = catalog::lookup(id).filter(|e| e.direction() == Direction::Command) else {
            self.ack = Ack { last_id: id, processed: true, error_flag: ErrorFlag::InvalidId, error_index: 0 };
            return;
        };

        let expected = frame_len(entry.length, entry.checksum);
        if frame.len() != expected {
            self.ack = Ack {
                last_id: id,
                processed: true,
                error_flag: ErrorFlag::WrongLength,
                error_index: 0,
            };
            return;
        }

        let payload = &frame[..entry.length];
        if entry.checksum && !self.crc.verify(payload, frame[entry.length]) {
            self.ack = Ack { last_id: id, processed: true, error_flag: ErrorFlag::Crc, error_index: 0 };
            return;
        }

        self.execute(entry, payload);
        self.ack = Ack { last_id: id, processed: true, error_flag: ErrorFlag::None, error_index: 0 };
        self.pending_polls = self.processing_polls;
    }
}

/// In-memory ADCS unit
#[derive(Clone)]
pub struct SimulatedAdcs {
    state: Arc<Mutex<SimState>>,
}

impl Default for SimulatedAdcs {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SimulatedAdcs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("SimulatedAdcs")
            .field("address", &format_args!("0x{:02X}", state.address))
            .field("ack", &state.ack)
            .field("files", &state.files.len())
            .finish_non_exhaustive()
    }
}

impl SimulatedAdcs {
    /// Fresh device at the standard address with zeroed telemetry
    pub fn new() -> Self {
        Self { state: Arc::new(Mutex::new(SimState::new())) }
    }

    /// Answer on a different bus address
    pub fn with_address(self, address: u8) -> Self {
        self.lock().address = address;
        self
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrite a telemetry register
    pub fn set_telemetry(&self, entry: &CatalogEntry, payload: &[u8]) {
        self.lock().registers.insert(entry.id.raw(), payload.to_vec());
    }

    /// Current contents of a telemetry register
    pub fn telemetry(&self, entry: &CatalogEntry) -> Option<Vec<u8>> {
        self.lock().registers.get(&entry.id.raw()).cloned()
    }

    /// Append a raw 12-byte file-info record to the SD card listing
    pub fn add_file(&self, record: [u8; FILE_RECORD_LEN]) {
        self.lock().files.push(record);
    }

    /// Add a file whose contents can be downloaded; its file-info record is built from them
    pub fn add_file_with_contents(&self, file_type: FileType, counter: u8, crc16: u16, contents: &[u8]) {
        let size = split_u32(u32::try_from(contents.len()).unwrap_or(u32::MAX));
        let date_time = split_u32(FILE_DATE_TIME);
        let crc = split_u16(crc16);
        let record = [
            file_type.raw(),
            counter,
            size[0],
            size[1],
            size[2],
            size[3],
            date_time[0],
            date_time[1],
            date_time[2],
            date_time[3],
            crc[0],
            crc[1],
        ];

        let mut state = self.lock();
        state.files.push(record);
        state.contents.insert((file_type.raw(), counter), contents.to_vec());
    }

    pub fn file_count(&self) -> usize {
        self.lock().files.len()
    }

    /// Report every following command unprocessed for `polls` acknowledgment reads
    pub fn set_processing_polls(&self, polls: u32) {
        self.lock().processing_polls = polls;
    }

    /// Report every staged download block not ready for `polls` reads
    pub fn set_block_ready_polls(&self, polls: u32) {
        self.lock().ready_polls = polls;
    }

    /// Leave `packets` (block-relative) out of the next `bursts` download bursts
    pub fn drop_download_packets(&self, packets: &[usize], bursts: u32) {
        let mut state = self.lock();
        state.dropped = packets.iter().copied().collect();
        state.drop_bursts = bursts;
    }

    /// Download bursts started so far
    pub fn burst_count(&self) -> u32 {
        self.lock().bursts
    }

    /// Flip a bit in the checksum of the next `count` checksummed reads
    pub fn corrupt_next_reads(&self, count: u32) {
        self.lock().corrupt_reads = count;
    }

    /// Fail every bus call with `error` until cleared with `None`
    pub fn set_bus_error(&self, error: Option<TransportError>) {
        self.lock().bus_error = error;
    }

    /// Every telecommand frame received so far, in order
    pub fn written(&self) -> Vec<(u8, Vec<u8>)> {
        self.lock().written.clone()
    }

    /// Last acknowledgment record
    pub fn ack(&self) -> Ack {
        self.lock().ack
    }
}

#[async_trait]
impl BusTransport for SimulatedAdcs {
    async fn write(&mut self, device: u8, command_id: u8, bytes: &[u8]) -> Result<(), TransportError> {
        let mut state = self.lock();

        if let Some(error) = state.bus_error.clone() {
            return Err(error);
        }
        if device != state.address {
            return Err(TransportError::Nack { device });
        }

        trace!("sim <- {} {:02X?}", command_id, bytes);
        state.written.push((command_id, bytes.to_vec()));
        state.receive(command_id, bytes);
        debug!("sim ack {:?}", state.ack);

        Ok(())
    }

    async fn read(
        &mut self,
        device: u8,
        command_id: u8,
        expected_len: usize,
    ) -> Result<Vec<u8>, TransportError> {
        let mut state = self.lock();

        if let Some(error) = state.bus_error.clone() {
            return Err(error);
        }
        if device != state.address {
            return Err(TransportError::Nack { device });
        }

        let mut frame = state
            .payload(command_id)
            .ok_or_else(|| TransportError::Io(format!("no telemetry register {}", command_id)))?;

        // Unchecksummed reads get the bare payload
        if expected_len == frame.len() + 1 {
            let crc = state.crc.checksum(&frame);
            frame.push(crc);

            if state.corrupt_reads > 0 {
                state.corrupt_reads -= 1;
                if let Some(last) = frame.last_mut() {
                    *last ^= 0x01;
                }
            }
        }

        trace!("sim -> {} {:02X?}", command_id, frame);
        Ok(frame)
    }
}
