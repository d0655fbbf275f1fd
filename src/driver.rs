//! # ADCS Driver
//!
//! Caller-facing surface: one async method per catalog entry, taking and returning typed records.
//!
//! The driver is a cheap, cloneable handle. Every call locks the shared transaction layer and runs
//! on its own spawned task, so a caller that gives up on a call never leaves a command half
//! acknowledged. Multi-step operations (file list walks) hold the lock for their whole duration.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::catalog::{tc, tlm, CatalogEntry};
use crate::codec::commands::{
    ClearErrors, DeployMagnetometer, MagicGuard, MagnetorquerOutput, NoArgs, SaveImage,
    SetControlMode,
};
use crate::codec::enums::{EstimationMode, MagnetometerMode, RunMode};
use crate::codec::files::{
    DownloadBlockReady, DownloadBuffer, DownloadBurst, EraseFile, FileInfo, HoleMap,
    LoadDownloadBlock, SdFormatProgress, SdLogConfig, SdLogSlot,
};
use crate::codec::params::{
    Asgp4Params, EstimationParams, MagnetometerConfig, RateGyroConfig, Sgp4OrbitParams,
    TrackingTarget,
};
use crate::codec::sensors::{
    CubeControlCurrent, CubeSenseCurrents, GpsAxis, GpsStatus, GpsTime, MiscCurrents, RawCamSensor,
    RawCss1To6, RawCss7To10, RawStarTracker, WheelCurrents,
};
use crate::codec::status::{
    AcpExecutionState, CommsStatus, CurrentState, Identification, PowerControl, ProgramStatus,
    UnixTime, UnixTimeSaveMode,
};
use crate::codec::vectors::{
    CommandedAttitude, EstimatedAttitude, EstimatedRates, FineRates, GyroBias, InnovationVector,
    MagneticField, MagnetorquerCommand, Measurements, PositionLlh, QuaternionError,
    RateSensorRates, RawMagnetometer, UnitVector, WheelSpeed,
};
use crate::codec::{Decode, Encode};
use crate::config::Config;
use crate::download::download_file;
use crate::error::{AdcsError, Result};
use crate::protocol::frame::Ack;
use crate::transaction::{AckState, RetryPolicy, Transaction};
use crate::transport::BusTransport;

/// Pause after every file-list pointer command before the pointer is read
pub const DEFAULT_FILE_POINTER_DELAY: Duration = Duration::from_millis(200);

/// Overall limit on one file-list walk; 255 entries take about 51 s at the default pause
pub const DEFAULT_FILE_POINTER_TIMEOUT: Duration = Duration::from_secs(60);

/// Pause between starting a download burst and reading its first packet
pub const DEFAULT_BURST_DELAY: Duration = Duration::from_millis(100);

/// Block-ready polls after staging a download block
pub const DEFAULT_BLOCK_READY_POLLS: u32 = 100;

/// Hole-map re-bursts per download block
pub const DEFAULT_HOLE_MAP_ATTEMPTS: u32 = 3;

/// Highest file index the file-list helpers will walk to
pub const MAX_FILE_INDEX: u16 = 255;

/// A file-list entry with its position in the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListedFile {
    pub index: u16,
    pub info: FileInfo,
}

/// Generates getters for telemetry that decodes straight into a record
macro_rules! telemetry_getters {
    ($($(#[$meta:meta])* $method:ident => $entry:expr, $record:ty;)+) => {
        $(
            $(#[$meta])*
            pub async fn $method(&self) -> Result<$record> {
                self.fetch(&$entry).await
            }
        )+
    };
}

/// Generates setters for telecommands that take one encodable record
/// Pacing and bounds of the multi-step SD card operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilePolicy {
    pub pointer_delay: Duration,
    pub pointer_timeout: Duration,
    pub burst_delay: Duration,
    pub block_ready_polls: u32,
    pub hole_map_attempts: u32,
}

impl Default for FilePolicy {
    fn default() -> Self {
        Self {
            pointer_delay: DEFAULT_FILE_POINTER_DELAY,
            pointer_timeout: DEFAULT_FILE_POINTER_TIMEOUT,
            burst_delay: DEFAULT_BURST_DELAY,
            block_ready_polls: DEFAULT_BLOCK_READY_POLLS,
            hole_map_attempts: DEFAULT_HOLE_MAP_ATTEMPTS,
        }
    }
}

macro_rules! command_setters {
    ($($(#[$meta:meta])* $method:ident($arg:ident: $ty:ty) => $entry:expr;)+) => {
        $(
            $(#[$meta])*
            pub async fn $method(&self, $arg: $ty) -> Result<()> {
                self.apply(&$entry, &$arg).await
            }
        )+
    };
}

/// Async handle to one ADCS unit
pub struct AdcsDriver<T> {
    inner: Arc<Mutex<Transaction<T>>>,
    files: FilePolicy,
}

impl<T> Clone for AdcsDriver<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            files: self.files,
        }
    }
}

impl<T> std::fmt::Debug for AdcsDriver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdcsDriver")
            .field("files", &self.files)
            .finish_non_exhaustive()
    }
}

impl<T: BusTransport + 'static> AdcsDriver<T> {
    /// Create a driver for the device at `device`
    ///
    /// # Arguments
    ///
    /// * `transport` - Bus the ADCS hangs off
    /// * `device` - Seven-bit bus address
    /// * `policy` - Retry and timeout bounds
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use adcs_driver::driver::AdcsDriver;
    /// use adcs_driver::transaction::RetryPolicy;
    /// use adcs_driver::transport::SimulatedAdcs;
    ///
    /// # async fn run() -> adcs_driver::error::Result<()> {
    /// let adcs = AdcsDriver::new(SimulatedAdcs::new(), 0x57, RetryPolicy::default());
    /// let id = adcs.identification().await?;
    /// println!("firmware {}.{}", id.firmware_major, id.firmware_minor);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(transport: T, device: u8, policy: RetryPolicy) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Transaction::new(transport, device, policy))),
            files: FilePolicy::default(),
        }
    }

    /// Create a driver from the `[bus]`, `[retry]` and `[files]` configuration sections
    pub fn from_config(transport: T, config: &Config) -> Self {
        Self::new(transport, config.bus.device_address, config.retry_policy())
            .with_file_policy(config.file_policy())
    }

    /// Override the pacing of file-list walks and downloads
    #[must_use]
    pub fn with_file_policy(mut self, policy: FilePolicy) -> Self {
        self.files = policy;
        self
    }

    /// Run `op` on its own task while holding the transaction layer
    async fn exclusive<F, Fut, R>(&self, op: F) -> Result<R>
    where
        F: FnOnce(OwnedMutexGuard<Transaction<T>>) -> Fut,
        Fut: Future<Output = Result<R>> + Send + 'static,
        R: Send + 'static,
    {
        let guard = Arc::clone(&self.inner).lock_owned().await;
        tokio::spawn(op(guard))
            .await
            .map_err(|e| AdcsError::Task(e.to_string()))?
    }

    async fn fetch<R: Decode>(&self, entry: &'static CatalogEntry) -> Result<R> {
        let payload = self
            .exclusive(move |mut tx| async move { tx.request_telemetry(entry).await })
            .await?;
        R::decode(&payload)
    }

    async fn apply<P: Encode + ?Sized>(&self, entry: &'static CatalogEntry, args: &P) -> Result<()> {
        let payload = args.encode()?;
        self.exclusive(move |mut tx| async move { tx.send_command(entry, &payload).await })
            .await
    }

    /// Acknowledgment state of the last telecommand
    pub async fn ack_state(&self) -> Option<AckState> {
        self.inner.lock().await.state()
    }

    // ---- Initialisation and time ----

    /// Bring the device clock in line with the host clock
    ///
    /// # Errors
    ///
    /// Any transaction failure of the set-time command.
    pub async fn initialize(&self) -> Result<()> {
        self.synchronize_unix_time().await?;
        info!("ADCS initialized");
        Ok(())
    }

    /// Set the device clock to the host's current UTC time
    pub async fn synchronize_unix_time(&self) -> Result<()> {
        let now = Utc::now();
        let epoch_ms = u64::try_from(now.timestamp_millis())
            .map_err(|_| AdcsError::InvalidArgument(format!("host clock {} is before 1970", now)))?;

        debug!("Synchronizing ADCS clock to {}", now);
        self.set_unix_time(UnixTime { epoch_ms }).await
    }

    // ---- Telecommands ----

    /// Reset the ADCS; the device does not acknowledge
    pub async fn reset(&self) -> Result<()> {
        self.apply(&tc::RESET, &MagicGuard).await
    }

    pub async fn deploy_magnetometer(&self, timeout_s: u8) -> Result<()> {
        self.apply(&tc::DEPLOY_MAGNETOMETER, &DeployMagnetometer { timeout_s }).await
    }

    pub async fn clear_errors(&self) -> Result<()> {
        self.apply(&tc::CLEAR_ERRORS, &ClearErrors).await
    }

    /// Trigger one control loop iteration in triggered run mode
    pub async fn run_once(&self) -> Result<()> {
        self.apply(&tc::RUN_ONCE, &NoArgs).await
    }

    /// Persist the current configuration to flash
    pub async fn save_config(&self) -> Result<()> {
        self.apply(&tc::SAVE_CONFIG, &NoArgs).await
    }

    pub async fn save_orbit_params(&self) -> Result<()> {
        self.apply(&tc::SAVE_ORBIT_PARAMS, &NoArgs).await
    }

    pub async fn bootloader_run_program(&self) -> Result<()> {
        self.apply(&tc::BOOTLOADER_RUN_PROGRAM, &NoArgs).await
    }

    pub async fn bootloader_clear_errors(&self) -> Result<()> {
        self.apply(&tc::BOOTLOADER_CLEAR_ERRORS, &NoArgs).await
    }

    command_setters! {
        set_unix_time(time: UnixTime) => tc::SET_UNIX_TIME;
        set_unix_time_save_mode(mode: UnixTimeSaveMode) => tc::UNIX_TIME_SAVE_MODE;
        set_run_mode(mode: RunMode) => tc::RUN_MODE;
        set_power_control(control: PowerControl) => tc::POWER_CONTROL;
        set_control_mode(command: SetControlMode) => tc::CONTROL_MODE;
        set_estimation_mode(mode: EstimationMode) => tc::ESTIMATION_MODE;
        set_commanded_attitude(attitude: CommandedAttitude) => tc::COMMANDED_ATTITUDE;
        /// Manual magnetorquer duty cycles; only honoured in no-control mode
        set_magnetorquer_output(output: MagnetorquerOutput) => tc::MAGNETORQUER_OUTPUT;
        set_wheel_speed(speed: WheelSpeed) => tc::WHEEL_SPEED;
        set_magnetometer_config(config: MagnetometerConfig) => tc::MAGNETOMETER_CONFIG;
        set_estimation_params(params: EstimationParams) => tc::ESTIMATION_PARAMS;
        set_asgp4_params(params: Asgp4Params) => tc::ASGP4_PARAMS;
        set_rate_gyro_config(config: RateGyroConfig) => tc::RATE_GYRO_CONFIG;
        set_sgp4_orbit_params(params: Sgp4OrbitParams) => tc::SGP4_ORBIT_PARAMS;
        set_tracking_target(target: TrackingTarget) => tc::TRACKING_TARGET;
        set_magnetometer_mode(mode: MagnetometerMode) => tc::MAGNETOMETER_MODE;
        /// Capture an image and store it on the SD card
        save_image(request: SaveImage) => tc::SAVE_IMAGE;
        erase_file(request: EraseFile) => tc::ERASE_FILE;
        /// Stage a file block for download; poll [`AdcsDriver::download_block_ready`] afterwards
        load_download_block(request: LoadDownloadBlock) => tc::LOAD_DOWNLOAD_BLOCK;
        initiate_download_burst(request: DownloadBurst) => tc::INITIATE_DOWNLOAD_BURST;
    }

    /// Format the ADCS SD card
    pub async fn format_sd(&self) -> Result<()> {
        warn!("Formatting ADCS SD card");
        self.apply(&tc::FORMAT_SD, &MagicGuard).await
    }

    pub async fn reset_file_list_pointer(&self) -> Result<()> {
        self.apply(&tc::RESET_FILE_LIST_POINTER, &NoArgs).await
    }

    pub async fn advance_file_list_pointer(&self) -> Result<()> {
        self.apply(&tc::ADVANCE_FILE_LIST_POINTER, &NoArgs).await
    }

    /// Configure one of the two periodic SD logs
    ///
    /// # Arguments
    ///
    /// * `slot` - Which log
    /// * `config` - Selection mask, period (0 disables) and destination card
    pub async fn set_sd_log_config(&self, slot: SdLogSlot, config: SdLogConfig) -> Result<()> {
        let entry = match slot {
            SdLogSlot::Log1 => &tc::SD_LOG1_CONFIG,
            SdLogSlot::Log2 => &tc::SD_LOG2_CONFIG,
        };
        self.apply(entry, &config).await
    }

    /// Upload hole map `index` (1 to 8) for a download burst
    ///
    /// # Errors
    ///
    /// `AdcsError::InvalidArgument` for an index outside 1 to 8, otherwise any transaction failure.
    pub async fn set_hole_map(&self, index: u8, map: HoleMap) -> Result<()> {
        self.apply(hole_map_entry(&tc::SET_HOLE_MAP, index)?, &map).await
    }

    // ---- Telemetry ----

    telemetry_getters! {
        identification => tlm::IDENTIFICATION, Identification;
        program_status => tlm::PROGRAM_STATUS, ProgramStatus;
        unix_time => tlm::UNIX_TIME, UnixTime;
        comms_status => tlm::COMMS_STATUS, CommsStatus;
        estimated_attitude => tlm::ESTIMATED_ATTITUDE, EstimatedAttitude;
        estimated_rates => tlm::ESTIMATED_RATES, EstimatedRates;
        position_llh => tlm::POSITION_LLH, PositionLlh;
        magnetic_field => tlm::MAGNETIC_FIELD, MagneticField;
        fine_sun_vector => tlm::FINE_SUN_VECTOR, UnitVector;
        nadir_vector => tlm::NADIR_VECTOR, UnitVector;
        rate_sensor => tlm::RATE_SENSOR, RateSensorRates;
        wheel_speed => tlm::WHEEL_SPEED, WheelSpeed;
        magnetorquer_command => tlm::MAGNETORQUER_COMMAND, MagnetorquerCommand;
        commanded_wheel_speed => tlm::COMMANDED_WHEEL_SPEED, WheelSpeed;
        /// Magnetic field predicted by the IGRF model
        igrf_field => tlm::IGRF_FIELD, MagneticField;
        quaternion_error => tlm::QUATERNION_ERROR, QuaternionError;
        gyro_bias => tlm::GYRO_BIAS, GyroBias;
        innovation => tlm::INNOVATION, InnovationVector;
        raw_cam1 => tlm::RAW_CAM1, RawCamSensor;
        raw_cam2 => tlm::RAW_CAM2, RawCamSensor;
        raw_css_1_to_6 => tlm::RAW_CSS_1_TO_6, RawCss1To6;
        raw_css_7_to_10 => tlm::RAW_CSS_7_TO_10, RawCss7To10;
        raw_magnetometer => tlm::RAW_MAGNETOMETER, RawMagnetometer;
        cubecontrol_current => tlm::CUBECONTROL_CURRENT, CubeControlCurrent;
        wheel_currents => tlm::WHEEL_CURRENTS, WheelCurrents;
        cubesense_currents => tlm::CUBESENSE_CURRENTS, CubeSenseCurrents;
        misc_currents => tlm::MISC_CURRENTS, MiscCurrents;
        gps_status => tlm::GPS_STATUS, GpsStatus;
        gps_time => tlm::GPS_TIME, GpsTime;
        gps_x => tlm::GPS_X, GpsAxis;
        gps_y => tlm::GPS_Y, GpsAxis;
        gps_z => tlm::GPS_Z, GpsAxis;
        fine_rates => tlm::FINE_RATES, FineRates;
        current_state => tlm::CURRENT_STATE, CurrentState;
        measurements => tlm::MEASUREMENTS, Measurements;
        acp_execution_state => tlm::ACP_STATE, AcpExecutionState;
        power_control => tlm::POWER_CONTROL, PowerControl;
        commanded_attitude => tlm::COMMANDED_ATTITUDE, CommandedAttitude;
        asgp4_params => tlm::ASGP4_PARAMS, Asgp4Params;
        tracking_target => tlm::TRACKING_TARGET, TrackingTarget;
        magnetometer_config => tlm::MAGNETOMETER_CONFIG, MagnetometerConfig;
        rate_gyro_config => tlm::RATE_GYRO_CONFIG, RateGyroConfig;
        raw_star_tracker => tlm::RAW_STAR_TRACKER, RawStarTracker;
        estimation_params => tlm::ESTIMATION_PARAMS, EstimationParams;
        unix_time_save_mode => tlm::UNIX_TIME_SAVE_MODE, UnixTimeSaveMode;
        sgp4_orbit_params => tlm::SGP4_ORBIT_PARAMS, Sgp4OrbitParams;
        sd_format_progress => tlm::SD_FORMAT_PROGRESS, SdFormatProgress;
        download_buffer => tlm::DOWNLOAD_BUFFER, DownloadBuffer;
        download_block_ready => tlm::DOWNLOAD_BLOCK_READY, DownloadBlockReady;
        /// File-list entry under the read pointer
        file_info => tlm::FILE_INFO, FileInfo;
    }

    /// Read the acknowledgment of the last telecommand
    pub async fn ack(&self) -> Result<Ack> {
        self.exclusive(|mut tx| async move { tx.read_ack().await }).await
    }

    pub async fn sd_log_config(&self, slot: SdLogSlot) -> Result<SdLogConfig> {
        let entry = match slot {
            SdLogSlot::Log1 => &tlm::SD_LOG1_CONFIG,
            SdLogSlot::Log2 => &tlm::SD_LOG2_CONFIG,
        };
        self.fetch(entry).await
    }

    /// Read back hole map `index` (1 to 8)
    pub async fn hole_map(&self, index: u8) -> Result<HoleMap> {
        self.fetch(hole_map_entry(&tlm::HOLE_MAP, index)?).await
    }

    // ---- Composite operations ----

    /// Stop both SD logs
    ///
    /// # Errors
    ///
    /// Stops at the first failing log configuration.
    pub async fn disable_sd_logging(&self) -> Result<()> {
        self.set_sd_log_config(SdLogSlot::Log1, SdLogConfig::disabled()).await?;
        self.set_sd_log_config(SdLogSlot::Log2, SdLogConfig::disabled()).await?;
        info!("ADCS SD logging disabled");
        Ok(())
    }

    /// Power down every peripheral except the CubeControl supplies, then stop SD logging
    pub async fn disable_peripherals_and_sd_logs(&self) -> Result<()> {
        self.set_power_control(PowerControl::peripherals_off()).await?;
        self.disable_sd_logging().await
    }

    /// Read up to `count` file-list entries starting at list index `offset`
    ///
    /// # Returns
    ///
    /// * `Result<Vec<ListedFile>>` - Entries in list order; shorter than `count` if the list ends
    ///
    /// # Errors
    ///
    /// `AdcsError::FileWalkTimeout` if the walk outlasts the policy's pointer timeout, otherwise
    /// any transaction failure while moving the pointer or reading an entry.
    pub async fn list_files(&self, count: u16, offset: u16) -> Result<Vec<ListedFile>> {
        let policy = self.files;

        let files = self
            .exclusive(move |mut tx| async move {
                bounded(policy.pointer_timeout, async {
                    let mut files = Vec::new();
                    if count == 0 {
                        return Ok(files);
                    }

                    let Some(mut info) = seek_file(&mut *tx, offset, policy.pointer_delay).await? else {
                        return Ok(files);
                    };
                    let mut index = offset;

                    loop {
                        files.push(ListedFile { index, info });
                        if files.len() == usize::from(count) || index == u16::MAX {
                            break;
                        }

                        tx.send_command(&tc::ADVANCE_FILE_LIST_POINTER, &[]).await?;
                        tokio::time::sleep(policy.pointer_delay).await;

                        info = read_file_info(&mut *tx).await?;
                        if info.is_end_of_list() {
                            break;
                        }
                        index += 1;
                    }

                    Ok::<_, AdcsError>(files)
                })
                .await
            })
            .await?;

        let busy = files.iter().filter(|f| f.info.busy_updating).count();
        if busy > 0 {
            warn!("{} files are being updated; indexes may shift before they are read", busy);
        }

        Ok(files)
    }

    /// Erase the file at list index `index`
    ///
    /// # Errors
    ///
    /// * `AdcsError::InvalidArgument` - `index` above 255
    /// * `AdcsError::FileNotFound` - the list ends before `index`
    /// * `AdcsError::FileWalkTimeout` - the pointer walk outlasts the pointer timeout
    /// * Any transaction failure
    pub async fn erase_file_by_index(&self, index: u16) -> Result<()> {
        check_file_index(index)?;
        let policy = self.files;

        self.exclusive(move |mut tx| async move {
            let info = locate_by_index(&mut *tx, index, &policy).await?;
            erase_listed(&mut *tx, &info).await
        })
        .await
    }

    /// Erase the first file whose CRC16 is `crc16`
    ///
    /// # Errors
    ///
    /// `AdcsError::FileNotFound` if no file in the first 255 entries matches,
    /// `AdcsError::FileWalkTimeout` if the search outlasts the pointer timeout, otherwise any
    /// transaction failure.
    pub async fn erase_file_by_crc(&self, crc16: u16) -> Result<()> {
        let policy = self.files;

        self.exclusive(move |mut tx| async move {
            let info = locate_by_crc(&mut *tx, crc16, &policy).await?;
            erase_listed(&mut *tx, &info).await
        })
        .await
    }

    /// Download the whole file at list index `index`
    ///
    /// The file is pulled block by block (20 KiB each) through download bursts, with hole-map
    /// re-bursts for packets that did not arrive. The transaction layer stays locked for the
    /// whole download.
    ///
    /// # Arguments
    ///
    /// * `index` - Position in the SD card file list (0 to 255)
    ///
    /// # Returns
    ///
    /// * `Result<Vec<u8>>` - File contents, exactly the size the file list reports
    ///
    /// # Errors
    ///
    /// * `AdcsError::InvalidArgument` - `index` above 255
    /// * `AdcsError::FileNotFound` - the list ends before `index`
    /// * `AdcsError::FileWalkTimeout` - the pointer walk outlasts the pointer timeout
    /// * `AdcsError::BlockRejected` / `AdcsError::BlockNotReady` - a block could not be staged
    /// * `AdcsError::DownloadIncomplete` - packets still missing after every hole-map retry
    /// * Any transaction failure
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use adcs_driver::driver::AdcsDriver;
    /// use adcs_driver::transaction::RetryPolicy;
    /// use adcs_driver::transport::SimulatedAdcs;
    ///
    /// # async fn run() -> adcs_driver::error::Result<()> {
    /// let adcs = AdcsDriver::new(SimulatedAdcs::new(), 0x57, RetryPolicy::default());
    /// let image = adcs.download_file_by_index(0).await?;
    /// std::fs::write("image.jpg", &image)?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn download_file_by_index(&self, index: u16) -> Result<Vec<u8>> {
        check_file_index(index)?;
        let policy = self.files;

        self.exclusive(move |mut tx| async move {
            let info = locate_by_index(&mut *tx, index, &policy).await?;
            download_file(&mut *tx, &info, &policy).await
        })
        .await
    }

    /// Download the first file whose CRC16 is `crc16`
    ///
    /// # Errors
    ///
    /// As [`AdcsDriver::download_file_by_index`], with `AdcsError::FileNotFound` when no file in
    /// the first 255 entries matches.
    pub async fn download_file_by_crc(&self, crc16: u16) -> Result<Vec<u8>> {
        let policy = self.files;

        self.exclusive(move |mut tx| async move {
            let info = locate_by_crc(&mut *tx, crc16, &policy).await?;
            download_file(&mut *tx, &info, &policy).await
        })
        .await
    }
}

fn hole_map_entry(table: &'static [CatalogEntry; 8], index: u8) -> Result<&'static CatalogEntry> {
    index
        .checked_sub(1)
        .and_then(|i| table.get(usize::from(i)))
        .ok_or_else(|| AdcsError::InvalidArgument(format!("hole map {} does not exist (1 to 8)", index)))
}

fn check_file_index(index: u16) -> Result<()> {
    if index > MAX_FILE_INDEX {
        return Err(AdcsError::InvalidArgument(format!(
            "file index {} is greater than {}",
            index, MAX_FILE_INDEX
        )));
    }
    Ok(())
}

/// Run a file-list walk under an overall time limit
async fn bounded<F, R>(limit: Duration, walk: F) -> Result<R>
where
    F: Future<Output = Result<R>>,
{
    tokio::time::timeout(limit, walk).await.map_err(|_| {
        warn!("File list walk abandoned after {:?}", limit);
        AdcsError::FileWalkTimeout {
            timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }
    })?
}

async fn read_file_info<T: BusTransport>(tx: &mut Transaction<T>) -> Result<FileInfo> {
    let payload = tx.request_telemetry(&tlm::FILE_INFO).await?;
    FileInfo::decode(&payload)
}

/// Move the file-list pointer to `index`
///
/// Returns the entry there, or `None` if the list ends first.
async fn seek_file<T: BusTransport>(
    tx: &mut Transaction<T>,
    index: u16,
    delay: Duration,
) -> Result<Option<FileInfo>> {
    tx.send_command(&tc::RESET_FILE_LIST_POINTER, &[]).await?;
    tokio::time::sleep(delay).await;

    for step in 0..index {
        if read_file_info(tx).await?.is_end_of_list() {
            warn!("End of file list reached at index {}", step);
            return Ok(None);
        }
        tx.send_command(&tc::ADVANCE_FILE_LIST_POINTER, &[]).await?;
        tokio::time::sleep(delay).await;
    }

    let info = read_file_info(tx).await?;
    Ok((!info.is_end_of_list()).then_some(info))
}

/// Scan from the top of the list for the first entry with `crc16`
async fn find_by_crc<T: BusTransport>(
    tx: &mut Transaction<T>,
    crc16: u16,
    delay: Duration,
) -> Result<Option<FileInfo>> {
    tx.send_command(&tc::RESET_FILE_LIST_POINTER, &[]).await?;
    tokio::time::sleep(delay).await;

    for index in 0..MAX_FILE_INDEX {
        let info = read_file_info(tx).await?;
        if info.is_end_of_list() {
            warn!("End of file list reached at index {}", index);
            return Ok(None);
        }
        if info.crc16 == crc16 {
            debug!("File with CRC 0x{:04X} found at index {}", crc16, index);
            return Ok(Some(info));
        }

        tx.send_command(&tc::ADVANCE_FILE_LIST_POINTER, &[]).await?;
        tokio::time::sleep(delay).await;
    }

    Ok(None)
}

async fn locate_by_index<T: BusTransport>(
    tx: &mut Transaction<T>,
    index: u16,
    policy: &FilePolicy,
) -> Result<FileInfo> {
    bounded(policy.pointer_timeout, seek_file(tx, index, policy.pointer_delay))
        .await?
        .ok_or_else(|| AdcsError::FileNotFound(format!("index {}", index)))
}

async fn locate_by_crc<T: BusTransport>(
    tx: &mut Transaction<T>,
    crc16: u16,
    policy: &FilePolicy,
) -> Result<FileInfo> {
    bounded(policy.pointer_timeout, find_by_crc(tx, crc16, policy.pointer_delay))
        .await?
        .ok_or_else(|| AdcsError::FileNotFound(format!("CRC16 0x{:04X}", crc16)))
}

async fn erase_listed<T: BusTransport>(tx: &mut Transaction<T>, info: &FileInfo) -> Result<()> {
    let file_type = info
        .file_type
        .ok_or_else(|| AdcsError::FileNotFound("end-of-list entry".to_string()))?;
    let request = EraseFile { file_type, counter: info.counter, erase_all: false };

    info!("Erasing ADCS file {:?} #{}", file_type, info.counter);
    tx.send_command(&tc::ERASE_FILE, &request.encode()?).await
}
