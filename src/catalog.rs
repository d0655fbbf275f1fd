//! # Command Catalog
//!
//! Static table of every ADCS telecommand and telemetry request: wire identifier, payload length,
//! checksum inclusion and acknowledgment policy.
//!
//! Entries are plain `static` items so the driver refers to them by name
//! (`catalog::tc::RUN_MODE`, `catalog::tlm::IDENTIFICATION`) while [`CATALOG`] lists them all for
//! lookup and for the consistency tests.

use serde::Serialize;

use crate::protocol::frame::{Direction, WireId};

/// What the host does after writing a telecommand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AckPolicy {
    /// Poll the acknowledgment telemetry until the command is processed
    Poll,
    /// The device cannot answer afterwards (reset, bootloader jumps)
    FireAndForget,
}

/// One catalog row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub id: WireId,
    /// Payload length in bytes, excluding the checksum
    pub length: usize,
    pub checksum: bool,
    pub ack: AckPolicy,
}

impl CatalogEntry {
    /// Checksummed telecommand with acknowledgment polling
    const fn command(name: &'static str, id: u8, length: usize) -> Self {
        Self { name, id: WireId::new(id), length, checksum: true, ack: AckPolicy::Poll }
    }

    /// Checksummed telemetry request
    const fn telemetry(name: &'static str, id: u8, length: usize) -> Self {
        Self { name, id: WireId::new(id), length, checksum: true, ack: AckPolicy::Poll }
    }

    const fn fire_and_forget(self) -> Self {
        Self { ack: AckPolicy::FireAndForget, ..self }
    }

    const fn without_checksum(self) -> Self {
        Self { checksum: false, ..self }
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.id.direction()
    }
}

/// Telecommands
pub mod tc {
    use super::CatalogEntry;

    pub static RESET: CatalogEntry = CatalogEntry::command("reset", 1, 1).fire_and_forget();
    pub static SET_UNIX_TIME: CatalogEntry = CatalogEntry::command("set_unix_time", 2, 6);
    pub static DEPLOY_MAGNETOMETER: CatalogEntry = CatalogEntry::command("deploy_magnetometer", 7, 1);
    pub static UNIX_TIME_SAVE_MODE: CatalogEntry = CatalogEntry::command("unix_time_save_mode", 9, 2);
    pub static RUN_MODE: CatalogEntry = CatalogEntry::command("run_mode", 10, 1);
    pub static POWER_CONTROL: CatalogEntry = CatalogEntry::command("power_control", 11, 3);
    pub static CLEAR_ERRORS: CatalogEntry = CatalogEntry::command("clear_errors", 12, 1);
    pub static CONTROL_MODE: CatalogEntry = CatalogEntry::command("control_mode", 13, 3);
    pub static ESTIMATION_MODE: CatalogEntry = CatalogEntry::command("estimation_mode", 14, 1);
    pub static COMMANDED_ATTITUDE: CatalogEntry = CatalogEntry::command("commanded_attitude", 15, 6);
    pub static MAGNETORQUER_OUTPUT: CatalogEntry = CatalogEntry::command("magnetorquer_output", 16, 6);
    pub static WHEEL_SPEED: CatalogEntry = CatalogEntry::command("wheel_speed", 17, 6);
    pub static RUN_ONCE: CatalogEntry = CatalogEntry::command("run_once", 18, 0);
    pub static MAGNETOMETER_CONFIG: CatalogEntry = CatalogEntry::command("magnetometer_config", 23, 30);
    pub static ESTIMATION_PARAMS: CatalogEntry = CatalogEntry::command("estimation_params", 26, 31);
    pub static ASGP4_PARAMS: CatalogEntry = CatalogEntry::command("asgp4_params", 27, 30);
    pub static RATE_GYRO_CONFIG: CatalogEntry = CatalogEntry::command("rate_gyro_config", 28, 10);
    pub static SGP4_ORBIT_PARAMS: CatalogEntry = CatalogEntry::command("sgp4_orbit_params", 45, 64);
    pub static TRACKING_TARGET: CatalogEntry = CatalogEntry::command("tracking_target", 55, 12);
    pub static MAGNETOMETER_MODE: CatalogEntry = CatalogEntry::command("magnetometer_mode", 56, 1);
    pub static SAVE_CONFIG: CatalogEntry = CatalogEntry::command("save_config", 63, 0);
    pub static SAVE_ORBIT_PARAMS: CatalogEntry = CatalogEntry::command("save_orbit_params", 64, 0);
    pub static SAVE_IMAGE: CatalogEntry = CatalogEntry::command("save_image", 80, 2);
    pub static BOOTLOADER_RUN_PROGRAM: CatalogEntry =
        CatalogEntry::command("bootloader_run_program", 100, 0).without_checksum().fire_and_forget();
    pub static BOOTLOADER_CLEAR_ERRORS: CatalogEntry =
        CatalogEntry::command("bootloader_clear_errors", 102, 0).without_checksum().fire_and_forget();
    pub static SD_LOG1_CONFIG: CatalogEntry = CatalogEntry::command("sd_log1_config", 104, 13);
    pub static SD_LOG2_CONFIG: CatalogEntry = CatalogEntry::command("sd_log2_config", 105, 13);
    pub static ERASE_FILE: CatalogEntry = CatalogEntry::command("erase_file", 108, 3);
    pub static LOAD_DOWNLOAD_BLOCK: CatalogEntry = CatalogEntry::command("load_download_block", 112, 8);
    pub static RESET_FILE_LIST_POINTER: CatalogEntry =
        CatalogEntry::command("reset_file_list_pointer", 114, 0);
    pub static ADVANCE_FILE_LIST_POINTER: CatalogEntry =
        CatalogEntry::command("advance_file_list_pointer", 115, 0);
    pub static FORMAT_SD: CatalogEntry = CatalogEntry::command("format_sd", 117, 1);
    pub static INITIATE_DOWNLOAD_BURST: CatalogEntry =
        CatalogEntry::command("initiate_download_burst", 119, 2);

    pub static SET_HOLE_MAP: [CatalogEntry; 8] = [
        CatalogEntry::command("set_hole_map1", 120, 16),
        CatalogEntry::command("set_hole_map2", 121, 16),
        CatalogEntry::command("set_hole_map3", 122, 16),
        CatalogEntry::command("set_hole_map4", 123, 16),
        CatalogEntry::command("set_hole_map5", 124, 16),
        CatalogEntry::command("set_hole_map6", 125, 16),
        CatalogEntry::command("set_hole_map7", 126, 16),
        CatalogEntry::command("set_hole_map8", 127, 16),
    ];
}

/// Telemetry requests
pub mod tlm {
    use super::CatalogEntry;

    pub static IDENTIFICATION: CatalogEntry = CatalogEntry::telemetry("identification", 128, 8);
    pub static PROGRAM_STATUS: CatalogEntry = CatalogEntry::telemetry("program_status", 129, 6);
    pub static UNIX_TIME: CatalogEntry = CatalogEntry::telemetry("unix_time", 140, 6);
    pub static COMMS_STATUS: CatalogEntry = CatalogEntry::telemetry("comms_status", 144, 6);
    pub static ESTIMATED_ATTITUDE: CatalogEntry = CatalogEntry::telemetry("estimated_attitude", 146, 6);
    pub static ESTIMATED_RATES: CatalogEntry = CatalogEntry::telemetry("estimated_rates", 147, 6);
    pub static POSITION_LLH: CatalogEntry = CatalogEntry::telemetry("position_llh", 150, 6);
    pub static MAGNETIC_FIELD: CatalogEntry = CatalogEntry::telemetry("magnetic_field", 151, 6);
    pub static FINE_SUN_VECTOR: CatalogEntry = CatalogEntry::telemetry("fine_sun_vector", 153, 6);
    pub static NADIR_VECTOR: CatalogEntry = CatalogEntry::telemetry("nadir_vector", 154, 6);
    pub static RATE_SENSOR: CatalogEntry = CatalogEntry::telemetry("rate_sensor", 155, 6);
    pub static WHEEL_SPEED: CatalogEntry = CatalogEntry::telemetry("wheel_speed", 156, 6);
    pub static MAGNETORQUER_COMMAND: CatalogEntry = CatalogEntry::telemetry("magnetorquer_command", 157, 6);
    pub static COMMANDED_WHEEL_SPEED: CatalogEntry =
        CatalogEntry::telemetry("commanded_wheel_speed", 158, 6);
    pub static IGRF_FIELD: CatalogEntry = CatalogEntry::telemetry("igrf_field", 159, 6);
    pub static QUATERNION_ERROR: CatalogEntry = CatalogEntry::telemetry("quaternion_error", 161, 6);
    pub static GYRO_BIAS: CatalogEntry = CatalogEntry::telemetry("gyro_bias", 162, 6);
    pub static INNOVATION: CatalogEntry = CatalogEntry::telemetry("innovation", 163, 6);
    pub static RAW_CAM2: CatalogEntry = CatalogEntry::telemetry("raw_cam2", 166, 6);
    pub static RAW_CAM1: CatalogEntry = CatalogEntry::telemetry("raw_cam1", 167, 6);
    pub static RAW_CSS_1_TO_6: CatalogEntry = CatalogEntry::telemetry("raw_css_1_to_6", 168, 6);
    pub static RAW_CSS_7_TO_10: CatalogEntry = CatalogEntry::telemetry("raw_css_7_to_10", 169, 4);
    pub static RAW_MAGNETOMETER: CatalogEntry = CatalogEntry::telemetry("raw_magnetometer", 170, 6);
    pub static CUBECONTROL_CURRENT: CatalogEntry = CatalogEntry::telemetry("cubecontrol_current", 172, 6);
    pub static WHEEL_CURRENTS: CatalogEntry = CatalogEntry::telemetry("wheel_currents", 173, 6);
    pub static CUBESENSE_CURRENTS: CatalogEntry = CatalogEntry::telemetry("cubesense_currents", 174, 8);
    pub static MISC_CURRENTS: CatalogEntry = CatalogEntry::telemetry("misc_currents", 175, 6);
    pub static GPS_STATUS: CatalogEntry = CatalogEntry::telemetry("gps_status", 176, 6);
    pub static GPS_TIME: CatalogEntry = CatalogEntry::telemetry("gps_time", 177, 6);
    pub static GPS_X: CatalogEntry = CatalogEntry::telemetry("gps_x", 178, 6);
    pub static GPS_Y: CatalogEntry = CatalogEntry::telemetry("gps_y", 179, 6);
    pub static GPS_Z: CatalogEntry = CatalogEntry::telemetry("gps_z", 180, 6);
    pub static FINE_RATES: CatalogEntry = CatalogEntry::telemetry("fine_rates", 181, 6);
    pub static CURRENT_STATE: CatalogEntry = CatalogEntry::telemetry("current_state", 190, 6);
    pub static MEASUREMENTS: CatalogEntry = CatalogEntry::telemetry("measurements", 191, 72);
    pub static ACP_STATE: CatalogEntry = CatalogEntry::telemetry("acp_state", 196, 3);
    pub static POWER_CONTROL: CatalogEntry = CatalogEntry::telemetry("power_control", 197, 3);
    pub static COMMANDED_ATTITUDE: CatalogEntry = CatalogEntry::telemetry("commanded_attitude", 199, 6);
    pub static ASGP4_PARAMS: CatalogEntry = CatalogEntry::telemetry("asgp4_params", 200, 30);
    pub static TRACKING_TARGET: CatalogEntry = CatalogEntry::telemetry("tracking_target", 201, 12);
    pub static MAGNETOMETER_CONFIG: CatalogEntry = CatalogEntry::telemetry("magnetometer_config", 204, 30);
    pub static RATE_GYRO_CONFIG: CatalogEntry = CatalogEntry::telemetry("rate_gyro_config", 207, 10);
    pub static RAW_STAR_TRACKER: CatalogEntry = CatalogEntry::telemetry("raw_star_tracker", 211, 54);
    pub static ESTIMATION_PARAMS: CatalogEntry = CatalogEntry::telemetry("estimation_params", 223, 31);
    pub static UNIX_TIME_SAVE_MODE: CatalogEntry = CatalogEntry::telemetry("unix_time_save_mode", 227, 2);
    pub static SGP4_ORBIT_PARAMS: CatalogEntry = CatalogEntry::telemetry("sgp4_orbit_params", 230, 64);
    pub static SD_FORMAT_PROGRESS: CatalogEntry = CatalogEntry::telemetry("sd_format_progress", 234, 1);
    pub static SD_LOG1_CONFIG: CatalogEntry = CatalogEntry::telemetry("sd_log1_config", 235, 13);
    pub static SD_LOG2_CONFIG: CatalogEntry = CatalogEntry::telemetry("sd_log2_config", 236, 13);
    pub static ACK: CatalogEntry = CatalogEntry::telemetry("ack", 240, 4);
    pub static DOWNLOAD_BUFFER: CatalogEntry = CatalogEntry::telemetry("download_buffer", 241, 22);
    pub static DOWNLOAD_BLOCK_READY: CatalogEntry = CatalogEntry::telemetry("download_block_ready", 242, 5);
    pub static FILE_INFO: CatalogEntry = CatalogEntry::telemetry("file_info", 243, 12);

    pub static HOLE_MAP: [CatalogEntry; 8] = [
        CatalogEntry::telemetry("hole_map1", 247, 16),
        CatalogEntry::telemetry("hole_map2", 248, 16),
        CatalogEntry::telemetry("hole_map3", 249, 16),
        CatalogEntry::telemetry("hole_map4", 250, 16),
        CatalogEntry::telemetry("hole_map5", 251, 16),
        CatalogEntry::telemetry("hole_map6", 252, 16),
        CatalogEntry::telemetry("hole_map7", 253, 16),
        CatalogEntry::telemetry("hole_map8", 254, 16),
    ];
}

/// Every entry, telecommands first
pub static CATALOG: &[&CatalogEntry] = &[
    &tc::RESET,
    &tc::SET_UNIX_TIME,
    &tc::DEPLOY_MAGNETOMETER,
    &tc::UNIX_TIME_SAVE_MODE,
    &tc::RUN_MODE,
    &tc::POWER_CONTROL,
    &tc::CLEAR_ERRORS,
    &tc::CONTROL_MODE,
    &tc::ESTIMATION_MODE,
    &tc::COMMANDED_ATTITUDE,
    &tc::MAGNETORQUER_OUTPUT,
    &tc::WHEEL_SPEED,
    &tc::RUN_ONCE,
    &tc::MAGNETOMETER_CONFIG,
    &tc::ESTIMATION_PARAMS,
    &tc::ASGP4_PARAMS,
    &tc::RATE_GYRO_CONFIG,
    &tc::SGP4_ORBIT_PARAMS,
    &tc::TRACKING_TARGET,
    &tc::MAGNETOMETER_MODE,
    &tc::SAVE_CONFIG,
    &tc::SAVE_ORBIT_PARAMS,
    &tc::SAVE_IMAGE,
    &tc::BOOTLOADER_RUN_PROGRAM,
    &tc::BOOTLOADER_CLEAR_ERRORS,
    &tc::SD_LOG1_CONFIG,
    &tc::SD_LOG2_CONFIG,
    &tc::ERASE_FILE,
    &tc::LOAD_DOWNLOAD_BLOCK,
    &tc::RESET_FILE_LIST_POINTER,
    &tc::ADVANCE_FILE_LIST_POINTER,
    &tc::FORMAT_SD,
    &tc::INITIATE_DOWNLOAD_BURST,
    &tc::SET_HOLE_MAP[0],
    &tc::SET_HOLE_MAP[1],
    &tc::SET_HOLE_MAP[2],
    &tc::SET_HOLE_MAP[3],
    &tc::SET_HOLE_MAP[4],
    &tc::SET_HOLE_MAP[5],
    &tc::SET_HOLE_MAP[6],
    &tc::SET_HOLE_MAP[7],
    &tlm::IDENTIFICATION,
    &tlm::PROGRAM_STATUS,
    &tlm::UNIX_TIME,
    &tlm::COMMS_STATUS,
    &tlm::ESTIMATED_ATTITUDE,
    &tlm::ESTIMATED_RATES,
    &tlm::POSITION_LLH,
    &tlm::MAGNETIC_FIELD,
    &tlm::FINE_SUN_VECTOR,
    &tlm::NADIR_VECTOR,
    &tlm::RATE_SENSOR,
    &tlm::WHEEL_SPEED,
    &tlm::MAGNETORQUER_COMMAND,
    &tlm::COMMANDED_WHEEL_SPEED,
    &tlm::IGRF_FIELD,
    &tlm::QUATERNION_ERROR,
    &tlm::GYRO_BIAS,
    &tlm::INNOVATION,
    &tlm::RAW_CAM2,
    &tlm::RAW_CAM1,
    &tlm::RAW_CSS_1_TO_6,
    &tlm::RAW_CSS_7_TO_10,
    &tlm::RAW_MAGNETOMETER,
    &tlm::CUBECONTROL_CURRENT,
    &tlm::WHEEL_CURRENTS,
    &tlm::CUBESENSE_CURRENTS,
    &tlm::MISC_CURRENTS,
    &tlm::GPS_STATUS,
    &tlm::GPS_TIME,
    &tlm::GPS_X,
    &tlm::GPS_Y,
    &tlm::GPS_Z,
    &tlm::FINE_RATES,
    &tlm::CURRENT_STATE,
    &tlm::MEASUREMENTS,
    &tlm::ACP_STATE,
    &tlm::POWER_CONTROL,
    &tlm::COMMANDED_ATTITUDE,
    &tlm::ASGP4_PARAMS,
    &tlm::TRACKING_TARGET,
    &tlm::MAGNETOMETER_CONFIG,
    &tlm::RATE_GYRO_CONFIG,
    &tlm::RAW_STAR_TRACKER,
    &tlm::ESTIMATION_PARAMS,
    &tlm::UNIX_TIME_SAVE_MODE,
    &tlm::SGP4_ORBIT_PARAMS,
    &tlm::SD_FORMAT_PROGRESS,
    &tlm::SD_LOG1_CONFIG,
    &tlm::SD_LOG2_CONFIG,
    &tlm::ACK,
    &tlm::DOWNLOAD_BUFFER,
    &tlm::DOWNLOAD_BLOCK_READY,
    &tlm::FILE_INFO,
    &tlm::HOLE_MAP[0],
    &tlm::HOLE_MAP[1],
    &tlm::HOLE_MAP[2],
    &tlm::HOLE_MAP[3],
    &tlm::HOLE_MAP[4],
    &tlm::HOLE_MAP[5],
    &tlm::HOLE_MAP[6],
    &tlm::HOLE_MAP[7],
];

/// Find the entry for a raw wire identifier
#[must_use]
pub fn lookup(id: u8) -> Option<&'static CatalogEntry> {
    CATALOG.iter().copied().find(|entry| entry.id.raw() == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::codec::commands::{
        ClearErrors, DeployMagnetometer, MagicGuard, MagnetorquerOutput, NoArgs, SaveImage,
        SetControlMode,
    };
    use crate::codec::enums::{
        Asgp4Filter, AxisSelect, CameraSelect, ControlMode, EstimationMode, FileType, ImageSize,
        MagnetometerMode, PowerSelect, RunMode,
    };
    use crate::codec::files::{DownloadBurst, EraseFile, HoleMap, LoadDownloadBlock, SdLogConfig};
    use crate::codec::params::{
        Asgp4Params, EstimationParams, MagnetometerConfig, RateGyroConfig, Sgp4OrbitParams,
        TrackingTarget,
    };
    use crate::codec::status::{PowerControl, UnixTime, UnixTimeSaveMode};
    use crate::codec::vectors::{CommandedAttitude, WheelSpeed};
    use crate::codec::{Decode, Encode};

    #[test]
    fn test_wire_ids_unique() {
        let mut seen = HashSet::new();
        for entry in CATALOG {
            assert!(seen.insert(entry.id), "duplicate wire id {} ({})", entry.id, entry.name);
        }
    }

    #[test]
    fn test_names_unique_within_direction() {
        let mut seen = HashSet::new();
        for entry in CATALOG {
            assert!(seen.insert((entry.direction(), entry.name)), "duplicate name {}", entry.name);
        }
    }

    #[test]
    fn test_direction_bit() {
        for entry in tc::SET_HOLE_MAP.iter().chain([&tc::RESET, &tc::INITIATE_DOWNLOAD_BURST]) {
            assert_eq!(entry.direction(), Direction::Command);
            assert!(entry.id.raw() < 128);
        }
        for entry in CATALOG.iter().filter(|e| e.id.raw() >= 128) {
            assert_eq!(entry.direction(), Direction::Telemetry, "{}", entry.name);
        }
    }

    #[test]
    fn test_fire_and_forget_entries() {
        let fire_and_forget: Vec<&str> = CATALOG
            .iter()
            .filter(|e| e.ack == AckPolicy::FireAndForget)
            .map(|e| e.name)
            .collect();

        assert_eq!(
            fire_and_forget,
            vec!["reset", "bootloader_run_program", "bootloader_clear_errors"]
        );
        assert!(!tc::BOOTLOADER_RUN_PROGRAM.checksum);
        assert!(tc::RESET.checksum);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup(240).map(|e| e.name), Some("ack"));
        assert_eq!(lookup(0x0A).map(|e| e.length), Some(1));
        assert!(lookup(0).is_none());
        assert!(lookup(255).is_none());
    }

    fn assert_encoded_len(entry: &CatalogEntry, payload: &impl Encode) {
        let bytes = payload.encode().unwrap();
        assert_eq!(bytes.len(), entry.length, "encoder for {}", entry.name);
    }

    #[test]
    fn test_encoder_lengths_match_catalog() {
        assert_encoded_len(&tc::RESET, &MagicGuard);
        assert_encoded_len(&tc::FORMAT_SD, &MagicGuard);
        assert_encoded_len(&tc::SET_UNIX_TIME, &UnixTime { epoch_ms: 1_730_251_606_610 });
        assert_encoded_len(&tc::DEPLOY_MAGNETOMETER, &DeployMagnetometer { timeout_s: 10 });
        assert_encoded_len(
            &tc::UNIX_TIME_SAVE_MODE,
            &UnixTimeSaveMode { save_now: true, save_on_update: false, save_periodic: true, period_s: 60 },
        );
        assert_encoded_len(&tc::RUN_MODE, &RunMode::Enabled);
        assert_encoded_len(&tc::POWER_CONTROL, &PowerControl::all(PowerSelect::On));
        assert_encoded_len(&tc::CLEAR_ERRORS, &ClearErrors);
        assert_encoded_len(
            &tc::CONTROL_MODE,
            &SetControlMode { mode: ControlMode::XyzWheel, timeout_s: 0xFFFF },
        );
        assert_encoded_len(&tc::ESTIMATION_MODE, &EstimationMode::MemsRateSensing);
        assert_encoded_len(
            &tc::COMMANDED_ATTITUDE,
            &CommandedAttitude { roll_mdeg: 1000, pitch_mdeg: -1000, yaw_mdeg: 0 },
        );
        assert_encoded_len(
            &tc::MAGNETORQUER_OUTPUT,
            &MagnetorquerOutput { x_permille: 1, y_permille: 2, z_permille: 3 },
        );
        assert_encoded_len(&tc::WHEEL_SPEED, &WheelSpeed { x_rpm: 100, y_rpm: 0, z_rpm: -100 });
        assert_encoded_len(&tc::RUN_ONCE, &NoArgs);
        assert_encoded_len(&tc::SAVE_CONFIG, &NoArgs);
        assert_encoded_len(&tc::SAVE_ORBIT_PARAMS, &NoArgs);
        assert_encoded_len(&tc::BOOTLOADER_RUN_PROGRAM, &NoArgs);
        assert_encoded_len(&tc::BOOTLOADER_CLEAR_ERRORS, &NoArgs);
        assert_encoded_len(&tc::RESET_FILE_LIST_POINTER, &NoArgs);
        assert_encoded_len(&tc::ADVANCE_FILE_LIST_POINTER, &NoArgs);
        assert_encoded_len(&tc::MAGNETOMETER_MODE, &MagnetometerMode::MainSignal);
        assert_encoded_len(
            &tc::MAGNETOMETER_CONFIG,
            &MagnetometerConfig::decode(&[0u8; 30]).unwrap(),
        );
        assert_encoded_len(&tc::ESTIMATION_PARAMS, &EstimationParams::decode(&[0u8; 31]).unwrap());
        let asgp4 = Asgp4Params::decode(&[0u8; 30]).unwrap();
        assert_eq!(asgp4.filter, Asgp4Filter::Lowpass);
        assert_encoded_len(&tc::ASGP4_PARAMS, &asgp4);
        assert_encoded_len(
            &tc::RATE_GYRO_CONFIG,
            &RateGyroConfig::new([AxisSelect::PositiveX; 3], [0, 0, 0], 1),
        );
        assert_encoded_len(&tc::SGP4_ORBIT_PARAMS, &Sgp4OrbitParams::decode(&[0u8; 64]).unwrap());
        assert_encoded_len(
            &tc::TRACKING_TARGET,
            &TrackingTarget { longitude_deg: 0.0, latitude_deg: 0.0, altitude_m: 0.0 },
        );
        assert_encoded_len(
            &tc::SAVE_IMAGE,
            &SaveImage { camera: CameraSelect::Cam1, size: ImageSize::Size1024 },
        );
        assert_encoded_len(&tc::SD_LOG1_CONFIG, &SdLogConfig::disabled());
        assert_encoded_len(&tc::SD_LOG2_CONFIG, &SdLogConfig::disabled());
        assert_encoded_len(
            &tc::ERASE_FILE,
            &EraseFile { file_type: FileType::BmpImage, counter: 1, erase_all: false },
        );
        assert_encoded_len(
            &tc::LOAD_DOWNLOAD_BLOCK,
            &LoadDownloadBlock { file_type: FileType::TelemetryLog, counter: 0, offset: 0, block_length: 1024 },
        );
        assert_encoded_len(&tc::INITIATE_DOWNLOAD_BURST, &DownloadBurst { ignore_hole_map: false });
        for entry in &tc::SET_HOLE_MAP {
            assert_encoded_len(entry, &HoleMap::default());
        }
    }
}
