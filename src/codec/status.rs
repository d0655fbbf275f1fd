//! # Status Records
//!
//! Identification, boot and communication status, power switching, time keeping and the
//! packed ADCS state summary.

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;

use super::bits::BitField;
use super::enums::{
    Asgp4Mode, BootCause, ControlMode, EstimationMode, ExecutionPoint, PowerSelect, ResetCause,
    RunMode, RunningProgram,
};
use super::{expect_len, Decode, Encode};
use crate::error::{AdcsError, Result};
use crate::protocol::bytes::{split_u16, split_u32, u16_at, u32_at};

/// Node identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Identification {
    pub node_type: u8,
    pub interface_version: u8,
    pub firmware_major: u8,
    pub firmware_minor: u8,
    pub seconds_since_startup: u16,
    pub ms_past_second: u16,
}

impl Decode for Identification {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 8, "identification")?;
        Ok(Self {
            node_type: payload[0],
            interface_version: payload[1],
            firmware_major: payload[2],
            firmware_minor: payload[3],
            seconds_since_startup: u16_at(payload, 4),
            ms_past_second: u16_at(payload, 6),
        })
    }
}

/// Boot and running program status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgramStatus {
    pub reset_cause: ResetCause,
    pub boot_cause: BootCause,
    pub boot_counter: u16,
    pub running_program: RunningProgram,
    pub firmware_major: u8,
    pub firmware_minor: u8,
}

const RESET_CAUSE: BitField = BitField::new(0, 4, 4);
const BOOT_CAUSE: BitField = BitField::new(0, 0, 4);

impl Decode for ProgramStatus {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 6, "program status")?;
        Ok(Self {
            reset_cause: ResetCause::decode_raw(RESET_CAUSE.get(payload))?,
            boot_cause: BootCause::decode_raw(BOOT_CAUSE.get(payload))?,
            boot_counter: u16_at(payload, 1),
            running_program: RunningProgram::decode_raw(payload[3])?,
            firmware_major: payload[4],
            firmware_minor: payload[5],
        })
    }
}

/// Bus communication counters and error flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommsStatus {
    pub telecommand_counter: u16,
    pub telemetry_counter: u16,
    pub telecommand_buffer_overrun: bool,
    pub telemetry_error: bool,
    pub telecommand_error: bool,
}

const TC_BUFFER_OVERRUN: BitField = BitField::flag(4, 7);
const TLM_ERROR: BitField = BitField::flag(4, 4);
const TC_ERROR: BitField = BitField::flag(4, 3);

impl Decode for CommsStatus {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 6, "comms status")?;
        Ok(Self {
            telecommand_counter: u16_at(payload, 0),
            telemetry_counter: u16_at(payload, 2),
            telecommand_buffer_overrun: TC_BUFFER_OVERRUN.is_set(payload),
            telemetry_error: TLM_ERROR.is_set(payload),
            telecommand_error: TC_ERROR.is_set(payload),
        })
    }
}

/// Power switch selection for every peripheral
///
/// Two bits per peripheral, lowest bits first within each byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PowerControl {
    pub cubecontrol_signal: PowerSelect,
    pub cubecontrol_motor: PowerSelect,
    pub cubesense1: PowerSelect,
    pub cubesense2: PowerSelect,
    pub cubestar: PowerSelect,
    pub cubewheel1: PowerSelect,
    pub cubewheel2: PowerSelect,
    pub cubewheel3: PowerSelect,
    pub motor: PowerSelect,
    pub gps: PowerSelect,
}

const POWER_LAYOUT: [BitField; 10] = [
    BitField::new(0, 0, 2),
    BitField::new(0, 2, 2),
    BitField::new(0, 4, 2),
    BitField::new(0, 6, 2),
    BitField::new(1, 0, 2),
    BitField::new(1, 2, 2),
    BitField::new(1, 4, 2),
    BitField::new(1, 6, 2),
    BitField::new(2, 0, 2),
    BitField::new(2, 2, 2),
];

impl PowerControl {
    /// Same selection for every peripheral
    #[must_use]
    pub const fn all(select: PowerSelect) -> Self {
        Self {
            cubecontrol_signal: select,
            cubecontrol_motor: select,
            cubesense1: select,
            cubesense2: select,
            cubestar: select,
            cubewheel1: select,
            cubewheel2: select,
            cubewheel3: select,
            motor: select,
            gps: select,
        }
    }

    /// Everything off except the CubeControl signal and motor supplies, which keep their state
    #[must_use]
    pub const fn peripherals_off() -> Self {
        let mut control = Self::all(PowerSelect::Off);
        control.cubecontrol_signal = PowerSelect::Same;
        control.cubecontrol_motor = PowerSelect::Same;
        control
    }

    fn fields(&self) -> [PowerSelect; 10] {
        [
            self.cubecontrol_signal,
            self.cubecontrol_motor,
            self.cubesense1,
            self.cubesense2,
            self.cubestar,
            self.cubewheel1,
            self.cubewheel2,
            self.cubewheel3,
            self.motor,
            self.gps,
        ]
    }
}

impl Decode for PowerControl {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 3, "power control")?;

        let mut selects = [PowerSelect::Off; 10];
        for (select, field) in selects.iter_mut().zip(POWER_LAYOUT.iter()) {
            *select = PowerSelect::decode_raw(field.get(payload))?;
        }

        let [cubecontrol_signal, cubecontrol_motor, cubesense1, cubesense2, cubestar, cubewheel1, cubewheel2, cubewheel3, motor, gps] =
            selects;

        Ok(Self {
            cubecontrol_signal,
            cubecontrol_motor,
            cubesense1,
            cubesense2,
            cubestar,
            cubewheel1,
            cubewheel2,
            cubewheel3,
            motor,
            gps,
        })
    }
}

impl Encode for PowerControl {
    fn encode(&self) -> Result<Bytes> {
        let mut payload = [0u8; 3];
        for (select, field) in self.fields().iter().zip(POWER_LAYOUT.iter()) {
            field.put(&mut payload, select.raw());
        }
        Ok(Bytes::copy_from_slice(&payload))
    }
}

/// Device clock as milliseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnixTime {
    pub epoch_ms: u64,
}

impl Decode for UnixTime {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 6, "unix time")?;
        let seconds = u64::from(u32_at(payload, 0));
        let millis = u64::from(u16_at(payload, 4));
        Ok(Self { epoch_ms: seconds * 1000 + millis })
    }
}

impl Encode for UnixTime {
    fn encode(&self) -> Result<Bytes> {
        let seconds = u32::try_from(self.epoch_ms / 1000).map_err(|_| {
            AdcsError::InvalidArgument(format!("epoch {} ms is past the 32-bit seconds range", self.epoch_ms))
        })?;
        // Always below 1000
        let millis = (self.epoch_ms % 1000) as u16;

        let mut payload = BytesMut::with_capacity(6);
        payload.put_slice(&split_u32(seconds));
        payload.put_slice(&split_u16(millis));
        Ok(payload.freeze())
    }
}

/// When the device persists its clock to flash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnixTimeSaveMode {
    pub save_now: bool,
    pub save_on_update: bool,
    pub save_periodic: bool,
    /// Save period in seconds
    pub period_s: u8,
}

const SAVE_NOW: BitField = BitField::flag(0, 0);
const SAVE_ON_UPDATE: BitField = BitField::flag(0, 1);
const SAVE_PERIODIC: BitField = BitField::flag(0, 2);

impl Decode for UnixTimeSaveMode {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 2, "unix time save mode")?;
        Ok(Self {
            save_now: SAVE_NOW.is_set(payload),
            save_on_update: SAVE_ON_UPDATE.is_set(payload),
            save_periodic: SAVE_PERIODIC.is_set(payload),
            period_s: payload[1],
        })
    }
}

impl Encode for UnixTimeSaveMode {
    fn encode(&self) -> Result<Bytes> {
        let mut payload = [0u8, self.period_s];
        SAVE_NOW.put_flag(&mut payload, self.save_now);
        SAVE_ON_UPDATE.put_flag(&mut payload, self.save_on_update);
        SAVE_PERIODIC.put_flag(&mut payload, self.save_periodic);
        Ok(Bytes::copy_from_slice(&payload))
    }
}

/// Where the ACP main loop is and how long it has been there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AcpExecutionState {
    pub ms_since_iteration_start: u16,
    pub execution_point: ExecutionPoint,
}

impl Decode for AcpExecutionState {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 3, "ACP execution state")?;
        Ok(Self {
            ms_since_iteration_start: u16_at(payload, 0),
            execution_point: ExecutionPoint::decode_raw(payload[2])?,
        })
    }
}

/// Packed summary of modes, enabled peripherals and error flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrentState {
    pub estimation_mode: EstimationMode,
    pub control_mode: ControlMode,
    pub run_mode: RunMode,
    pub asgp4_mode: Asgp4Mode,

    pub cubecontrol_signal_enabled: bool,
    pub cubecontrol_motor_enabled: bool,
    pub cubesense1_enabled: bool,
    pub cubesense2_enabled: bool,
    pub cubewheel1_enabled: bool,
    pub cubewheel2_enabled: bool,
    pub cubewheel3_enabled: bool,
    pub cubestar_enabled: bool,
    pub gps_receiver_enabled: bool,
    pub gps_lna_power_enabled: bool,
    pub motor_driver_enabled: bool,
    pub sun_above_local_horizon: bool,

    pub cubesense1_comm_error: bool,
    pub cubesense2_comm_error: bool,
    pub cubecontrol_signal_comm_error: bool,
    pub cubecontrol_motor_comm_error: bool,
    pub cubewheel1_comm_error: bool,
    pub cubewheel2_comm_error: bool,
    pub cubewheel3_comm_error: bool,
    pub cubestar_comm_error: bool,

    pub magnetometer_range_error: bool,
    pub cam1_sram_overcurrent: bool,
    pub cam1_3v3_overcurrent: bool,
    pub cam1_busy_error: bool,
    pub cam1_detection_error: bool,
    pub sun_sensor_range_error: bool,
    pub cam2_sram_overcurrent: bool,
    pub cam2_3v3_overcurrent: bool,
    pub cam2_busy_error: bool,
    pub cam2_detection_error: bool,
    pub nadir_sensor_range_error: bool,
    pub rate_sensor_range_error: bool,
    pub wheel_speed_range_error: bool,
    pub coarse_sun_sensor_error: bool,
    pub startracker_match_error: bool,
    pub startracker_overcurrent: bool,
}

/// Bit layout of the current state record
mod state_layout {
    use super::BitField;

    pub const ESTIMATION_MODE: BitField = BitField::new(0, 0, 4);
    pub const CONTROL_MODE: BitField = BitField::new(0, 4, 4);
    pub const RUN_MODE: BitField = BitField::new(1, 0, 2);
    pub const ASGP4_MODE: BitField = BitField::new(1, 2, 2);

    /// Byte 1 bits 4-7, then all of byte 2
    pub const ENABLED: [BitField; 12] = [
        BitField::flag(1, 4),
        BitField::flag(1, 5),
        BitField::flag(1, 6),
        BitField::flag(1, 7),
        BitField::flag(2, 0),
        BitField::flag(2, 1),
        BitField::flag(2, 2),
        BitField::flag(2, 3),
        BitField::flag(2, 4),
        BitField::flag(2, 5),
        BitField::flag(2, 6),
        BitField::flag(2, 7),
    ];

    /// Bytes 3 to 5, lowest bit first
    pub const fn error(index: usize) -> BitField {
        BitField::flag(3 + index / 8, (index % 8) as u8)
    }
}

impl Decode for CurrentState {
    fn decode(payload: &[u8]) -> Result<Self> {
        use state_layout::{error, ASGP4_MODE, CONTROL_MODE, ENABLED, ESTIMATION_MODE, RUN_MODE};

        expect_len(payload, 6, "current state")?;

        let enabled = |i: usize| ENABLED[i].is_set(payload);
        let err = |i: usize| error(i).is_set(payload);

        Ok(Self {
            estimation_mode: EstimationMode::decode_raw(ESTIMATION_MODE.get(payload))?,
            control_mode: ControlMode::decode_raw(CONTROL_MODE.get(payload))?,
            run_mode: RunMode::decode_raw(RUN_MODE.get(payload))?,
            asgp4_mode: Asgp4Mode::decode_raw(ASGP4_MODE.get(payload))?,

            cubecontrol_signal_enabled: enabled(0),
            cubecontrol_motor_enabled: enabled(1),
            cubesense1_enabled: enabled(2),
            cubesense2_enabled: enabled(3),
            cubewheel1_enabled: enabled(4),
            cubewheel2_enabled: enabled(5),
            cubewheel3_enabled: enabled(6),
            cubestar_enabled: enabled(7),
            gps_receiver_enabled: enabled(8),
            gps_lna_power_enabled: enabled(9),
            motor_driver_enabled: enabled(10),
            sun_above_local_horizon: enabled(11),

            cubesense1_comm_error: err(0),
            cubesense2_comm_error: err(1),
            cubecontrol_signal_comm_error: err(2),
            cubecontrol_motor_comm_error: err(3),
            cubewheel1_comm_error: err(4),
            cubewheel2_comm_error: err(5),
            cubewheel3_comm_error: err(6),
            cubestar_comm_error: err(7),

            magnetometer_range_error: err(8),
            cam1_sram_overcurrent: err(9),
            cam1_3v3_overcurrent: err(10),
            cam1_busy_error: err(11),
            cam1_detection_error: err(12),
            sun_sensor_range_error: err(13),
            cam2_sram_overcurrent: err(14),
            cam2_3v3_overcurrent: err(15),
            cam2_busy_error: err(16),
            cam2_detection_error: err(17),
            nadir_sensor_range_error: err(18),
            rate_sensor_range_error: err(19),
            wheel_speed_range_error: err(20),
            coarse_sun_sensor_error: err(21),
            startracker_match_error: err(22),
            startracker_overcurrent: err(23),
        })
    }
}
