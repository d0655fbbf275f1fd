//! # Sensor Records
//!
//! Raw sensor telemetry: cameras, coarse sun sensors, GPS, the star tracker and current
//! measurements.

use serde::Serialize;

use super::bits::BitField;
use super::enums::{CaptureResult, DetectResult, GpsSolutionStatus};
use super::vectors::Vector3;
use super::{expect_len, Decode};
use crate::error::Result;
use crate::protocol::bytes::{i16_at, i32_at, u16_at, u32_at};

/// Raw sun or nadir camera detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RawCamSensor {
    pub centroid_x: i16,
    pub centroid_y: i16,
    pub capture_result: CaptureResult,
    pub detect_result: DetectResult,
}

impl Decode for RawCamSensor {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 6, "raw cam sensor")?;
        Ok(Self {
            centroid_x: i16_at(payload, 0),
            centroid_y: i16_at(payload, 2),
            capture_result: CaptureResult::decode_raw(payload[4])?,
            detect_result: DetectResult::decode_raw(payload[5])?,
        })
    }
}

/// Raw coarse sun sensors 1 to 6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RawCss1To6 {
    pub css: [u8; 6],
}

impl Decode for RawCss1To6 {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 6, "raw CSS 1-6")?;
        let mut css = [0u8; 6];
        css.copy_from_slice(payload);
        Ok(Self { css })
    }
}

/// Raw coarse sun sensors 7 to 10
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RawCss7To10 {
    pub css: [u8; 4],
}

impl Decode for RawCss7To10 {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 4, "raw CSS 7-10")?;
        let mut css = [0u8; 4];
        css.copy_from_slice(payload);
        Ok(Self { css })
    }
}

/// CubeControl supply currents
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CubeControlCurrent {
    pub supply_3v3_ma: f64,
    pub supply_5v_ma: f64,
    pub supply_vbat_ma: f64,
}

/// One raw count is 1/2.048 mA
const CUBECONTROL_MA_PER_COUNT: f64 = 0.488_281_25;

impl Decode for CubeControlCurrent {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 6, "CubeControl current")?;
        let ma = |offset| f64::from(u16_at(payload, offset)) * CUBECONTROL_MA_PER_COUNT;
        Ok(Self {
            supply_3v3_ma: ma(0),
            supply_5v_ma: ma(2),
            supply_vbat_ma: ma(4),
        })
    }
}

/// Reaction wheel currents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WheelCurrents {
    pub wheel1_ua: u32,
    pub wheel2_ua: u32,
    pub wheel3_ua: u32,
}

impl Decode for WheelCurrents {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 6, "wheel currents")?;
        let ua = |offset| u32::from(u16_at(payload, offset)) * 10;
        Ok(Self {
            wheel1_ua: ua(0),
            wheel2_ua: ua(2),
            wheel3_ua: ua(4),
        })
    }
}

/// CubeSense camera currents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CubeSenseCurrents {
    pub cubesense1_3v3_ua: u32,
    pub cubesense1_sram_ua: u32,
    pub cubesense2_3v3_ua: u32,
    pub cubesense2_sram_ua: u32,
}

impl Decode for CubeSenseCurrents {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 8, "CubeSense currents")?;
        let ua = |offset| u32::from(u16_at(payload, offset)) * 100;
        Ok(Self {
            cubesense1_3v3_ua: ua(0),
            cubesense1_sram_ua: ua(2),
            cubesense2_3v3_ua: ua(4),
            cubesense2_sram_ua: ua(6),
        })
    }
}

/// Star tracker and magnetorquer currents plus the star tracker MCU temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MiscCurrents {
    pub cubestar_ua: u32,
    pub magnetorquer_ua: u32,
    pub cubestar_mcu_temperature_mdegc: i32,
}

impl Decode for MiscCurrents {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 6, "misc currents")?;
        Ok(Self {
            cubestar_ua: u32::from(u16_at(payload, 0)) * 10,
            magnetorquer_ua: u32::from(u16_at(payload, 2)) * 100,
            cubestar_mcu_temperature_mdegc: i32::from(i16_at(payload, 4)) * 10,
        })
    }
}

/// GPS receiver solution summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GpsStatus {
    pub solution_status: GpsSolutionStatus,
    pub tracked_satellites: u8,
    pub used_satellites: u8,
    pub xyz_log_counter: u8,
    pub range_log_counter: u8,
    pub response_message: u8,
}

impl Decode for GpsStatus {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 6, "GPS status")?;
        Ok(Self {
            solution_status: GpsSolutionStatus::decode_raw(payload[0])?,
            tracked_satellites: payload[1],
            used_satellites: payload[2],
            xyz_log_counter: payload[3],
            range_log_counter: payload[4],
            response_message: payload[5],
        })
    }
}

/// GPS reference time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GpsTime {
    pub week: u16,
    pub time_of_week_ms: u32,
}

impl Decode for GpsTime {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 6, "GPS time")?;
        Ok(Self {
            week: u16_at(payload, 0),
            time_of_week_ms: u32_at(payload, 2),
        })
    }
}

/// ECEF position and velocity along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GpsAxis {
    pub position_m: i32,
    pub velocity_m_per_s: i16,
}

impl Decode for GpsAxis {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 6, "GPS axis")?;
        Ok(Self {
            position_m: i32_at(payload, 0),
            velocity_m_per_s: i16_at(payload, 4),
        })
    }
}

/// One star as seen by the star tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrackedStar {
    pub confidence: u8,
    pub magnitude: u16,
    pub catalogue_number: u16,
    pub centroid_x: i16,
    pub centroid_y: i16,
}

/// Raw star tracker telemetry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RawStarTracker {
    pub stars_detected: u8,
    pub image_noise: u8,
    pub invalid_stars: u8,
    pub stars_identified: u8,
    pub identification_mode: u8,
    pub image_dark_value: u8,

    pub image_capture_success: bool,
    pub detection_success: bool,
    pub identification_success: bool,
    pub attitude_success: bool,
    pub processing_time_error: bool,
    pub tracking_module_enabled: bool,
    pub prediction_enabled: bool,
    pub comms_error: bool,

    pub sample_period: u16,
    pub stars: [TrackedStar; 3],

    pub capture_ms: u16,
    pub detection_ms: u16,
    pub identification_ms: u16,

    pub estimated_rates_udeg_per_s: Vector3,
    /// Vector part q1, q2, q3 in millionths
    pub estimated_quaternion_micro: [i32; 3],
}

/// Status flags in byte 6, lowest bit first
const STAR_TRACKER_FLAGS: [BitField; 8] = [
    BitField::flag(6, 0),
    BitField::flag(6, 1),
    BitField::flag(6, 2),
    BitField::flag(6, 3),
    BitField::flag(6, 4),
    BitField::flag(6, 5),
    BitField::flag(6, 6),
    BitField::flag(6, 7),
];

impl Decode for RawStarTracker {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 54, "raw star tracker")?;

        let flag = |i: usize| STAR_TRACKER_FLAGS[i].is_set(payload);
        let scaled = |offset| i32::from(i16_at(payload, offset)) * 100;
        let star = |i: usize| TrackedStar {
            confidence: payload[9 + i],
            magnitude: u16_at(payload, 12 + 2 * i),
            catalogue_number: u16_at(payload, 18 + 6 * i),
            centroid_x: i16_at(payload, 20 + 6 * i),
            centroid_y: i16_at(payload, 22 + 6 * i),
        };

        Ok(Self {
            stars_detected: payload[0],
            image_noise: payload[1],
            invalid_stars: payload[2],
            stars_identified: payload[3],
            identification_mode: payload[4],
            image_dark_value: payload[5],

            image_capture_success: flag(0),
            detection_success: flag(1),
            identification_success: flag(2),
            attitude_success: flag(3),
            processing_time_error: flag(4),
            tracking_module_enabled: flag(5),
            prediction_enabled: flag(6),
            comms_error: flag(7),

            sample_period: u16_at(payload, 7),
            stars: [star(0), star(1), star(2)],

            capture_ms: u16_at(payload, 36),
            detection_ms: u16_at(payload, 38),
            identification_ms: u16_at(payload, 40),

            estimated_rates_udeg_per_s: Vector3 { x: scaled(42), y: scaled(44), z: scaled(46) },
            estimated_quaternion_micro: [scaled(48), scaled(50), scaled(52)],
        })
    }
}
