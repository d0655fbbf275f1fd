//! # Configuration Parameters
//!
//! Parameter blocks the ADCS stores in its configuration: orbit, magnetometer, estimator,
//! augmented SGP4, tracking target and rate gyro. Each block is written by one telecommand and
//! read back through a telemetry request of the same layout, so every record here is both
//! `Encode` and `Decode`.

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;

use super::bits::BitField;
use super::enums::{Asgp4Filter, AxisSelect, MagnetometerMode};
use super::{expect_len, narrow_i16, narrow_i32, narrow_u8, Decode, Encode};
use crate::error::Result;
use crate::protocol::bytes::{f32_at, f64_at, i16_at, i32_at, split_i16, split_i32, split_u16, u16_at};

/// SGP4 orbit elements
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sgp4OrbitParams {
    pub inclination_deg: f64,
    pub eccentricity: f64,
    pub raan_deg: f64,
    pub argument_of_perigee_deg: f64,
    pub b_star_drag: f64,
    pub mean_motion_orbits_per_day: f64,
    pub mean_anomaly_deg: f64,
    /// Epoch as year point day
    pub epoch: f64,
}

impl Sgp4OrbitParams {
    fn values(&self) -> [f64; 8] {
        [
            self.inclination_deg,
            self.eccentricity,
            self.raan_deg,
            self.argument_of_perigee_deg,
            self.b_star_drag,
            self.mean_motion_orbits_per_day,
            self.mean_anomaly_deg,
            self.epoch,
        ]
    }
}

impl Decode for Sgp4OrbitParams {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 64, "SGP4 orbit params")?;
        let at = |i: usize| f64_at(payload, i * 8);
        Ok(Self {
            inclination_deg: at(0),
            eccentricity: at(1),
            raan_deg: at(2),
            argument_of_perigee_deg: at(3),
            b_star_drag: at(4),
            mean_motion_orbits_per_day: at(5),
            mean_anomaly_deg: at(6),
            epoch: at(7),
        })
    }
}

impl Encode for Sgp4OrbitParams {
    fn encode(&self) -> Result<Bytes> {
        let mut payload = BytesMut::with_capacity(64);
        for value in self.values() {
            payload.put_f64_le(value);
        }
        Ok(payload.freeze())
    }
}

/// Magnetometer mounting and calibration
///
/// Offsets and sensitivity matrix entries are in thousandths of the device's calibration unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MagnetometerConfig {
    pub mounting_alpha_mdeg: i32,
    pub mounting_beta_mdeg: i32,
    pub mounting_gamma_mdeg: i32,
    pub channel_offsets_milli: [i32; 3],
    /// s11, s22, s33, s12, s13, s21, s23, s31, s32 in wire order
    pub sensitivity_milli: [i32; 9],
}

impl Decode for MagnetometerConfig {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 30, "magnetometer config")?;
        let raw = |offset| i32::from(i16_at(payload, offset));

        let mut channel_offsets_milli = [0; 3];
        for (i, offset) in channel_offsets_milli.iter_mut().enumerate() {
            *offset = raw(6 + 2 * i);
        }
        let mut sensitivity_milli = [0; 9];
        for (i, entry) in sensitivity_milli.iter_mut().enumerate() {
            *entry = raw(12 + 2 * i);
        }

        Ok(Self {
            mounting_alpha_mdeg: raw(0) * 10,
            mounting_beta_mdeg: raw(2) * 10,
            mounting_gamma_mdeg: raw(4) * 10,
            channel_offsets_milli,
            sensitivity_milli,
        })
    }
}

impl Encode for MagnetometerConfig {
    fn encode(&self) -> Result<Bytes> {
        let mut payload = BytesMut::with_capacity(30);
        payload.put_slice(&split_i16(narrow_i16(self.mounting_alpha_mdeg, 10, "mounting_alpha_mdeg")?));
        payload.put_slice(&split_i16(narrow_i16(self.mounting_beta_mdeg, 10, "mounting_beta_mdeg")?));
        payload.put_slice(&split_i16(narrow_i16(self.mounting_gamma_mdeg, 10, "mounting_gamma_mdeg")?));
        for offset in self.channel_offsets_milli {
            payload.put_slice(&split_i16(narrow_i16(offset, 1, "channel_offsets_milli")?));
        }
        for entry in self.sensitivity_milli {
            payload.put_slice(&split_i16(narrow_i16(entry, 1, "sensitivity_milli")?));
        }
        Ok(payload.freeze())
    }
}

/// Estimator noise parameters and sensor selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EstimationParams {
    pub magnetometer_rate_filter_system_noise: f32,
    pub ekf_system_noise: f32,
    pub css_measurement_noise: f32,
    pub sun_sensor_measurement_noise: f32,
    pub nadir_sensor_measurement_noise: f32,
    pub magnetometer_measurement_noise: f32,
    pub star_tracker_measurement_noise: f32,

    pub use_sun_sensor: bool,
    pub use_nadir_sensor: bool,
    pub use_css: bool,
    pub use_star_tracker: bool,
    pub nadir_terminator_test: bool,
    pub auto_magnetometer_recovery: bool,
    pub magnetometer_mode: MagnetometerMode,

    /// Magnetometer reported in raw magnetometer telemetry
    pub raw_magnetometer_selection: MagnetometerMode,
    pub auto_transition_on_rate_sensor_error: bool,
    pub wheel_power_up_delay: bool,

    pub error_counter_reset_period_min: u8,
}

mod estimation_layout {
    use super::BitField;

    pub const USE_SUN: BitField = BitField::flag(28, 0);
    pub const USE_NADIR: BitField = BitField::flag(28, 1);
    pub const USE_CSS: BitField = BitField::flag(28, 2);
    pub const USE_STAR_TRACKER: BitField = BitField::flag(28, 3);
    pub const NADIR_TERMINATOR_TEST: BitField = BitField::flag(28, 4);
    pub const AUTO_MAG_RECOVERY: BitField = BitField::flag(28, 5);
    pub const MAGNETOMETER_MODE: BitField = BitField::new(28, 6, 2);

    pub const RAW_MAG_SELECTION: BitField = BitField::new(29, 0, 2);
    pub const AUTO_TRANSITION: BitField = BitField::flag(29, 2);
    pub const WHEEL_DELAY: BitField = BitField::flag(29, 3);
}

impl Decode for EstimationParams {
    fn decode(payload: &[u8]) -> Result<Self> {
        use estimation_layout::*;

        expect_len(payload, 31, "estimation params")?;
        let noise = |i: usize| f32_at(payload, i * 4);

        Ok(Self {
            magnetometer_rate_filter_system_noise: noise(0),
            ekf_system_noise: noise(1),
            css_measurement_noise: noise(2),
            sun_sensor_measurement_noise: noise(3),
            nadir_sensor_measurement_noise: noise(4),
            magnetometer_measurement_noise: noise(5),
            star_tracker_measurement_noise: noise(6),

            use_sun_sensor: USE_SUN.is_set(payload),
            use_nadir_sensor: USE_NADIR.is_set(payload),
            use_css: USE_CSS.is_set(payload),
            use_star_tracker: USE_STAR_TRACKER.is_set(payload),
            nadir_terminator_test: NADIR_TERMINATOR_TEST.is_set(payload),
            auto_magnetometer_recovery: AUTO_MAG_RECOVERY.is_set(payload),
            magnetometer_mode: MagnetometerMode::decode_raw(MAGNETOMETER_MODE.get(payload))?,

            raw_magnetometer_selection: MagnetometerMode::decode_raw(RAW_MAG_SELECTION.get(payload))?,
            auto_transition_on_rate_sensor_error: AUTO_TRANSITION.is_set(payload),
            wheel_power_up_delay: WHEEL_DELAY.is_set(payload),

            error_counter_reset_period_min: payload[30],
        })
    }
}

impl Encode for EstimationParams {
    fn encode(&self) -> Result<Bytes> {
        use estimation_layout::*;

        let mut payload = [0u8; 31];
        let noises = [
            self.magnetometer_rate_filter_system_noise,
            self.ekf_system_noise,
            self.css_measurement_noise,
            self.sun_sensor_measurement_noise,
            self.nadir_sensor_measurement_noise,
            self.magnetometer_measurement_noise,
            self.star_tracker_measurement_noise,
        ];
        for (chunk, noise) in payload.chunks_exact_mut(4).zip(noises) {
            chunk.copy_from_slice(&noise.to_le_bytes());
        }

        USE_SUN.put_flag(&mut payload, self.use_sun_sensor);
        USE_NADIR.put_flag(&mut payload, self.use_nadir_sensor);
        USE_CSS.put_flag(&mut payload, self.use_css);
        USE_STAR_TRACKER.put_flag(&mut payload, self.use_star_tracker);
        NADIR_TERMINATOR_TEST.put_flag(&mut payload, self.nadir_terminator_test);
        AUTO_MAG_RECOVERY.put_flag(&mut payload, self.auto_magnetometer_recovery);
        MAGNETOMETER_MODE.put(&mut payload, self.magnetometer_mode.raw());

        RAW_MAG_SELECTION.put(&mut payload, self.raw_magnetometer_selection.raw());
        AUTO_TRANSITION.put_flag(&mut payload, self.auto_transition_on_rate_sensor_error);
        WHEEL_DELAY.put_flag(&mut payload, self.wheel_power_up_delay);

        payload[30] = self.error_counter_reset_period_min;
        Ok(Bytes::copy_from_slice(&payload))
    }
}

/// Augmented SGP4 propagator tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Asgp4Params {
    pub inclination_coefficient_milli: i32,
    pub raan_coefficient_milli: i32,
    pub eccentricity_coefficient_milli: i32,
    pub aop_coefficient_milli: i32,
    pub time_coefficient_milli: i32,
    pub position_coefficient_milli: i32,
    pub max_position_error_milli: u32,
    pub filter: Asgp4Filter,
    pub xp_coefficient_nano: i64,
    pub yp_coefficient_nano: i64,
    pub gps_roll_over: u8,
    pub position_sd_milli: u32,
    pub velocity_sd_milli: u32,
    pub min_satellites: u8,
    pub time_gain_milli: u32,
    pub max_lag_milli: u32,
    pub min_samples: u16,
}

impl Decode for Asgp4Params {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 30, "ASGP4 params")?;
        let coefficient = |offset| i32::from(i16_at(payload, offset));
        let scaled = |index: usize, factor: u32| u32::from(payload[index]) * factor;

        Ok(Self {
            inclination_coefficient_milli: coefficient(0),
            raan_coefficient_milli: coefficient(2),
            eccentricity_coefficient_milli: coefficient(4),
            aop_coefficient_milli: coefficient(6),
            time_coefficient_milli: coefficient(8),
            position_coefficient_milli: coefficient(10),
            max_position_error_milli: scaled(12, 100),
            filter: Asgp4Filter::decode_raw(payload[13])?,
            xp_coefficient_nano: i64::from(i32_at(payload, 14)) * 100,
            yp_coefficient_nano: i64::from(i32_at(payload, 18)) * 100,
            gps_roll_over: payload[22],
            position_sd_milli: scaled(23, 100),
            velocity_sd_milli: scaled(24, 10),
            min_satellites: payload[25],
            time_gain_milli: scaled(26, 10),
            max_lag_milli: scaled(27, 10),
            min_samples: u16_at(payload, 28),
        })
    }
}

impl Encode for Asgp4Params {
    fn encode(&self) -> Result<Bytes> {
        let mut payload = BytesMut::with_capacity(30);
        for (value, field) in [
            (self.inclination_coefficient_milli, "inclination_coefficient_milli"),
            (self.raan_coefficient_milli, "raan_coefficient_milli"),
            (self.eccentricity_coefficient_milli, "eccentricity_coefficient_milli"),
            (self.aop_coefficient_milli, "aop_coefficient_milli"),
            (self.time_coefficient_milli, "time_coefficient_milli"),
            (self.position_coefficient_milli, "position_coefficient_milli"),
        ] {
            payload.put_slice(&split_i16(narrow_i16(value, 1, field)?));
        }
        payload.put_u8(narrow_u8(self.max_position_error_milli, 100, "max_position_error_milli")?);
        payload.put_u8(self.filter.raw());
        payload.put_slice(&split_i32(narrow_i32(self.xp_coefficient_nano, 100, "xp_coefficient_nano")?));
        payload.put_slice(&split_i32(narrow_i32(self.yp_coefficient_nano, 100, "yp_coefficient_nano")?));
        payload.put_u8(self.gps_roll_over);
        payload.put_u8(narrow_u8(self.position_sd_milli, 100, "position_sd_milli")?);
        payload.put_u8(narrow_u8(self.velocity_sd_milli, 10, "velocity_sd_milli")?);
        payload.put_u8(self.min_satellites);
        payload.put_u8(narrow_u8(self.time_gain_milli, 10, "time_gain_milli")?);
        payload.put_u8(narrow_u8(self.max_lag_milli, 10, "max_lag_milli")?);
        payload.put_slice(&split_u16(self.min_samples));
        Ok(payload.freeze())
    }
}

/// Ground target for the tracking controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackingTarget {
    pub longitude_deg: f32,
    pub latitude_deg: f32,
    pub altitude_m: f32,
}

impl Decode for TrackingTarget {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 12, "tracking target")?;
        Ok(Self {
            longitude_deg: f32_at(payload, 0),
            latitude_deg: f32_at(payload, 4),
            altitude_m: f32_at(payload, 8),
        })
    }
}

impl Encode for TrackingTarget {
    fn encode(&self) -> Result<Bytes> {
        let mut payload = BytesMut::with_capacity(12);
        payload.put_f32_le(self.longitude_deg);
        payload.put_f32_le(self.latitude_deg);
        payload.put_f32_le(self.altitude_m);
        Ok(payload.freeze())
    }
}

/// Rate gyro mounting and offsets
///
/// Axis selections are kept as the raw byte: configurations read back from flight units have
/// been seen to hold values outside the documented range, and decoding must not fail on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateGyroConfig {
    pub gyro_axes: [u8; 3],
    pub x_offset_mdeg_per_s: i32,
    pub y_offset_mdeg_per_s: i32,
    pub z_offset_mdeg_per_s: i32,
    pub rate_sensor_multiplier: u8,
}

impl RateGyroConfig {
    /// Build a configuration from typed axis selections
    #[must_use]
    pub fn new(axes: [AxisSelect; 3], offsets_mdeg_per_s: [i32; 3], rate_sensor_multiplier: u8) -> Self {
        Self {
            gyro_axes: axes.map(AxisSelect::raw),
            x_offset_mdeg_per_s: offsets_mdeg_per_s[0],
            y_offset_mdeg_per_s: offsets_mdeg_per_s[1],
            z_offset_mdeg_per_s: offsets_mdeg_per_s[2],
            rate_sensor_multiplier,
        }
    }

    /// Typed axis selection of gyro `index` (0..3), `None` if the raw value is out of range
    #[must_use]
    pub fn axis(&self, index: usize) -> Option<AxisSelect> {
        self.gyro_axes.get(index).copied().and_then(AxisSelect::from_raw)
    }
}

impl Decode for RateGyroConfig {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 10, "rate gyro config")?;
        Ok(Self {
            gyro_axes: [payload[0], payload[1], payload[2]],
            x_offset_mdeg_per_s: i32::from(i16_at(payload, 3)),
            y_offset_mdeg_per_s: i32::from(i16_at(payload, 5)),
            z_offset_mdeg_per_s: i32::from(i16_at(payload, 7)),
            rate_sensor_multiplier: payload[9],
        })
    }
}

impl Encode for RateGyroConfig {
    fn encode(&self) -> Result<Bytes> {
        let mut payload = BytesMut::with_capacity(10);
        payload.put_slice(&self.gyro_axes);
        payload.put_slice(&split_i16(narrow_i16(self.x_offset_mdeg_per_s, 1, "x_offset_mdeg_per_s")?));
        payload.put_slice(&split_i16(narrow_i16(self.y_offset_mdeg_per_s, 1, "y_offset_mdeg_per_s")?));
        payload.put_slice(&split_i16(narrow_i16(self.z_offset_mdeg_per_s, 1, "z_offset_mdeg_per_s")?));
        payload.put_u8(self.rate_sensor_multiplier);
        Ok(payload.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdcsError;

    const EPSILON: f64 = 1e-6;

    fn close(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_decode_orbit_params() {
        let payload = [
            0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0xF3, 0x3F, // 1.2
            0x71, 0x3D, 0x0A, 0xD7, 0xA3, 0x70, 0xE5, 0x3F, // 0.67
            0x67, 0x66, 0x66, 0x66, 0x66, 0x66, 0x16, 0x40, // 5.6
            0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x1F, 0x40, // 7.8
            0xCD, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xEC, 0x3F, // 0.9
            0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x24, 0x40, // 10.1
            0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x26, 0x40, // 11.2
            0x9A, 0x99, 0x99, 0x99, 0x99, 0x99, 0x28, 0x40, // 12.3
        ];

        let orbit = Sgp4OrbitParams::decode(&payload).unwrap();

        assert!(close(orbit.inclination_deg, 1.2, EPSILON));
        assert!(close(orbit.eccentricity, 0.67, EPSILON));
        assert!(close(orbit.raan_deg, 5.6, EPSILON));
        assert!(close(orbit.argument_of_perigee_deg, 7.8, EPSILON));
        assert!(close(orbit.b_star_drag, 0.9, EPSILON));
        assert!(close(orbit.mean_motion_orbits_per_day, 10.1, EPSILON));
        assert!(close(orbit.mean_anomaly_deg, 11.2, EPSILON));
        assert!(close(orbit.epoch, 12.3, EPSILON));

        // Floats are copied bit for bit
        assert_eq!(orbit.encode().unwrap().as_ref(), &payload[..]);
    }

    #[test]
    fn test_decode_magnetometer_config() {
        let mut payload = [0u8; 30];
        for pair in payload.chunks_exact_mut(4) {
            pair.copy_from_slice(&[0x22, 0x22, 0xDE, 0xDD][..pair.len()]);
        }
        payload[28] = 0x22;
        payload[29] = 0x22;

        let config = MagnetometerConfig::decode(&payload).unwrap();

        assert_eq!(config.mounting_alpha_mdeg, 87380);
        assert_eq!(config.mounting_beta_mdeg, -87380);
        assert_eq!(config.mounting_gamma_mdeg, 87380);
        assert_eq!(config.channel_offsets_milli, [-8738, 8738, -8738]);
        assert_eq!(
            config.sensitivity_milli,
            [8738, -8738, 8738, -8738, 8738, -8738, 8738, -8738, 8738]
        );
    }

    #[test]
    fn test_encode_magnetometer_config_scales_angles() {
        let config = MagnetometerConfig {
            mounting_alpha_mdeg: 12_345,
            mounting_beta_mdeg: -500,
            mounting_gamma_mdeg: 0,
            channel_offsets_milli: [1, -1, 1000],
            sensitivity_milli: [1000, 1000, 1000, 0, 0, 0, 0, 0, 0],
        };

        let payload = config.encode().unwrap();

        assert_eq!(payload.len(), 30);
        assert_eq!(&payload[0..6], &[0xD2, 0x04, 0xCE, 0xFF, 0x00, 0x00]);
        assert_eq!(&payload[6..12], &[0x01, 0x00, 0xFF, 0xFF, 0xE8, 0x03]);
    }

    #[test]
    fn test_decode_estimation_params() {
        let payload = [
            0xCD, 0xCC, 0x8C, 0x3F, // 1.1
            0xCD, 0xCC, 0x0C, 0x40, // 2.2
            0x33, 0x33, 0x53, 0x40, // 3.3
            0xCD, 0xCC, 0x8C, 0x40, // 4.4
            0x00, 0x00, 0xB0, 0x40, // 5.5
            0x33, 0x33, 0xD3, 0x40, // 6.6
            0x66, 0x66, 0xF6, 0x40, // 7.7
            0xAA, // flags
            0x0D, // selection
            0x2C, // reset period
        ];

        let params = EstimationParams::decode(&payload).unwrap();

        assert!(close(f64::from(params.magnetometer_rate_filter_system_noise), 1.1, EPSILON));
        assert!(close(f64::from(params.ekf_system_noise), 2.2, EPSILON));
        assert!(close(f64::from(params.css_measurement_noise), 3.3, EPSILON));
        assert!(close(f64::from(params.sun_sensor_measurement_noise), 4.4, EPSILON));
        assert!(close(f64::from(params.nadir_sensor_measurement_noise), 5.5, EPSILON));
        assert!(close(f64::from(params.magnetometer_measurement_noise), 6.6, EPSILON));
        assert!(close(f64::from(params.star_tracker_measurement_noise), 7.7, EPSILON));

        assert!(!params.use_sun_sensor);
        assert!(params.use_nadir_sensor);
        assert!(!params.use_css);
        assert!(params.use_star_tracker);
        assert!(!params.nadir_terminator_test);
        assert!(params.auto_magnetometer_recovery);
        assert_eq!(params.magnetometer_mode, MagnetometerMode::MainMotor);
        assert_eq!(params.raw_magnetometer_selection, MagnetometerMode::RedundantSignal);
        assert!(params.auto_transition_on_rate_sensor_error);
        assert!(params.wheel_power_up_delay);
        assert_eq!(params.error_counter_reset_period_min, 44);

        assert_eq!(params.encode().unwrap().as_ref(), &payload[..]);
    }

    #[test]
    fn test_decode_asgp4_params() {
        let payload = [
            0x4C, 0x04, 0x98, 0x08, 0xE4, 0x0C, 0x30, 0x11, 0x7C, 0x15, 0xC8, 0x19, // coefficients
            0x4D, // max position error
            0x01, // filter
            0x00, 0x3A, 0xC1, 0xFA, // xp
            0x40, 0x61, 0x19, 0xFA, // yp
            0x0A, 0x6F, 0xD4, 0x0D, 0xD6, 0xD7, // roll-over .. max lag
            0x10, 0x00, // min samples
        ];

        let params = Asgp4Params::decode(&payload).unwrap();

        assert_eq!(params.inclination_coefficient_milli, 1100);
        assert_eq!(params.raan_coefficient_milli, 2200);
        assert_eq!(params.eccentricity_coefficient_milli, 3300);
        assert_eq!(params.aop_coefficient_milli, 4400);
        assert_eq!(params.time_coefficient_milli, 5500);
        assert_eq!(params.position_coefficient_milli, 6600);
        assert_eq!(params.max_position_error_milli, 7700);
        assert_eq!(params.filter, Asgp4Filter::Average);
        assert_eq!(params.xp_coefficient_nano, -8_800_000_000);
        assert_eq!(params.yp_coefficient_nano, -9_900_000_000);
        assert_eq!(params.gps_roll_over, 10);
        assert_eq!(params.position_sd_milli, 11100);
        assert_eq!(params.velocity_sd_milli, 2120);
        assert_eq!(params.min_satellites, 13);
        assert_eq!(params.time_gain_milli, 2140);
        assert_eq!(params.max_lag_milli, 2150);
        assert_eq!(params.min_samples, 16);

        assert_eq!(params.encode().unwrap().as_ref(), &payload[..]);
    }

    #[test]
    fn test_asgp4_rejects_out_of_range_error() {
        let mut params = Asgp4Params::decode(&[0u8; 30]).unwrap();
        params.max_position_error_milli = 25_600;
        assert!(matches!(params.encode(), Err(AdcsError::InvalidArgument(_))));
    }

    #[test]
    fn test_decode_tracking_target() {
        let payload = [0xCD, 0xCC, 0xDC, 0x42, 0x33, 0x33, 0x8B, 0xC2, 0x66, 0x66, 0x86, 0x3F];

        let target = TrackingTarget::decode(&payload).unwrap();

        assert!(close(f64::from(target.longitude_deg), 110.4, 1e-5));
        assert!(close(f64::from(target.latitude_deg), -69.6, 1e-5));
        assert!(close(f64::from(target.altitude_m), 1.05, EPSILON));
    }

    #[test]
    fn test_decode_rate_gyro_config() {
        let payload = [0xCD, 0xCC, 0xDC, 0x42, 0x33, 0x33, 0x8B, 0xC2, 0x66, 0x66];

        let config = RateGyroConfig::decode(&payload).unwrap();

        assert_eq!(config.gyro_axes, [205, 204, 220]);
        assert_eq!(config.axis(0), None);
        assert_eq!(config.x_offset_mdeg_per_s, 13122);
        assert_eq!(config.y_offset_mdeg_per_s, -29901);
        assert_eq!(config.z_offset_mdeg_per_s, 26306);
        assert_eq!(config.rate_sensor_multiplier, 102);

        assert_eq!(config.encode().unwrap().as_ref(), &payload[..]);
    }

    #[test]
    fn test_rate_gyro_typed_axes() {
        let config = RateGyroConfig::new(
            [AxisSelect::PositiveX, AxisSelect::NegativeY, AxisSelect::NotUsed],
            [0, 0, 0],
            1,
        );
        assert_eq!(config.gyro_axes, [0, 3, 6]);
        assert_eq!(config.axis(1), Some(AxisSelect::NegativeY));
        assert_eq!(config.axis(3), None);
    }
}
