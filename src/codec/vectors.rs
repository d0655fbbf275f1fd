//! # Vector Records
//!
//! Three-axis estimation, sensor and actuator records. Each is three little-endian `i16` values,
//! sign-extended and then multiplied into the engineering unit named by the field.

use serde::Serialize;

use super::{expect_len, narrow_i16, Decode, Encode};
use crate::error::Result;
use crate::protocol::bytes::{i16_at, split_i16};

use bytes::{BufMut, Bytes, BytesMut};

vector_record! {
    /// Estimated angular rates
    EstimatedRates { x_mdeg_per_s, y_mdeg_per_s, z_mdeg_per_s } x 10
}

vector_record! {
    /// Satellite position as latitude, longitude and altitude
    PositionLlh { latitude_mdeg, longitude_mdeg, altitude_m } x 10
}

vector_record! {
    /// Rate sensor output
    RateSensorRates { x_mdeg_per_s, y_mdeg_per_s, z_mdeg_per_s } x 10
}

vector_record! {
    /// Measured or commanded reaction wheel speed
    WheelSpeed { x_rpm, y_rpm, z_rpm } x 1
}

vector_record! {
    /// Magnetorquer on-time command
    MagnetorquerCommand { x_ms, y_ms, z_ms } x 10
}

vector_record! {
    /// Raw magnetometer counts
    RawMagnetometer { x, y, z } x 1
}

vector_record! {
    /// Fine estimated angular rates
    FineRates { x_mdeg_per_s, y_mdeg_per_s, z_mdeg_per_s } x 1
}

vector_record! {
    /// Commanded attitude angles
    CommandedAttitude { roll_mdeg, pitch_mdeg, yaw_mdeg } x 10
}

vector_record! {
    /// Estimated attitude angles
    EstimatedAttitude { roll_mdeg, pitch_mdeg, yaw_mdeg } x 10
}

vector_record! {
    /// Measured or IGRF-modelled magnetic field
    MagneticField { x_nt, y_nt, z_nt } x 10
}

vector_record! {
    /// Unit vector in millionths
    UnitVector { x_micro, y_micro, z_micro } x 100
}

vector_record! {
    /// Quaternion error vector part in millionths
    QuaternionError { q1_micro, q2_micro, q3_micro } x 100
}

vector_record! {
    /// Estimated gyro bias
    GyroBias { x_mdeg_per_s, y_mdeg_per_s, z_mdeg_per_s } x 1
}

vector_record! {
    /// Estimation innovation vector in millionths
    InnovationVector { x_micro, y_micro, z_micro } x 100
}

impl Encode for CommandedAttitude {
    fn encode(&self) -> Result<Bytes> {
        let mut payload = BytesMut::with_capacity(6);
        payload.put_slice(&split_i16(narrow_i16(self.roll_mdeg, 10, "roll_mdeg")?));
        payload.put_slice(&split_i16(narrow_i16(self.pitch_mdeg, 10, "pitch_mdeg")?));
        payload.put_slice(&split_i16(narrow_i16(self.yaw_mdeg, 10, "yaw_mdeg")?));
        Ok(payload.freeze())
    }
}

impl Encode for WheelSpeed {
    fn encode(&self) -> Result<Bytes> {
        let mut payload = BytesMut::with_capacity(6);
        payload.put_slice(&split_i16(narrow_i16(self.x_rpm, 1, "x_rpm")?));
        payload.put_slice(&split_i16(narrow_i16(self.y_rpm, 1, "y_rpm")?));
        payload.put_slice(&split_i16(narrow_i16(self.z_rpm, 1, "z_rpm")?));
        Ok(payload.freeze())
    }
}

/// Plain three-axis value used inside composite records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Vector3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Vector3 {
    fn read(payload: &[u8], offset: usize, scale: i32) -> Self {
        Self {
            x: i32::from(i16_at(payload, offset)) * scale,
            y: i32::from(i16_at(payload, offset + 2)) * scale,
            z: i32::from(i16_at(payload, offset + 4)) * scale,
        }
    }
}

/// One identified star in body and orbit frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StarVectors {
    pub body_micro: Vector3,
    pub orbit_micro: Vector3,
}

/// Calibrated sensor measurements of one control loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Measurements {
    pub magnetic_field_nt: Vector3,
    pub coarse_sun_micro: Vector3,
    pub sun_micro: Vector3,
    pub nadir_micro: Vector3,
    pub angular_rate_mdeg_per_s: Vector3,
    pub wheel_speed_rpm: Vector3,
    pub stars: [StarVectors; 3],
}

impl Decode for Measurements {
    fn decode(payload: &[u8]) -> Result<Self> {
        expect_len(payload, 72, "measurements")?;

        let star = |offset: usize| StarVectors {
            body_micro: Vector3::read(payload, offset, 100),
            orbit_micro: Vector3::read(payload, offset + 6, 100),
        };

        Ok(Self {
            magnetic_field_nt: Vector3::read(payload, 0, 10),
            coarse_sun_micro: Vector3::read(payload, 6, 100),
            sun_micro: Vector3::read(payload, 12, 100),
            nadir_micro: Vector3::read(payload, 18, 100),
            angular_rate_mdeg_per_s: Vector3::read(payload, 24, 10),
            wheel_speed_rpm: Vector3::read(payload, 30, 1),
            stars: [star(36), star(48), star(60)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdcsError;

    #[test]
    fn test_decode_estimated_rates() {
        let rates = EstimatedRates::decode(&[0x11, 0x22, 0x33, 0x44, 0x55, 0xff]).unwrap();

        assert_eq!(rates.x_mdeg_per_s, 87210);
        assert_eq!(rates.y_mdeg_per_s, 174590);
        assert_eq!(rates.z_mdeg_per_s, -1710);
    }

    #[test]
    fn test_decode_position_llh() {
        let llh = PositionLlh::decode(&[0x11, 0x22, 0x33, 0xff, 0x55, 0x66]).unwrap();

        assert_eq!(llh.latitude_mdeg, 87210);
        assert_eq!(llh.longitude_mdeg, -2050);
        assert_eq!(llh.altitude_m, 261970);
    }

    #[test]
    fn test_scaled_minimum_keeps_sign() {
        let field = MagneticField::decode(&[0x00, 0x80, 0x00, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(field.x_nt, -327_680);
    }

    #[test]
    fn test_decode_wheel_speed() {
        let speed = WheelSpeed::decode(&[0x11, 0x22, 0x33, 0xff, 0x55, 0x66]).unwrap();

        assert_eq!(speed.x_rpm, 8721);
        assert_eq!(speed.y_rpm, -205);
        assert_eq!(speed.z_rpm, 26197);
    }

    #[test]
    fn test_decode_commanded_wheel_speed() {
        let speed = WheelSpeed::decode(&[0x01, 0x02, 0x03, 0x04, 0x05, 0xd6]).unwrap();

        assert_eq!(speed.x_rpm, 513);
        assert_eq!(speed.y_rpm, 1027);
        assert_eq!(speed.z_rpm, -10747);
    }

    #[test]
    fn test_decode_magnetorquer_command() {
        let cmd = MagnetorquerCommand::decode(&[0x11, 0x22, 0x33, 0xff, 0x55, 0x66]).unwrap();

        assert_eq!(cmd.x_ms, 87210);
        assert_eq!(cmd.y_ms, -2050);
        assert_eq!(cmd.z_ms, 261970);
    }

    #[test]
    fn test_decode_raw_magnetometer_and_fine_rates() {
        let payload = [0x11, 0x22, 0x33, 0x44, 0x55, 0xff];

        let raw = RawMagnetometer::decode(&payload).unwrap();
        assert_eq!((raw.x, raw.y, raw.z), (8721, 17459, -171));

        let fine = FineRates::decode(&payload).unwrap();
        assert_eq!((fine.x_mdeg_per_s, fine.y_mdeg_per_s, fine.z_mdeg_per_s), (8721, 17459, -171));
    }

    #[test]
    fn test_decode_commanded_attitude() {
        let angles = CommandedAttitude::decode(&[0x11, 0xaa, 0x22, 0xbb, 0x33, 0xcc]).unwrap();

        assert_eq!(angles.roll_mdeg, -219990);
        assert_eq!(angles.pitch_mdeg, -176300);
        assert_eq!(angles.yaw_mdeg, -132610);
    }

    #[test]
    fn test_encode_commanded_attitude() {
        let angles = CommandedAttitude { roll_mdeg: -219990, pitch_mdeg: -176300, yaw_mdeg: -132610 };
        assert_eq!(angles.encode().unwrap().as_ref(), &[0x11, 0xaa, 0x22, 0xbb, 0x33, 0xcc]);
    }

    #[test]
    fn test_encode_commanded_attitude_out_of_range() {
        let angles = CommandedAttitude { roll_mdeg: 400_000, pitch_mdeg: 0, yaw_mdeg: 0 };
        assert!(matches!(angles.encode(), Err(AdcsError::InvalidArgument(_))));
    }

    #[test]
    fn test_decode_estimated_attitude() {
        let angles = EstimatedAttitude::decode(&[0x10, 0x27, 0x34, 0xff, 0x56, 0x78]).unwrap();

        assert_eq!(angles.roll_mdeg, 100000);
        assert_eq!(angles.pitch_mdeg, -2040);
        assert_eq!(angles.yaw_mdeg, 308060);
    }

    #[test]
    fn test_decode_igrf_field() {
        let field = MagneticField::decode(&[0x09, 0xf8, 0x07, 0x06, 0x05, 0xd4]).unwrap();

        assert_eq!(field.x_nt, -20390);
        assert_eq!(field.y_nt, 15430);
        assert_eq!(field.z_nt, -112590);
    }

    #[test]
    fn test_decode_fine_sun_and_nadir() {
        let sun = UnitVector::decode(&[0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc]).unwrap();
        assert_eq!((sun.x_micro, sun.y_micro, sun.z_micro), (1333000, 3080600, -1725400));

        let nadir = UnitVector::decode(&[0x01, 0x10, 0xf1, 0x11, 0xF0, 0xF1]).unwrap();
        assert_eq!((nadir.x_micro, nadir.y_micro, nadir.z_micro), (409700, 459300, -360000));
    }

    #[test]
    fn test_decode_quaternion_error_and_gyro_bias() {
        let payload = [0x01, 0x02, 0x03, 0xe4, 0x05, 0x06];

        let error = QuaternionError::decode(&payload).unwrap();
        assert_eq!((error.q1_micro, error.q2_micro, error.q3_micro), (51300, -716500, 154100));

        let bias = GyroBias::decode(&payload).unwrap();
        assert_eq!((bias.x_mdeg_per_s, bias.y_mdeg_per_s, bias.z_mdeg_per_s), (513, -7165, 1541));
    }

    #[test]
    fn test_vector_rejects_wrong_length() {
        assert!(matches!(InnovationVector::decode(&[0x00; 5]), Err(AdcsError::Codec(_))));
        assert!(matches!(InnovationVector::decode(&[0x00; 7]), Err(AdcsError::Codec(_))));
    }

    #[test]
    fn test_decode_measurements() {
        let payload = [
            0xd2, 0x1c, 0xa3, 0xc5, 0x3e, 0x93, // magnetic field
            0x49, 0xf8, 0x65, 0xef, 0x1f, 0xd3, // coarse sun
            0xd1, 0xdb, 0xce, 0x16, 0x27, 0xc5, // sun
            0xb1, 0xe5, 0xd3, 0x19, 0x70, 0xd9, // nadir
            0x87, 0x6f, 0xa1, 0x09, 0xf0, 0xb7, // rates
            0x99, 0xcc, 0xb9, 0x5f, 0x6b, 0xe1, // wheel speed
            0xd3, 0x05, 0xc9, 0x19, 0x9c, 0xd7, // star 1 body
            0x02, 0x2a, 0x54, 0xc2, 0x4f, 0xca, // star 1 orbit
            0x7d, 0xa2, 0x0d, 0x03, 0x48, 0x98, // star 2 body
            0xe6, 0xb7, 0xac, 0x8d, 0x3d, 0x63, // star 2 orbit
            0x0b, 0x2c, 0x84, 0x7f, 0x32, 0x15, // star 3 body
            0x47, 0x9e, 0x3c, 0x4a, 0xd3, 0x1c, // star 3 orbit
        ];

        let m = Measurements::decode(&payload).unwrap();

        assert_eq!(m.magnetic_field_nt, Vector3 { x: 73780, y: -149410, z: -278420 });
        assert_eq!(m.coarse_sun_micro, Vector3 { x: -197500, y: -425100, z: -1148900 });
        assert_eq!(m.sun_micro, Vector3 { x: -926300, y: 583800, z: -1506500 });
        assert_eq!(m.nadir_micro, Vector3 { x: -673500, y: 661100, z: -987200 });
        assert_eq!(m.angular_rate_mdeg_per_s, Vector3 { x: 285510, y: 24650, z: -184480 });
        assert_eq!(m.wheel_speed_rpm, Vector3 { x: -13159, y: 24505, z: -7829 });

        assert_eq!(m.stars[0].body_micro, Vector3 { x: 149100, y: 660100, z: -1034000 });
        assert_eq!(m.stars[0].orbit_micro, Vector3 { x: 1075400, y: -1578800, z: -1374500 });
        assert_eq!(m.stars[1].body_micro, Vector3 { x: -2393900, y: 78100, z: -2655200 });
        assert_eq!(m.stars[1].orbit_micro, Vector3 { x: -1845800, y: -2926800, z: 2540500 });
        assert_eq!(m.stars[2].body_micro, Vector3 { x: 1127500, y: 3264400, z: 542600 });
        assert_eq!(m.stars[2].orbit_micro, Vector3 { x: -2501700, y: 1900400, z: 737900 });
    }
}
