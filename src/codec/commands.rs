//! # Simple Telecommand Payloads
//!
//! Short command arguments that have no telemetry counterpart.

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;

use super::enums::{CameraSelect, ControlMode, EstimationMode, ImageSize, MagnetometerMode, RunMode};
use super::Encode;
use crate::error::Result;
use crate::protocol::bytes::{split_i16, split_u16};
use crate::protocol::frame::ADCS_MAGIC_NUMBER;

/// Commands with no arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoArgs;

impl Encode for NoArgs {
    fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::new())
    }
}

/// Guard byte required by destructive commands (reset, SD format)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MagicGuard;

impl Encode for MagicGuard {
    fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::from_static(&[ADCS_MAGIC_NUMBER]))
    }
}

/// Clear the node error flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClearErrors;

/// Bits 6 and 7 clear the error and boot flags
const CLEAR_ERROR_BITS: u8 = 0b1100_0000;

impl Encode for ClearErrors {
    fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::from_static(&[CLEAR_ERROR_BITS]))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeployMagnetometer {
    pub timeout_s: u8,
}

impl Encode for DeployMagnetometer {
    fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(&[self.timeout_s]))
    }
}

impl Encode for RunMode {
    fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(&[self.raw()]))
    }
}

impl Encode for EstimationMode {
    fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(&[self.raw()]))
    }
}

impl Encode for MagnetometerMode {
    fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(&[self.raw()]))
    }
}

/// Switch the attitude control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SetControlMode {
    pub mode: ControlMode,
    /// Seconds before falling back to no control; 0xFFFF means never
    pub timeout_s: u16,
}

impl Encode for SetControlMode {
    fn encode(&self) -> Result<Bytes> {
        let mut payload = BytesMut::with_capacity(3);
        payload.put_u8(self.mode.raw());
        payload.put_slice(&split_u16(self.timeout_s));
        Ok(payload.freeze())
    }
}

/// Manual magnetorquer duty cycles in thousandths (-1000..=1000)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MagnetorquerOutput {
    pub x_permille: i16,
    pub y_permille: i16,
    pub z_permille: i16,
}

impl Encode for MagnetorquerOutput {
    fn encode(&self) -> Result<Bytes> {
        let mut payload = BytesMut::with_capacity(6);
        payload.put_slice(&split_i16(self.x_permille));
        payload.put_slice(&split_i16(self.y_permille));
        payload.put_slice(&split_i16(self.z_permille));
        Ok(payload.freeze())
    }
}

/// Capture an image and store it on the SD card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveImage {
    pub camera: CameraSelect,
    pub size: ImageSize,
}

impl Encode for SaveImage {
    fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(&[self.camera.raw(), self.size.raw()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_payloads() {
        assert!(NoArgs.encode().unwrap().is_empty());
        assert_eq!(MagicGuard.encode().unwrap().as_ref(), &[0x5A]);
        assert_eq!(ClearErrors.encode().unwrap().as_ref(), &[192]);
    }

    #[test]
    fn test_mode_payloads() {
        assert_eq!(RunMode::Triggered.encode().unwrap().as_ref(), &[2]);
        assert_eq!(EstimationMode::FullStateEkf.encode().unwrap().as_ref(), &[5]);
        assert_eq!(MagnetometerMode::None.encode().unwrap().as_ref(), &[3]);
    }

    #[test]
    fn test_control_mode_with_timeout() {
        let command = SetControlMode { mode: ControlMode::Detumbling, timeout_s: 600 };
        assert_eq!(command.encode().unwrap().as_ref(), &[0x01, 0x58, 0x02]);
    }

    #[test]
    fn test_magnetorquer_output_signed() {
        let command = MagnetorquerOutput { x_permille: 500, y_permille: -250, z_permille: 0 };
        assert_eq!(
            command.encode().unwrap().as_ref(),
            &[0xF4, 0x01, 0x06, 0xFF, 0x00, 0x00]
        );
    }

    #[test]
    fn test_save_image() {
        let command = SaveImage { camera: CameraSelect::Cam2, size: ImageSize::Size256 };
        assert_eq!(command.encode().unwrap().as_ref(), &[1, 2]);
    }
}
