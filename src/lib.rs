//! # ADCS Driver Library
//!
//! Onboard driver for a CubeSat attitude determination and control subsystem (ADCS) on a shared
//! two-wire bus.
//!
//! This library provides checksum-framed command and telemetry transactions with acknowledgment
//! polling, typed encode/decode of every ADCS record, and an async driver with one method per
//! command or telemetry request, plus whole-file downloads from the ADCS SD card.

pub mod catalog;
pub mod codec;
pub mod config;
pub mod download;
pub mod driver;
pub mod error;
pub mod protocol;
pub mod telemetry;
pub mod transaction;
pub mod transport;
