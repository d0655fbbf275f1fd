//! # Telemetry Module
//!
//! Handles telemetry logging to JSONL files.
//!
//! This module handles:
//! - Polling a snapshot of the ADCS state through the driver
//! - Formatting records as JSONL (JSON Lines) stamped with UTC time
//! - Appending to the configured log file
//!
//! Each line has the shape
//!
//! ```text
//! {"timestamp":"2024-10-30T01:26:46.610Z","kind":"snapshot","data":{...}}
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::codec::sensors::CubeControlCurrent;
use crate::codec::status::{CurrentState, PowerControl, UnixTime};
use crate::codec::vectors::{EstimatedAttitude, EstimatedRates, PositionLlh};
use crate::driver::AdcsDriver;
use crate::error::Result;
use crate::transport::BusTransport;

/// Periodic view of the ADCS written by the telemetry loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Snapshot {
    pub unix_time: UnixTime,
    pub state: CurrentState,
    pub attitude: EstimatedAttitude,
    pub rates: EstimatedRates,
    pub position: PositionLlh,
    pub power: PowerControl,
    pub current: CubeControlCurrent,
}

impl Snapshot {
    /// Read every record of the snapshot, one transaction each
    ///
    /// # Errors
    ///
    /// Stops at the first failing telemetry request.
    pub async fn collect<T: BusTransport + 'static>(adcs: &AdcsDriver<T>) -> Result<Self> {
        Ok(Self {
            unix_time: adcs.unix_time().await?,
            state: adcs.current_state().await?,
            attitude: adcs.estimated_attitude().await?,
            rates: adcs.estimated_rates().await?,
            position: adcs.position_llh().await?,
            power: adcs.power_control().await?,
            current: adcs.cubecontrol_current().await?,
        })
    }
}

#[derive(Serialize)]
struct Line<'a, R: Serialize> {
    timestamp: String,
    kind: &'a str,
    data: &'a R,
}

/// Format one JSONL line (without the trailing newline)
///
/// # Errors
///
/// Returns `AdcsError::Json` if `data` fails to serialise
pub fn format_record<R: Serialize>(kind: &str, data: &R, at: DateTime<Utc>) -> Result<String> {
    let line = Line {
        timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        kind,
        data,
    };
    Ok(serde_json::to_string(&line)?)
}

/// Append-only JSONL telemetry log
#[derive(Debug)]
pub struct TelemetryLog {
    path: PathBuf,
    file: File,
    records: u64,
}

impl TelemetryLog {
    /// Open (or create) the log at `path`, creating missing parent directories
    ///
    /// # Errors
    ///
    /// Returns `AdcsError::Io` if the directory or file cannot be created
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use adcs_driver::telemetry::TelemetryLog;
    ///
    /// # async fn run() -> adcs_driver::error::Result<()> {
    /// let mut log = TelemetryLog::open("./logs/adcs-telemetry.jsonl").await?;
    /// log.record("note", &"started").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path).await?;
        info!("Telemetry log opened at {}", path.display());

        Ok(Self { path, file, records: 0 })
    }

    /// Append one record stamped with the current UTC time
    pub async fn record<R: Serialize>(&mut self, kind: &str, data: &R) -> Result<()> {
        let mut line = format_record(kind, data, Utc::now())?;
        line.push('\n');

        self.file.write_all(line.as_bytes()).await?;
        self.file.flush().await?;
        self.records += 1;

        debug!("Telemetry record {} ({})", self.records, kind);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended since the log was opened
    pub fn records_written(&self) -> u64 {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tlm;
    use crate::transaction::RetryPolicy;
    use crate::transport::SimulatedAdcs;
    use chrono::TimeZone;
    use std::time::Duration;

    #[test]
    fn test_format_record() {
        let at = Utc.with_ymd_and_hms(2024, 10, 30, 1, 26, 46).unwrap();
        let line = format_record("unix_time", &UnixTime { epoch_ms: 1_730_251_606_610 }, at).unwrap();

        assert_eq!(
            line,
            r#"{"timestamp":"2024-10-30T01:26:46.000Z","kind":"unix_time","data":{"epoch_ms":1730251606610}}"#
        );
    }

    #[tokio::test]
    async fn test_log_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("adcs.jsonl");

        let mut log = TelemetryLog::open(&path).await.unwrap();
        log.record("a", &1u8).await.unwrap();
        log.record("b", &[1, 2, 3]).await.unwrap();
        assert_eq!(log.records_written(), 2);
        drop(log);

        let mut log = TelemetryLog::open(&path).await.unwrap();
        log.record("c", &"again").await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["kind"], "a");
        assert_eq!(lines[1]["data"], serde_json::json!([1, 2, 3]));
        assert_eq!(lines[2]["data"], "again");
        assert!(lines[2]["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_snapshot_from_simulator() {
        let sim = SimulatedAdcs::new();
        // roll 10 deg, pitch -5 deg, yaw 0
        sim.set_telemetry(&tlm::ESTIMATED_ATTITUDE, &[0xE8, 0x03, 0x0C, 0xFE, 0x00, 0x00]);
        let policy = RetryPolicy { settle_delay: Duration::ZERO, ..RetryPolicy::default() };
        let adcs = AdcsDriver::new(sim, 0x57, policy);

        let snapshot = Snapshot::collect(&adcs).await.unwrap();

        assert_eq!(snapshot.attitude.roll_mdeg, 10_000);
        assert_eq!(snapshot.attitude.pitch_mdeg, -5_000);

        let line = format_record("snapshot", &snapshot, Utc::now()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["data"]["attitude"]["roll_mdeg"], 10_000);
    }
}
