//! # ADCS Driver
//!
//! Telemetry service for the CubeSat attitude determination and control subsystem.
//!
//! Brings the ADCS clock in line with the host, then polls a telemetry snapshot at the configured
//! interval and appends it to the JSONL telemetry log until Ctrl+C.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::time::interval;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use adcs_driver::config::Config;
use adcs_driver::driver::AdcsDriver;
use adcs_driver::telemetry::{Snapshot, TelemetryLog};
use adcs_driver::transport::SimulatedAdcs;

/// Configuration file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/adcs.toml";

/// File name of the tracing copy inside `log_dir`
const LOG_FILE_PREFIX: &str = "adcs-driver.log";

/// Load the configuration named on the command line, the default file, or built-in defaults
fn load_config() -> Result<Config> {
    match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => Config::load(&path).with_context(|| format!("loading {}", path.display())),
        None if PathBuf::from(DEFAULT_CONFIG_PATH).exists() => {
            Config::load(DEFAULT_CONFIG_PATH).context("loading default configuration")
        }
        None => Ok(Config::default()),
    }
}

/// Install the tracing subscriber; the returned guard flushes the file writer on drop
fn init_logging(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let (file_layer, guard) = match &config.telemetry.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}

/// Main entry point
///
/// # Control Flow
///
/// 1. Load configuration and set up logging
/// 2. Initialize the ADCS (clock synchronisation) and report its identification
/// 3. Poll a snapshot every `poll_interval_ms` and append it to the telemetry log
/// 4. On Ctrl+C, stop polling and report the record count
///
/// # Errors
///
/// Returns error if the configuration is invalid, the telemetry log cannot be opened or the
/// ADCS fails to initialize.
#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    let _log_guard = init_logging(&config);

    info!("ADCS driver v{} starting...", env!("CARGO_PKG_VERSION"));

    let adcs = AdcsDriver::from_config(SimulatedAdcs::new(), &config);
    adcs.initialize().await.context("initializing ADCS")?;

    let id = adcs.identification().await?;
    info!(
        "ADCS node type {} firmware {}.{} up {}.{:03} s",
        id.node_type, id.firmware_major, id.firmware_minor, id.seconds_since_startup, id.ms_past_second
    );

    let mut log = if config.telemetry.enabled {
        Some(TelemetryLog::open(&config.telemetry.log_path).await?)
    } else {
        info!("Telemetry logging disabled");
        None
    };

    let mut ticker = interval(config.poll_interval());
    info!("Polling ADCS telemetry every {} ms", config.telemetry.poll_interval_ms);
    info!("Press Ctrl+C to exit");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snapshot = match Snapshot::collect(&adcs).await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        warn!("Telemetry poll failed: {}", e);
                        continue;
                    }
                };

                if let Some(log) = log.as_mut() {
                    if let Err(e) = log.record("snapshot", &snapshot).await {
                        warn!("Failed to write telemetry record: {}", e);
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    if let Some(log) = &log {
        info!("Wrote {} telemetry records to {}", log.records_written(), log.path().display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
        assert_eq!(DEFAULT_CONFIG_PATH, "config/adcs.toml");
    }

    #[test]
    fn test_startup_against_simulator() {
        let config = Config::default();
        let adcs = AdcsDriver::from_config(SimulatedAdcs::new(), &config);

        tokio_test::block_on(async {
            adcs.initialize().await.unwrap();
            assert!(Snapshot::collect(&adcs).await.is_ok());
        });
    }
}
