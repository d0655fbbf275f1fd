//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::driver::FilePolicy;
use crate::error::{AdcsError, Result};
use crate::protocol::frame::ADCS_I2C_ADDRESS;
use crate::transaction::RetryPolicy;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Bus configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BusConfig {
    #[serde(default = "default_device_address")]
    pub device_address: u8,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Retry budgets of the transaction layer
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RetryConfig {
    #[serde(default = "default_checksum_attempts")]
    pub checksum_attempts: u32,

    #[serde(default = "default_ack_poll_budget")]
    pub ack_poll_budget: u32,

    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

/// Pacing of SD card file-list walks and downloads
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FilesConfig {
    #[serde(default = "default_pointer_delay_ms")]
    pub pointer_delay_ms: u64,

    /// Overall limit on one file-list walk
    #[serde(default = "default_pointer_timeout_ms")]
    pub pointer_timeout_ms: u64,

    #[serde(default = "default_burst_delay_ms")]
    pub burst_delay_ms: u64,

    #[serde(default = "default_block_ready_polls")]
    pub block_ready_polls: u32,

    #[serde(default = "default_hole_map_attempts")]
    pub hole_map_attempts: u32,
}

/// Telemetry log configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Directory for a copy of the tracing output; no file logging when absent
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

// Default value functions
fn default_device_address() -> u8 { ADCS_I2C_ADDRESS }
fn default_timeout_ms() -> u64 { 1000 }

fn default_checksum_attempts() -> u32 { 100 }
fn default_ack_poll_budget() -> u32 { 1000 }
fn default_settle_delay_ms() -> u64 { 10 }

fn default_pointer_delay_ms() -> u64 { 200 }
fn default_pointer_timeout_ms() -> u64 { 60000 }
fn default_burst_delay_ms() -> u64 { 100 }
fn default_block_ready_polls() -> u32 { 100 }
fn default_hole_map_attempts() -> u32 { 3 }

fn default_telemetry_enabled() -> bool { true }
fn default_log_path() -> PathBuf { PathBuf::from("./logs/adcs-telemetry.jsonl") }
fn default_poll_interval_ms() -> u64 { 1000 }

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            device_address: default_device_address(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            checksum_attempts: default_checksum_attempts(),
            ack_poll_budget: default_ack_poll_budget(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            pointer_delay_ms: default_pointer_delay_ms(),
            pointer_timeout_ms: default_pointer_timeout_ms(),
            burst_delay_ms: default_burst_delay_ms(),
            block_ready_polls: default_block_ready_polls(),
            hole_map_attempts: default_hole_map_attempts(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_telemetry_enabled(),
            log_path: default_log_path(),
            poll_interval_ms: default_poll_interval_ms(),
            log_dir: None,
        }
    }
}

fn invalid(message: impl std::fmt::Display) -> AdcsError {
    AdcsError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing sections and fields take their defaults.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use adcs_driver::config::Config;
    ///
    /// let config = Config::load("config/adcs.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `AdcsError::Config` naming the first value out of its valid range
    pub fn validate(&self) -> Result<()> {
        if self.bus.device_address > 0x7F {
            return Err(invalid("device_address must be a 7-bit address (0x00 to 0x7F)"));
        }

        if self.bus.timeout_ms == 0 || self.bus.timeout_ms > 10000 {
            return Err(invalid("timeout_ms must be between 1 and 10000"));
        }

        if self.retry.checksum_attempts == 0 {
            return Err(invalid("checksum_attempts must be greater than 0"));
        }

        if self.retry.ack_poll_budget == 0 {
            return Err(invalid("ack_poll_budget must be greater than 0"));
        }

        if self.retry.settle_delay_ms > 1000 {
            return Err(invalid("settle_delay_ms must be at most 1000"));
        }

        if self.files.pointer_delay_ms > 10000 {
            return Err(invalid("pointer_delay_ms must be at most 10000"));
        }

        if self.files.pointer_timeout_ms == 0 || self.files.pointer_timeout_ms > 600000 {
            return Err(invalid("pointer_timeout_ms must be between 1 and 600000"));
        }

        if self.files.burst_delay_ms > 10000 {
            return Err(invalid("burst_delay_ms must be at most 10000"));
        }

        if self.files.block_ready_polls == 0 {
            return Err(invalid("block_ready_polls must be greater than 0"));
        }

        if self.telemetry.poll_interval_ms == 0 || self.telemetry.poll_interval_ms > 60000 {
            return Err(invalid("poll_interval_ms must be between 1 and 60000"));
        }

        if self.telemetry.enabled && self.telemetry.log_path.as_os_str().is_empty() {
            return Err(invalid("telemetry log_path cannot be empty when enabled"));
        }

        Ok(())
    }

    /// Retry and timeout bounds for the transaction layer
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            checksum_attempts: self.retry.checksum_attempts,
            ack_poll_budget: self.retry.ack_poll_budget,
            bus_timeout: Duration::from_millis(self.bus.timeout_ms),
            settle_delay: Duration::from_millis(self.retry.settle_delay_ms),
        }
    }

    /// Pacing and bounds for file-list walks and downloads
    #[must_use]
    pub fn file_policy(&self) -> FilePolicy {
        FilePolicy {
            pointer_delay: Duration::from_millis(self.files.pointer_delay_ms),
            pointer_timeout: Duration::from_millis(self.files.pointer_timeout_ms),
            burst_delay: Duration::from_millis(self.files.burst_delay_ms),
            block_ready_polls: self.files.block_ready_polls,
            hole_map_attempts: self.files.hole_map_attempts,
        }
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.telemetry.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn load_str(toml_content: &str) -> Result<Config> {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        Config::load(temp_file.path())
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.bus.device_address, 0x57);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.file_policy(), FilePolicy::default());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = load_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let config = load_str(
            r#"
[bus]
device_address = 0x58
timeout_ms = 250

[retry]
checksum_attempts = 5
settle_delay_ms = 0

[telemetry]
enabled = false
log_dir = "/tmp/adcs"
"#,
        )
        .unwrap();

        assert_eq!(config.bus.device_address, 0x58);
        assert_eq!(config.retry.ack_poll_budget, 1000);
        assert!(!config.telemetry.enabled);
        assert_eq!(config.telemetry.log_dir, Some(PathBuf::from("/tmp/adcs")));

        let policy = config.retry_policy();
        assert_eq!(policy.checksum_attempts, 5);
        assert_eq!(policy.bus_timeout, Duration::from_millis(250));
        assert_eq!(policy.settle_delay, Duration::ZERO);
    }

    #[test]
    fn test_invalid_timeout() {
        let err = load_str("[bus]\ntimeout_ms = 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));

        assert!(load_str("[bus]\ntimeout_ms = 10001\n").is_err());
        assert!(load_str("[bus]\ntimeout_ms = 10000\n").is_ok());
    }

    #[test]
    fn test_invalid_retry_budgets() {
        assert!(load_str("[retry]\nchecksum_attempts = 0\n").is_err());
        assert!(load_str("[retry]\nack_poll_budget = 0\n").is_err());
        assert!(load_str("[retry]\nsettle_delay_ms = 1001\n").is_err());
    }

    #[test]
    fn test_files_section() {
        let config = load_str(
            r#"
[files]
pointer_delay_ms = 50
pointer_timeout_ms = 5000
hole_map_attempts = 0
"#,
        )
        .unwrap();

        let policy = config.file_policy();
        assert_eq!(policy.pointer_delay, Duration::from_millis(50));
        assert_eq!(policy.pointer_timeout, Duration::from_millis(5000));
        assert_eq!(policy.burst_delay, Duration::from_millis(100));
        assert_eq!(policy.block_ready_polls, 100);
        assert_eq!(policy.hole_map_attempts, 0);

        assert!(load_str("[files]\npointer_timeout_ms = 0\n").is_err());
        assert!(load_str("[files]\nblock_ready_polls = 0\n").is_err());
        assert!(load_str("[files]\nburst_delay_ms = 10001\n").is_err());
    }

    #[test]
    fn test_invalid_address() {
        let mut config = Config::default();
        config.bus.device_address = 0x80;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_poll_interval() {
        let mut config = Config::default();
        config.telemetry.poll_interval_ms = 0;
        assert!(config.validate().is_err());

        config.telemetry.poll_interval_ms = 60001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_log_path_when_enabled() {
        let mut config = Config::default();
        config.telemetry.log_path = PathBuf::new();
        assert!(config.validate().is_err());

        config.telemetry.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(load_str("[bus\n"), Err(AdcsError::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Config::load("/nonexistent/adcs.toml"),
            Err(AdcsError::Io(_))
        ));
    }
}
