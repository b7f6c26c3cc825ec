//! Configuration schema definitions.
//!
//! Defines the structure of the configuration file using serde. All sections
//! carry defaults so a missing file or partial file is always valid.

use crate::suite::Target;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Console line settings
    pub console: ConsoleConfig,
    /// Expectation window settings
    pub expect: ExpectConfig,
    /// Target selection
    pub target: TargetConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Console configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Baud rate for the device console
    pub baud: u32,
    /// Per-read timeout in milliseconds (poll granularity)
    pub read_timeout_ms: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            baud: 115_200,
            read_timeout_ms: 100,
        }
    }
}

impl ConsoleConfig {
    /// Per-read timeout as a Duration
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Expectation window configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpectConfig {
    /// Wait window per marker, in milliseconds
    pub window_ms: u64,
}

impl Default for ExpectConfig {
    fn default() -> Self {
        // Matches the wait the reference pytest harness gives each marker.
        Self { window_ms: 30_000 }
    }
}

impl ExpectConfig {
    /// Wait window as a Duration
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

/// Target selection section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Build target the connected device was flashed for
    pub name: Option<Target>,
    /// Console port path (e.g. "/dev/ttyUSB0" or "COM3")
    pub port: Option<String>,
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Compact,
}
