//! Configuration module for dut-console.
//!
//! TOML-based configuration with environment variable overrides.
//!
//! # Configuration Resolution
//!
//! Configuration is loaded from the following locations (in order of priority):
//!
//! 1. `DUT_CONSOLE_CONFIG` environment variable (explicit path)
//! 2. `./dut-console.toml` (current directory)
//! 3. `~/.config/dut-console/dut-console.toml` (XDG on Linux/macOS)
//! 4. `%APPDATA%\dut-console\dut-console.toml` (Windows)
//! 5. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! Values can be overridden via `DUT_CONSOLE_<SECTION>_<KEY>` variables:
//!
//! - `DUT_CONSOLE_CONSOLE_BAUD=74880`
//! - `DUT_CONSOLE_EXPECT_WINDOW_MS=60000`
//! - `DUT_CONSOLE_TARGET_PORT=/dev/ttyUSB1`
//!
//! The ESP-IDF convention variables `ESPPORT` and `ESPBAUD` are also honored
//! for the target port and console baud.

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{resolve_config_path, ConfigLoader};
pub use schema::{Config, ConsoleConfig, ExpectConfig, LogFormat, LoggingConfig, TargetConfig};
