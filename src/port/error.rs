//! Port-specific error types.
//!
//! Errors for console port operations, kept separate from the harness-level
//! errors so the port layer stays self-contained.

use thiserror::Error;

/// Errors that can occur during console port operations.
#[derive(Debug, Error)]
pub enum PortError {
    /// The specified console port was not found on the system.
    #[error("Console port not found: {0}")]
    NotFound(String),

    /// An I/O error occurred during port operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Port configuration failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A read saw no data within the per-read timeout.
    #[error("Read timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The device went away mid-session (unplugged, reset into bootloader).
    #[error("Device disconnected: {0}")]
    Disconnected(String),

    /// A serialport-specific error occurred.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl PortError {
    /// Create a NotFound error from a port name.
    pub fn not_found(port_name: impl Into<String>) -> Self {
        Self::NotFound(port_name.into())
    }

    /// Create a Config error from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a Timeout error from a duration.
    pub fn timeout(duration: std::time::Duration) -> Self {
        Self::Timeout(duration)
    }

    /// Create a Disconnected error from a message.
    pub fn disconnected(message: impl Into<String>) -> Self {
        Self::Disconnected(message.into())
    }

    /// Whether this error means "no data yet" rather than a real fault.
    ///
    /// Serial reads signal an empty interval as `TimedOut` (or `WouldBlock`
    /// on some platforms); the expectation engine keeps polling on these
    /// until its own window elapses.
    pub fn is_would_block(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }
}
