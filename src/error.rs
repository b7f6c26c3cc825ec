//! Harness-level error type for the runner binary.

use thiserror::Error;

/// Errors surfaced by the runner before or while driving a suite.
///
/// Expectation failures are not errors at this level; they travel inside the
/// suite report so the runner can still print progress and emit JSON.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Port(#[from] crate::port::PortError),

    #[error("no console port specified; pass --port, set ESPPORT, or configure [target] port")]
    NoPort,

    #[error("unknown suite: {0}")]
    UnknownSuite(String),

    #[error("suite '{suite}' does not build for target '{target}'")]
    TargetUnsupported { suite: String, target: String },
}
