//! Expectation suites.
//!
//! A suite is an ordered list of literal console markers plus the targets the
//! firmware image builds for. Suites are defined once, as statics, and looked
//! up by name from the CLI.

pub mod ipc_isr;

use crate::dut::{Dut, ExpectError};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{error, info};

/// Build targets the harness knows how to parametrize over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Esp32,
    Esp32s3,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Esp32 => "esp32",
            Target::Esp32s3 => "esp32s3",
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "esp32" => Ok(Target::Esp32),
            "esp32s3" => Ok(Target::Esp32s3),
            other => Err(format!("unknown target: {other}")),
        }
    }
}

/// An ordered marker-sequence test.
#[derive(Debug)]
pub struct Suite {
    /// Suite name as used by `--suite`.
    pub name: &'static str,
    /// Targets the firmware image is built for.
    pub targets: &'static [Target],
    /// The expected markers, in order.
    pub markers: &'static [&'static str],
}

/// All registered suites.
pub static ALL: &[&Suite] = &[&ipc_isr::SUITE];

/// Look up a suite by name.
pub fn find(name: &str) -> Option<&'static Suite> {
    ALL.iter().copied().find(|s| s.name == name)
}

impl Suite {
    /// Whether this suite's firmware builds for `target`.
    pub fn supports(&self, target: Target) -> bool {
        self.targets.contains(&target)
    }

    /// Run the suite against a connected device.
    ///
    /// Consumes the device's output stream, matching each marker in order,
    /// and reports how far the sequence progressed.
    pub fn run(&self, dut: &mut Dut) -> SuiteReport {
        info!(suite = self.name, port = dut.port_name(), "suite start");
        let started = Instant::now();
        let result = dut.expect_sequence(self.markers);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(()) => {
                info!(suite = self.name, elapsed_ms, "suite passed");
                SuiteReport {
                    suite: self.name.to_string(),
                    port: dut.port_name().to_string(),
                    passed: true,
                    matched: self.markers.len(),
                    total: self.markers.len(),
                    failed_marker: None,
                    failure: None,
                    error: None,
                    elapsed_ms,
                }
            }
            Err(failure) => {
                error!(
                    suite = self.name,
                    index = failure.index,
                    total = failure.total,
                    source = %failure.source,
                    "suite failed"
                );
                SuiteReport {
                    suite: self.name.to_string(),
                    port: dut.port_name().to_string(),
                    passed: false,
                    matched: failure.index,
                    total: failure.total,
                    failed_marker: Some(self.markers[failure.index].to_string()),
                    failure: Some(FailureKind::from(&failure.source)),
                    error: Some(failure.source.to_string()),
                    elapsed_ms,
                }
            }
        }
    }
}

/// Which of the two fatal failure kinds ended the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ExpectationTimeout,
    DeviceError,
}

impl From<&ExpectError> for FailureKind {
    fn from(err: &ExpectError) -> Self {
        match err {
            ExpectError::Timeout { .. } => FailureKind::ExpectationTimeout,
            ExpectError::Device { .. } => FailureKind::DeviceError,
        }
    }
}

/// Outcome of a suite run, serializable for `--json` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub suite: String,
    pub port: String,
    pub passed: bool,
    /// Markers matched before the run ended.
    pub matched: usize,
    pub total: usize,
    /// The first unmatched marker, if the run failed.
    pub failed_marker: Option<String>,
    pub failure: Option<FailureKind>,
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl SuiteReport {
    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        if self.passed {
            format!(
                "PASS {} on {}: {}/{} markers in {} ms",
                self.suite, self.port, self.matched, self.total, self.elapsed_ms
            )
        } else {
            format!(
                "FAIL {} on {}: {}/{} markers matched, stuck at {:?}",
                self.suite,
                self.port,
                self.matched,
                self.total,
                self.failed_marker.as_deref().unwrap_or("?")
            )
        }
    }
}
