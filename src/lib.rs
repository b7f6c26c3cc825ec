//! dut-console
//!
//! Serial console expectation harness for device-in-the-loop firmware tests.
//! Opens a device's console, waits for literal log markers in a fixed order,
//! and reports the first point of mismatch.
//!
//! # Modules
//!
//! - `config`: TOML configuration with environment overrides
//! - `dut`: device handle and blocking expectation engine
//! - `error`: harness-level error type for the runner
//! - `port`: console port abstraction (real serial + mock)
//! - `suite`: named marker-sequence suites (currently `ipc_isr`)
//!
//! # Example
//!
//! ```
//! use dut_console::dut::Dut;
//! use dut_console::port::MockConsole;
//! use std::time::Duration;
//!
//! let mut console = MockConsole::new("MOCK0");
//! console.enqueue_line("example: Start");
//! console.enqueue_line("example: End");
//!
//! let mut dut = Dut::new(console, Duration::from_secs(1));
//! dut.expect_sequence(&["example: Start", "example: End"]).unwrap();
//! ```

pub mod config;
pub mod dut;
pub mod error;
pub mod port;
pub mod suite;

// Re-export commonly used types for convenience
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
pub use dut::{Dut, ExpectError, SequenceFailure};
pub use error::HarnessError;
pub use port::{
    ConsolePort, DataBits, FlowControl, MockConsole, Parity, PortError, PortSettings,
    SerialConsole, StopBits,
};
pub use suite::{FailureKind, Suite, SuiteReport, Target};
