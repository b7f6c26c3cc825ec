//! Hardware-in-the-loop run of the IPC-ISR suite.
//!
//! Requires a target flashed with the ipc_isr example and connected on
//! `TEST_PORT`. Run with:
//!
//! ```bash
//! TEST_PORT=/dev/ttyUSB0 cargo test --features hardware-tests --test hardware_ipc_isr
//! ```
//!
//! The device must boot (or auto-reset on port open, as USB-serial adapters
//! with DTR/RTS reset wiring do) after the port is opened, so the transcript
//! starts from `example: Start`.

#![cfg(feature = "hardware-tests")]

use dut_console::dut::Dut;
use dut_console::port::{PortSettings, SerialConsole};
use dut_console::suite;
use std::time::Duration;

struct HardwareConfig {
    port_name: String,
    baud_rate: u32,
    window: Duration,
}

impl HardwareConfig {
    fn from_env() -> Option<Self> {
        let port_name = std::env::var("TEST_PORT").ok()?;
        let baud_rate = std::env::var("TEST_BAUD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(115_200);
        let window = std::env::var("TEST_WINDOW_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_secs(30));

        Some(HardwareConfig {
            port_name,
            baud_rate,
            window,
        })
    }
}

macro_rules! skip_without_hardware {
    () => {
        match HardwareConfig::from_env() {
            Some(config) => config,
            None => {
                println!("Skipping: TEST_PORT environment variable not set");
                println!("   Set TEST_PORT=/dev/ttyUSB0 (or COM3) to run hardware tests");
                return;
            }
        }
    };
}

#[test]
fn ipc_isr_transcript_on_hardware() {
    let config = skip_without_hardware!();

    let console = SerialConsole::open(&config.port_name, PortSettings::with_baud(config.baud_rate))
        .expect("open console port");

    let mut dut = Dut::new(console, config.window);
    dut.discard_pending().expect("discard stale output");

    let report = suite::find("ipc_isr").expect("suite registered").run(&mut dut);
    assert!(report.passed, "{}", report.summary());
    assert_eq!(report.matched, 12);
}
