//! Core traits for console port abstraction.
//!
//! Defines the `ConsolePort` trait that allows both real serial consoles
//! and mock implementations to be used interchangeably by the harness.

use super::error::PortError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Line settings for a device console.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortSettings {
    /// Baud rate (bits per second).
    pub baud_rate: u32,

    /// Number of data bits (5, 6, 7, or 8).
    pub data_bits: DataBits,

    /// Flow control mode.
    pub flow_control: FlowControl,

    /// Parity checking mode.
    pub parity: Parity,

    /// Number of stop bits.
    pub stop_bits: StopBits,

    /// Per-read timeout. This bounds a single read, not a whole expect
    /// window; the `Dut` polls at this granularity.
    pub read_timeout: Duration,
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            data_bits: DataBits::Eight,
            flow_control: FlowControl::None,
            parity: Parity::None,
            stop_bits: StopBits::One,
            read_timeout: Duration::from_millis(100),
        }
    }
}

impl PortSettings {
    /// Settings with a non-default baud rate, everything else 8N1.
    pub fn with_baud(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Self::default()
        }
    }
}

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl From<DataBits> for serialport::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Five => serialport::DataBits::Five,
            DataBits::Six => serialport::DataBits::Six,
            DataBits::Seven => serialport::DataBits::Seven,
            DataBits::Eight => serialport::DataBits::Eight,
        }
    }
}

/// Flow control modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowControl {
    None,
    Software,
    Hardware,
}

impl From<FlowControl> for serialport::FlowControl {
    fn from(flow: FlowControl) -> Self {
        match flow {
            FlowControl::None => serialport::FlowControl::None,
            FlowControl::Software => serialport::FlowControl::Software,
            FlowControl::Hardware => serialport::FlowControl::Hardware,
        }
    }
}

/// Parity checking modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl From<Parity> for serialport::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        }
    }
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopBits {
    One,
    Two,
}

impl From<StopBits> for serialport::StopBits {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => serialport::StopBits::One,
            StopBits::Two => serialport::StopBits::Two,
        }
    }
}

/// Trait for blocking console read operations.
///
/// This trait abstracts over the device's output stream, allowing the
/// expectation engine to run against real hardware or a scripted mock.
pub trait ConsolePort: Send + std::fmt::Debug {
    /// Read bytes from the console into the provided buffer.
    ///
    /// Returns the number of bytes actually read. A read that sees no data
    /// within the per-read timeout returns a `TimedOut`/`WouldBlock` I/O
    /// error, which callers treat as "no data yet".
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// Get the name/path of this console port.
    fn name(&self) -> &str;

    /// Set the per-read timeout for this port.
    fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), PortError>;

    /// Discard any unread data in the receive buffer.
    ///
    /// Used before a fresh boot session so stale output from a previous run
    /// cannot satisfy an expectation.
    fn clear_input(&mut self) -> Result<(), PortError>;

    /// Get the current bytes available to read (if supported).
    ///
    /// Returns `None` if the operation is not supported or cannot be determined.
    fn bytes_to_read(&self) -> Option<usize> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = PortSettings::default();
        assert_eq!(settings.baud_rate, 115_200);
        assert_eq!(settings.data_bits, DataBits::Eight);
        assert_eq!(settings.flow_control, FlowControl::None);
        assert_eq!(settings.parity, Parity::None);
        assert_eq!(settings.stop_bits, StopBits::One);
        assert_eq!(settings.read_timeout, Duration::from_millis(100));
    }

    #[test]
    fn test_with_baud() {
        let settings = PortSettings::with_baud(74_880);
        assert_eq!(settings.baud_rate, 74_880);
        assert_eq!(settings.data_bits, DataBits::Eight);
    }

    #[test]
    fn test_data_bits_conversion() {
        let bits = DataBits::Eight;
        let serialport_bits: serialport::DataBits = bits.into();
        assert_eq!(serialport_bits, serialport::DataBits::Eight);
    }

    #[test]
    fn test_flow_control_conversion() {
        let flow = FlowControl::Hardware;
        let serialport_flow: serialport::FlowControl = flow.into();
        assert_eq!(serialport_flow, serialport::FlowControl::Hardware);
    }

    #[test]
    fn test_parity_conversion() {
        let parity = Parity::Even;
        let serialport_parity: serialport::Parity = parity.into();
        assert_eq!(serialport_parity, serialport::Parity::Even);
    }

    #[test]
    fn test_stop_bits_conversion() {
        let stop_bits = StopBits::Two;
        let serialport_stop_bits: serialport::StopBits = stop_bits.into();
        assert_eq!(serialport_stop_bits, serialport::StopBits::Two);
    }
}
