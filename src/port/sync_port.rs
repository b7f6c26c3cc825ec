//! Real serial console implementation.
//!
//! Wraps the `serialport` crate's `SerialPort` trait with our own
//! `ConsolePort` trait for dependency injection and testing.

use super::error::PortError;
use super::traits::{ConsolePort, PortSettings};
use std::io::Read;
use std::time::Duration;

/// Serial console implementation wrapping `serialport::SerialPort`.
pub struct SerialConsole {
    /// The underlying serial port implementation.
    port: Box<dyn serialport::SerialPort>,
    /// The port name/path for identification.
    name: String,
}

impl SerialConsole {
    /// Open a device console with the given settings.
    ///
    /// # Arguments
    /// * `port_name` - The system path to the serial port (e.g., "/dev/ttyUSB0" or "COM3")
    /// * `settings` - Line settings for the console
    ///
    /// # Example
    /// ```no_run
    /// use dut_console::port::{SerialConsole, PortSettings};
    ///
    /// let console = SerialConsole::open("/dev/ttyUSB0", PortSettings::default())?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(port_name: &str, settings: PortSettings) -> Result<Self, PortError> {
        let port = serialport::new(port_name, settings.baud_rate)
            .data_bits(settings.data_bits.into())
            .flow_control(settings.flow_control.into())
            .parity(settings.parity.into())
            .stop_bits(settings.stop_bits.into())
            .timeout(settings.read_timeout)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => PortError::not_found(port_name),
                serialport::ErrorKind::InvalidInput => PortError::config(e.to_string()),
                _ => PortError::Serial(e),
            })?;

        Ok(Self {
            port,
            name: port_name.to_string(),
        })
    }

    /// Open a device console with default settings (115200 8N1).
    pub fn open_default(port_name: &str) -> Result<Self, PortError> {
        Self::open(port_name, PortSettings::default())
    }

    /// List the serial ports known to the system.
    pub fn available_ports() -> Vec<serialport::SerialPortInfo> {
        serialport::available_ports().unwrap_or_default()
    }
}

impl ConsolePort for SerialConsole {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        match self.port.read(buffer) {
            // EOF from a serial device means it went away, not end of stream.
            Ok(0) => Err(PortError::disconnected(self.name.clone())),
            Ok(n) => Ok(n),
            Err(e) => Err(PortError::Io(e)),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        self.port.set_timeout(timeout).map_err(PortError::Serial)
    }

    fn clear_input(&mut self) -> Result<(), PortError> {
        self.port
            .clear(serialport::ClearBuffer::Input)
            .map_err(PortError::Serial)
    }

    fn bytes_to_read(&self) -> Option<usize> {
        self.port.bytes_to_read().ok().map(|n| n as usize)
    }
}

impl std::fmt::Debug for SerialConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialConsole")
            .field("name", &self.name)
            .field("baud_rate", &self.port.baud_rate())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_not_found_error() {
        let result = SerialConsole::open("/dev/nonexistent_port_12345", PortSettings::default());

        assert!(result.is_err());
        if let Err(e) = result {
            match e {
                PortError::NotFound(name) => {
                    assert!(name.contains("nonexistent"));
                }
                _ => panic!("Expected NotFound error, got: {:?}", e),
            }
        }
    }

    #[test]
    fn test_available_ports_does_not_panic() {
        let _ = SerialConsole::available_ports();
    }
}
