//! Mock console implementation for testing.
//!
//! Provides a `MockConsole` that simulates a device's console output without
//! requiring actual hardware. Tests script the boot log up front and can
//! simulate timeouts and disconnects.

use super::error::PortError;
use super::traits::ConsolePort;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Inner state of the mock console, protected by a mutex for interior mutability.
#[derive(Debug)]
struct MockConsoleState {
    /// Queue of bytes to be returned by read operations.
    read_queue: VecDeque<u8>,
    /// Whether the next read should time out.
    should_timeout: bool,
    /// Whether the device has "disconnected"; all further reads fail.
    disconnected: bool,
    /// Configured per-read timeout duration.
    read_timeout: Duration,
    /// Whether the input buffer has been cleared.
    input_cleared: bool,
    /// Upper bound on bytes returned per read, to exercise chunked delivery.
    max_read_chunk: usize,
}

impl Default for MockConsoleState {
    fn default() -> Self {
        Self {
            read_queue: VecDeque::new(),
            should_timeout: false,
            disconnected: false,
            read_timeout: Duration::from_millis(100),
            input_cleared: false,
            max_read_chunk: usize::MAX,
        }
    }
}

/// Mock console implementation for testing.
///
/// This implementation allows you to:
/// - Script console output line-by-line or as raw byte chunks
/// - Simulate read timeouts and device disconnects
/// - Bound the bytes delivered per read to exercise split markers
///
/// # Example
/// ```
/// use dut_console::port::{ConsolePort, MockConsole};
///
/// let mut console = MockConsole::new("MOCK0");
/// console.enqueue_line("example: Start");
///
/// let mut buffer = [0u8; 32];
/// let n = console.read_bytes(&mut buffer).unwrap();
/// assert_eq!(&buffer[..n], b"example: Start\r\n");
/// ```
#[derive(Clone)]
pub struct MockConsole {
    /// The port name/identifier.
    name: String,
    /// The internal state, wrapped in Arc<Mutex<>> for interior mutability.
    state: Arc<Mutex<MockConsoleState>>,
}

impl MockConsole {
    /// Create a new mock console with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockConsoleState::default())),
        }
    }

    /// Enqueue a console line, terminated CRLF as UART monitors deliver it.
    pub fn enqueue_line(&mut self, line: &str) {
        let mut state = self.state.lock().unwrap();
        state.read_queue.extend(line.as_bytes());
        state.read_queue.extend(b"\r\n");
    }

    /// Enqueue several console lines at once.
    pub fn enqueue_lines<'a>(&mut self, lines: impl IntoIterator<Item = &'a str>) {
        for line in lines {
            self.enqueue_line(line);
        }
    }

    /// Enqueue raw bytes without any line termination.
    pub fn enqueue_bytes(&mut self, data: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.read_queue.extend(data);
    }

    /// Make the next read time out instead of returning data.
    pub fn set_should_timeout(&mut self, should_timeout: bool) {
        let mut state = self.state.lock().unwrap();
        state.should_timeout = should_timeout;
    }

    /// Simulate the device going away; all further reads fail.
    pub fn set_disconnected(&mut self, disconnected: bool) {
        let mut state = self.state.lock().unwrap();
        state.disconnected = disconnected;
    }

    /// Bound the number of bytes any single read returns.
    pub fn set_max_read_chunk(&mut self, max: usize) {
        let mut state = self.state.lock().unwrap();
        state.max_read_chunk = max.max(1);
    }

    /// Get whether the input buffer has been cleared since the last reset.
    pub fn was_input_cleared(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.input_cleared
    }

    /// Reset the "input cleared" flag.
    pub fn reset_cleared_flag(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.input_cleared = false;
    }

    /// Get the number of bytes still queued for reading.
    pub fn queued_bytes(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.read_queue.len()
    }
}

impl ConsolePort for MockConsole {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock().unwrap();

        if state.disconnected {
            return Err(PortError::disconnected(self.name.clone()));
        }

        if state.should_timeout {
            state.should_timeout = false;
            return Err(PortError::timeout(state.read_timeout));
        }

        let limit = buffer.len().min(state.max_read_chunk);
        let mut bytes_read = 0;
        for byte in buffer.iter_mut().take(limit) {
            if let Some(queued_byte) = state.read_queue.pop_front() {
                *byte = queued_byte;
                bytes_read += 1;
            } else {
                break;
            }
        }

        if bytes_read == 0 {
            // An empty interval on a real port surfaces as TimedOut.
            Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "No data available",
            )))
        } else {
            Ok(bytes_read)
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        let mut state = self.state.lock().unwrap();
        state.read_timeout = timeout;
        Ok(())
    }

    fn clear_input(&mut self) -> Result<(), PortError> {
        let mut state = self.state.lock().unwrap();
        state.read_queue.clear();
        state.input_cleared = true;
        Ok(())
    }

    fn bytes_to_read(&self) -> Option<usize> {
        let state = self.state.lock().unwrap();
        Some(state.read_queue.len())
    }
}

impl std::fmt::Debug for MockConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockConsole")
            .field("name", &self.name)
            .field("queued_bytes", &self.queued_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_line_and_read() {
        let mut console = MockConsole::new("MOCK0");
        console.enqueue_line("hello");

        let mut buffer = [0u8; 16];
        let n = console.read_bytes(&mut buffer).unwrap();
        assert_eq!(n, 7);
        assert_eq!(&buffer[..n], b"hello\r\n");
    }

    #[test]
    fn test_enqueue_raw_bytes() {
        let mut console = MockConsole::new("MOCK0");
        console.enqueue_bytes(b"partial");

        let mut buffer = [0u8; 16];
        let n = console.read_bytes(&mut buffer).unwrap();
        assert_eq!(&buffer[..n], b"partial");
    }

    #[test]
    fn test_empty_read_times_out() {
        let mut console = MockConsole::new("MOCK0");
        let mut buffer = [0u8; 16];

        let result = console.read_bytes(&mut buffer);
        match result {
            Err(e) => assert!(e.is_would_block()),
            Ok(n) => panic!("Expected timeout, read {} bytes", n),
        }
    }

    #[test]
    fn test_timeout_simulation() {
        let mut console = MockConsole::new("MOCK0");
        console.enqueue_line("data behind the timeout");
        console.set_should_timeout(true);

        let mut buffer = [0u8; 16];
        assert!(matches!(
            console.read_bytes(&mut buffer),
            Err(PortError::Timeout(_))
        ));

        // Timeout is one-shot; the queued data is readable afterwards.
        assert!(console.read_bytes(&mut buffer).is_ok());
    }

    #[test]
    fn test_disconnect_simulation() {
        let mut console = MockConsole::new("MOCK0");
        console.enqueue_line("unreachable");
        console.set_disconnected(true);

        let mut buffer = [0u8; 16];
        assert!(matches!(
            console.read_bytes(&mut buffer),
            Err(PortError::Disconnected(_))
        ));
        // Disconnects are sticky.
        assert!(matches!(
            console.read_bytes(&mut buffer),
            Err(PortError::Disconnected(_))
        ));
    }

    #[test]
    fn test_max_read_chunk() {
        let mut console = MockConsole::new("MOCK0");
        console.set_max_read_chunk(3);
        console.enqueue_bytes(b"abcdef");

        let mut buffer = [0u8; 16];
        assert_eq!(console.read_bytes(&mut buffer).unwrap(), 3);
        assert_eq!(&buffer[..3], b"abc");
        assert_eq!(console.read_bytes(&mut buffer).unwrap(), 3);
        assert_eq!(&buffer[..3], b"def");
    }

    #[test]
    fn test_clear_input() {
        let mut console = MockConsole::new("MOCK0");
        console.enqueue_line("stale boot output");

        console.clear_input().unwrap();
        assert!(console.was_input_cleared());
        assert_eq!(console.queued_bytes(), 0);
    }

    #[test]
    fn test_bytes_to_read() {
        let mut console = MockConsole::new("MOCK0");
        console.enqueue_bytes(b"123456789");

        assert_eq!(console.bytes_to_read(), Some(9));
    }
}
