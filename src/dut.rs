//! Device-under-test handle and expectation engine.
//!
//! A `Dut` owns a console port and provides blocking expect operations over
//! the device's output stream: wait for a literal marker, wait for a regex
//! pattern, or check an ordered marker sequence. Matched bytes are consumed;
//! nothing is ever re-matched.

use crate::port::{ConsolePort, PortError};
use memchr::{memchr, memmem};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

/// Read granularity for the poll loop.
const READ_CHUNK: usize = 512;

/// Errors from a single expect operation. Both are fatal to a test run.
#[derive(Debug, Error)]
pub enum ExpectError {
    /// The marker was not observed within the wait window.
    #[error("expectation timed out after {window:?} waiting for {marker:?}")]
    Timeout { marker: String, window: Duration },

    /// The console could not be read.
    #[error("device error while waiting for {marker:?}: {source}")]
    Device {
        marker: String,
        #[source]
        source: PortError,
    },
}

/// Failure report from an ordered sequence check.
///
/// `index` is the zero-based position of the first unmatched marker, which is
/// also the number of markers that did match before the failure.
#[derive(Debug, Error)]
#[error("sequence failed at marker {index} of {total}: {source}")]
pub struct SequenceFailure {
    pub index: usize,
    pub total: usize,
    #[source]
    pub source: ExpectError,
}

/// Handle for a connected device under test.
///
/// Wraps a console port with a rolling capture buffer and a per-expectation
/// wait window. Reads are sequential and blocking; each expect call polls the
/// port until its marker appears or the window elapses.
#[derive(Debug)]
pub struct Dut {
    port: Box<dyn ConsolePort>,
    window: Duration,
    /// Bytes received but not yet consumed by a match.
    capture: Vec<u8>,
    /// Tail of the last partially-received line, for line-wise logging.
    pending_line: Vec<u8>,
}

impl Dut {
    /// Create a handle over an open console port with the given wait window.
    pub fn new(port: impl ConsolePort + 'static, window: Duration) -> Self {
        Self {
            port: Box::new(port),
            window,
            capture: Vec::new(),
            pending_line: Vec::new(),
        }
    }

    /// The name of the underlying console port.
    pub fn port_name(&self) -> &str {
        self.port.name()
    }

    /// The per-expectation wait window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replace the per-expectation wait window.
    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }

    /// Drop buffered capture and any unread port data.
    ///
    /// Call before a fresh boot session so stale output from a previous run
    /// cannot satisfy an expectation.
    pub fn discard_pending(&mut self) -> Result<(), PortError> {
        self.capture.clear();
        self.pending_line.clear();
        self.port.clear_input()
    }

    /// Block until `marker` appears verbatim in the output stream.
    ///
    /// The stream is consumed through the end of the match; anything received
    /// after the marker stays buffered for the next expectation. Fails with
    /// [`ExpectError::Timeout`] when the wait window elapses first and
    /// [`ExpectError::Device`] when the console cannot be read.
    pub fn expect_exact(&mut self, marker: &str) -> Result<(), ExpectError> {
        let deadline = Instant::now() + self.window;
        let finder = memmem::Finder::new(marker.as_bytes());

        loop {
            if let Some(pos) = finder.find(&self.capture) {
                self.capture.drain(..pos + marker.len());
                info!(marker, "matched");
                return Ok(());
            }

            if Instant::now() >= deadline {
                return Err(ExpectError::Timeout {
                    marker: marker.to_string(),
                    window: self.window,
                });
            }

            self.poll(marker)?;
        }
    }

    /// Block until `pattern` matches somewhere in the output stream.
    ///
    /// Returns the matched text (lossy UTF-8). The stream is consumed through
    /// the end of the match. The IPC-ISR suite only needs exact markers; this
    /// exists for suites that assert on variable output such as addresses.
    pub fn expect(&mut self, pattern: &regex::bytes::Regex) -> Result<String, ExpectError> {
        let deadline = Instant::now() + self.window;

        loop {
            if let Some((start, end)) = pattern.find(&self.capture).map(|m| (m.start(), m.end())) {
                let text = String::from_utf8_lossy(&self.capture[start..end]).into_owned();
                self.capture.drain(..end);
                info!(pattern = pattern.as_str(), matched = %text, "matched");
                return Ok(text);
            }

            if Instant::now() >= deadline {
                return Err(ExpectError::Timeout {
                    marker: pattern.as_str().to_string(),
                    window: self.window,
                });
            }

            self.poll(pattern.as_str())?;
        }
    }

    /// Check that every marker appears in the stream, in order.
    ///
    /// Matching never skips ahead: a marker arriving before its turn is
    /// consumed while waiting for an earlier one, and the sequence fails at
    /// the marker whose turn it was. The first failure aborts the check.
    pub fn expect_sequence(&mut self, markers: &[&str]) -> Result<(), SequenceFailure> {
        let total = markers.len();
        for (index, marker) in markers.iter().enumerate() {
            self.expect_exact(marker).map_err(|source| SequenceFailure {
                index,
                total,
                source,
            })?;
            debug!(index, total, "sequence progress");
        }
        Ok(())
    }

    /// One blocking read into the capture buffer.
    ///
    /// Empty intervals (TimedOut/WouldBlock) are not errors; the caller's
    /// deadline decides when waiting stops.
    fn poll(&mut self, marker: &str) -> Result<(), ExpectError> {
        let mut buffer = [0u8; READ_CHUNK];
        match self.port.read_bytes(&mut buffer) {
            Ok(n) => {
                self.ingest(&buffer[..n]);
                Ok(())
            }
            Err(e) if e.is_would_block() => Ok(()),
            Err(e) => Err(ExpectError::Device {
                marker: marker.to_string(),
                source: e,
            }),
        }
    }

    /// Append received bytes and log any completed console lines.
    fn ingest(&mut self, data: &[u8]) {
        self.capture.extend_from_slice(data);

        let mut rest = data;
        while let Some(nl) = memchr(b'\n', rest) {
            self.pending_line.extend_from_slice(&rest[..nl]);
            if self.pending_line.last() == Some(&b'\r') {
                self.pending_line.pop();
            }
            debug!(line = %String::from_utf8_lossy(&self.pending_line), "console");
            self.pending_line.clear();
            rest = &rest[nl + 1..];
        }
        self.pending_line.extend_from_slice(rest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::MockConsole;

    // Short window: scripted data arrives on the first poll, and negative
    // cases fail without slowing the suite down.
    fn dut_with(console: MockConsole) -> Dut {
        Dut::new(console, Duration::from_millis(200))
    }

    #[test]
    fn test_expect_exact_consumes_through_match() {
        let mut console = MockConsole::new("MOCK0");
        console.enqueue_line("noise before");
        console.enqueue_line("example: Start");
        console.enqueue_line("example: End");
        let mut dut = dut_with(console);

        dut.expect_exact("example: Start").unwrap();
        dut.expect_exact("example: End").unwrap();
    }

    #[test]
    fn test_expect_exact_does_not_rematch() {
        let mut console = MockConsole::new("MOCK0");
        console.enqueue_line("example: Start");
        let mut dut = dut_with(console);

        dut.expect_exact("example: Start").unwrap();
        // The line was consumed; a second wait for it must time out.
        let err = dut.expect_exact("example: Start").unwrap_err();
        assert!(matches!(err, ExpectError::Timeout { .. }));
    }

    #[test]
    fn test_expect_exact_timeout_names_marker() {
        let console = MockConsole::new("MOCK0");
        let mut dut = dut_with(console);

        let err = dut.expect_exact("example: Start").unwrap_err();
        match err {
            ExpectError::Timeout { marker, .. } => assert_eq!(marker, "example: Start"),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_expect_exact_device_error() {
        let mut console = MockConsole::new("MOCK0");
        console.set_disconnected(true);
        let mut dut = Dut::new(console, Duration::from_secs(1));

        let err = dut.expect_exact("example: Start").unwrap_err();
        assert!(matches!(err, ExpectError::Device { .. }));
    }

    #[test]
    fn test_expect_regex() {
        let mut console = MockConsole::new("MOCK0");
        console.enqueue_line("example: out[3] = PS of other cpu = 0x25");
        let mut dut = dut_with(console);

        let pattern = regex::bytes::Regex::new(r"PS of other cpu = 0x[0-9a-f]+").unwrap();
        let text = dut.expect(&pattern).unwrap();
        assert_eq!(text, "PS of other cpu = 0x25");
    }

    #[test]
    fn test_expect_sequence_reports_first_mismatch() {
        let mut console = MockConsole::new("MOCK0");
        console.enqueue_lines(["a", "b", "d"]);
        let mut dut = dut_with(console);

        let failure = dut.expect_sequence(&["a", "b", "c", "d"]).unwrap_err();
        assert_eq!(failure.index, 2);
        assert_eq!(failure.total, 4);
        assert!(matches!(failure.source, ExpectError::Timeout { .. }));
    }

    #[test]
    fn test_marker_split_across_reads() {
        let mut console = MockConsole::new("MOCK0");
        console.set_max_read_chunk(4);
        console.enqueue_line("example: PS_INTLEVEL = 0x5");
        let mut dut = Dut::new(console, Duration::from_secs(1));

        dut.expect_exact("example: PS_INTLEVEL = 0x5").unwrap();
    }

    #[test]
    fn test_discard_pending_drops_stale_output() {
        let mut console = MockConsole::new("MOCK0");
        console.enqueue_line("example: Start");
        let mut dut = dut_with(console);

        dut.discard_pending().unwrap();
        let err = dut.expect_exact("example: Start").unwrap_err();
        assert!(matches!(err, ExpectError::Timeout { .. }));
    }
}
