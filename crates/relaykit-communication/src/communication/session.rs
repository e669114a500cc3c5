//! Serial connection session
//!
//! [`SerialSession`] owns the serial handle, the connected/disconnected
//! state, and the background reader thread that turns raw incoming bytes
//! into discrete text lines. The reader never touches UI state; it
//! communicates solely through an mpsc channel drained by the UI timer.
//!
//! Concurrency model: the reader thread locks the handle only to check
//! availability and perform short reads, the UI thread locks it only to
//! write. The stop flag is cooperative and checked once per loop iteration.

use parking_lot::Mutex;
use relaykit_core::{ConnectionError, Result};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Read timeout applied to the underlying port; also the quiet interval
/// after which buffered unterminated bytes are flushed as a line
const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Pause after opening the port. Many Arduino-style boards reset when the
/// host asserts DTR on open; commands sent during the reset are lost.
const SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Bounded wait for the reader thread on disconnect
const JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Reader sleep when the port has no buffered bytes
const IDLE_POLL: Duration = Duration::from_millis(50);

/// Reader backoff after a transient read error
const ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Connection state of a [`SerialSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No port is open
    Disconnected,
    /// A port is open and the reader thread is running
    Connected,
}

/// Low-level serial I/O seam
///
/// Implemented for the real `serialport` handle and by in-memory doubles in
/// tests, so the session can run without hardware.
pub trait SerialLink: Send {
    /// Number of bytes buffered by the driver and ready to read
    fn bytes_to_read(&mut self) -> io::Result<u32>;

    /// Read available bytes into `buf`
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write all of `data` to the port
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Flush pending output
    fn flush(&mut self) -> io::Result<()>;
}

impl SerialLink for Box<dyn serialport::SerialPort> {
    fn bytes_to_read(&mut self) -> io::Result<u32> {
        serialport::SerialPort::bytes_to_read(&**self).map_err(io::Error::from)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(&mut **self, buf)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        io::Write::write_all(&mut **self, data)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::Write::flush(&mut **self)
    }
}

type SharedLink = Arc<Mutex<Box<dyn SerialLink>>>;

/// Serial connection session
///
/// Exactly one instance exists, owned by the UI controller. At most one
/// reader thread is active at any time; `connect` is rejected while a
/// previous reader has not been confirmed stopped.
pub struct SerialSession {
    link: Option<SharedLink>,
    port_name: Option<String>,
    baud_rate: u32,
    stop: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
    incoming: Option<Receiver<String>>,
}

impl SerialSession {
    /// Create a new, disconnected session
    pub fn new() -> Self {
        Self {
            link: None,
            port_name: None,
            baud_rate: 0,
            stop: Arc::new(AtomicBool::new(false)),
            reader: None,
            incoming: None,
        }
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        if self.link.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// True while a port is open
    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// Port name of the open connection, if any
    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    /// Baud rate of the open connection
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// True while the background reader thread is alive
    pub fn reader_running(&self) -> bool {
        self.reader.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// One-line summary for the status bar
    pub fn summary(&self) -> String {
        match self.port_name {
            Some(ref port) => format!("Connected to {} @ {}", port, self.baud_rate),
            None => "Disconnected".to_string(),
        }
    }

    /// Open `port` at `baud` and start the reader thread
    ///
    /// Valid only while disconnected. Blocks for the settle delay after a
    /// successful open so a board reset triggered by the connection can
    /// complete before the session is declared ready.
    pub fn connect(&mut self, port: &str, baud: u32) -> Result<()> {
        if self.is_connected() {
            return Err(ConnectionError::AlreadyConnected {
                port: self.port_name.clone().unwrap_or_default(),
            }
            .into());
        }

        let handle = serialport::new(port, baud)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| {
                tracing::warn!("Failed to open serial port {}: {}", port, e);
                ConnectionError::FailedToOpen {
                    port: port.to_string(),
                    reason: e.to_string(),
                }
            })?;

        thread::sleep(SETTLE_DELAY);

        self.attach_link(Box::new(handle), port, baud)?;
        tracing::info!(port, baud, "serial connection established");
        Ok(())
    }

    /// Attach an already-open link and start the reader thread
    ///
    /// This is the seam `connect` goes through after opening the real port;
    /// tests and simulators use it directly to run the session without
    /// hardware. No settle delay is applied.
    pub fn attach_link(&mut self, link: Box<dyn SerialLink>, port: &str, baud: u32) -> Result<()> {
        if self.is_connected() {
            return Err(ConnectionError::AlreadyConnected {
                port: self.port_name.clone().unwrap_or_default(),
            }
            .into());
        }

        // A reader from a previous connection must be gone before a new one
        // starts.
        if let Some(handle) = self.reader.take() {
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                self.reader = Some(handle);
                return Err(ConnectionError::SerialError {
                    reason: "previous reader thread is still stopping".to_string(),
                }
                .into());
            }
        }

        let link: SharedLink = Arc::new(Mutex::new(link));
        let (tx, rx) = mpsc::channel();

        // Fresh flag: a reader that outlived its join timeout still sees its
        // own flag set.
        self.stop = Arc::new(AtomicBool::new(false));
        let stop = self.stop.clone();
        let reader_link = link.clone();

        let reader = thread::Builder::new()
            .name("serial-reader".to_string())
            .spawn(move || reader_loop(reader_link, tx, stop))
            .map_err(|e| ConnectionError::IoError {
                reason: e.to_string(),
            })?;

        self.link = Some(link);
        self.port_name = Some(port.to_string());
        self.baud_rate = baud;
        self.reader = Some(reader);
        self.incoming = Some(rx);
        Ok(())
    }

    /// Stop the reader and close the port
    ///
    /// Idempotent: calling while already disconnected is a no-op. Waits up
    /// to the join timeout for the reader to acknowledge the stop flag, then
    /// proceeds regardless; close-time errors are swallowed.
    pub fn disconnect(&mut self) {
        if !self.is_connected() {
            return;
        }

        self.stop.store(true, Ordering::Relaxed);

        if let Some(handle) = self.reader.take() {
            let deadline = Instant::now() + JOIN_TIMEOUT;
            while !handle.is_finished() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(10));
            }
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                // The reader exits on its own at the next stop check; do not
                // block the UI thread any longer.
                tracing::warn!("reader thread did not stop within {:?}", JOIN_TIMEOUT);
                self.reader = Some(handle);
            }
        }

        // Dropping the handle closes the port.
        self.link = None;
        self.incoming = None;
        self.port_name = None;
        tracing::info!("serial connection closed");
    }

    /// Write `data` verbatim and flush
    ///
    /// No terminator is appended; framing (e.g. a trailing `#`) is the
    /// caller's responsibility. A write failure is returned to the caller
    /// and does not change the connection state.
    pub fn send(&mut self, data: &[u8]) -> Result<()> {
        let link = self.link.as_ref().ok_or(ConnectionError::NotConnected)?;
        let mut guard = link.lock();
        guard.write_all(data).map_err(|e| ConnectionError::IoError {
            reason: e.to_string(),
        })?;
        guard.flush().map_err(|e| ConnectionError::IoError {
            reason: e.to_string(),
        })?;
        tracing::debug!(bytes = data.len(), "wrote command");
        Ok(())
    }

    /// Non-blocking pop of one decoded incoming line
    pub fn try_recv(&self) -> Option<String> {
        match self.incoming.as_ref()?.try_recv() {
            Ok(line) => Some(line),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

impl Default for SerialSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Reader loop body, one instance per connection lifetime
///
/// Transient errors are treated as "no data this tick" after a short
/// backoff; only the stop flag or a dropped receiver ends the loop. Bytes
/// that sit in the pending buffer without a terminator are flushed as a
/// line once the port has been quiet for the read timeout, matching what a
/// blocking line read would have returned when the timeout expired.
fn reader_loop(link: SharedLink, tx: Sender<String>, stop: Arc<AtomicBool>) {
    let mut pending: Vec<u8> = Vec::new();
    let mut buf = [0u8; 512];
    let mut last_byte = Instant::now();

    while !stop.load(Ordering::Relaxed) {
        let available = link.lock().bytes_to_read();
        match available {
            Ok(0) => {
                if !pending.is_empty() && last_byte.elapsed() >= READ_TIMEOUT {
                    let text = String::from_utf8_lossy(&pending).trim_end().to_string();
                    pending.clear();
                    if !text.is_empty() && tx.send(text).is_err() {
                        return;
                    }
                }
                thread::sleep(IDLE_POLL);
            }
            Ok(_) => {
                let read = link.lock().read(&mut buf);
                match read {
                    Ok(0) => thread::sleep(IDLE_POLL),
                    Ok(n) => {
                        last_byte = Instant::now();
                        pending.extend_from_slice(&buf[..n]);
                        while let Some(line) = next_line(&mut pending) {
                            if tx.send(line).is_err() {
                                // Consumer is gone; nothing left to do.
                                return;
                            }
                        }
                    }
                    Err(e)
                        if e.kind() == io::ErrorKind::TimedOut
                            || e.kind() == io::ErrorKind::WouldBlock => {}
                    Err(e) => {
                        tracing::debug!("transient serial read error: {}", e);
                        thread::sleep(ERROR_BACKOFF);
                    }
                }
            }
            Err(e) => {
                tracing::debug!("transient serial poll error: {}", e);
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }
}

/// Split one complete line off the front of `pending`
///
/// Lines end at `\n` or `\r`. Invalid UTF-8 decodes to replacement
/// characters rather than failing; trailing whitespace is stripped; lines
/// that end up empty are skipped.
fn next_line(pending: &mut Vec<u8>) -> Option<String> {
    loop {
        let idx = pending.iter().position(|&b| b == b'\n' || b == b'\r')?;
        let raw: Vec<u8> = pending.drain(..=idx).collect();
        let text = String::from_utf8_lossy(&raw).trim_end().to_string();
        if !text.is_empty() {
            return Some(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_line_splits_on_newline() {
        let mut pending = b"OK\nrest".to_vec();
        assert_eq!(next_line(&mut pending).as_deref(), Some("OK"));
        assert_eq!(pending, b"rest");
        assert_eq!(next_line(&mut pending), None);
    }

    #[test]
    fn next_line_handles_crlf_and_blank_lines() {
        let mut pending = b"one\r\n\r\ntwo\n".to_vec();
        assert_eq!(next_line(&mut pending).as_deref(), Some("one"));
        assert_eq!(next_line(&mut pending).as_deref(), Some("two"));
        assert_eq!(next_line(&mut pending), None);
    }

    #[test]
    fn next_line_replaces_invalid_utf8() {
        let mut pending = b"\xff\xfeOK\n".to_vec();
        let line = next_line(&mut pending).unwrap();
        assert!(line.contains('\u{FFFD}'));
        assert!(line.ends_with("OK"));
    }

    #[test]
    fn next_line_keeps_partial_lines_buffered() {
        let mut pending = b"no terminator yet".to_vec();
        assert_eq!(next_line(&mut pending), None);
        assert_eq!(pending, b"no terminator yet");
    }
}
