//! Session behavior against an in-memory link
//!
//! The `FarEnd` half of the pair plays the relay board: it observes every
//! byte the session writes and can push reply bytes for the reader thread.

use parking_lot::Mutex;
use proptest::prelude::*;
use relaykit_communication::{ConnectionState, SerialLink, SerialSession};
use relaykit_core::{default_devices, ConnectionError, Error};
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

struct MockLink {
    from_device: Arc<Mutex<VecDeque<u8>>>,
    to_device: Arc<Mutex<Vec<u8>>>,
}

struct FarEnd {
    to_app: Arc<Mutex<VecDeque<u8>>>,
    from_app: Arc<Mutex<Vec<u8>>>,
}

impl FarEnd {
    /// Bytes the device sends toward the application
    fn push(&self, bytes: &[u8]) {
        self.to_app.lock().extend(bytes.iter().copied());
    }

    /// Everything the application has written so far
    fn written(&self) -> Vec<u8> {
        self.from_app.lock().clone()
    }
}

fn link_pair() -> (MockLink, FarEnd) {
    let inbound = Arc::new(Mutex::new(VecDeque::new()));
    let outbound = Arc::new(Mutex::new(Vec::new()));
    (
        MockLink {
            from_device: inbound.clone(),
            to_device: outbound.clone(),
        },
        FarEnd {
            to_app: inbound,
            from_app: outbound,
        },
    )
}

impl SerialLink for MockLink {
    fn bytes_to_read(&mut self) -> io::Result<u32> {
        Ok(self.from_device.lock().len() as u32)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut queue = self.from_device.lock();
        if queue.is_empty() {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "no data"));
        }
        let n = buf.len().min(queue.len());
        for slot in buf[..n].iter_mut() {
            *slot = queue.pop_front().unwrap();
        }
        Ok(n)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.to_device.lock().extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn connected_session() -> (SerialSession, FarEnd) {
    let (link, far_end) = link_pair();
    let mut session = SerialSession::new();
    session
        .attach_link(Box::new(link), "mock0", 9600)
        .expect("attach in-memory link");
    (session, far_end)
}

fn wait_for_line(session: &SerialSession, timeout: Duration) -> Option<String> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if let Some(line) = session.try_recv() {
            return Some(line);
        }
        thread::sleep(Duration::from_millis(5));
    }
    None
}

#[test]
fn fixed_commands_are_sent_verbatim() {
    for device in default_devices() {
        let (mut session, far_end) = connected_session();
        session.send(device.on_command.as_bytes()).unwrap();
        assert_eq!(far_end.written(), device.on_command.as_bytes());

        session.send(device.off_command.as_bytes()).unwrap();
        let both = [device.on_command.as_bytes(), device.off_command.as_bytes()].concat();
        assert_eq!(far_end.written(), both);
        session.disconnect();
    }
}

#[test]
fn custom_send_appends_no_terminator() {
    let (mut session, far_end) = connected_session();
    session.send(b"X#").unwrap();
    assert_eq!(far_end.written(), b"X#");
    session.disconnect();
}

#[test]
fn send_while_disconnected_is_rejected() {
    let mut session = SerialSession::new();
    match session.send(b"A#") {
        Err(Error::Connection(ConnectionError::NotConnected)) => {}
        other => panic!("expected NotConnected, got {:?}", other),
    }
}

#[test]
fn reader_thread_lifecycle() {
    let (mut session, _far_end) = connected_session();
    assert_eq!(session.state(), ConnectionState::Connected);
    assert!(session.reader_running());

    session.disconnect();
    assert_eq!(session.state(), ConnectionState::Disconnected);
    assert!(!session.reader_running());
}

#[test]
fn disconnect_twice_is_a_noop() {
    let (mut session, _far_end) = connected_session();
    session.disconnect();
    session.disconnect();
    assert!(!session.is_connected());
}

#[test]
fn connect_while_connected_is_rejected() {
    let (mut session, _far_end) = connected_session();
    let (second, _other) = link_pair();
    match session.attach_link(Box::new(second), "mock1", 9600) {
        Err(Error::Connection(ConnectionError::AlreadyConnected { port })) => {
            assert_eq!(port, "mock0");
        }
        other => panic!("expected AlreadyConnected, got {:?}", other),
    }
    session.disconnect();
}

#[test]
fn lines_arrive_in_fifo_order() {
    let (mut session, far_end) = connected_session();
    far_end.push(b"first\nsecond\nthird\n");

    assert_eq!(
        wait_for_line(&session, Duration::from_secs(1)).as_deref(),
        Some("first")
    );
    assert_eq!(
        wait_for_line(&session, Duration::from_secs(1)).as_deref(),
        Some("second")
    );
    assert_eq!(
        wait_for_line(&session, Duration::from_secs(1)).as_deref(),
        Some("third")
    );
    session.disconnect();
}

#[test]
fn invalid_utf8_is_replaced_not_dropped() {
    let (mut session, far_end) = connected_session();
    far_end.push(b"\xff\xfeOK\n");

    let line = wait_for_line(&session, Duration::from_secs(1)).expect("line delivered");
    assert!(line.contains('\u{FFFD}'));
    assert!(line.ends_with("OK"));
    session.disconnect();
}

#[test]
fn blank_lines_are_not_enqueued() {
    let (mut session, far_end) = connected_session();
    far_end.push(b"\r\n\r\nping\n");

    assert_eq!(
        wait_for_line(&session, Duration::from_secs(1)).as_deref(),
        Some("ping")
    );
    assert_eq!(wait_for_line(&session, Duration::from_millis(200)), None);
    session.disconnect();
}

#[test]
fn unterminated_bytes_are_flushed_after_quiet_interval() {
    let (mut session, far_end) = connected_session();

    // A bare prompt with no newline, like a board printing "READY".
    far_end.push(b"READY");

    // Not delivered while the line could still be completed.
    assert_eq!(wait_for_line(&session, Duration::from_millis(300)), None);

    // Flushed once the port has been quiet for the read timeout.
    assert_eq!(
        wait_for_line(&session, Duration::from_secs(2)).as_deref(),
        Some("READY")
    );

    // The buffer was consumed; nothing is delivered twice.
    assert_eq!(wait_for_line(&session, Duration::from_millis(200)), None);
    session.disconnect();
}

#[test]
fn no_lines_delivered_after_disconnect() {
    let (mut session, far_end) = connected_session();
    session.disconnect();

    far_end.push(b"late\n");
    thread::sleep(Duration::from_millis(150));
    assert_eq!(session.try_recv(), None);
}

#[test]
fn end_to_end_switch_on() {
    let (mut session, far_end) = connected_session();

    // Operator presses "Switch ON".
    session.send(b"A#").unwrap();
    assert_eq!(far_end.written(), b"A#");

    // Board acknowledges.
    far_end.push(b"OK\n");
    assert_eq!(
        wait_for_line(&session, Duration::from_secs(1)).as_deref(),
        Some("OK")
    );

    session.disconnect();
    assert!(!session.reader_running());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn payloads_are_written_verbatim(payload in proptest::collection::vec(any::<u8>(), 1..64)) {
        let (mut session, far_end) = connected_session();
        session.send(&payload).unwrap();
        prop_assert_eq!(far_end.written(), payload);
        session.disconnect();
    }
}
