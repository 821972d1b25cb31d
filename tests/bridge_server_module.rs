use hc_runner::bridge::{server, ProgressMonitor};
use hc_runner::client::{ClientError, ProgressSource};
use hc_runner::progress::ProgressSnapshot;
use serde_json::{json, Value};
use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::tempdir;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::Message;

const POLL: Duration = Duration::from_millis(25);
const READ_TIMEOUT: Duration = Duration::from_secs(5);

struct CountingSource {
    seq: AtomicU64,
}

impl ProgressSource for CountingSource {
    fn query_progress(&self) -> Result<ProgressSnapshot, ClientError> {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        Ok(ProgressSnapshot::new(json!({ "seq": seq })))
    }
}

struct ServerUnderTest {
    monitor: Arc<ProgressMonitor>,
    addr: String,
    _log_dir: tempfile::TempDir,
}

fn start_server() -> ServerUnderTest {
    let log_dir = tempdir().expect("temp dir");
    let monitor = Arc::new(ProgressMonitor::with_poll_interval(
        Arc::new(CountingSource { seq: AtomicU64::new(0) }),
        log_dir.path().to_path_buf(),
        POLL,
    ));
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr").to_string();
    let monitor_for_server = Arc::clone(&monitor);
    thread::spawn(move || {
        server::serve_with_listener(monitor_for_server, listener).expect("serve");
    });
    ServerUnderTest {
        monitor,
        addr,
        _log_dir: log_dir,
    }
}

fn connect(addr: &str) -> tungstenite::WebSocket<MaybeTlsStream<TcpStream>> {
    let (socket, _response) =
        tungstenite::connect(format!("ws://{addr}")).expect("websocket handshake");
    if let MaybeTlsStream::Plain(stream) = socket.get_ref() {
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .expect("read timeout");
    }
    socket
}

fn next_text(socket: &mut tungstenite::WebSocket<MaybeTlsStream<TcpStream>>) -> Value {
    loop {
        match socket.read().expect("read frame") {
            Message::Text(text) => return serde_json::from_str(&text).expect("json frame"),
            _ => continue,
        }
    }
}

#[test]
fn subscribers_receive_progress_update_frames() {
    let server = start_server();

    let mut socket = connect(&server.addr);
    let frame = next_text(&mut socket);
    assert_eq!(frame["event"], "progress_update");
    let payload = &frame["payload"];
    assert!(
        payload.is_array() || payload["payload"]["seq"].is_u64(),
        "payload must be a history list or a single snapshot, got {payload}"
    );

    server.monitor.shutdown();
}

#[test]
fn failed_handshake_does_not_take_down_the_listener() {
    let server = start_server();

    // A peer that speaks no websocket at all.
    let mut raw = TcpStream::connect(&server.addr).expect("tcp connect");
    raw.write_all(b"GET / HTTP/1.1\r\nHost: nowhere\r\n\r\n")
        .expect("write garbage");
    drop(raw);
    thread::sleep(Duration::from_millis(100));

    // Real subscribers still get served afterwards.
    let mut socket = connect(&server.addr);
    let frame = next_text(&mut socket);
    assert_eq!(frame["event"], "progress_update");

    server.monitor.shutdown();
}

#[test]
fn health_request_is_answered_inline() {
    let server = start_server();

    let mut socket = connect(&server.addr);
    socket
        .send(Message::Text("health".to_string()))
        .expect("send health request");

    // Updates may interleave; the health report is the frame without an event.
    let health = loop {
        let frame = next_text(&mut socket);
        if frame.get("monitoring_active").is_some() {
            break frame;
        }
    };
    assert_eq!(health["monitoring_active"], true);
    assert!(health["subscribers"].as_u64().unwrap_or(0) >= 1);

    server.monitor.shutdown();
}
