use super::{BridgeEvent, ProgressMonitor};
use crate::shared::logging::append_runner_log;
use serde_json::json;
use std::io::ErrorKind;
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tungstenite::handshake::HandshakeError;
use tungstenite::{Message, WebSocket};

const ACCEPT_IDLE_SLEEP: Duration = Duration::from_millis(100);
const SOCKET_IDLE_SLEEP: Duration = Duration::from_millis(40);

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("could not bind websocket listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not configure listener on {addr}: {source}")]
    Listener {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Accepts websocket subscribers and fans progress events out to them until
/// the monitor is shut down. Each connection gets its own thread.
pub fn serve(monitor: Arc<ProgressMonitor>, bind: &str) -> Result<(), BridgeError> {
    let listener = TcpListener::bind(bind).map_err(|source| BridgeError::Bind {
        addr: bind.to_string(),
        source,
    })?;
    serve_with_listener(monitor, listener)
}

/// Accept loop over an already-bound listener. Split out so tests can bind an
/// ephemeral port and learn the address before serving.
pub fn serve_with_listener(
    monitor: Arc<ProgressMonitor>,
    listener: TcpListener,
) -> Result<(), BridgeError> {
    let addr = listener
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    listener
        .set_nonblocking(true)
        .map_err(|source| BridgeError::Listener {
            addr: addr.clone(),
            source,
        })?;
    append_runner_log(
        monitor.log_dir(),
        "INFO",
        "bridge_listening",
        &format!("websocket bridge listening on {addr}"),
    );

    loop {
        if monitor.stop_requested() {
            return Ok(());
        }
        match listener.accept() {
            Ok((stream, peer)) => {
                let monitor = Arc::clone(&monitor);
                thread::spawn(move || {
                    let peer = peer.to_string();
                    if let Err(err) = handle_connection(&monitor, stream) {
                        append_runner_log(
                            monitor.log_dir(),
                            "WARN",
                            "bridge_connection_failed",
                            &format!("{peer}: {err}"),
                        );
                    }
                });
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_IDLE_SLEEP);
            }
            Err(err) => {
                append_runner_log(
                    monitor.log_dir(),
                    "WARN",
                    "bridge_accept_failed",
                    &err.to_string(),
                );
                thread::sleep(ACCEPT_IDLE_SLEEP);
            }
        }
    }
}

fn handle_connection(
    monitor: &ProgressMonitor,
    stream: TcpStream,
) -> Result<(), tungstenite::Error> {
    // The stream is still blocking here, so an interrupted handshake only
    // means the peer went away before finishing it.
    let mut socket = tungstenite::accept(stream).map_err(|err| match err {
        HandshakeError::Failure(failure) => failure,
        HandshakeError::Interrupted(_) => tungstenite::Error::ConnectionClosed,
    })?;
    // Handshake done; switch to polling reads so queued events keep flowing.
    if let Err(err) = socket.get_ref().set_nonblocking(true) {
        let _ = socket.close(None);
        return Err(tungstenite::Error::Io(err));
    }

    let (subscriber_id, events) = monitor.subscribe();
    let result = pump_connection(monitor, &mut socket, &events);
    monitor.unsubscribe(subscriber_id);
    let _ = socket.close(None);
    result
}

fn pump_connection(
    monitor: &ProgressMonitor,
    socket: &mut WebSocket<TcpStream>,
    events: &Receiver<BridgeEvent>,
) -> Result<(), tungstenite::Error> {
    loop {
        if monitor.stop_requested() {
            return Ok(());
        }

        let mut sent_any = false;
        while let Ok(event) = events.try_recv() {
            socket.send(Message::Text(encode_event(&event)))?;
            sent_any = true;
        }

        match socket.read() {
            Ok(Message::Text(text)) => {
                if text.trim() == "health" {
                    socket.send(Message::Text(monitor.health().to_string()))?;
                }
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Ping(payload)) => {
                let _ = socket.send(Message::Pong(payload));
            }
            Ok(Message::Pong(_)) => {}
            Ok(Message::Frame(_)) => {}
            Ok(Message::Close(_)) => return Ok(()),
            Err(tungstenite::Error::Io(err))
                if err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut =>
            {
                if !sent_any {
                    thread::sleep(SOCKET_IDLE_SLEEP);
                }
            }
            Err(tungstenite::Error::ConnectionClosed) => return Ok(()),
            Err(err) => return Err(err),
        }
    }
}

/// Wire format matches what dashboard clients already expect: a named event
/// whose payload is either the replayed history list or a single snapshot.
fn encode_event(event: &BridgeEvent) -> String {
    let payload = match event {
        BridgeEvent::History(snapshots) => {
            serde_json::to_value(snapshots).unwrap_or_else(|_| json!([]))
        }
        BridgeEvent::Update(snapshot) => {
            serde_json::to_value(snapshot).unwrap_or_else(|_| json!(null))
        }
    };
    json!({ "event": "progress_update", "payload": payload }).to_string()
}
