pub mod server;

use crate::client::{ClientError, ProgressSource};
use crate::progress::{ProgressHistory, ProgressSnapshot};
use crate::shared::logging::append_runner_log;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

pub const POLL_INTERVAL: Duration = Duration::from_secs(5);
const STOP_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// Events a subscriber should slow-path if it cannot keep up; a full buffer
/// drops the event for that subscriber only.
pub const SUBSCRIBER_BUFFER_CAPACITY: usize = 32;

#[derive(Debug, Clone)]
pub enum BridgeEvent {
    /// Replay of everything the monitor has seen so far, oldest first. Sent
    /// once, when a subscriber connects to a monitor with history.
    History(Vec<ProgressSnapshot>),
    /// One freshly polled snapshot.
    Update(ProgressSnapshot),
}

struct Subscriber {
    id: u64,
    sender: SyncSender<BridgeEvent>,
}

/// Everything the poll thread and subscribers contend over, behind one lock
/// so "is a poll loop running" and "what has it seen" can never disagree.
struct MonitorShared {
    history: ProgressHistory,
    subscribers: Vec<Subscriber>,
    active: bool,
    last_updated: Option<i64>,
    last_error: Option<String>,
    next_subscriber_id: u64,
}

impl MonitorShared {
    fn new() -> Self {
        Self {
            history: ProgressHistory::new(),
            subscribers: Vec::new(),
            active: false,
            last_updated: None,
            last_error: None,
            next_subscriber_id: 1,
        }
    }

    fn broadcast(&mut self, snapshot: &ProgressSnapshot) {
        self.subscribers.retain(|subscriber| {
            match subscriber
                .sender
                .try_send(BridgeEvent::Update(snapshot.clone()))
            {
                Ok(()) => true,
                // Slow subscriber: drop this event for them, keep the rest.
                Err(TrySendError::Full(_)) => true,
                Err(TrySendError::Disconnected(_)) => false,
            }
        });
    }
}

/// Shared progress monitor behind the websocket bridge. The first subscriber
/// starts a poll thread against the remote service; later subscribers share
/// it. The thread stops on fatal errors or shutdown, and the next subscriber
/// after a fatal stop starts a fresh one.
pub struct ProgressMonitor {
    source: Arc<dyn ProgressSource>,
    shared: Arc<Mutex<MonitorShared>>,
    stop: Arc<AtomicBool>,
    poll_interval: Duration,
    log_dir: PathBuf,
}

impl ProgressMonitor {
    pub fn new(source: Arc<dyn ProgressSource>, log_dir: PathBuf) -> Self {
        Self::with_poll_interval(source, log_dir, POLL_INTERVAL)
    }

    pub fn with_poll_interval(
        source: Arc<dyn ProgressSource>,
        log_dir: PathBuf,
        poll_interval: Duration,
    ) -> Self {
        Self {
            source,
            shared: Arc::new(Mutex::new(MonitorShared::new())),
            stop: Arc::new(AtomicBool::new(false)),
            poll_interval,
            log_dir,
        }
    }

    /// Registers a subscriber and returns its id plus the event stream. Any
    /// accumulated history is queued first, so subscribers always see events
    /// in arrival order. Starts the poll thread if none is running.
    pub fn subscribe(&self) -> (u64, Receiver<BridgeEvent>) {
        let (sender, receiver) = sync_channel(SUBSCRIBER_BUFFER_CAPACITY);
        let (id, start_poll) = {
            let mut shared = lock_shared(&self.shared);
            let id = shared.next_subscriber_id;
            shared.next_subscriber_id += 1;
            if !shared.history.is_empty() {
                // Fresh channel with capacity > 0, cannot be full yet.
                let _ = sender.try_send(BridgeEvent::History(shared.history.snapshot()));
            }
            shared.subscribers.push(Subscriber { id, sender });
            let start_poll = !shared.active;
            shared.active = true;
            (id, start_poll)
        };
        if start_poll {
            self.spawn_poll_thread();
        }
        (id, receiver)
    }

    pub fn unsubscribe(&self, id: u64) {
        let mut shared = lock_shared(&self.shared);
        shared.subscribers.retain(|subscriber| subscriber.id != id);
    }

    pub fn health(&self) -> serde_json::Value {
        let shared = lock_shared(&self.shared);
        serde_json::json!({
            "monitoring_active": shared.active,
            "subscribers": shared.subscribers.len(),
            "history_length": shared.history.len(),
            "last_updated": shared.last_updated,
            "last_error": shared.last_error,
        })
    }

    pub fn log_dir(&self) -> &std::path::Path {
        &self.log_dir
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Asks the poll thread (and the accept loop in `server`) to wind down.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    fn spawn_poll_thread(&self) {
        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.shared);
        let stop = Arc::clone(&self.stop);
        let poll_interval = self.poll_interval;
        let log_dir = self.log_dir.clone();
        thread::spawn(move || {
            run_poll_loop(source, shared, stop, poll_interval, &log_dir);
        });
    }
}

fn run_poll_loop(
    source: Arc<dyn ProgressSource>,
    shared: Arc<Mutex<MonitorShared>>,
    stop: Arc<AtomicBool>,
    poll_interval: Duration,
    log_dir: &std::path::Path,
) {
    append_runner_log(log_dir, "INFO", "monitor_started", "progress poll loop running");
    while !stop.load(Ordering::SeqCst) {
        match source.query_progress() {
            Ok(snapshot) => {
                let mut guard = lock_shared(&shared);
                guard.last_updated = Some(snapshot.received_at);
                guard.last_error = None;
                guard.broadcast(&snapshot);
                guard.history.push(snapshot);
            }
            Err(err) => {
                let fatal = err.is_fatal();
                record_poll_error(&shared, &err);
                if fatal {
                    append_runner_log(
                        log_dir,
                        "ERROR",
                        "monitor_stopped",
                        &format!("fatal poll failure: {err}"),
                    );
                    return;
                }
                append_runner_log(
                    log_dir,
                    "WARN",
                    "monitor_poll_failed",
                    &err.to_string(),
                );
            }
        }
        sleep_with_stop(poll_interval, &stop);
    }
    let mut guard = lock_shared(&shared);
    guard.active = false;
    append_runner_log(log_dir, "INFO", "monitor_stopped", "progress poll loop exiting");
}

fn record_poll_error(shared: &Arc<Mutex<MonitorShared>>, err: &ClientError) {
    let mut guard = lock_shared(shared);
    guard.last_error = Some(err.to_string());
    if err.is_fatal() {
        guard.active = false;
    }
}

fn lock_shared(shared: &Arc<Mutex<MonitorShared>>) -> MutexGuard<'_, MonitorShared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Sleeps in short slices so a stop request interrupts the wait promptly.
pub(crate) fn sleep_with_stop(duration: Duration, stop: &AtomicBool) {
    let mut remaining = duration;
    while !remaining.is_zero() {
        if stop.load(Ordering::SeqCst) {
            return;
        }
        let slice = remaining.min(STOP_CHECK_INTERVAL);
        thread::sleep(slice);
        remaining = remaining.saturating_sub(slice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn sleep_with_stop_returns_early_when_stopped() {
        let stop = AtomicBool::new(true);
        let started = Instant::now();
        sleep_with_stop(Duration::from_secs(5), &stop);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn broadcast_drops_disconnected_subscribers() {
        let mut shared = MonitorShared::new();
        let (alive_tx, alive_rx) = sync_channel(4);
        let (dead_tx, dead_rx) = sync_channel(4);
        drop(dead_rx);
        shared.subscribers.push(Subscriber { id: 1, sender: alive_tx });
        shared.subscribers.push(Subscriber { id: 2, sender: dead_tx });

        shared.broadcast(&ProgressSnapshot::new(serde_json::json!({"pending": []})));

        assert_eq!(shared.subscribers.len(), 1);
        assert_eq!(shared.subscribers[0].id, 1);
        assert!(matches!(alive_rx.try_recv(), Ok(BridgeEvent::Update(_))));
    }

    #[test]
    fn broadcast_skips_events_for_full_subscribers() {
        let mut shared = MonitorShared::new();
        let (tx, rx) = sync_channel(1);
        shared.subscribers.push(Subscriber { id: 1, sender: tx });

        let snapshot = ProgressSnapshot::new(serde_json::json!({"seq": 1}));
        shared.broadcast(&snapshot);
        shared.broadcast(&ProgressSnapshot::new(serde_json::json!({"seq": 2})));

        // Buffer held one event; the second was skipped, not queued.
        assert!(matches!(rx.try_recv(), Ok(BridgeEvent::Update(_))));
        assert!(rx.try_recv().is_err());
        assert_eq!(shared.subscribers.len(), 1);
    }
}
