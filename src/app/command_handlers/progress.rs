use crate::bridge::sleep_with_stop;
use crate::client::ProgressSource;
use crate::progress::{render_progress, ProgressSnapshot};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub const WATCH_INTERVAL: Duration = Duration::from_secs(5);

/// Sets the flag once the user presses ENTER. The reader thread blocks on
/// stdin and is abandoned when the process exits.
pub(super) fn spawn_enter_watcher() -> Arc<AtomicBool> {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_for_reader = Arc::clone(&stop);
    thread::spawn(move || {
        let mut line = String::new();
        let _ = std::io::stdin().lock().read_line(&mut line);
        stop_for_reader.store(true, Ordering::SeqCst);
    });
    stop
}

/// Polls the source and prints each snapshot until `done` says to stop or the
/// user presses ENTER. Returns whether the done condition was reached; false
/// means the user gave up first.
pub(super) fn watch_progress<S, F>(
    source: &S,
    interval: Duration,
    done: F,
) -> Result<bool, String>
where
    S: ProgressSource,
    F: FnMut(&ProgressSnapshot) -> bool,
{
    println!("Polling progress every {}s; press ENTER to stop.", interval.as_secs());
    let stop = spawn_enter_watcher();
    watch_progress_with_stop(source, interval, &stop, done)
}

/// Transient query failures are reported and the watch keeps polling; fatal
/// errors (rejected or revoked credentials) end it.
pub(super) fn watch_progress_with_stop<S, F>(
    source: &S,
    interval: Duration,
    stop: &AtomicBool,
    mut done: F,
) -> Result<bool, String>
where
    S: ProgressSource,
    F: FnMut(&ProgressSnapshot) -> bool,
{
    loop {
        match source.query_progress() {
            Ok(snapshot) => {
                println!("{}", render_progress(&snapshot));
                if done(&snapshot) {
                    return Ok(true);
                }
            }
            Err(err) if err.is_fatal() => return Err(err.to_string()),
            Err(err) => eprintln!("Progress query failed, retrying: {err}"),
        }
        sleep_with_stop(interval, stop);
        if stop.load(Ordering::SeqCst) {
            return Ok(false);
        }
    }
}

/// Waits until the given work package no longer appears as pending or in
/// progress.
pub(super) fn wait_for_work_package<S: ProgressSource>(
    source: &S,
    work_package_id: &str,
    interval: Duration,
) -> Result<bool, String> {
    watch_progress(source, interval, |snapshot| {
        !snapshot
            .unfinished_work_package_ids()
            .iter()
            .any(|id| id == work_package_id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use serde_json::json;
    use std::sync::atomic::AtomicU64;

    const TICK: Duration = Duration::from_millis(1);

    /// Source whose first poll fails with a transport error; later polls work.
    struct FlakySource {
        calls: AtomicU64,
    }

    impl ProgressSource for FlakySource {
        fn query_progress(&self) -> Result<ProgressSnapshot, ClientError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(ClientError::Transport {
                    url: "https://eas.example.com:7624/api/graphql".to_string(),
                    detail: "connection reset".to_string(),
                });
            }
            Ok(ProgressSnapshot::new(json!({ "pending": [] })))
        }
    }

    struct RevokedSource;

    impl ProgressSource for RevokedSource {
        fn query_progress(&self) -> Result<ProgressSnapshot, ClientError> {
            Err(ClientError::Api("token_revoked".to_string()))
        }
    }

    #[test]
    fn transient_failure_is_retried_until_done() {
        let source = FlakySource { calls: AtomicU64::new(0) };
        let stop = AtomicBool::new(false);
        let reached =
            watch_progress_with_stop(&source, TICK, &stop, |snapshot| {
                snapshot.unfinished_work_package_ids().is_empty()
            })
            .expect("watch must outlive a transient failure");
        assert!(reached);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn fatal_failure_ends_the_watch() {
        let stop = AtomicBool::new(false);
        let err = watch_progress_with_stop(&RevokedSource, TICK, &stop, |_| false)
            .expect_err("revoked credentials must end the watch");
        assert!(err.contains("token_revoked"));
    }

    #[test]
    fn stop_flag_ends_the_watch_without_reaching_done() {
        let source = FlakySource { calls: AtomicU64::new(1) };
        let stop = AtomicBool::new(true);
        let reached = watch_progress_with_stop(&source, TICK, &stop, |_| false)
            .expect("watch must end cleanly on stop");
        assert!(!reached);
    }
}
