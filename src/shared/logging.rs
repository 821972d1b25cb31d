use crate::shared::time::now_secs;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn runner_log_path(config_dir: &Path) -> PathBuf {
    config_dir.join("logs/runner.log")
}

pub fn append_runner_log_line(config_dir: &Path, line: &str) -> std::io::Result<()> {
    let path = runner_log_path(config_dir);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;
    writeln!(file, "{line}")
}

/// Appends a structured line to the runner log and echoes it to stderr.
/// Logging failures never propagate into the caller's flow.
pub fn append_runner_log(config_dir: &Path, level: &str, event: &str, message: &str) {
    let line = format!("{} {level} {event} {message}", now_secs());
    let _ = append_runner_log_line(config_dir, &line);
    eprintln!("[{level}] {event}: {message}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn log_lines_are_appended_under_logs_directory() {
        let dir = tempdir().expect("temp dir");
        append_runner_log(dir.path(), "info", "bridge.started", "bound to 127.0.0.1:0");
        append_runner_log(dir.path(), "warn", "poll.failed", "timed out");

        let raw = fs::read_to_string(runner_log_path(dir.path())).expect("read log");
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("info bridge.started"));
        assert!(lines[1].contains("warn poll.failed timed out"));
    }
}
