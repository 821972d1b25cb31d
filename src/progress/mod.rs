pub mod history;

pub use history::{ProgressHistory, PROGRESS_HISTORY_CAPACITY};

use crate::shared::time::now_secs;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One progress report from the remote service, stamped with the time we
/// received it. The payload is kept as raw JSON so new server-side fields
/// pass through untouched.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProgressSnapshot {
    pub received_at: i64,
    pub payload: Value,
}

impl ProgressSnapshot {
    pub fn new(payload: Value) -> Self {
        Self {
            received_at: now_secs(),
            payload,
        }
    }

    /// Ids of work packages that are still pending or in progress. Pending
    /// entries may be plain id strings or objects carrying an `id` field.
    pub fn unfinished_work_package_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        if let Some(pending) = self.payload.get("pending").and_then(Value::as_array) {
            for entry in pending {
                match entry {
                    Value::String(id) => ids.push(id.clone()),
                    Value::Object(_) => {
                        if let Some(id) = entry.get("id").and_then(Value::as_str) {
                            ids.push(id.to_string());
                        }
                    }
                    _ => {}
                }
            }
        }
        if let Some(in_progress) = self.payload.get("inProgress").and_then(Value::as_array) {
            for entry in in_progress {
                if let Some(id) = entry.get("id").and_then(Value::as_str) {
                    ids.push(id.to_string());
                }
            }
        }
        ids
    }

    pub fn is_idle(&self) -> bool {
        self.unfinished_work_package_ids().is_empty()
    }
}

/// Pretty-prints a snapshot for terminal output, bracketed by separators so
/// repeated polls are easy to tell apart in a scrolling session.
pub fn render_progress(snapshot: &ProgressSnapshot) -> String {
    let body = serde_json::to_string_pretty(&snapshot.payload)
        .unwrap_or_else(|_| snapshot.payload.to_string());
    format!(
        "---------------- progress ----------------\n{body}\n------------------------------------------"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unfinished_ids_cover_pending_strings_and_in_progress_objects() {
        let snapshot = ProgressSnapshot::new(json!({
            "pending": ["wp-1", {"id": "wp-2"}, 7],
            "inProgress": [{"id": "wp-3", "stage": "solving"}],
            "finished": [{"id": "wp-0"}]
        }));
        assert_eq!(
            snapshot.unfinished_work_package_ids(),
            vec!["wp-1", "wp-2", "wp-3"]
        );
        assert!(!snapshot.is_idle());
    }

    #[test]
    fn snapshot_with_only_finished_work_is_idle() {
        let snapshot = ProgressSnapshot::new(json!({
            "pending": [],
            "inProgress": [],
            "finished": [{"id": "wp-0"}]
        }));
        assert!(snapshot.is_idle());
    }

    #[test]
    fn render_includes_separators_and_payload() {
        let snapshot = ProgressSnapshot::new(json!({"pending": ["wp-1"]}));
        let rendered = render_progress(&snapshot);
        assert!(rendered.starts_with("---------------- progress"));
        assert!(rendered.contains("wp-1"));
    }
}
