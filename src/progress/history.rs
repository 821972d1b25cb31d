use super::ProgressSnapshot;
use std::collections::VecDeque;

/// How many snapshots the bridge keeps for replay to newly connected
/// subscribers.
pub const PROGRESS_HISTORY_CAPACITY: usize = 20;

/// A bounded buffer of the most recent progress snapshots, oldest first.
#[derive(Debug, Default)]
pub struct ProgressHistory {
    entries: VecDeque<ProgressSnapshot>,
}

impl ProgressHistory {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(PROGRESS_HISTORY_CAPACITY),
        }
    }

    pub fn push(&mut self, snapshot: ProgressSnapshot) {
        if self.entries.len() == PROGRESS_HISTORY_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    /// Current contents in arrival order.
    pub fn snapshot(&self) -> Vec<ProgressSnapshot> {
        self.entries.iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn history_evicts_oldest_beyond_capacity() {
        let mut history = ProgressHistory::new();
        for n in 1..=25 {
            history.push(ProgressSnapshot::new(json!({ "seq": n })));
        }
        assert_eq!(history.len(), PROGRESS_HISTORY_CAPACITY);
        let entries = history.snapshot();
        assert_eq!(entries.first().map(|s| s.payload["seq"].clone()), Some(json!(6)));
        assert_eq!(entries.last().map(|s| s.payload["seq"].clone()), Some(json!(25)));
    }

    #[test]
    fn empty_history_reports_empty() {
        let history = ProgressHistory::new();
        assert!(history.is_empty());
        assert!(history.snapshot().is_empty());
    }
}
