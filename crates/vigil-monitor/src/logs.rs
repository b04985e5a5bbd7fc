//! Bounded, newest-first retention logs for the proctoring feed.
//!
//! The monitoring view shows a short rolling window of recent violations and
//! answer activity. Each log retains the most recent entries only (50 by
//! default); insertion is O(1) and old entries fall off the back.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vigil_core::{SessionId, StudentId};
use vigil_events::{ActivityPayload, Severity};

/// A fixed-capacity ring that keeps the newest entries first.
#[derive(Clone, Debug)]
pub struct BoundedLog<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> BoundedLog<T> {
    /// Create a log retaining at most `capacity` entries (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert an entry as the newest; evicts the oldest when full.
    pub fn push(&mut self, entry: T) {
        if self.entries.len() == self.capacity {
            let _ = self.entries.pop_back();
        }
        self.entries.push_front(entry);
    }

    /// Clone out the current contents, newest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// One violation as shown in the rolling proctoring feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationEntry {
    /// Session the violation occurred in.
    pub session_id: SessionId,
    /// Student who triggered it.
    pub student_id: StudentId,
    /// Severity assigned upstream.
    pub severity: Severity,
    /// Breach reason (opaque to the monitor).
    pub reason: String,
    /// Producer-supplied event timestamp.
    pub timestamp: DateTime<Utc>,
}

/// One answer-activity item as shown in the rolling proctoring feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    /// Session the activity occurred in.
    pub session_id: SessionId,
    /// Student it belongs to.
    pub student_id: StudentId,
    /// What happened (answer change or auto-save snapshot).
    pub activity: ActivityPayload,
    /// Producer-supplied event timestamp.
    pub timestamp: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_log() {
        let log: BoundedLog<u32> = BoundedLog::new(50);
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
        assert!(log.snapshot().is_empty());
    }

    #[test]
    fn newest_first() {
        let mut log = BoundedLog::new(50);
        log.push(1);
        log.push(2);
        log.push(3);
        assert_eq!(log.snapshot(), vec![3, 2, 1]);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut log = BoundedLog::new(3);
        for i in 0..5 {
            log.push(i);
        }
        assert_eq!(log.snapshot(), vec![4, 3, 2]);
    }

    #[test]
    fn thousand_inserts_keep_exactly_fifty() {
        let mut log = BoundedLog::new(50);
        for i in 0..1000 {
            log.push(i);
        }
        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 50);
        // The 50 most recent by insertion order, newest first.
        let expected: Vec<i32> = (950..1000).rev().collect();
        assert_eq!(snapshot, expected);
    }

    #[test]
    fn zero_capacity_clamps_to_one() {
        let mut log = BoundedLog::new(0);
        log.push("a");
        log.push("b");
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.snapshot(), vec!["b"]);
    }

    #[test]
    fn len_saturates_at_capacity() {
        let mut log = BoundedLog::new(2);
        log.push(1);
        assert_eq!(log.len(), 1);
        log.push(2);
        log.push(3);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn violation_entry_serializes_camel_case() {
        let entry = ViolationEntry {
            session_id: SessionId::from("sess_1"),
            student_id: StudentId::from("stu_1"),
            severity: Severity::Critical,
            reason: "tab_switch".into(),
            timestamp: "2026-03-09T08:30:00Z".parse().unwrap(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["sessionId"], "sess_1");
        assert_eq!(json["severity"], "critical");
    }
}
