//! Declarative connection reconciliation.
//!
//! Instead of opening/closing connections as side effects scattered across
//! event handlers, the supervisor computes the diff between the sessions
//! that *should* have a connection and those that currently do, then applies
//! it. The computation is pure and does no I/O, so it is testable on its own
//! and safe to re-run at any time.

use std::collections::BTreeSet;

use vigil_core::SessionId;

/// The connections to open and close to make reality match intent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionDiff {
    /// Sessions that should have a connection but do not.
    pub to_open: Vec<SessionId>,
    /// Sessions that have a connection but should not.
    pub to_close: Vec<SessionId>,
}

impl ConnectionDiff {
    /// Whether applying this diff would change anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_open.is_empty() && self.to_close.is_empty()
    }
}

/// Compute the diff between the desired and actual session-connection sets.
///
/// Output order is ascending by session ID, so applying a diff is
/// deterministic.
#[must_use]
pub fn reconcile(desired: &BTreeSet<SessionId>, actual: &BTreeSet<SessionId>) -> ConnectionDiff {
    ConnectionDiff {
        to_open: desired.difference(actual).cloned().collect(),
        to_close: actual.difference(desired).cloned().collect(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> BTreeSet<SessionId> {
        ids.iter().map(|id| SessionId::from(*id)).collect()
    }

    #[test]
    fn identical_sets_need_nothing() {
        let diff = reconcile(&set(&["a", "b"]), &set(&["a", "b"]));
        assert!(diff.is_empty());
    }

    #[test]
    fn missing_sessions_are_opened() {
        let diff = reconcile(&set(&["a", "b", "c"]), &set(&["b"]));
        assert_eq!(diff.to_open, vec![SessionId::from("a"), SessionId::from("c")]);
        assert!(diff.to_close.is_empty());
    }

    #[test]
    fn extra_sessions_are_closed() {
        let diff = reconcile(&set(&["b"]), &set(&["a", "b", "c"]));
        assert!(diff.to_open.is_empty());
        assert_eq!(
            diff.to_close,
            vec![SessionId::from("a"), SessionId::from("c")]
        );
    }

    #[test]
    fn disjoint_sets_swap_everything() {
        let diff = reconcile(&set(&["a"]), &set(&["z"]));
        assert_eq!(diff.to_open, vec![SessionId::from("a")]);
        assert_eq!(diff.to_close, vec![SessionId::from("z")]);
    }

    #[test]
    fn empty_desired_closes_all() {
        let diff = reconcile(&set(&[]), &set(&["a", "b"]));
        assert_eq!(diff.to_open, Vec::<SessionId>::new());
        assert_eq!(diff.to_close.len(), 2);
    }

    #[test]
    fn output_is_sorted() {
        let diff = reconcile(&set(&["c", "a", "b"]), &set(&[]));
        assert_eq!(
            diff.to_open,
            vec![
                SessionId::from("a"),
                SessionId::from("b"),
                SessionId::from("c")
            ]
        );
    }
}
