//! Aggregate statistics over the session map.
//!
//! Everything here is a pure projection recomputed on demand from a
//! snapshot, so the numbers are always mutually consistent — at the cost of
//! an O(sessions) pass per call, which is cheap at classroom scale.

use serde::Serialize;

use crate::state::session::{ExamStatus, SessionState};

/// Roll-up numbers for the monitoring header.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    /// Number of known sessions.
    pub total_students: usize,
    /// Sessions currently `online`.
    pub online: usize,
    /// Sessions currently `examming`.
    pub examming: usize,
    /// Sessions currently `offline`.
    pub offline: usize,
    /// Sessions currently `submitted`.
    pub submitted: usize,
    /// Sum of violation counts across all sessions.
    pub total_violations: u64,
    /// Sum of critical-violation counts across all sessions.
    pub critical_violations: u64,
    /// Mean progress percentage over sessions that declare questions.
    pub average_progress_percent: f64,
}

/// Compute the full roll-up for a snapshot.
#[must_use]
pub fn summarize(sessions: &[SessionState]) -> SummaryStats {
    let mut stats = SummaryStats {
        total_students: sessions.len(),
        ..SummaryStats::default()
    };

    let mut progress_sum = 0.0;
    let mut progress_n = 0u32;
    for session in sessions {
        match session.exam_status {
            ExamStatus::Online => stats.online += 1,
            ExamStatus::Examming => stats.examming += 1,
            ExamStatus::Offline => stats.offline += 1,
            ExamStatus::Submitted => stats.submitted += 1,
        }
        stats.total_violations += session.violation_count;
        stats.critical_violations += session.critical_violation_count;
        if let Some(percent) = session.progress_percent() {
            progress_sum += percent;
            progress_n += 1;
        }
    }
    if progress_n > 0 {
        stats.average_progress_percent = progress_sum / f64::from(progress_n);
    }
    stats
}

/// Count sessions in one exam status.
#[must_use]
pub fn count_by_exam_status(sessions: &[SessionState], status: ExamStatus) -> usize {
    sessions
        .iter()
        .filter(|session| session.exam_status == status)
        .count()
}

/// Sort a snapshot for display: `answered_count` descending, ties broken by
/// `session_id` ascending so output is deterministic.
pub fn order_for_display(sessions: &mut [SessionState]) {
    sessions.sort_by(|a, b| {
        b.answered_count
            .cmp(&a.answered_count)
            .then_with(|| a.session_id.cmp(&b.session_id))
    });
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::{SessionId, StudentId};

    fn session(id: &str, status: ExamStatus, answered: u32, total: u32) -> SessionState {
        let mut s = SessionState::new(
            SessionId::from(id),
            StudentId::from(format!("stu_{id}").as_str()),
            String::new(),
            total,
        );
        s.exam_status = status;
        s.answered_count = answered;
        s
    }

    #[test]
    fn empty_snapshot() {
        let stats = summarize(&[]);
        assert_eq!(stats, SummaryStats::default());
    }

    #[test]
    fn counts_by_status() {
        let sessions = vec![
            session("a", ExamStatus::Online, 0, 10),
            session("b", ExamStatus::Examming, 2, 10),
            session("c", ExamStatus::Examming, 5, 10),
            session("d", ExamStatus::Offline, 1, 10),
            session("e", ExamStatus::Submitted, 10, 10),
        ];
        let stats = summarize(&sessions);
        assert_eq!(stats.total_students, 5);
        assert_eq!(stats.online, 1);
        assert_eq!(stats.examming, 2);
        assert_eq!(stats.offline, 1);
        assert_eq!(stats.submitted, 1);

        assert_eq!(count_by_exam_status(&sessions, ExamStatus::Examming), 2);
        assert_eq!(count_by_exam_status(&sessions, ExamStatus::Submitted), 1);
    }

    #[test]
    fn violations_sum_across_sessions() {
        let mut a = session("a", ExamStatus::Examming, 0, 10);
        a.violation_count = 3;
        a.critical_violation_count = 1;
        let mut b = session("b", ExamStatus::Offline, 0, 10);
        b.violation_count = 2;
        let stats = summarize(&[a, b]);
        assert_eq!(stats.total_violations, 5);
        assert_eq!(stats.critical_violations, 1);
    }

    #[test]
    fn average_progress() {
        let sessions = vec![
            session("a", ExamStatus::Examming, 5, 10), // 50%
            session("b", ExamStatus::Examming, 10, 10), // 100%
        ];
        let stats = summarize(&sessions);
        assert!((stats.average_progress_percent - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_question_sessions_excluded_from_average() {
        let sessions = vec![
            session("a", ExamStatus::Examming, 5, 10), // 50%
            session("b", ExamStatus::Online, 0, 0),    // excluded
        ];
        let stats = summarize(&sessions);
        assert!((stats.average_progress_percent - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn all_zero_question_sessions_average_zero() {
        let sessions = vec![session("a", ExamStatus::Online, 0, 0)];
        let stats = summarize(&sessions);
        assert!((stats.average_progress_percent - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn display_order_by_progress_then_id() {
        let mut sessions = vec![
            session("c", ExamStatus::Examming, 2, 10),
            session("a", ExamStatus::Examming, 7, 10),
            session("d", ExamStatus::Examming, 2, 10),
            session("b", ExamStatus::Examming, 9, 10),
        ];
        order_for_display(&mut sessions);
        let ids: Vec<&str> = sessions.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c", "d"]);
    }
}
