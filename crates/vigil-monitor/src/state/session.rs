//! Per-session state and its mutation rules.
//!
//! [`SessionState`] is only ever mutated by the reducer; everything here is
//! synchronous and non-blocking. Counters are monotone, `answered_count`
//! carries a high-water mark so late or reordered events can never erase
//! progress already observed, and `exam_status` moves only along the
//! transitions encoded in [`SessionState::apply_phase`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use vigil_core::{QuestionId, SessionId, StudentId};
use vigil_events::{ActivityPayload, SessionPhase, Severity};

/// Liveness of a session's transport, independent of exam progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// A connection attempt is in flight.
    #[default]
    Connecting,
    /// The transport is established.
    Open,
    /// The transport was closed (deliberately or by the peer).
    Closed,
    /// The transport failed (connect refused, credential rejected, …).
    Error,
}

/// Semantic state of a student within the exam.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamStatus {
    /// Joined the exam room but not yet on the exam page.
    Online,
    /// Actively taking the exam.
    Examming,
    /// Away: left the page, dropped the transport, or left the exam.
    Offline,
    /// Submitted the attempt. Terminal for status transitions.
    Submitted,
}

/// The canonical per-student record maintained by the reducer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Student this session belongs to.
    pub student_id: StudentId,
    /// Unique session (one attempt at one exam).
    pub session_id: SessionId,
    /// Display name for the proctoring view. Empty until a join announces it.
    pub display_name: String,
    /// Transport liveness.
    pub connection_status: ConnectionStatus,
    /// Semantic exam state.
    pub exam_status: ExamStatus,
    /// Timestamp of the most recently applied event, if any.
    pub last_activity_at: Option<DateTime<Utc>>,
    /// Total violations observed. Never decreases.
    pub violation_count: u64,
    /// Critical-severity violations observed. Never decreases.
    pub critical_violation_count: u64,
    /// Current answers, keyed by question. Last write wins.
    pub answers: HashMap<QuestionId, String>,
    /// Answered-question count, clamped to its high-water mark.
    pub answered_count: u32,
    /// Question count from exam metadata. Set once, immutable.
    pub total_questions: u32,
    /// When the attempt started. Set on the first `started`, immutable.
    pub start_time: Option<DateTime<Utc>>,
}

impl SessionState {
    /// Create a fresh session entering the `online` state.
    #[must_use]
    pub fn new(
        session_id: SessionId,
        student_id: StudentId,
        display_name: String,
        total_questions: u32,
    ) -> Self {
        Self {
            student_id,
            session_id,
            display_name,
            connection_status: ConnectionStatus::Connecting,
            exam_status: ExamStatus::Online,
            last_activity_at: None,
            violation_count: 0,
            critical_violation_count: 0,
            answers: HashMap::new(),
            answered_count: 0,
            total_questions,
            start_time: None,
        }
    }

    /// Record one violation. Counters only move up, in any arrival order.
    pub fn record_violation(&mut self, severity: Severity, at: DateTime<Utc>) {
        self.violation_count += 1;
        if severity.is_critical() {
            self.critical_violation_count += 1;
        }
        self.last_activity_at = Some(at);
    }

    /// Apply answer-progress telemetry.
    pub fn apply_activity(&mut self, activity: &ActivityPayload, at: DateTime<Utc>) {
        match activity {
            ActivityPayload::AnswerChanged {
                question_id,
                new_value,
            } => {
                let _ = self
                    .answers
                    .insert(question_id.clone(), new_value.clone());
                // Re-derive, but never regress below the high-water mark:
                // a low-timestamp answer arriving late must not erase
                // progress a trusted auto-save already reported.
                self.answered_count = self.answered_count.max(self.derived_answered());
            }
            ActivityPayload::AutoSave { answered_count } => {
                self.answered_count = self.answered_count.max(*answered_count);
            }
        }
        self.last_activity_at = Some(at);
    }

    /// Apply a `session_status` phase announcement.
    ///
    /// Returns `true` if the phase caused a transition; illegal or unknown
    /// phases are ignored.
    pub fn apply_phase(&mut self, phase: SessionPhase, at: DateTime<Utc>) -> bool {
        let applied = match (self.exam_status, phase) {
            (ExamStatus::Online, SessionPhase::Started) => {
                self.exam_status = ExamStatus::Examming;
                // Fresh attempt: progress restarts, high-water mark included.
                self.answers.clear();
                self.answered_count = 0;
                if self.start_time.is_none() {
                    self.start_time = Some(at);
                }
                true
            }
            (ExamStatus::Online | ExamStatus::Offline, SessionPhase::RejoinedPage) => {
                self.exam_status = ExamStatus::Examming;
                true
            }
            (ExamStatus::Examming, SessionPhase::LeftPage) => {
                self.exam_status = ExamStatus::Offline;
                true
            }
            (ExamStatus::Examming, SessionPhase::Submitted) => {
                self.exam_status = ExamStatus::Submitted;
                true
            }
            _ => {
                debug!(
                    session_id = %self.session_id,
                    status = ?self.exam_status,
                    phase = ?phase,
                    "ignoring session phase with no legal transition"
                );
                false
            }
        };
        if applied {
            self.last_activity_at = Some(at);
        }
        applied
    }

    /// The transport for this session was established.
    pub fn transport_opened(&mut self) {
        self.connection_status = ConnectionStatus::Open;
    }

    /// A connection attempt for this session is in flight.
    pub fn transport_connecting(&mut self) {
        self.connection_status = ConnectionStatus::Connecting;
    }

    /// The transport closed. A dropped transport is evidence the student is
    /// no longer actively connected, so the exam status downgrades too —
    /// unless the attempt already reached its terminal `submitted` state.
    pub fn transport_closed(&mut self) {
        self.connection_status = ConnectionStatus::Closed;
        self.downgrade_to_offline();
    }

    /// The transport failed.
    pub fn transport_errored(&mut self) {
        self.connection_status = ConnectionStatus::Error;
        self.downgrade_to_offline();
    }

    /// A roster `student_leave` forces the session away, whatever its state.
    pub fn force_leave(&mut self, at: DateTime<Utc>) {
        self.exam_status = ExamStatus::Offline;
        self.connection_status = ConnectionStatus::Closed;
        self.last_activity_at = Some(at);
    }

    fn downgrade_to_offline(&mut self) {
        if self.exam_status != ExamStatus::Submitted {
            self.exam_status = ExamStatus::Offline;
        }
    }

    /// Progress as a percentage, if the exam declares any questions.
    #[must_use]
    pub fn progress_percent(&self) -> Option<f64> {
        if self.total_questions == 0 {
            return None;
        }
        Some(f64::from(self.answered_count) / f64::from(self.total_questions) * 100.0)
    }

    fn derived_answered(&self) -> u32 {
        u32::try_from(self.answers.values().filter(|v| !v.is_empty()).count()).unwrap_or(u32::MAX)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
