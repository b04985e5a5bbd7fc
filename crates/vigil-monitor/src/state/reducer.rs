//! The session-state reducer — the single authority over [`MonitorState`].
//!
//! Correctness here must not depend on cross-session event order: counters
//! are commutative, `answered_count` is clamped to a high-water mark, and
//! `answers` uses documented arrival-order last-write-wins per field.

use std::collections::HashMap;
use std::sync::Arc;

use metrics::counter;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use vigil_core::{SessionId, StudentId};
use vigil_events::{EnvelopePayload, EventEnvelope};

use super::session::{ConnectionStatus, SessionState};
use super::{ConnectionScope, MonitorEvent, RosterAction, RosterEntry, TransportChange};

/// The canonical map of per-session state, plus its indexes.
#[derive(Debug)]
pub struct MonitorState {
    total_questions: u32,
    sessions: HashMap<SessionId, SessionState>,
    by_student: HashMap<StudentId, SessionId>,
    roster_status: ConnectionStatus,
}

impl MonitorState {
    /// Create an empty state for an exam with `total_questions` questions.
    #[must_use]
    pub fn new(total_questions: u32) -> Self {
        Self {
            total_questions,
            sessions: HashMap::new(),
            by_student: HashMap::new(),
            roster_status: ConnectionStatus::Connecting,
        }
    }

    /// Apply one unit of work.
    ///
    /// Returns the roster entries (0–2) the connection supervisor must act
    /// on: a join announcement yields `Join` plus, when it supersedes a
    /// previous session of the same student, a `Leave` for the old one.
    pub fn apply(&mut self, event: &MonitorEvent) -> Vec<RosterEntry> {
        match event {
            MonitorEvent::Envelope { envelope, payload } => {
                self.apply_envelope(envelope, payload)
            }
            MonitorEvent::Transport { scope, change } => {
                self.apply_transport(scope, *change);
                Vec::new()
            }
        }
    }

    fn apply_envelope(
        &mut self,
        envelope: &EventEnvelope,
        payload: &EnvelopePayload,
    ) -> Vec<RosterEntry> {
        match payload {
            EnvelopePayload::Join(join) => self.apply_join(envelope, &join.display_name),
            EnvelopePayload::Leave(_) => {
                self.ensure_session(envelope)
                    .force_leave(envelope.timestamp);
                vec![RosterEntry {
                    action: RosterAction::Leave,
                    session_id: envelope.session_id.clone(),
                    student_id: envelope.student_id.clone(),
                    timestamp: envelope.timestamp,
                }]
            }
            EnvelopePayload::Violation(violation) => {
                self.ensure_session(envelope)
                    .record_violation(violation.severity, envelope.timestamp);
                Vec::new()
            }
            EnvelopePayload::Activity(activity) => {
                self.ensure_session(envelope)
                    .apply_activity(activity, envelope.timestamp);
                Vec::new()
            }
            EnvelopePayload::Status(status) => {
                let _ = self
                    .ensure_session(envelope)
                    .apply_phase(status.status, envelope.timestamp);
                Vec::new()
            }
            EnvelopePayload::Unrecognized(_) => {
                debug!(session_id = %envelope.session_id, "ignoring unrecognized envelope");
                Vec::new()
            }
        }
    }

    fn apply_join(&mut self, envelope: &EventEnvelope, display_name: &str) -> Vec<RosterEntry> {
        let mut entries = Vec::with_capacity(2);

        // A student has at most one live session. A join with a new
        // session id supersedes the previous one: mark it gone and ask the
        // supervisor to release its connection.
        if let Some(old_id) = self.by_student.get(&envelope.student_id).cloned() {
            if old_id != envelope.session_id {
                if let Some(old) = self.sessions.get_mut(&old_id) {
                    old.force_leave(envelope.timestamp);
                }
                warn!(
                    student_id = %envelope.student_id,
                    old_session = %old_id,
                    new_session = %envelope.session_id,
                    "student joined with a new session; superseding the old one"
                );
                entries.push(RosterEntry {
                    action: RosterAction::Leave,
                    session_id: old_id,
                    student_id: envelope.student_id.clone(),
                    timestamp: envelope.timestamp,
                });
            }
        }

        let session = self.ensure_session(envelope);
        if !display_name.is_empty() {
            session.display_name = display_name.to_owned();
        }
        session.last_activity_at = Some(envelope.timestamp);

        // The join is authoritative for the student index.
        let _ = self
            .by_student
            .insert(envelope.student_id.clone(), envelope.session_id.clone());

        entries.push(RosterEntry {
            action: RosterAction::Join,
            session_id: envelope.session_id.clone(),
            student_id: envelope.student_id.clone(),
            timestamp: envelope.timestamp,
        });
        entries
    }

    fn apply_transport(&mut self, scope: &ConnectionScope, change: TransportChange) {
        match scope {
            ConnectionScope::Roster => {
                self.roster_status = match change {
                    TransportChange::Connecting => ConnectionStatus::Connecting,
                    TransportChange::Opened => ConnectionStatus::Open,
                    TransportChange::Closed => ConnectionStatus::Closed,
                    TransportChange::Errored => ConnectionStatus::Error,
                };
            }
            ConnectionScope::Session(session_id) => {
                let Some(session) = self.sessions.get_mut(session_id) else {
                    // A transport change for a session no event has named
                    // yet carries no displayable information; drop it.
                    debug!(session_id = %session_id, "transport change for unknown session");
                    return;
                };
                match change {
                    TransportChange::Connecting => session.transport_connecting(),
                    TransportChange::Opened => session.transport_opened(),
                    TransportChange::Closed => session.transport_closed(),
                    TransportChange::Errored => session.transport_errored(),
                }
            }
        }
    }

    /// Look up a session, creating it if this is the first event naming it.
    ///
    /// Sessions are never deleted while the monitor runs — a student going
    /// offline must stay visible — so creation is the only map mutation.
    fn ensure_session(&mut self, envelope: &EventEnvelope) -> &mut SessionState {
        // The student index follows the most recent join; for sessions
        // created by stray non-join events it fills only a vacant slot.
        let _ = self
            .by_student
            .entry(envelope.student_id.clone())
            .or_insert_with(|| envelope.session_id.clone());
        let total_questions = self.total_questions;
        self.sessions
            .entry(envelope.session_id.clone())
            .or_insert_with(|| {
                SessionState::new(
                    envelope.session_id.clone(),
                    envelope.student_id.clone(),
                    String::new(),
                    total_questions,
                )
            })
    }

    /// Clone out all sessions, in map order (callers sort for display).
    #[must_use]
    pub fn snapshot_sessions(&self) -> Vec<SessionState> {
        self.sessions.values().cloned().collect()
    }

    /// Look up one session by ID.
    #[must_use]
    pub fn session(&self, session_id: &SessionId) -> Option<&SessionState> {
        self.sessions.get(session_id)
    }

    /// The session currently indexed for a student, if any.
    #[must_use]
    pub fn session_for_student(&self, student_id: &StudentId) -> Option<&SessionState> {
        self.by_student
            .get(student_id)
            .and_then(|id| self.sessions.get(id))
    }

    /// Number of known sessions (never shrinks while the monitor runs).
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Liveness of the roster connection.
    #[must_use]
    pub fn roster_status(&self) -> ConnectionStatus {
        self.roster_status
    }

    /// Question count supplied by exam metadata at monitor start.
    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }
}

/// Drain the fan-in channel into the state until cancelled or all senders
/// are gone.
///
/// Roster entries produced while applying events are forwarded to the
/// connection supervisor; if the supervisor is gone the monitor is tearing
/// down and the entries are moot.
pub async fn run_reducer(
    mut rx: mpsc::Receiver<MonitorEvent>,
    state: Arc<RwLock<MonitorState>>,
    roster_tx: mpsc::UnboundedSender<RosterEntry>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            event = rx.recv() => {
                let Some(event) = event else { break };
                let entries = state.write().apply(&event);
                counter!("reducer_events_applied_total").increment(1);
                for entry in entries {
                    if roster_tx.send(entry).is_err() {
                        debug!("roster supervisor gone; dropping roster entry");
                    }
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
