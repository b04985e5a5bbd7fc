//! Canonical monitor state and the reducer that owns it.
//!
//! All mutation funnels through one consumer: connection readers and the
//! router submit [`MonitorEvent`]s into a channel, a single reducer task
//! applies them to [`MonitorState`], and every read takes a snapshot. No
//! cross-session ordering is assumed anywhere in here.

pub mod reducer;
pub mod session;

pub use reducer::{MonitorState, run_reducer};
pub use session::{ConnectionStatus, ExamStatus, SessionState};

use chrono::{DateTime, Utc};
use vigil_core::{SessionId, StudentId};
use vigil_events::{EnvelopePayload, EventEnvelope};

/// Which upstream connection a transport change concerns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionScope {
    /// The single roster connection for the monitored exam.
    Roster,
    /// The per-session connection for one student session.
    Session(SessionId),
}

/// Lifecycle change reported by a connection reader task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportChange {
    /// A connection attempt is in flight.
    Connecting,
    /// The WebSocket handshake completed.
    Opened,
    /// The transport closed (peer close, cancellation, or clean EOF).
    Closed,
    /// The transport failed (connect error, credential rejection, IO error).
    Errored,
}

/// One unit of work submitted to the reducer.
#[derive(Clone, Debug)]
pub enum MonitorEvent {
    /// A parsed, classified envelope.
    Envelope {
        /// The transport envelope as received.
        envelope: EventEnvelope,
        /// Its decoded payload.
        payload: EnvelopePayload,
    },
    /// A transport lifecycle change.
    Transport {
        /// Connection the change concerns.
        scope: ConnectionScope,
        /// What happened.
        change: TransportChange,
    },
}

/// What a roster announcement asks the connection layer to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RosterAction {
    /// The session is present; a connection should exist for it.
    Join,
    /// The session is gone; its connection should be released.
    Leave,
}

/// Ephemeral record of a join/leave announcement.
///
/// Emitted by the reducer toward the connection supervisor and dropped once
/// acted on — roster entries are never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RosterEntry {
    /// Requested action.
    pub action: RosterAction,
    /// Session the announcement concerns.
    pub session_id: SessionId,
    /// Student the announcement concerns.
    pub student_id: StudentId,
    /// Producer-supplied announcement timestamp.
    pub timestamp: DateTime<Utc>,
}
