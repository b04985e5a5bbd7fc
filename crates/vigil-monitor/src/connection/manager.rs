//! Ownership of the roster connection and all per-session connections.
//!
//! Invariants enforced here:
//!
//! - at most one roster connection, and at most one connection per session
//!   (opens are idempotent while a reader task is live)
//! - `close` / `close_all` are safe on unknown or already-closed ids
//! - after `close_all` returns, no reader task survives, whatever state the
//!   connections were in (connecting, open, erroring)
//!
//! There is deliberately no auto-retry: a dropped session connection stays
//! closed until a fresh roster join announces the session again.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use futures::future::join_all;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vigil_core::{ConnectionId, Credential, ExamId, SessionId};

use super::reconcile::{ConnectionDiff, reconcile};
use super::socket::run_connection;
use crate::config::MonitorConfig;
use crate::router::EventRouter;
use crate::state::ConnectionScope;

/// A spawned reader task and its cancellation handle.
struct ConnectionHandle {
    id: ConnectionId,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ConnectionHandle {
    fn is_live(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Owns the lifecycle of every upstream connection of one monitor.
pub struct ConnectionManager {
    endpoint: String,
    exam_id: ExamId,
    credential: Credential,
    heartbeat: Duration,
    shutdown_timeout: Duration,
    router: EventRouter,
    cancel: CancellationToken,
    roster: Mutex<Option<ConnectionHandle>>,
    sessions: Mutex<HashMap<SessionId, ConnectionHandle>>,
}

impl ConnectionManager {
    /// Create a manager for the exam named by `config`.
    #[must_use]
    pub fn new(config: &MonitorConfig, router: EventRouter) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_owned(),
            exam_id: config.exam_id.clone(),
            credential: config.credential.clone(),
            heartbeat: Duration::from_secs(config.heartbeat_interval_secs),
            shutdown_timeout: Duration::from_secs(config.shutdown_timeout_secs),
            router,
            cancel: CancellationToken::new(),
            roster: Mutex::new(None),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Open the roster connection. No-op while one is already live.
    pub fn open_roster(&self) {
        let mut roster = self.roster.lock();
        if roster.as_ref().is_some_and(ConnectionHandle::is_live) {
            debug!(exam_id = %self.exam_id, "roster connection already open");
            return;
        }
        let url = self.roster_url();
        info!(exam_id = %self.exam_id, "opening roster connection");
        *roster = Some(self.spawn(url, ConnectionScope::Roster));
    }

    /// Open a per-session connection. No-op while one is already live
    /// (open or still connecting) for this session.
    pub fn open_session(&self, session_id: &SessionId) {
        let mut sessions = self.sessions.lock();
        if sessions
            .get(session_id)
            .is_some_and(ConnectionHandle::is_live)
        {
            debug!(session_id = %session_id, "session connection already open");
            return;
        }
        let url = self.session_url(session_id);
        info!(session_id = %session_id, "opening session connection");
        let handle = self.spawn(url, ConnectionScope::Session(session_id.clone()));
        let _ = sessions.insert(session_id.clone(), handle);
    }

    /// Release one session connection. Safe on unknown ids.
    pub fn close(&self, session_id: &SessionId) {
        if let Some(handle) = self.sessions.lock().remove(session_id) {
            info!(session_id = %session_id, connection_id = %handle.id, "closing session connection");
            handle.cancel.cancel();
        }
    }

    /// Release the roster connection. Safe when none is open.
    pub fn close_roster(&self) {
        if let Some(handle) = self.roster.lock().take() {
            info!(exam_id = %self.exam_id, connection_id = %handle.id, "closing roster connection");
            handle.cancel.cancel();
        }
    }

    /// Make the live connection set match `desired`: open what is missing,
    /// close what is extra. Returns the applied diff.
    pub fn reconcile_sessions(&self, desired: &BTreeSet<SessionId>) -> ConnectionDiff {
        let actual: BTreeSet<SessionId> = {
            let sessions = self.sessions.lock();
            sessions
                .iter()
                .filter(|(_, handle)| handle.is_live())
                .map(|(id, _)| id.clone())
                .collect()
        };
        let diff = reconcile(desired, &actual);
        for session_id in &diff.to_close {
            self.close(session_id);
        }
        for session_id in &diff.to_open {
            self.open_session(session_id);
        }
        diff
    }

    /// Number of live connections, roster included.
    #[must_use]
    pub fn active_connection_count(&self) -> usize {
        let sessions = self
            .sessions
            .lock()
            .values()
            .filter(|handle| handle.is_live())
            .count();
        let roster = usize::from(self.roster.lock().as_ref().is_some_and(ConnectionHandle::is_live));
        sessions + roster
    }

    /// Tear down every connection and wait for the reader tasks to drain.
    ///
    /// Completes even when connections are mid-handshake or erroring: after
    /// the drain timeout any straggler is aborted outright.
    pub async fn close_all(&self) {
        self.cancel.cancel();

        let mut handles: Vec<ConnectionHandle> = self.sessions.lock().drain().map(|(_, h)| h).collect();
        if let Some(roster) = self.roster.lock().take() {
            handles.push(roster);
        }
        for handle in &handles {
            handle.cancel.cancel();
        }

        info!(
            connection_count = handles.len(),
            timeout_secs = self.shutdown_timeout.as_secs(),
            "waiting for reader tasks to drain"
        );
        let aborts: Vec<_> = handles.iter().map(|h| h.task.abort_handle()).collect();
        let drain = join_all(handles.into_iter().map(|h| h.task));
        if tokio::time::timeout(self.shutdown_timeout, drain).await.is_err() {
            warn!("teardown timed out; aborting remaining reader tasks");
            for abort in aborts {
                abort.abort();
            }
        }
    }

    fn spawn(&self, url: String, scope: ConnectionScope) -> ConnectionHandle {
        let cancel = self.cancel.child_token();
        let task = tokio::spawn(run_connection(
            url,
            scope,
            self.router.clone(),
            self.heartbeat,
            cancel.clone(),
        ));
        ConnectionHandle {
            id: ConnectionId::generate(),
            cancel,
            task,
        }
    }

    fn roster_url(&self) -> String {
        format!(
            "{}/ws/exams/{}/roster?token={}",
            self.endpoint,
            self.exam_id,
            self.credential.expose()
        )
    }

    fn session_url(&self, session_id: &SessionId) -> String {
        format!(
            "{}/ws/sessions/{}?token={}",
            self.endpoint,
            session_id,
            self.credential.expose()
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
