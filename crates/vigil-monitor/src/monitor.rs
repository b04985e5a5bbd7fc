//! The monitor facade — wiring, lifecycle, and the snapshot read API.
//!
//! [`Monitor::start`] queries exam metadata once, spawns the reducer task
//! and the roster supervisor, and opens the roster connection. From then on
//! everything is event-driven: roster joins open per-session connections,
//! roster leaves (and supersessions) release them. [`Monitor::shutdown`]
//! tears all of it down; no connection outlives the monitoring session.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vigil_core::SessionId;

use crate::config::MonitorConfig;
use crate::connection::ConnectionManager;
use crate::error::{MonitorError, Result};
use crate::logs::{ActivityEntry, ViolationEntry};
use crate::metadata::ExamMetadataProvider;
use crate::router::EventRouter;
use crate::state::{
    ConnectionStatus, MonitorState, RosterAction, RosterEntry, SessionState, run_reducer,
};
use crate::stats::{SummaryStats, order_for_display, summarize};

/// A running proctoring monitor for one exam.
pub struct Monitor {
    state: Arc<RwLock<MonitorState>>,
    router: EventRouter,
    manager: Arc<ConnectionManager>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    shutdown_timeout: Duration,
    shut_down: AtomicBool,
}

impl Monitor {
    /// Start monitoring: fetch metadata, spawn the pipeline, open the roster.
    ///
    /// Fails only on a non-WebSocket endpoint or an unavailable metadata
    /// provider; connection failures after this point downgrade state
    /// instead of erroring.
    pub async fn start(
        config: MonitorConfig,
        metadata: Arc<dyn ExamMetadataProvider>,
    ) -> Result<Self> {
        if !config.endpoint.starts_with("ws://") && !config.endpoint.starts_with("wss://") {
            return Err(MonitorError::InvalidEndpoint(config.endpoint));
        }

        // Off the event path, once, before any connection exists.
        let total_questions = metadata.total_questions(&config.exam_id).await?;
        info!(exam_id = %config.exam_id, total_questions, "starting monitor");

        let state = Arc::new(RwLock::new(MonitorState::new(total_questions)));
        let (event_tx, event_rx) = mpsc::channel(config.event_channel_capacity);
        let router = EventRouter::new(event_tx, config.log_capacity);
        let manager = Arc::new(ConnectionManager::new(&config, router.clone()));
        let cancel = CancellationToken::new();

        let (roster_tx, roster_rx) = mpsc::unbounded_channel();
        let reducer = tokio::spawn(run_reducer(
            event_rx,
            state.clone(),
            roster_tx,
            cancel.child_token(),
        ));
        let supervisor = tokio::spawn(run_roster_supervisor(
            roster_rx,
            manager.clone(),
            cancel.child_token(),
        ));

        manager.open_roster();

        Ok(Self {
            state,
            router,
            manager,
            cancel,
            tasks: Mutex::new(vec![reducer, supervisor]),
            shutdown_timeout: Duration::from_secs(config.shutdown_timeout_secs),
            shut_down: AtomicBool::new(false),
        })
    }

    /// All sessions, ordered for display (progress descending, then id).
    #[must_use]
    pub fn all_sessions(&self) -> Vec<SessionState> {
        let mut sessions = self.state.read().snapshot_sessions();
        order_for_display(&mut sessions);
        sessions
    }

    /// One session by id, if known.
    #[must_use]
    pub fn session(&self, session_id: &SessionId) -> Option<SessionState> {
        self.state.read().session(session_id).cloned()
    }

    /// The rolling violation feed, newest first.
    #[must_use]
    pub fn violation_log(&self) -> Vec<ViolationEntry> {
        self.router.violation_snapshot()
    }

    /// The rolling answer-activity feed, newest first.
    #[must_use]
    pub fn activity_log(&self) -> Vec<ActivityEntry> {
        self.router.activity_snapshot()
    }

    /// Roll-up statistics, recomputed from a consistent snapshot.
    #[must_use]
    pub fn summary(&self) -> SummaryStats {
        summarize(&self.state.read().snapshot_sessions())
    }

    /// Liveness of the roster connection.
    #[must_use]
    pub fn roster_status(&self) -> ConnectionStatus {
        self.state.read().roster_status()
    }

    /// Frames dropped as malformed since startup.
    #[must_use]
    pub fn parse_error_count(&self) -> u64 {
        self.router.parse_error_count()
    }

    /// Live upstream connections, roster included.
    #[must_use]
    pub fn active_connection_count(&self) -> usize {
        self.manager.active_connection_count()
    }

    /// Tear down every connection and internal task. Idempotent.
    ///
    /// Session state remains readable afterwards; it is discarded when the
    /// monitor is dropped.
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("shutting down monitor");
        self.manager.close_all().await;
        self.cancel.cancel();

        let tasks: Vec<JoinHandle<()>> = std::mem::take(&mut *self.tasks.lock());
        let aborts: Vec<_> = tasks.iter().map(JoinHandle::abort_handle).collect();
        if tokio::time::timeout(self.shutdown_timeout, join_all(tasks))
            .await
            .is_err()
        {
            warn!("internal tasks did not drain in time; aborting");
            for abort in aborts {
                abort.abort();
            }
        }
    }
}

/// React to roster announcements by reconciling the connection set.
///
/// The supervisor keeps the desired session set (joins add, leaves remove)
/// and lets [`ConnectionManager::reconcile_sessions`] compute and apply the
/// open/close diff, so connection churn is always derived from one place.
async fn run_roster_supervisor(
    mut rx: mpsc::UnboundedReceiver<RosterEntry>,
    manager: Arc<ConnectionManager>,
    cancel: CancellationToken,
) {
    let mut desired: BTreeSet<SessionId> = BTreeSet::new();
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            entry = rx.recv() => {
                let Some(entry) = entry else { break };
                match entry.action {
                    RosterAction::Join => {
                        let _ = desired.insert(entry.session_id.clone());
                    }
                    RosterAction::Leave => {
                        let _ = desired.remove(&entry.session_id);
                    }
                }
                let diff = manager.reconcile_sessions(&desired);
                if !diff.is_empty() {
                    debug!(
                        opened = diff.to_open.len(),
                        closed = diff.to_close.len(),
                        "reconciled session connections"
                    );
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{MetadataError, StaticExamMetadata};
    use async_trait::async_trait;
    use vigil_core::{Credential, ExamId};

    struct FailingMetadata;

    #[async_trait]
    impl ExamMetadataProvider for FailingMetadata {
        async fn total_questions(&self, _exam_id: &ExamId) -> std::result::Result<u32, MetadataError> {
            Err(MetadataError::Unavailable("backend 503".into()))
        }
    }

    fn config(endpoint: &str) -> MonitorConfig {
        MonitorConfig::new(endpoint, ExamId::from("exam_1"), Credential::new("tok"))
    }

    #[tokio::test]
    async fn start_rejects_non_websocket_endpoint() {
        let result = Monitor::start(
            config("http://127.0.0.1:1"),
            Arc::new(StaticExamMetadata::new(10)),
        )
        .await;
        assert!(matches!(result, Err(MonitorError::InvalidEndpoint(_))));
    }

    #[tokio::test]
    async fn start_surfaces_metadata_failure() {
        let result = Monitor::start(config("ws://127.0.0.1:1"), Arc::new(FailingMetadata)).await;
        assert!(matches!(result, Err(MonitorError::Metadata(_))));
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        // Endpoint with nothing listening: the roster connect fails fast and
        // the monitor keeps running with an errored roster status.
        let monitor = Monitor::start(
            config("ws://127.0.0.1:9"),
            Arc::new(StaticExamMetadata::new(10)),
        )
        .await
        .unwrap();

        monitor.shutdown().await;
        monitor.shutdown().await;
        assert_eq!(monitor.active_connection_count(), 0);
    }

    #[tokio::test]
    async fn fresh_monitor_reads_empty() {
        let monitor = Monitor::start(
            config("ws://127.0.0.1:9"),
            Arc::new(StaticExamMetadata::new(10)),
        )
        .await
        .unwrap();

        assert!(monitor.all_sessions().is_empty());
        assert!(monitor.violation_log().is_empty());
        assert!(monitor.activity_log().is_empty());
        assert_eq!(monitor.summary(), SummaryStats::default());
        assert_eq!(monitor.parse_error_count(), 0);

        monitor.shutdown().await;
    }
}
