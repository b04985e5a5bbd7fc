//! Inbound frame classification and dispatch.
//!
//! Every connection reader hands its raw text frames to a clone of
//! [`EventRouter`]. The router parses, deposits violations/activity into the
//! bounded logs, and forwards the classified event to the reducer channel.
//! It holds no session state of its own, and a frame that fails to parse is
//! dropped and counted — it never crashes the connection or stalls the
//! frames behind it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use vigil_events::{EnvelopePayload, EventEnvelope};

use crate::logs::{ActivityEntry, BoundedLog, ViolationEntry};
use crate::state::{ConnectionScope, MonitorEvent, TransportChange};

/// Classifies envelopes and fans them into the logs and the reducer.
#[derive(Clone)]
pub struct EventRouter {
    reducer_tx: mpsc::Sender<MonitorEvent>,
    violations: Arc<Mutex<BoundedLog<ViolationEntry>>>,
    activity: Arc<Mutex<BoundedLog<ActivityEntry>>>,
    parse_errors: Arc<AtomicU64>,
}

impl EventRouter {
    /// Create a router feeding `reducer_tx`, with logs retaining
    /// `log_capacity` entries each.
    #[must_use]
    pub fn new(reducer_tx: mpsc::Sender<MonitorEvent>, log_capacity: usize) -> Self {
        Self {
            reducer_tx,
            violations: Arc::new(Mutex::new(BoundedLog::new(log_capacity))),
            activity: Arc::new(Mutex::new(BoundedLog::new(log_capacity))),
            parse_errors: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Parse and dispatch one raw text frame.
    pub async fn route_frame(&self, raw: &str) {
        let envelope = match EventEnvelope::parse(raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                self.count_parse_error(&e);
                return;
            }
        };
        let payload = match envelope.typed_payload() {
            Ok(payload) => payload,
            Err(e) => {
                self.count_parse_error(&e);
                return;
            }
        };

        match &payload {
            EnvelopePayload::Violation(violation) => {
                self.violations.lock().push(ViolationEntry {
                    session_id: envelope.session_id.clone(),
                    student_id: envelope.student_id.clone(),
                    severity: violation.severity,
                    reason: violation.reason.clone(),
                    timestamp: envelope.timestamp,
                });
            }
            EnvelopePayload::Activity(activity) => {
                self.activity.lock().push(ActivityEntry {
                    session_id: envelope.session_id.clone(),
                    student_id: envelope.student_id.clone(),
                    activity: activity.clone(),
                    timestamp: envelope.timestamp,
                });
            }
            EnvelopePayload::Unrecognized(_) => {
                // Forward-compatible: unknown message types are data we
                // don't understand yet, not errors.
                debug!(session_id = %envelope.session_id, "dropping unrecognized message type");
                counter!("envelopes_unrecognized_total").increment(1);
                return;
            }
            EnvelopePayload::Status(_) | EnvelopePayload::Join(_) | EnvelopePayload::Leave(_) => {}
        }

        counter!("envelopes_routed_total").increment(1);
        if self
            .reducer_tx
            .send(MonitorEvent::Envelope { envelope, payload })
            .await
            .is_err()
        {
            warn!("reducer channel closed; dropping envelope");
        }
    }

    /// Report a transport lifecycle change to the reducer.
    pub async fn notify_transport(&self, scope: ConnectionScope, change: TransportChange) {
        if self
            .reducer_tx
            .send(MonitorEvent::Transport { scope, change })
            .await
            .is_err()
        {
            debug!("reducer channel closed; dropping transport change");
        }
    }

    /// Number of frames dropped because they failed to parse.
    #[must_use]
    pub fn parse_error_count(&self) -> u64 {
        self.parse_errors.load(Ordering::Relaxed)
    }

    /// Current violation feed, newest first (≤ log capacity).
    #[must_use]
    pub fn violation_snapshot(&self) -> Vec<ViolationEntry> {
        self.violations.lock().snapshot()
    }

    /// Current activity feed, newest first (≤ log capacity).
    #[must_use]
    pub fn activity_snapshot(&self) -> Vec<ActivityEntry> {
        self.activity.lock().snapshot()
    }

    fn count_parse_error(&self, error: &vigil_events::EnvelopeError) {
        warn!(error = %error, "dropping malformed frame");
        counter!("envelope_parse_errors_total").increment(1);
        let _ = self.parse_errors.fetch_add(1, Ordering::Relaxed);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
