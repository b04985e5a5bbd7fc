//! Monitor configuration.

use serde::{Deserialize, Serialize};
use vigil_core::constants::{
    DEFAULT_EVENT_CHANNEL_CAPACITY, DEFAULT_HEARTBEAT_INTERVAL_SECS, DEFAULT_LOG_CAPACITY,
    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
use vigil_core::{Credential, ExamId};

/// Configuration for one monitoring session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// WebSocket endpoint of the exam backend (`ws://` or `wss://`, no
    /// trailing slash).
    pub endpoint: String,
    /// Exam to monitor.
    pub exam_id: ExamId,
    /// Bearer credential presented on every connection.
    pub credential: Credential,
    /// Capacity of the reader → reducer fan-in channel.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
    /// Entries retained by each bounded activity/violation log.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
    /// Interval between client-initiated Ping frames, in seconds.
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
    /// How long teardown waits for reader tasks before aborting, in seconds.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_event_channel_capacity() -> usize {
    DEFAULT_EVENT_CHANNEL_CAPACITY
}

fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}

fn default_heartbeat_interval_secs() -> u64 {
    DEFAULT_HEARTBEAT_INTERVAL_SECS
}

fn default_shutdown_timeout_secs() -> u64 {
    DEFAULT_SHUTDOWN_TIMEOUT_SECS
}

impl MonitorConfig {
    /// Create a config with default tunables.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, exam_id: ExamId, credential: Credential) -> Self {
        Self {
            endpoint: endpoint.into(),
            exam_id,
            credential,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            log_capacity: DEFAULT_LOG_CAPACITY,
            heartbeat_interval_secs: DEFAULT_HEARTBEAT_INTERVAL_SECS,
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
        }
    }
}
