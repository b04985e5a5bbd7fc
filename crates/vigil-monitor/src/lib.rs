//! # vigil-monitor
//!
//! The concurrency-heavy core of the vigil proctoring system: an
//! always-current picture of every student session in a running exam, built
//! from a swarm of independent, unordered, unreliable real-time streams.
//!
//! Architecture (data flows left to right):
//!
//! ```text
//! roster ws ──┐
//! session ws ─┼─> EventRouter ──> mpsc ──> reducer task ──> MonitorState
//! session ws ─┘       │                                          │
//!                bounded logs                              snapshots / stats
//! ```
//!
//! - **[`connection`]**: one reader task per WebSocket; the
//!   [`ConnectionManager`](connection::ConnectionManager) owns exactly one
//!   roster connection plus one connection per known-active session.
//! - **[`router`]**: parses and classifies inbound frames, deposits them
//!   into the bounded violation/activity logs, and forwards them to the
//!   reducer channel. Malformed input is dropped and counted, never fatal.
//! - **[`state`]**: the single-authority reducer folding events into
//!   per-session state under a serialization discipline — readers never
//!   mutate, they only submit.
//! - **[`stats`]**: pure roll-up projections recomputed on demand.
//! - **[`monitor`]**: the facade wiring all of the above, exposing the
//!   snapshot read API consumed by the presentation layer.

#![deny(unsafe_code)]

pub mod config;
pub mod connection;
pub mod error;
pub mod logs;
pub mod metadata;
pub mod monitor;
pub mod router;
pub mod state;
pub mod stats;

pub use config::MonitorConfig;
pub use error::{MonitorError, Result};
pub use metadata::{ExamMetadataProvider, MetadataError, StaticExamMetadata};
pub use monitor::Monitor;
pub use state::{ConnectionStatus, ExamStatus, SessionState};
pub use stats::SummaryStats;
