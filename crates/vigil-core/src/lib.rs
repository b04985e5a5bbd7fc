//! # vigil-core
//!
//! Foundation types for the vigil exam-proctoring monitor.
//!
//! This crate provides the shared vocabulary the other vigil crates depend on:
//!
//! - **Branded IDs**: `ExamId`, `SessionId`, `StudentId`, `QuestionId` as
//!   newtypes for type safety
//! - **Credential**: opaque bearer token presented on every upstream
//!   connection, redacted in debug output
//! - **Constants**: default tunables shared between config and tests

#![deny(unsafe_code)]

pub mod constants;
pub mod credential;
pub mod ids;

pub use credential::Credential;
pub use ids::{ConnectionId, ExamId, QuestionId, SessionId, StudentId};
