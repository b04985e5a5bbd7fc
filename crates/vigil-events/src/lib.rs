//! # vigil-events
//!
//! The shared event vocabulary spoken by every vigil component.
//!
//! A proctoring monitor receives one stream of envelopes per student session
//! plus a roster stream announcing joins and leaves. This crate defines:
//!
//! - **[`MessageType`]**: the five wire discriminators plus an
//!   `Unrecognized` catch-all for forward compatibility
//! - **[`EventEnvelope`]**: the flat transport struct with base fields at the
//!   top level and an opaque JSON `payload`
//! - **Typed payloads**: opt-in, compile-time-safe payload access via
//!   [`EventEnvelope::typed_payload()`]
//!
//! Envelopes are immutable once received; nothing here holds state.

#![deny(unsafe_code)]

pub mod envelope;
pub mod errors;
pub mod message_type;
pub mod payloads;

pub use envelope::{EnvelopePayload, EventEnvelope};
pub use errors::{EnvelopeError, Result};
pub use message_type::MessageType;
pub use payloads::{
    ActivityPayload, JoinPayload, LeavePayload, SessionPhase, Severity, StatusPayload,
    ViolationPayload,
};
