//! The [`EventEnvelope`] struct — the transport-level event type.
//!
//! Envelopes arrive as a flat JSON object with base fields at the top level
//! and a `payload` object stored as opaque [`serde_json::Value`]. Typed
//! access is opt-in via [`EventEnvelope::typed_payload()`], which dispatches
//! on [`MessageType`] and deserializes into the matching payload struct.
//!
//! Timestamps are producer-supplied and monotonic per producer only — two
//! envelopes from different sessions may arrive out of wall-clock order, and
//! consumers must tolerate that.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vigil_core::{ExamId, SessionId, StudentId};

use crate::errors::{EnvelopeError, Result};
use crate::message_type::MessageType;
use crate::payloads::{
    ActivityPayload, JoinPayload, LeavePayload, StatusPayload, ViolationPayload,
};

/// A received proctoring event, immutable once parsed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// Producer-supplied timestamp. Not globally ordered across sessions.
    pub timestamp: DateTime<Utc>,
    /// Student this event concerns.
    pub student_id: StudentId,
    /// Session this event concerns.
    pub session_id: SessionId,
    /// Exam the session belongs to.
    pub exam_id: ExamId,
    /// Type-specific data (opaque JSON).
    #[serde(default)]
    pub payload: Value,
}

/// Typed payload enum for compile-time-safe access.
///
/// Obtained via [`EventEnvelope::typed_payload()`].
#[derive(Clone, Debug, PartialEq)]
pub enum EnvelopePayload {
    /// `violation_event`
    Violation(ViolationPayload),
    /// `exam_activity`
    Activity(ActivityPayload),
    /// `session_status`
    Status(StatusPayload),
    /// `student_join`
    Join(JoinPayload),
    /// `student_leave`
    Leave(LeavePayload),
    /// An unrecognized message type; the raw payload is preserved.
    Unrecognized(Value),
}

impl EventEnvelope {
    /// Parse a raw text frame into an envelope.
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(EnvelopeError::Malformed)
    }

    /// Deserialize the payload into the typed variant matching
    /// [`message_type`](Self::message_type).
    ///
    /// Returns `Err` if the payload JSON doesn't match the expected shape.
    pub fn typed_payload(&self) -> Result<EnvelopePayload> {
        let decode = |e: serde_json::Error| EnvelopeError::Payload {
            message_type: self.message_type,
            source: e,
        };
        match self.message_type {
            MessageType::ViolationEvent => Ok(EnvelopePayload::Violation(
                serde_json::from_value(self.payload.clone()).map_err(decode)?,
            )),
            MessageType::ExamActivity => Ok(EnvelopePayload::Activity(
                serde_json::from_value(self.payload.clone()).map_err(decode)?,
            )),
            MessageType::SessionStatus => Ok(EnvelopePayload::Status(
                serde_json::from_value(self.payload.clone()).map_err(decode)?,
            )),
            MessageType::StudentJoin => Ok(EnvelopePayload::Join(
                serde_json::from_value(self.payload.clone()).map_err(decode)?,
            )),
            MessageType::StudentLeave => Ok(EnvelopePayload::Leave(
                serde_json::from_value(self.payload.clone()).map_err(decode)?,
            )),
            MessageType::Unrecognized => Ok(EnvelopePayload::Unrecognized(self.payload.clone())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payloads::{SessionPhase, Severity};
    use assert_matches::assert_matches;

    fn envelope_json(message_type: &str, payload: &str) -> String {
        format!(
            r#"{{"type":"{message_type}","timestamp":"2026-03-09T08:30:00Z","studentId":"stu_1","sessionId":"sess_1","examId":"exam_1","payload":{payload}}}"#
        )
    }

    #[test]
    fn parse_violation_envelope() {
        let raw = envelope_json("violation_event", r#"{"severity":"low","reason":"blur"}"#);
        let env = EventEnvelope::parse(&raw).unwrap();
        assert_eq!(env.message_type, MessageType::ViolationEvent);
        assert_eq!(env.student_id.as_str(), "stu_1");
        assert_eq!(env.session_id.as_str(), "sess_1");
        assert_eq!(env.exam_id.as_str(), "exam_1");
    }

    #[test]
    fn typed_payload_violation() {
        let raw = envelope_json(
            "violation_event",
            r#"{"severity":"critical","reason":"tab_switch"}"#,
        );
        let env = EventEnvelope::parse(&raw).unwrap();
        assert_matches!(
            env.typed_payload().unwrap(),
            EnvelopePayload::Violation(ViolationPayload {
                severity: Severity::Critical,
                ..
            })
        );
    }

    #[test]
    fn typed_payload_activity() {
        let raw = envelope_json(
            "exam_activity",
            r#"{"kind":"answer_changed","questionId":"q1","newValue":"A"}"#,
        );
        let env = EventEnvelope::parse(&raw).unwrap();
        assert_matches!(
            env.typed_payload().unwrap(),
            EnvelopePayload::Activity(ActivityPayload::AnswerChanged { .. })
        );
    }

    #[test]
    fn typed_payload_status() {
        let raw = envelope_json("session_status", r#"{"status":"started"}"#);
        let env = EventEnvelope::parse(&raw).unwrap();
        assert_matches!(
            env.typed_payload().unwrap(),
            EnvelopePayload::Status(StatusPayload {
                status: SessionPhase::Started
            })
        );
    }

    #[test]
    fn typed_payload_join_and_leave() {
        let raw = envelope_json("student_join", r#"{"displayName":"Ada L."}"#);
        let env = EventEnvelope::parse(&raw).unwrap();
        assert_matches!(env.typed_payload().unwrap(), EnvelopePayload::Join(p) => {
            assert_eq!(p.display_name, "Ada L.");
        });

        let raw = envelope_json("student_leave", "{}");
        let env = EventEnvelope::parse(&raw).unwrap();
        assert_matches!(env.typed_payload().unwrap(), EnvelopePayload::Leave(_));
    }

    #[test]
    fn unknown_type_preserves_payload() {
        let raw = envelope_json("webcam_frame", r#"{"blob":"..."}"#);
        let env = EventEnvelope::parse(&raw).unwrap();
        assert_eq!(env.message_type, MessageType::Unrecognized);
        assert_matches!(env.typed_payload().unwrap(), EnvelopePayload::Unrecognized(v) => {
            assert_eq!(v["blob"], "...");
        });
    }

    #[test]
    fn malformed_json_is_error() {
        let err = EventEnvelope::parse("{not json").unwrap_err();
        assert_matches!(err, EnvelopeError::Malformed(_));
    }

    #[test]
    fn missing_base_field_is_error() {
        // No sessionId.
        let raw = r#"{"type":"student_join","timestamp":"2026-03-09T08:30:00Z","studentId":"stu_1","examId":"exam_1","payload":{}}"#;
        assert!(EventEnvelope::parse(raw).is_err());
    }

    #[test]
    fn payload_shape_mismatch_is_payload_error() {
        let raw = envelope_json("violation_event", r#"{"no_severity":true}"#);
        let env = EventEnvelope::parse(&raw).unwrap();
        assert_matches!(
            env.typed_payload().unwrap_err(),
            EnvelopeError::Payload {
                message_type: MessageType::ViolationEvent,
                ..
            }
        );
    }

    #[test]
    fn missing_payload_defaults_to_null() {
        let raw = r#"{"type":"student_leave","timestamp":"2026-03-09T08:30:00Z","studentId":"stu_1","sessionId":"sess_1","examId":"exam_1"}"#;
        let env = EventEnvelope::parse(raw).unwrap();
        assert_eq!(env.payload, Value::Null);
        // Leave payload fields are all optional, so null still fails serde's
        // struct expectation — callers treat that as a payload error.
        assert!(env.typed_payload().is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let raw = envelope_json("session_status", r#"{"status":"submitted"}"#);
        let env = EventEnvelope::parse(&raw).unwrap();
        let json = serde_json::to_string(&env).unwrap();
        let back = EventEnvelope::parse(&json).unwrap();
        assert_eq!(env, back);
    }

    #[test]
    fn timestamps_parse_rfc3339() {
        let raw = envelope_json("student_leave", "{}");
        let env = EventEnvelope::parse(&raw).unwrap();
        assert_eq!(env.timestamp.to_rfc3339(), "2026-03-09T08:30:00+00:00");
    }
}
