//! Typed payload structs, one per [`MessageType`](crate::MessageType).
//!
//! Payload JSON uses camelCase field names on the wire. Enums that carry
//! upstream-defined vocabularies (`Severity`, `SessionPhase`) keep an
//! `Unrecognized` catch-all so new upstream values degrade gracefully.

use serde::{Deserialize, Serialize};
use vigil_core::QuestionId;

/// Severity of a rule violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational breach (e.g., a brief focus loss).
    Low,
    /// Suspicious but not conclusive.
    Moderate,
    /// Strong evidence of cheating (e.g., repeated tab switches).
    Critical,
    /// A severity this build does not know. Counted as non-critical.
    #[serde(other)]
    Unrecognized,
}

impl Severity {
    /// Whether this severity feeds the critical-violation counter.
    #[must_use]
    pub fn is_critical(self) -> bool {
        matches!(self, Self::Critical)
    }
}

/// Payload of a `violation_event` envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationPayload {
    /// Severity assigned by the upstream detection heuristics.
    pub severity: Severity,
    /// Human-readable breach reason (opaque to the monitor).
    pub reason: String,
}

/// Payload of an `exam_activity` envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ActivityPayload {
    /// The student changed one answer.
    #[serde(rename = "answer_changed", rename_all = "camelCase")]
    AnswerChanged {
        /// Question whose answer changed.
        question_id: QuestionId,
        /// New answer value; empty string means the answer was cleared.
        new_value: String,
    },
    /// Periodic auto-save carrying an authoritative answered count.
    #[serde(rename = "auto_save", rename_all = "camelCase")]
    AutoSave {
        /// Count of answered questions as persisted by the exam backend.
        answered_count: u32,
    },
}

/// Semantic phase announced by a `session_status` envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// The student started a fresh exam attempt.
    Started,
    /// The student navigated away from the exam page.
    LeftPage,
    /// The student returned to the exam page.
    RejoinedPage,
    /// The student submitted the attempt. Terminal.
    Submitted,
    /// The exam window closed upstream.
    Ended,
    /// A phase this build does not know. Ignored by the reducer.
    #[serde(other)]
    Unrecognized,
}

/// Payload of a `session_status` envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPayload {
    /// The announced phase.
    pub status: SessionPhase,
}

/// Payload of a roster `student_join` envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPayload {
    /// Display name for the proctoring view.
    pub display_name: String,
}

/// Payload of a roster `student_leave` envelope.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeavePayload {
    /// Optional upstream-supplied reason for the departure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_critical_flag() {
        assert!(Severity::Critical.is_critical());
        assert!(!Severity::Low.is_critical());
        assert!(!Severity::Moderate.is_critical());
        assert!(!Severity::Unrecognized.is_critical());
    }

    #[test]
    fn unknown_severity_is_unrecognized() {
        let parsed: Severity = serde_json::from_str("\"apocalyptic\"").unwrap();
        assert_eq!(parsed, Severity::Unrecognized);
    }

    #[test]
    fn violation_payload_wire_format() {
        let json = r#"{"severity":"critical","reason":"tab_switch"}"#;
        let payload: ViolationPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.severity, Severity::Critical);
        assert_eq!(payload.reason, "tab_switch");
    }

    #[test]
    fn answer_changed_wire_format() {
        let json = r#"{"kind":"answer_changed","questionId":"q1","newValue":"A"}"#;
        let payload: ActivityPayload = serde_json::from_str(json).unwrap();
        match payload {
            ActivityPayload::AnswerChanged {
                question_id,
                new_value,
            } => {
                assert_eq!(question_id.as_str(), "q1");
                assert_eq!(new_value, "A");
            }
            ActivityPayload::AutoSave { .. } => panic!("wrong variant"),
        }
    }

    #[test]
    fn auto_save_wire_format() {
        let json = r#"{"kind":"auto_save","answeredCount":3}"#;
        let payload: ActivityPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload, ActivityPayload::AutoSave { answered_count: 3 });
    }

    #[test]
    fn status_payload_phases() {
        for (wire, phase) in [
            ("started", SessionPhase::Started),
            ("left_page", SessionPhase::LeftPage),
            ("rejoined_page", SessionPhase::RejoinedPage),
            ("submitted", SessionPhase::Submitted),
            ("ended", SessionPhase::Ended),
        ] {
            let json = format!(r#"{{"status":"{wire}"}}"#);
            let payload: StatusPayload = serde_json::from_str(&json).unwrap();
            assert_eq!(payload.status, phase);
        }
    }

    #[test]
    fn unknown_phase_is_unrecognized() {
        let json = r#"{"status":"meditating"}"#;
        let payload: StatusPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.status, SessionPhase::Unrecognized);
    }

    #[test]
    fn join_payload_wire_format() {
        let json = r#"{"displayName":"Ada L."}"#;
        let payload: JoinPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.display_name, "Ada L.");
    }

    #[test]
    fn leave_payload_reason_optional() {
        let payload: LeavePayload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload.reason, None);

        let payload: LeavePayload = serde_json::from_str(r#"{"reason":"kicked"}"#).unwrap();
        assert_eq!(payload.reason.as_deref(), Some("kicked"));
    }

    #[test]
    fn answer_changed_serializes_with_kind_tag() {
        let payload = ActivityPayload::AnswerChanged {
            question_id: QuestionId::from("q2"),
            new_value: "B".into(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "answer_changed");
        assert_eq!(json["questionId"], "q2");
        assert_eq!(json["newValue"], "B");
    }
}
