//! The [`MessageType`] enum — transport-level envelope discriminators.
//!
//! Every variant has an exact `#[serde(rename)]` matching the wire string the
//! exam backend emits (e.g., `"violation_event"`). Tags this build does not
//! know about deserialize to [`MessageType::Unrecognized`] rather than
//! failing, so a newer backend never crashes an older monitor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// All envelope message types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    /// A detected rule breach (tab switch, clipboard use, …) with severity.
    #[serde(rename = "violation_event")]
    ViolationEvent,
    /// Answer-progress telemetry (answer changed, auto-save snapshot).
    #[serde(rename = "exam_activity")]
    ExamActivity,
    /// Semantic session transition (started, left page, rejoined, submitted).
    #[serde(rename = "session_status")]
    SessionStatus,
    /// Roster announcement: a student session joined the exam.
    #[serde(rename = "student_join")]
    StudentJoin,
    /// Roster announcement: a student session left the exam.
    #[serde(rename = "student_leave")]
    StudentLeave,
    /// Any tag this build does not know. Ignored, never an error.
    #[serde(other, rename = "unrecognized")]
    Unrecognized,
}

/// All known message type variants in definition order.
///
/// Useful for iteration in tests; deliberately excludes `Unrecognized`.
pub const ALL_MESSAGE_TYPES: [MessageType; 5] = [
    MessageType::ViolationEvent,
    MessageType::ExamActivity,
    MessageType::SessionStatus,
    MessageType::StudentJoin,
    MessageType::StudentLeave,
];

impl MessageType {
    /// Return the canonical wire string (e.g., `"violation_event"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ViolationEvent => "violation_event",
            Self::ExamActivity => "exam_activity",
            Self::SessionStatus => "session_status",
            Self::StudentJoin => "student_join",
            Self::StudentLeave => "student_leave",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Whether this type is a roster announcement (join/leave).
    #[must_use]
    pub fn is_roster_type(self) -> bool {
        matches!(self, Self::StudentJoin | Self::StudentLeave)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
