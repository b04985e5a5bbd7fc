//! Branded ID newtypes for type safety.
//!
//! Every entity in the vigil system has a distinct ID type implemented as a
//! newtype wrapper around `String`. This prevents accidentally passing a
//! student ID where a session ID is expected — a real hazard here, since
//! every event envelope carries both side by side.
//!
//! Exam, session, student, and question IDs are minted upstream (by the exam
//! backend) and treated as opaque strings. [`ConnectionId`] is minted locally
//! as a UUID v7 (time-ordered) via [`uuid::Uuid::now_v7`].

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from an existing string value.
            #[must_use]
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

branded_id! {
    /// Unique identifier for an exam being monitored.
    ExamId
}

branded_id! {
    /// Unique identifier for one student's attempt at one exam.
    SessionId
}

branded_id! {
    /// Unique identifier for a student.
    StudentId
}

branded_id! {
    /// Unique identifier for a question within an exam.
    QuestionId
}

branded_id! {
    /// Unique identifier for a locally-opened upstream connection.
    ConnectionId
}

impl ConnectionId {
    /// Mint a new random connection ID (UUID v7, time-ordered).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
