//! The exam-metadata collaborator boundary.
//!
//! The monitor needs one fact from the wider exam system — how many
//! questions the exam has — and queries it exactly once at startup, off the
//! event path. The provider is a trait so tests and the CLI can supply the
//! value directly while an embedding application can back it with its REST
//! client.

use async_trait::async_trait;
use thiserror::Error;
use vigil_core::ExamId;

/// Errors raised by a metadata provider.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The provider could not supply metadata for the exam.
    #[error("exam metadata unavailable: {0}")]
    Unavailable(String),
}

/// Supplies exam metadata to the monitor at startup.
#[async_trait]
pub trait ExamMetadataProvider: Send + Sync {
    /// Total number of questions in the exam.
    async fn total_questions(&self, exam_id: &ExamId) -> Result<u32, MetadataError>;
}

/// A provider with a fixed answer, for tests and CLI use.
#[derive(Clone, Copy, Debug)]
pub struct StaticExamMetadata {
    total_questions: u32,
}

impl StaticExamMetadata {
    /// Create a provider that always reports `total_questions`.
    #[must_use]
    pub fn new(total_questions: u32) -> Self {
        Self { total_questions }
    }
}

#[async_trait]
impl ExamMetadataProvider for StaticExamMetadata {
    async fn total_questions(&self, _exam_id: &ExamId) -> Result<u32, MetadataError> {
        Ok(self.total_questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_provider_reports_fixed_value() {
        let provider = StaticExamMetadata::new(25);
        let total = provider
            .total_questions(&ExamId::from("exam_1"))
            .await
            .unwrap();
        assert_eq!(total, 25);
    }

    #[test]
    fn unavailable_display() {
        let err = MetadataError::Unavailable("backend 503".into());
        assert_eq!(err.to_string(), "exam metadata unavailable: backend 503");
    }
}
