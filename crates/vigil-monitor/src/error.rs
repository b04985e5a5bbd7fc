//! Error types for the monitor core.
//!
//! Nothing on the event path is fatal: transport failures downgrade session
//! state locally and malformed input is dropped and counted. The variants
//! here cover the only operations that can actually refuse to proceed —
//! monitor startup.

use thiserror::Error;

use crate::metadata::MetadataError;

/// Errors that can occur while starting or driving the monitor.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The configured endpoint is not a WebSocket URL.
    #[error("invalid endpoint (expected ws:// or wss://): {0}")]
    InvalidEndpoint(String),

    /// The exam metadata provider could not supply exam metadata.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// Convenience type alias for monitor results.
pub type Result<T> = std::result::Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_endpoint_display() {
        let err = MonitorError::InvalidEndpoint("http://nope".into());
        assert_eq!(
            err.to_string(),
            "invalid endpoint (expected ws:// or wss://): http://nope"
        );
    }

    #[test]
    fn metadata_error_passes_through() {
        let err: MonitorError = MetadataError::Unavailable("backend 503".into()).into();
        assert_eq!(err.to_string(), "exam metadata unavailable: backend 503");
    }
}
