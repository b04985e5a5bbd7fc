//! Error types for envelope parsing.
//!
//! [`EnvelopeError`] distinguishes frames that are not envelopes at all from
//! envelopes whose payload does not match their declared type. Both are
//! dropped by the router; neither is ever fatal.

use thiserror::Error;

use crate::message_type::MessageType;

/// Errors that can occur while decoding an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The frame is not a well-formed envelope.
    #[error("malformed envelope: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The envelope parsed but its payload does not match its message type.
    #[error("invalid {message_type} payload: {source}")]
    Payload {
        /// The declared message type whose payload failed to decode.
        message_type: MessageType,
        /// Underlying decode error.
        source: serde_json::Error,
    },
}

/// Convenience type alias for envelope results.
pub type Result<T> = std::result::Result<T, EnvelopeError>;
