//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding messages.
///
/// Decode errors are expected in normal operation (clients can send
/// anything); the handler reports them to the offending sender and moves
/// on. Encode errors indicate a server-side bug and are logged.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a message into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown message type,
    /// or a payload that doesn't match its type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but violates a protocol rule (e.g. an empty
    /// required field).
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
