//! Codec trait, JSON implementation, and frame coalescing.
//!
//! A codec converts between message types and raw bytes. The rest of the
//! server only talks to the [`Codec`] trait, so a binary codec could be
//! swapped in later without touching anything else.
//!
//! # Frame coalescing
//!
//! The write loop may pack several queued server envelopes into a single
//! transport frame, separated by `\n` ([`join_frames`]). A conformant
//! client splits on line boundaries and decodes each line independently —
//! and the server does the same for inbound frames ([`split_frames`]).

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes values to bytes and decodes them back.
///
/// `Send + Sync + 'static` because the codec is shared across all
/// connection tasks for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into one frame's bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes one frame's bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// Joins already-encoded frames with `\n` so they ride in one transport
/// frame. A single frame passes through unchanged.
pub fn join_frames(frames: &[Vec<u8>]) -> Vec<u8> {
    let total: usize = frames.iter().map(|f| f.len() + 1).sum();
    let mut out = Vec::with_capacity(total);
    for (i, frame) in frames.iter().enumerate() {
        if i > 0 {
            out.push(b'\n');
        }
        out.extend_from_slice(frame);
    }
    out
}

/// Splits a possibly-coalesced frame on line boundaries, skipping empty
/// lines (a trailing newline produces one).
pub fn split_frames(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    data.split(|b| *b == b'\n').filter(|line| !line.is_empty())
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// JSON keeps the protocol inspectable in browser DevTools, which matters
/// far more here than frame size does. Behind the default `json` feature.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientEnvelope, ClientMessage, ServerEnvelope, ServerMessage, SessionId};

    #[test]
    fn test_json_codec_round_trip() {
        let codec = JsonCodec;
        let env = ClientEnvelope {
            message: ClientMessage::PlayCard,
            timestamp: 77,
        };
        let bytes = codec.encode(&env).unwrap();
        let decoded: ClientEnvelope = codec.decode(&bytes).unwrap();
        assert_eq!(env, decoded);
    }

    #[test]
    fn test_json_codec_decode_garbage_returns_error() {
        let codec = JsonCodec;
        let result: Result<ClientEnvelope, _> = codec.decode(b"{{{{");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_join_frames_single_frame_unchanged() {
        let joined = join_frames(&[b"abc".to_vec()]);
        assert_eq!(joined, b"abc");
    }

    #[test]
    fn test_join_then_split_round_trip() {
        let frames = vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()];
        let joined = join_frames(&frames);
        let split: Vec<&[u8]> = split_frames(&joined).collect();
        assert_eq!(split, vec![&b"one"[..], &b"two"[..], &b"three"[..]]);
    }

    #[test]
    fn test_split_frames_skips_empty_lines() {
        let split: Vec<&[u8]> = split_frames(b"a\n\nb\n").collect();
        assert_eq!(split, vec![&b"a"[..], &b"b"[..]]);
    }

    #[test]
    fn test_coalesced_envelopes_decode_independently() {
        let codec = JsonCodec;
        let a = codec
            .encode(&ServerEnvelope {
                message: ServerMessage::Connected {
                    session_id: SessionId::new("s1"),
                },
                timestamp: 1,
            })
            .unwrap();
        let b = codec
            .encode(&ServerEnvelope {
                message: ServerMessage::GameStarting { countdown: 3 },
                timestamp: 2,
            })
            .unwrap();

        let joined = join_frames(&[a, b]);
        let decoded: Vec<ServerEnvelope> = split_frames(&joined)
            .map(|line| codec.decode(line).unwrap())
            .collect();

        assert_eq!(decoded.len(), 2);
        assert!(matches!(
            decoded[1].message,
            ServerMessage::GameStarting { countdown: 3 }
        ));
    }
}
