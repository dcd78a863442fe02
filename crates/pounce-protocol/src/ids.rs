//! Identity newtypes shared across the wire format and the server.
//!
//! All three are opaque strings on the wire. The newtype wrappers exist so
//! a `RoomCode` can never be passed where a `PlayerId` is expected, and so
//! function signatures document themselves.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A unique identifier for a player within a room.
///
/// Issued by the server when a player creates or joins a room (a 32-char
/// hex token). Stable for the lifetime of the player's seat, including
/// across reconnects.
///
/// `#[serde(transparent)]` keeps the JSON representation a plain string,
/// so a client sees `"a3f9…"` rather than `{"0":"a3f9…"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Wraps an already-generated token.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the underlying token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A short human-typeable room code (e.g. `"KX7R"`).
///
/// Generated from an alphabet with visually confusable characters removed;
/// always stored and compared uppercase. [`RoomCode::normalized`] is what
/// inbound join requests go through, so `"kx7r"` finds the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(pub String);

impl RoomCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Uppercases a client-supplied code so lookups are case-insensitive.
    pub fn normalized(code: &str) -> Self {
        Self(code.to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The opaque per-connection session token.
///
/// Issued on first connect and echoed back by the client on reconnection;
/// the server uses it to restore the (player, room) binding within the
/// session TTL window. It is the only credential in the system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
