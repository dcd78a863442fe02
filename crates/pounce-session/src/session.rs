//! Session types and token generation.

use std::time::{Duration, Instant};

use pounce_protocol::{PlayerId, RoomCode};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a session binding survives without being refreshed.
    /// Reconnecting within the window refreshes it.
    ///
    /// Default: 30 minutes.
    pub session_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(30 * 60),
        }
    }
}

/// One session's binding: which player in which room, and until when.
///
/// The serialized form (minus the deadline, which the store tracks via its
/// own TTL) is what gets mirrored to the external store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBinding {
    pub player_id: PlayerId,
    pub room_code: RoomCode,
    /// In-memory expiry deadline. Not serialized — the store applies its
    /// own TTL on put.
    #[serde(skip, default = "far_future")]
    pub expires_at: Instant,
}

fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(60 * 60 * 24 * 365)
}

impl SessionBinding {
    pub fn new(player_id: PlayerId, room_code: RoomCode, ttl: Duration) -> Self {
        Self {
            player_id,
            room_code,
            expires_at: Instant::now() + ttl,
        }
    }

    /// Whether the binding's TTL window has elapsed.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Generates a random 32-character hex string (128 bits of entropy).
///
/// Used for session tokens and player ids. 128 bits keeps guessing a live
/// token computationally infeasible, which is the entirety of the system's
/// authentication story.
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
