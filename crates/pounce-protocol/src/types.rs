//! Message types for Pounce's wire format.
//!
//! Every frame is an envelope `{type, payload, timestamp}`:
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ type: "SLAP"                         │  ← which message
//! │ payload: { "timestamp": 171234…  }   │  ← per-type content
//! │ timestamp: 1712345678901             │  ← unix millis at send
//! └──────────────────────────────────────┘
//! ```
//!
//! The `type`/`payload` pair is modeled as an adjacently tagged serde enum
//! (`#[serde(tag = "type", content = "payload")]`), one enum per direction.
//! Decoding is exhaustive: an unknown `type`, or a payload that doesn't
//! match its type, is a decode error — there is no runtime default case.

use std::collections::HashMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::{Card, PlayerId, RoomCode, SessionId};

// ---------------------------------------------------------------------------
// Shared view types
// ---------------------------------------------------------------------------

/// A player as seen by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    /// Cards currently held. Zero outside an active game.
    pub card_count: usize,
    pub is_host: bool,
    pub is_connected: bool,
    /// Seat position, dense from 0.
    pub position: usize,
}

/// Room rule settings, used both for the outbound room snapshot and as the
/// `UPDATE_SETTINGS` payload. The server clamps inbound values to range
/// rather than rejecting them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPayload {
    pub max_players: usize,
    pub slap_cooldown_ms: u64,
    pub turn_timeout_ms: u64,
    pub enable_doubles: bool,
    pub enable_sandwich: bool,
    pub burn_penalty: usize,
    pub enable_slap_in: bool,
    pub max_slap_ins: u32,
}

/// Room lifecycle status. Serialized lowercase (`"waiting"`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// In the lobby, accepting joins.
    Waiting,
    /// Countdown running; no more joins.
    Starting,
    /// Game in progress.
    Playing,
    /// Game over; the room lingers until swept.
    Finished,
}

impl RoomStatus {
    /// Whether new players may join.
    pub fn is_joinable(&self) -> bool {
        matches!(self, RoomStatus::Waiting)
    }

    /// Whether a game is running or about to.
    pub fn is_active(&self) -> bool {
        matches!(self, RoomStatus::Starting | RoomStatus::Playing)
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoomStatus::Waiting => "waiting",
            RoomStatus::Starting => "starting",
            RoomStatus::Playing => "playing",
            RoomStatus::Finished => "finished",
        };
        write!(f, "{s}")
    }
}

/// Full room state pushed to clients on join, reconnect, and roster change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub players: Vec<PlayerInfo>,
    pub settings: SettingsPayload,
    pub status: RoomStatus,
    pub host_id: PlayerId,
}

/// Game state as clients see it: only the top three pile cards are visible
/// (enough to judge doubles and sandwiches), hands are counts only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub pile: Vec<Card>,
    pub current_player_id: PlayerId,
    pub player_card_counts: HashMap<PlayerId, usize>,
    pub can_slap: bool,
}

/// Aggregate statistics reported with `GAME_OVER`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    /// Every slap attempt, including cooldown rejections.
    pub total_slaps: u64,
    pub successful_slaps: HashMap<PlayerId, u64>,
    pub cards_burned: HashMap<PlayerId, u64>,
    pub duration_ms: u64,
}

/// One entry in the joinable-room listing consumed by the lobby UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomListing {
    pub code: RoomCode,
    pub player_count: usize,
    pub max_players: usize,
    pub status: RoomStatus,
    pub host_name: String,
}

// ---------------------------------------------------------------------------
// Slap results
// ---------------------------------------------------------------------------

/// Why a slap attempt resolved the way it did. Serialized lowercase.
///
/// `Jack`/`Doubles`/`Sandwich` accompany successes; the rest are the
/// negative outcomes. Cooldown and elimination-ineligibility are normal
/// results of racing, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlapReason {
    Jack,
    Doubles,
    Sandwich,
    Invalid,
    Cooldown,
    Eliminated,
}

impl fmt::Display for SlapReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SlapReason::Jack => "jack",
            SlapReason::Doubles => "doubles",
            SlapReason::Sandwich => "sandwich",
            SlapReason::Invalid => "invalid",
            SlapReason::Cooldown => "cooldown",
            SlapReason::Eliminated => "eliminated",
        };
        write!(f, "{s}")
    }
}

/// Outcome of one slap attempt, broadcast to the whole room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlapResult {
    pub player_id: PlayerId,
    pub success: bool,
    pub reason: SlapReason,
    /// Pile size transferred on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards_won: Option<usize>,
    /// Cards actually burned on an invalid slap (≤ configured penalty).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burn_penalty: Option<usize>,
}

// ---------------------------------------------------------------------------
// Client → server messages
// ---------------------------------------------------------------------------

/// Everything a client may send.
///
/// `rename_all = "SCREAMING_SNAKE_CASE"` gives the wire tags
/// (`"CREATE_ROOM"`, …); `rename_all_fields = "camelCase"` gives the
/// payload field names the client SDK expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    CreateRoom {
        player_name: String,
    },
    JoinRoom {
        room_code: String,
        player_name: String,
    },
    LeaveRoom,
    UpdateSettings(SettingsPayload),
    ChangeName {
        new_name: String,
    },
    StartGame,
    PlayCard,
    Slap {
        /// Client-side clock at the moment of the slap, for latency
        /// diagnostics only — arbitration uses server arrival order.
        timestamp: i64,
    },
    React {
        emoji: String,
    },
    KickPlayer {
        player_id: PlayerId,
    },
    EndGame,
}

// ---------------------------------------------------------------------------
// Server → client messages
// ---------------------------------------------------------------------------

/// Everything the server may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    // -- Connection lifecycle --
    Connected {
        session_id: SessionId,
    },
    /// Sent instead of a bare `Connected` when a presented session token
    /// still maps to a live room: the full snapshot restores the client.
    Reconnected {
        room: RoomSnapshot,
    },

    // -- Room lifecycle --
    RoomCreated {
        room_code: RoomCode,
        room: RoomSnapshot,
    },
    RoomJoined {
        room: RoomSnapshot,
    },
    RoomUpdated {
        room: RoomSnapshot,
    },
    RoomClosed {
        reason: String,
    },

    // -- Roster --
    PlayerJoined {
        player: PlayerInfo,
    },
    PlayerLeft {
        player_id: PlayerId,
    },
    PlayerKicked {
        player_id: PlayerId,
        player_name: String,
    },
    PlayerReconnected {
        player_id: PlayerId,
    },
    NameChanged {
        player_id: PlayerId,
        new_name: String,
    },
    SettingsChanged {
        settings: SettingsPayload,
    },

    // -- Game flow --
    GameStarting {
        countdown: u32,
    },
    GameStarted {
        game_state: GameSnapshot,
    },
    CardsDealt {
        player_cards: HashMap<PlayerId, usize>,
    },
    CardPlayed {
        player_id: PlayerId,
        card: Card,
        pile_count: usize,
    },
    TurnChanged {
        current_player_id: PlayerId,
    },
    TurnWarning {
        seconds_remaining: u32,
    },
    SlapAttempted {
        player_id: PlayerId,
        player_name: String,
    },
    SlapResult(SlapResult),
    PlayerEliminated {
        player_id: PlayerId,
    },
    GameOver {
        winner_id: PlayerId,
        winner_name: String,
        stats: GameStats,
    },
    GameEnded {
        reason: String,
    },
    React {
        player_id: PlayerId,
        emoji: String,
    },

    // -- Errors --
    Error {
        code: String,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// Milliseconds since the unix epoch, the wire timestamp unit.
pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// An inbound frame: a [`ClientMessage`] plus the sender's timestamp.
///
/// `#[serde(flatten)]` merges the message's `type`/`payload` keys with the
/// envelope's `timestamp` into one flat JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientEnvelope {
    #[serde(flatten)]
    pub message: ClientMessage,
    /// Client clock at send time. Absent ⇒ 0 (older clients omit it).
    #[serde(default)]
    pub timestamp: i64,
}

impl ClientEnvelope {
    pub fn new(message: ClientMessage) -> Self {
        Self {
            message,
            timestamp: now_millis(),
        }
    }
}

/// An outbound frame: a [`ServerMessage`] stamped at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerEnvelope {
    #[serde(flatten)]
    pub message: ServerMessage,
    pub timestamp: i64,
}

impl ServerEnvelope {
    pub fn new(message: ServerMessage) -> Self {
        Self {
            message,
            timestamp: now_millis(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
