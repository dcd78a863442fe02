//! Error types for the room layer.

use pounce_protocol::{PlayerId, RoomCode};

/// Errors that can occur during room operations.
///
/// Every variant maps to a stable wire code via [`RoomError::code`]; the
/// handler sends that code with the error's display text to the
/// originating client only.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room code is unknown.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// The roster is at the configured maximum.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// The room has left the lobby; joins and setting changes are over.
    #[error("game already in progress")]
    GameInProgress,

    /// No such player in this room.
    #[error("player {0} not in room")]
    PlayerNotFound(PlayerId),

    /// Ran out of attempts to find an unused room code.
    #[error("failed to generate a unique room code")]
    CodeGeneration,
}

impl RoomError {
    /// The wire error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            RoomError::NotFound(_) => "ROOM_NOT_FOUND",
            RoomError::RoomFull(_) => "ROOM_FULL",
            RoomError::GameInProgress => "GAME_IN_PROGRESS",
            RoomError::PlayerNotFound(_) => "PLAYER_NOT_FOUND",
            RoomError::CodeGeneration => "CREATE_FAILED",
        }
    }
}
