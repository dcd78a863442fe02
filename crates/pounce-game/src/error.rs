//! Error types for the game engine.
//!
//! Only genuine rule violations are errors. Racing outcomes — cooldown
//! rejections, exhausted slap-back-ins, slapping an invalid pile — are
//! negative [`SlapResult`](pounce_protocol::SlapResult)s, not `Err`s.

use pounce_protocol::PlayerId;

/// Errors from game operations.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The acting player is not the current player.
    #[error("not your turn")]
    NotYourTurn,

    /// The acting player has no cards to play.
    #[error("no cards to play")]
    EmptyHand,

    /// The player is not seated in this game at all.
    #[error("player {0} is not in this game")]
    UnknownPlayer(PlayerId),
}
