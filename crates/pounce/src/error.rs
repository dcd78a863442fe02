//! Unified error type for the Pounce server.

use pounce_game::GameError;
use pounce_protocol::ProtocolError;
use pounce_room::RoomError;
use pounce_session::StoreError;
use pounce_transport::TransportError;

/// Top-level error that wraps all layer-specific errors, so embedders
/// deal with one type and `?` converts automatically.
#[derive(Debug, thiserror::Error)]
pub enum PounceError {
    /// A transport-level error (accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, full, wrong status).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A game-level error (wrong turn, empty hand).
    #[error(transparent)]
    Game(#[from] GameError),

    /// A storage-collaborator error.
    #[error(transparent)]
    Store(#[from] StoreError),
}
