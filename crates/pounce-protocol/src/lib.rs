//! Wire protocol for Pounce.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Identity** ([`PlayerId`], [`RoomCode`], [`SessionId`]) — opaque
//!   string newtypes that travel on the wire.
//! - **Cards** ([`Card`], [`Suit`], [`Rank`]) — the shared card
//!   primitives used by both the game engine and the wire format.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`], the envelopes) —
//!   every frame either side may send, as exhaustively tagged enums.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`], frame helpers) — how
//!   messages become bytes and back.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while doing so.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw frames) and the rest of
//! the server. It doesn't know about connections, rooms, or game rules —
//! it only knows how to describe and (de)serialize messages.
//!
//! ```text
//! Transport (bytes) → Protocol (envelopes) → Registry/Rooms (behavior)
//! ```

mod card;
mod codec;
mod error;
mod ids;
mod types;

pub use card::{Card, Rank, Suit};
pub use codec::{join_frames, split_frames, Codec};
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientEnvelope, ClientMessage, GameSnapshot, GameStats, PlayerInfo,
    RoomListing, RoomSnapshot, RoomStatus, ServerEnvelope, ServerMessage,
    SettingsPayload, SlapReason, SlapResult,
};
pub use ids::{PlayerId, RoomCode, SessionId};
