//! Room lifecycle management for Pounce.
//!
//! A room is an isolated group of players addressed by a short code,
//! running at most one game. This crate owns:
//!
//! - [`Room`] — roster, host designation, settings, status, and the
//!   optional active [`Game`](pounce_game::Game).
//! - [`RoomManager`] — the process-wide room map: code generation,
//!   create/join/leave, the idle-room sweep, session bindings for
//!   reconnection, and best-effort store mirroring.
//!
//! Each room sits behind its own lock, so two rooms never contend with
//! each other; only the code → room map itself is shared.

mod error;
mod manager;
mod room;
mod settings;

pub use error::RoomError;
pub use manager::{PlayerDebug, RoomDebug, RoomManager, SharedRoom, SWEEP_INTERVAL};
pub use room::{Player, Room};
pub use settings::RoomSettings;
