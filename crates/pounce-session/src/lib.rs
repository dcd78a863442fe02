//! Session layer for Pounce.
//!
//! A "session" is the reconnection credential: an opaque token bound to a
//! (player, room) pair with an expiry. When a connection drops, the
//! binding outlives it — a client presenting the same token within the TTL
//! window gets its seat back without creating a new player.
//!
//! The layer has two halves:
//!
//! - [`SessionManager`] — the authoritative in-memory token → binding map.
//! - [`KeyValueStore`] — an abstract expiring key-value collaborator
//!   (Redis-shaped) that sessions and rooms are mirrored to, best-effort,
//!   for crash recovery. Store failures never surface to clients; the
//!   in-memory state wins. [`MemoryStore`] is the bundled implementation.

mod error;
mod manager;
mod session;
mod store;

pub use error::StoreError;
pub use manager::SessionManager;
pub use session::{generate_token, SessionBinding, SessionConfig};
pub use store::{KeyValueStore, MemoryStore};
