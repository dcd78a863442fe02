//! # Pounce
//!
//! Real-time server for a multiplayer slap-the-pile card game. Clients
//! connect over WebSockets, gather in short-code rooms, play cards in
//! turn, and race to slap the pile when it turns hot.
//!
//! This crate ties the layers together:
//!
//! ```text
//! transport (frames) → protocol (envelopes) → handler (dispatch)
//!                                        │
//!            registry (fan-out) ◄────────┼────────► rooms + games
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use pounce::PounceServerBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pounce::PounceError> {
//!     pounce::init_tracing();
//!     let server = PounceServerBuilder::new()
//!         .bind("0.0.0.0:8080")
//!         .build()
//!         .await?;
//!     server.run().await
//! }
//! ```

mod error;
mod flow;
mod handler;
mod registry;
mod server;

pub use error::PounceError;
pub use pounce_room::{PlayerDebug, RoomDebug};
pub use registry::{ClientDebug, Registry};
pub use server::{
    PounceServer, PounceServerBuilder, ServerDebug, ServerState,
};

/// Commonly used types for server embedders.
pub mod prelude {
    pub use crate::{PounceError, PounceServer, PounceServerBuilder};
    pub use pounce_protocol::{
        ClientEnvelope, ClientMessage, PlayerId, RoomCode, ServerEnvelope,
        ServerMessage, SessionId,
    };
    pub use pounce_room::{RoomManager, RoomSettings};
    pub use pounce_session::{KeyValueStore, MemoryStore, SessionConfig};
}

/// Installs a `tracing` subscriber honoring `RUST_LOG`, defaulting to
/// `info`. Call once at startup; later calls are ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
