//! `PounceServer` builder and accept loop.
//!
//! This is the entry point for running the server. The builder wires the
//! layers together; [`PounceServer::run`] accepts connections and spawns
//! one handler task per client.

use std::sync::Arc;

use pounce_protocol::RoomListing;
use pounce_room::{RoomDebug, RoomManager};
use pounce_session::{KeyValueStore, MemoryStore, SessionConfig};
use pounce_transport::{Transport, WebSocketTransport};
use serde::Serialize;

use crate::handler::handle_connection;
use crate::registry::Registry;
use crate::{ClientDebug, PounceError};

/// Shared server state passed to every connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The two
/// process-wide structures — the connection registry and the room map —
/// each carry their own lock; there is no global one.
pub struct ServerState<S: KeyValueStore> {
    pub registry: Registry,
    pub rooms: Arc<RoomManager<S>>,
}

impl<S: KeyValueStore> ServerState<S> {
    /// Read-only snapshot of all connections and rooms, for operational
    /// visibility only.
    pub async fn debug_snapshot(&self) -> ServerDebug {
        let clients = self.registry.debug_clients().await;
        let rooms = self.rooms.debug_rooms().await;
        ServerDebug {
            total_clients: clients.len(),
            total_rooms: rooms.len(),
            clients,
            rooms,
        }
    }

    /// Joinable rooms for an external lobby UI.
    pub async fn joinable_rooms(&self) -> Vec<RoomListing> {
        self.rooms.joinable_rooms().await
    }
}

/// Read-only dump of the whole server, for the debug interface.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerDebug {
    pub total_clients: usize,
    pub total_rooms: usize,
    pub clients: Vec<ClientDebug>,
    pub rooms: Vec<RoomDebug>,
}

/// Builder for configuring and starting a Pounce server.
pub struct PounceServerBuilder {
    bind_addr: String,
    session_config: SessionConfig,
}

impl PounceServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            session_config: SessionConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the session configuration (reconnection TTL).
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Builds the server with the bundled in-memory store.
    pub async fn build(self) -> Result<PounceServer<MemoryStore>, PounceError> {
        self.build_with_store(Some(Arc::new(MemoryStore::new())))
            .await
    }

    /// Builds the server with a caller-supplied storage collaborator
    /// (`None` disables mirroring entirely).
    pub async fn build_with_store<S: KeyValueStore>(
        self,
        store: Option<Arc<S>>,
    ) -> Result<PounceServer<S>, PounceError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let rooms = Arc::new(RoomManager::new(self.session_config, store));
        let sweeper = RoomManager::spawn_sweeper(
            Arc::clone(&rooms),
            pounce_room::SWEEP_INTERVAL,
        );
        let state = Arc::new(ServerState {
            registry: Registry::new(),
            rooms,
        });
        Ok(PounceServer {
            transport,
            state,
            sweeper,
        })
    }
}

impl Default for PounceServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Pounce server. Call [`run()`](Self::run) to start accepting
/// connections.
pub struct PounceServer<S: KeyValueStore> {
    transport: WebSocketTransport,
    state: Arc<ServerState<S>>,
    sweeper: tokio::task::JoinHandle<()>,
}

impl<S: KeyValueStore> PounceServer<S> {
    /// Creates a new builder.
    pub fn builder() -> PounceServerBuilder {
        PounceServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// A handle to the shared state, for embedders that serve the
    /// discovery/debug interfaces alongside the game socket.
    pub fn state(&self) -> Arc<ServerState<S>> {
        Arc::clone(&self.state)
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(mut self) -> Result<(), PounceError> {
        tracing::info!("Pounce server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(handle_connection(conn, state));
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

impl<S: KeyValueStore> Drop for PounceServer<S> {
    fn drop(&mut self) {
        self.sweeper.abort();
    }
}
