//! The connection registry: every live connection, indexed for fan-out.
//!
//! One mutex guards the whole live set — register/unregister race with
//! broadcasts from every room, so all mutation is serialized here. The
//! registry never blocks on a recipient: deliveries are `try_send` into
//! each connection's bounded outbound queue, and a full queue simply
//! drops the message. A client stuck enough to fill 256 frames is on its
//! way out through the unregister path anyway.

use std::collections::HashMap;

use pounce_protocol::{
    Codec, JsonCodec, PlayerId, RoomCode, ServerEnvelope, ServerMessage,
    SessionId,
};
use pounce_transport::ConnectionId;
use serde::Serialize;
use tokio::sync::{mpsc, Mutex};

/// Outbound frames buffered per connection before drops start.
pub(crate) const OUTBOUND_BUFFER: usize = 256;

/// What the registry knows about one connection.
struct ClientEntry {
    session_id: SessionId,
    player_id: Option<PlayerId>,
    room_code: Option<RoomCode>,
    name: Option<String>,
    sender: mpsc::Sender<Vec<u8>>,
}

/// A connection's seat binding, as returned to the handler.
#[derive(Debug, Clone)]
pub(crate) struct ClientBinding {
    pub session_id: SessionId,
    pub player_id: Option<PlayerId>,
    pub room_code: Option<RoomCode>,
}

struct Inner {
    clients: HashMap<ConnectionId, ClientEntry>,
    /// Session → connection index for reconnection-era lookups.
    sessions: HashMap<SessionId, ConnectionId>,
}

/// Tracks all live connections; owns broadcast and point-to-point
/// delivery.
pub struct Registry {
    codec: JsonCodec,
    inner: Mutex<Inner>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            codec: JsonCodec,
            inner: Mutex::new(Inner {
                clients: HashMap::new(),
                sessions: HashMap::new(),
            }),
        }
    }

    // -- Lifecycle ---------------------------------------------------------

    /// Adds a connection to the live set. Idempotent per connection id;
    /// re-registering a session id points it at the newest connection.
    pub(crate) async fn register(
        &self,
        conn_id: ConnectionId,
        session_id: SessionId,
        sender: mpsc::Sender<Vec<u8>>,
    ) {
        let mut inner = self.inner.lock().await;
        inner.sessions.insert(session_id.clone(), conn_id);
        inner.clients.insert(
            conn_id,
            ClientEntry {
                session_id,
                player_id: None,
                room_code: None,
                name: None,
                sender,
            },
        );
        tracing::debug!(%conn_id, clients = inner.clients.len(), "connection registered");
    }

    /// Removes a connection from all indexes and closes its outbound
    /// queue (the write loop drains and exits). Returns the binding so
    /// the caller can run the room disconnect path synchronously.
    pub(crate) async fn unregister(
        &self,
        conn_id: ConnectionId,
    ) -> Option<ClientBinding> {
        let mut inner = self.inner.lock().await;
        let entry = inner.clients.remove(&conn_id)?;
        // Only unindex the session if it still points at us — a
        // reconnection may have claimed it already.
        if inner.sessions.get(&entry.session_id) == Some(&conn_id) {
            inner.sessions.remove(&entry.session_id);
        }
        tracing::debug!(%conn_id, clients = inner.clients.len(), "connection unregistered");
        Some(ClientBinding {
            session_id: entry.session_id,
            player_id: entry.player_id,
            room_code: entry.room_code,
        })
    }

    // -- Seat bindings -----------------------------------------------------

    /// Records which (player, room) a connection is seated as.
    pub(crate) async fn bind(
        &self,
        conn_id: ConnectionId,
        player_id: PlayerId,
        room_code: RoomCode,
        name: String,
    ) {
        if let Some(entry) = self.inner.lock().await.clients.get_mut(&conn_id) {
            entry.player_id = Some(player_id);
            entry.room_code = Some(room_code);
            entry.name = Some(name);
        }
    }

    /// Clears a connection's seat binding (leave, kick, room teardown).
    pub(crate) async fn clear_binding(&self, conn_id: ConnectionId) {
        if let Some(entry) = self.inner.lock().await.clients.get_mut(&conn_id) {
            entry.player_id = None;
            entry.room_code = None;
            entry.name = None;
        }
    }

    /// Clears the binding of whichever connection is seated as `player`
    /// in `room` (the kick path). Returns its session id so the caller
    /// can drop the session binding too.
    pub(crate) async fn clear_player_binding(
        &self,
        room: &RoomCode,
        player: &PlayerId,
    ) -> Option<SessionId> {
        let mut inner = self.inner.lock().await;
        let entry = inner.clients.values_mut().find(|e| {
            e.room_code.as_ref() == Some(room) && e.player_id.as_ref() == Some(player)
        })?;
        entry.player_id = None;
        entry.room_code = None;
        entry.name = None;
        Some(entry.session_id.clone())
    }

    /// Clears every binding pointing at `room` (disband). Returns the
    /// affected session ids.
    pub(crate) async fn clear_room_bindings(
        &self,
        room: &RoomCode,
    ) -> Vec<SessionId> {
        let mut inner = self.inner.lock().await;
        let mut cleared = Vec::new();
        for entry in inner.clients.values_mut() {
            if entry.room_code.as_ref() == Some(room) {
                entry.player_id = None;
                entry.room_code = None;
                entry.name = None;
                cleared.push(entry.session_id.clone());
            }
        }
        cleared
    }

    /// The current binding of a connection.
    pub(crate) async fn binding(
        &self,
        conn_id: ConnectionId,
    ) -> Option<ClientBinding> {
        let inner = self.inner.lock().await;
        let entry = inner.clients.get(&conn_id)?;
        Some(ClientBinding {
            session_id: entry.session_id.clone(),
            player_id: entry.player_id.clone(),
            room_code: entry.room_code.clone(),
        })
    }

    // -- Delivery ----------------------------------------------------------

    /// Sends to one connection. Drops the frame if the queue is full.
    pub(crate) async fn send_to_conn(
        &self,
        conn_id: ConnectionId,
        message: &ServerMessage,
    ) {
        let Some(bytes) = self.encode(message) else { return };
        let inner = self.inner.lock().await;
        if let Some(entry) = inner.clients.get(&conn_id) {
            deliver(&entry.sender, bytes, conn_id);
        }
    }

    /// Delivers to every connection seated in `room`. Non-blocking per
    /// recipient: a full queue drops that recipient's copy rather than
    /// stalling the broadcaster.
    pub(crate) async fn broadcast_to_room(
        &self,
        room: &RoomCode,
        message: &ServerMessage,
    ) {
        self.broadcast_filtered(room, None, message).await;
    }

    /// Same delivery semantics, skipping one connection (usually the
    /// originator, who got a direct response instead).
    pub(crate) async fn broadcast_to_room_except(
        &self,
        room: &RoomCode,
        except: ConnectionId,
        message: &ServerMessage,
    ) {
        self.broadcast_filtered(room, Some(except), message).await;
    }

    async fn broadcast_filtered(
        &self,
        room: &RoomCode,
        except: Option<ConnectionId>,
        message: &ServerMessage,
    ) {
        let Some(bytes) = self.encode(message) else { return };
        let inner = self.inner.lock().await;
        for (conn_id, entry) in &inner.clients {
            if entry.room_code.as_ref() != Some(room) {
                continue;
            }
            if Some(*conn_id) == except {
                continue;
            }
            deliver(&entry.sender, bytes.clone(), *conn_id);
        }
    }

    fn encode(&self, message: &ServerMessage) -> Option<Vec<u8>> {
        let envelope = ServerEnvelope::new(message.clone());
        match self.codec.encode(&envelope) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::error!(error = %e, "failed to encode server message");
                None
            }
        }
    }

    // -- Introspection -----------------------------------------------------

    /// Number of live connections.
    pub async fn client_count(&self) -> usize {
        self.inner.lock().await.clients.len()
    }

    /// Read-only dump of all connections, for operational visibility.
    pub async fn debug_clients(&self) -> Vec<ClientDebug> {
        let inner = self.inner.lock().await;
        inner
            .clients
            .values()
            .map(|e| ClientDebug {
                session_id: e.session_id.clone(),
                player_id: e.player_id.clone(),
                player_name: e.name.clone(),
                room_code: e.room_code.clone(),
            })
            .collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Queues one frame, dropping on backpressure.
fn deliver(sender: &mpsc::Sender<Vec<u8>>, bytes: Vec<u8>, conn_id: ConnectionId) {
    match sender.try_send(bytes) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(_)) => {
            tracing::warn!(%conn_id, "outbound buffer full, dropping frame");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {}
    }
}

/// A connection as seen by the debug interface.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDebug {
    pub session_id: SessionId,
    pub player_id: Option<PlayerId>,
    pub player_name: Option<String>,
    pub room_code: Option<RoomCode>,
}

// =========================================================================
// Tests
// =========================================================================
