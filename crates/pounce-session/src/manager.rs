//! The session manager: the authoritative token → (player, room) map.
//!
//! # Concurrency note
//!
//! `SessionManager` is not thread-safe by itself — it's a plain `HashMap`
//! owned by the room manager and accessed under its lock. Keeping it
//! simple here avoids a second layer of locking.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use pounce_protocol::{PlayerId, RoomCode, SessionId};

use crate::{KeyValueStore, SessionBinding, SessionConfig};

/// Key prefix for mirrored sessions in the external store.
fn store_key(session_id: &SessionId) -> String {
    format!("session:{session_id}")
}

/// Tracks every live session binding, with best-effort mirroring to an
/// optional external store.
///
/// ```text
/// save() ──→ [bound] ──(reconnect)──→ get() refreshes TTL
///               │
///               ├──(leave/kick)──→ remove()
///               └──(TTL elapses)──→ expired: get() = None, purged by sweep
/// ```
pub struct SessionManager<S: KeyValueStore> {
    sessions: HashMap<SessionId, SessionBinding>,
    config: SessionConfig,
    store: Option<Arc<S>>,
}

impl<S: KeyValueStore> SessionManager<S> {
    /// Creates a new, empty session manager.
    pub fn new(config: SessionConfig, store: Option<Arc<S>>) -> Self {
        Self {
            sessions: HashMap::new(),
            config,
            store,
        }
    }

    /// Binds a session token to a (player, room) pair.
    ///
    /// Called on room create and join. Overwrites any previous binding for
    /// the token — a client can only be seated in one room at a time.
    pub async fn save(
        &mut self,
        session_id: SessionId,
        player_id: PlayerId,
        room_code: RoomCode,
    ) {
        let binding = SessionBinding::new(
            player_id,
            room_code,
            self.config.session_ttl,
        );

        if let Some(store) = &self.store {
            mirror_put(store, &session_id, &binding, &self.config).await;
        }

        tracing::debug!(
            %session_id,
            player_id = %binding.player_id,
            room_code = %binding.room_code,
            "session saved"
        );
        self.sessions.insert(session_id, binding);
    }

    /// Looks up a live binding, refreshing its TTL on hit.
    ///
    /// An expired binding reads as absent and is dropped on the spot.
    pub async fn get(&mut self, session_id: &SessionId) -> Option<SessionBinding> {
        let binding = self.sessions.get_mut(session_id)?;
        if binding.is_expired() {
            self.sessions.remove(session_id);
            if let Some(store) = &self.store {
                mirror_delete(store, session_id).await;
            }
            return None;
        }

        // Reconnection refreshes the window.
        binding.expires_at = Instant::now() + self.config.session_ttl;
        let refreshed = binding.clone();
        if let Some(store) = &self.store {
            mirror_put(store, session_id, &refreshed, &self.config).await;
        }
        Some(refreshed)
    }

    /// Drops a binding (explicit leave, kick, or room teardown).
    pub async fn remove(&mut self, session_id: &SessionId) {
        if self.sessions.remove(session_id).is_some() {
            tracing::debug!(%session_id, "session removed");
        }
        if let Some(store) = &self.store {
            mirror_delete(store, session_id).await;
        }
    }

    /// Removes every binding pointing at `room_code` (room teardown).
    pub async fn remove_room(&mut self, room_code: &RoomCode) {
        let doomed: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|(_, b)| &b.room_code == room_code)
            .map(|(id, _)| id.clone())
            .collect();
        for id in doomed {
            self.remove(&id).await;
        }
    }

    /// Sweeps out expired bindings. Returns how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, b| !b.is_expired());
        before - self.sessions.len()
    }

    /// Number of live bindings (including any not yet purged).
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Mirrors a binding to the store. Failures are logged and swallowed —
/// the in-memory map stays authoritative.
async fn mirror_put<S: KeyValueStore>(
    store: &Arc<S>,
    session_id: &SessionId,
    binding: &SessionBinding,
    config: &SessionConfig,
) {
    let bytes = match serde_json::to_vec(binding) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize session for mirror");
            return;
        }
    };
    if let Err(e) = store
        .put(&store_key(session_id), bytes, config.session_ttl)
        .await
    {
        tracing::warn!(%session_id, error = %e, "session mirror write failed");
    }
}

async fn mirror_delete<S: KeyValueStore>(store: &Arc<S>, session_id: &SessionId) {
    if let Err(e) = store.delete(&store_key(session_id)).await {
        tracing::warn!(%session_id, error = %e, "session mirror delete failed");
    }
}

// =========================================================================
// Tests
// =========================================================================
