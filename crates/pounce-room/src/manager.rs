//! Room manager: the process-wide room map and everything around it.
//!
//! Lock layout: the code → room map sits behind one mutex, and every room
//! behind its own. Operations lock the map only long enough to find or
//! mutate the entry, so two rooms' games never contend. Lock order is
//! always map → room, never the reverse.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use pounce_protocol::{
    PlayerId, PlayerInfo, RoomCode, RoomListing, RoomStatus, SessionId,
};
use pounce_session::{
    KeyValueStore, SessionBinding, SessionConfig, SessionManager,
};
use rand::Rng;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::{Room, RoomError};

/// Unambiguous room-code alphabet: no 0/O, 1/I lookalikes.
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const ROOM_CODE_LENGTH: usize = 4;
/// Attempts against the live code set before giving up.
const ROOM_CODE_ATTEMPTS: usize = 100;

/// Mirrored room snapshots outlive any plausible game.
const ROOM_TTL: Duration = Duration::from_secs(2 * 60 * 60);
/// How often the idle sweep runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// A room behind its own lock, shareable across tasks.
pub type SharedRoom = Arc<Mutex<Room>>;

fn room_store_key(code: &RoomCode) -> String {
    format!("room:{code}")
}

/// Creates, tracks, and destroys rooms; owns session bindings and the
/// best-effort store mirror.
pub struct RoomManager<S: KeyValueStore> {
    rooms: Mutex<HashMap<RoomCode, SharedRoom>>,
    sessions: Mutex<SessionManager<S>>,
    store: Option<Arc<S>>,
}

impl<S: KeyValueStore> RoomManager<S> {
    pub fn new(session_config: SessionConfig, store: Option<Arc<S>>) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            sessions: Mutex::new(SessionManager::new(
                session_config,
                store.clone(),
            )),
            store,
        }
    }

    // -- Creation & lookup -------------------------------------------------

    /// Creates a room with the given host and returns its handle.
    pub async fn create_room(
        &self,
        host_name: impl Into<String>,
    ) -> Result<(RoomCode, SharedRoom, PlayerId), RoomError> {
        let mut rooms = self.rooms.lock().await;
        let code = generate_room_code(&rooms)?;

        let (room, host_id) = Room::new(code.clone(), host_name);
        let shared = Arc::new(Mutex::new(room));
        rooms.insert(code.clone(), Arc::clone(&shared));
        drop(rooms);

        tracing::info!(room_code = %code, "room created");
        self.mirror_room(&*shared.lock().await).await;
        Ok((code, shared, host_id))
    }

    /// Looks up a room by code.
    pub async fn get(&self, code: &RoomCode) -> Option<SharedRoom> {
        self.rooms.lock().await.get(code).cloned()
    }

    /// Seats a player in a waiting, non-full room.
    pub async fn join_room(
        &self,
        code: &RoomCode,
        player_name: impl Into<String>,
    ) -> Result<(SharedRoom, PlayerId, PlayerInfo), RoomError> {
        let shared = self
            .get(code)
            .await
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        let (player_id, info) = {
            let mut room = shared.lock().await;
            if !room.status.is_joinable() {
                return Err(RoomError::GameInProgress);
            }
            let player = room.add_player(player_name)?;
            let player_id = player.id.clone();
            let info = player.info(0);
            tracing::info!(
                room_code = %code,
                %player_id,
                players = room.players().len(),
                "player joined"
            );
            self.mirror_room(&room).await;
            (player_id, info)
        };

        Ok((shared, player_id, info))
    }

    /// Removes a player. Deletes the room once no connected players
    /// remain. Returns `true` if the room was deleted.
    pub async fn leave_room(
        &self,
        code: &RoomCode,
        player_id: &PlayerId,
    ) -> Result<bool, RoomError> {
        let shared = self
            .get(code)
            .await
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        let now_empty = {
            let mut room = shared.lock().await;
            room.remove_player(player_id)
                .ok_or_else(|| RoomError::PlayerNotFound(player_id.clone()))?;
            tracing::info!(room_code = %code, %player_id, "player left");
            if room.is_empty() {
                true
            } else {
                self.mirror_room(&room).await;
                false
            }
        };

        if now_empty {
            self.delete_room(code).await;
        }
        Ok(now_empty)
    }

    /// Removes a room outright (host gone mid-game, internal invariant
    /// failure). Returns the handle so the caller can notify remaining
    /// players. Sessions pointing at the room are dropped.
    pub async fn disband(&self, code: &RoomCode) -> Option<SharedRoom> {
        let shared = self.rooms.lock().await.remove(code)?;
        self.sessions.lock().await.remove_room(code).await;
        if let Some(store) = &self.store {
            if let Err(e) = store.delete(&room_store_key(code)).await {
                tracing::warn!(room_code = %code, error = %e, "room mirror delete failed");
            }
        }
        tracing::info!(room_code = %code, "room disbanded");
        Some(shared)
    }

    async fn delete_room(&self, code: &RoomCode) {
        if self.disband(code).await.is_some() {
            tracing::info!(room_code = %code, "room deleted (no connected players)");
        }
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }

    // -- Session bindings --------------------------------------------------

    /// Binds a session token to (player, room) for reconnection.
    pub async fn save_session(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
        room_code: RoomCode,
    ) {
        self.sessions
            .lock()
            .await
            .save(session_id, player_id, room_code)
            .await;
    }

    /// Fetches a live session binding, refreshing its TTL.
    pub async fn get_session(&self, session_id: &SessionId) -> Option<SessionBinding> {
        self.sessions.lock().await.get(session_id).await
    }

    /// Drops a session binding (explicit leave or kick).
    pub async fn remove_session(&self, session_id: &SessionId) {
        self.sessions.lock().await.remove(session_id).await;
    }

    // -- Discovery & introspection -----------------------------------------

    /// Joinable rooms for the lobby UI: waiting status with free seats.
    pub async fn joinable_rooms(&self) -> Vec<RoomListing> {
        let rooms: Vec<SharedRoom> =
            self.rooms.lock().await.values().cloned().collect();

        let mut listings = Vec::new();
        for shared in rooms {
            let room = shared.lock().await;
            if room.status.is_joinable() && !room.is_full() {
                listings.push(RoomListing {
                    code: room.code.clone(),
                    player_count: room.connected_count(),
                    max_players: room.settings.max_players,
                    status: room.status,
                    host_name: room.host_name().to_string(),
                });
            }
        }
        listings
    }

    /// Read-only dump of every room, for operational visibility only.
    pub async fn debug_rooms(&self) -> Vec<RoomDebug> {
        let rooms: Vec<SharedRoom> =
            self.rooms.lock().await.values().cloned().collect();

        let mut out = Vec::with_capacity(rooms.len());
        for shared in rooms {
            let room = shared.lock().await;
            let players = room
                .players()
                .iter()
                .map(|p| PlayerDebug {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    card_count: room
                        .game
                        .as_ref()
                        .map_or(0, |g| g.player_card_count(&p.id)),
                    is_host: p.is_host,
                    is_connected: p.is_connected,
                })
                .collect();
            out.push(RoomDebug {
                code: room.code.clone(),
                status: room.status,
                host_id: room.host_id.clone(),
                players,
                has_game: room.game.is_some(),
            });
        }
        out
    }

    // -- Cleanup -----------------------------------------------------------

    /// One sweep pass: deletes rooms with no connected players or in
    /// `Finished` status, and purges expired session bindings. Covers
    /// abrupt network loss that never produced a clean disconnect.
    pub async fn sweep_idle(&self) -> usize {
        let candidates: Vec<(RoomCode, SharedRoom)> = self
            .rooms
            .lock()
            .await
            .iter()
            .map(|(c, r)| (c.clone(), Arc::clone(r)))
            .collect();

        let mut removed = 0;
        for (code, shared) in candidates {
            let doomed = {
                let room = shared.lock().await;
                room.is_empty() || room.status == RoomStatus::Finished
            };
            if doomed && self.disband(&code).await.is_some() {
                tracing::info!(room_code = %code, "room swept");
                removed += 1;
            }
        }

        let purged = self.sessions.lock().await.purge_expired();
        if purged > 0 {
            tracing::debug!(purged, "expired sessions purged");
        }
        removed
    }

    /// Spawns the periodic idle sweep. The returned handle owns the task;
    /// abort it (or drop the runtime) to stop sweeping.
    pub fn spawn_sweeper(
        manager: Arc<Self>,
        interval: Duration,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                manager.sweep_idle().await;
            }
        })
    }

    // -- Store mirroring ---------------------------------------------------

    /// Mirrors a room snapshot to the external store, best-effort.
    pub async fn mirror_room(&self, room: &Room) {
        let Some(store) = &self.store else { return };
        let bytes = match serde_json::to_vec(&room.snapshot()) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize room for mirror");
                return;
            }
        };
        if let Err(e) = store.put(&room_store_key(&room.code), bytes, ROOM_TTL).await {
            tracing::warn!(room_code = %room.code, error = %e, "room mirror write failed");
        }
    }
}

/// Samples codes from the unambiguous alphabet until one misses the live
/// set, up to a bounded attempt count.
fn generate_room_code(
    live: &HashMap<RoomCode, SharedRoom>,
) -> Result<RoomCode, RoomError> {
    let mut rng = rand::rng();
    for _ in 0..ROOM_CODE_ATTEMPTS {
        let code: String = (0..ROOM_CODE_LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..ROOM_CODE_ALPHABET.len());
                ROOM_CODE_ALPHABET[idx] as char
            })
            .collect();
        let code = RoomCode::new(code);
        if !live.contains_key(&code) {
            return Ok(code);
        }
    }
    Err(RoomError::CodeGeneration)
}

// ---------------------------------------------------------------------------
// Debug views
// ---------------------------------------------------------------------------

/// A player as seen by the debug interface.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDebug {
    pub id: PlayerId,
    pub name: String,
    pub card_count: usize,
    pub is_host: bool,
    pub is_connected: bool,
}

/// A room as seen by the debug interface.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDebug {
    pub code: RoomCode,
    pub status: RoomStatus,
    pub host_id: PlayerId,
    pub players: Vec<PlayerDebug>,
    pub has_game: bool,
}

// =========================================================================
// Tests
// =========================================================================
