//! A single room: roster, host, settings, status, and the active game.

use pounce_game::Game;
use pounce_protocol::{PlayerId, PlayerInfo, RoomCode, RoomSnapshot, RoomStatus};
use pounce_session::generate_token;

use crate::{RoomError, RoomSettings};

/// A player's seat in a room.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    /// Cleared on stream close, restored on reconnection.
    pub is_connected: bool,
    /// Dense seat index, reindexed on departure.
    pub position: usize,
}

impl Player {
    /// The wire view, with the card count supplied by the caller (only
    /// the game knows it).
    pub fn info(&self, card_count: usize) -> PlayerInfo {
        PlayerInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            card_count,
            is_host: self.is_host,
            is_connected: self.is_connected,
            position: self.position,
        }
    }
}

/// One room. Invariant: exactly one player has `is_host == true` while
/// the roster is non-empty, and `host_id` names that player.
///
/// Not internally synchronized — the manager wraps each room in its own
/// lock, which is the per-room serialization point for everything
/// including game arbitration.
pub struct Room {
    pub code: RoomCode,
    /// Seats, ordered by position (dense from 0).
    players: Vec<Player>,
    pub settings: RoomSettings,
    pub status: RoomStatus,
    pub host_id: PlayerId,
    pub game: Option<Game>,
}

impl Room {
    /// Creates a room in `Waiting` status with the creator seated as
    /// host. Returns the room and the host's player id.
    pub fn new(code: RoomCode, host_name: impl Into<String>) -> (Self, PlayerId) {
        let host_id = PlayerId::new(generate_token());
        let host = Player {
            id: host_id.clone(),
            name: host_name.into(),
            is_host: true,
            is_connected: true,
            position: 0,
        };
        let room = Self {
            code,
            players: vec![host],
            settings: RoomSettings::default(),
            status: RoomStatus::Waiting,
            host_id: host_id.clone(),
            game: None,
        };
        (room, host_id)
    }

    // -- Roster ------------------------------------------------------------

    /// Seats a new player at the next free position.
    pub fn add_player(&mut self, name: impl Into<String>) -> Result<&Player, RoomError> {
        if self.is_full() {
            return Err(RoomError::RoomFull(self.code.clone()));
        }
        let player = Player {
            id: PlayerId::new(generate_token()),
            name: name.into(),
            is_host: false,
            is_connected: true,
            position: self.players.len(),
        };
        self.players.push(player);
        Ok(self.players.last().expect("just pushed"))
    }

    /// Removes a player, reassigns the host if needed, and reindexes
    /// positions to stay dense from 0.
    ///
    /// Host reassignment picks any remaining *connected* player. This is
    /// the lobby rule; an in-game host departure disbands the room at the
    /// layer above instead of ever reaching here as a reassignment.
    pub fn remove_player(&mut self, player_id: &PlayerId) -> Option<Player> {
        let idx = self.players.iter().position(|p| &p.id == player_id)?;
        let removed = self.players.remove(idx);

        if removed.is_host && !self.players.is_empty() {
            // Prefer a connected heir; fall back to seat order.
            let idx = self
                .players
                .iter()
                .position(|p| p.is_connected)
                .unwrap_or(0);
            let host = &mut self.players[idx];
            host.is_host = true;
            self.host_id = host.id.clone();
            tracing::info!(
                room_code = %self.code,
                new_host = %self.host_id,
                "host reassigned"
            );
        }

        for (pos, player) in self.players.iter_mut().enumerate() {
            player.position = pos;
        }
        Some(removed)
    }

    pub fn player(&self, player_id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == player_id)
    }

    pub fn player_mut(&mut self, player_id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| &p.id == player_id)
    }

    /// Flips a player's connected flag. Unknown ids are ignored.
    pub fn set_connected(&mut self, player_id: &PlayerId, connected: bool) {
        if let Some(player) = self.player_mut(player_id) {
            player.is_connected = connected;
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn connected_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_connected).count()
    }

    /// Ids of connected players, in seat order. This is the turn order a
    /// game is dealt with.
    pub fn connected_player_ids(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.is_connected)
            .map(|p| p.id.clone())
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.settings.max_players
    }

    /// A room with no *connected* players is empty — disconnected seats
    /// waiting on reconnection don't keep it alive by themselves.
    pub fn is_empty(&self) -> bool {
        self.connected_count() == 0
    }

    pub fn host_name(&self) -> &str {
        self.player(&self.host_id).map_or("", |p| p.name.as_str())
    }

    // -- Game --------------------------------------------------------------

    /// Deals a new game over the currently connected players and moves to
    /// `Playing`.
    pub fn start_game(&mut self) {
        let player_ids = self.connected_player_ids();
        self.game = Some(Game::deal(&player_ids, self.settings.game_config()));
        self.status = RoomStatus::Playing;
        tracing::info!(
            room_code = %self.code,
            players = player_ids.len(),
            "game started"
        );
    }

    /// Tears down the game and returns to the lobby. Dropping the game
    /// cancels its armed turn timer.
    pub fn end_game(&mut self) {
        self.game = None;
        self.status = RoomStatus::Waiting;
    }

    // -- Views -------------------------------------------------------------

    /// The full wire snapshot, card counts filled in from the live game.
    pub fn snapshot(&self) -> RoomSnapshot {
        let players = self
            .players
            .iter()
            .map(|p| {
                let count = self
                    .game
                    .as_ref()
                    .map_or(0, |g| g.player_card_count(&p.id));
                p.info(count)
            })
            .collect();
        RoomSnapshot {
            code: self.code.clone(),
            players,
            settings: self.settings.payload(),
            status: self.status,
            host_id: self.host_id.clone(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
