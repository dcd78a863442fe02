//! Room rule settings with range clamping.

use std::time::Duration;

use pounce_game::GameConfig;
use pounce_protocol::SettingsPayload;
use serde::{Deserialize, Serialize};

/// The configurable rules of a room.
///
/// Inbound updates go through [`RoomSettings::apply`], which clamps each
/// value to its legal range rather than rejecting the whole payload — a
/// client slider glitch shouldn't bounce an otherwise fine update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSettings {
    /// 2–8.
    pub max_players: usize,
    /// 0–1000 ms between one player's slap attempts.
    pub slap_cooldown_ms: u64,
    /// 5000–60000 ms before the current player's card is auto-played.
    pub turn_timeout_ms: u64,
    pub enable_doubles: bool,
    pub enable_sandwich: bool,
    /// 0–5 cards forfeited for a bad slap.
    pub burn_penalty: usize,
    pub enable_slap_in: bool,
    /// 1–10 re-entries per player.
    pub max_slap_ins: u32,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            max_players: 4,
            slap_cooldown_ms: 200,
            turn_timeout_ms: 10_000,
            enable_doubles: true,
            enable_sandwich: true,
            burn_penalty: 1,
            enable_slap_in: true,
            max_slap_ins: 3,
        }
    }
}

impl RoomSettings {
    /// Applies a settings payload, clamping every value into range.
    pub fn apply(&mut self, payload: SettingsPayload) {
        self.max_players = payload.max_players.clamp(2, 8);
        self.slap_cooldown_ms = payload.slap_cooldown_ms.min(1000);
        self.turn_timeout_ms = payload.turn_timeout_ms.clamp(5_000, 60_000);
        self.enable_doubles = payload.enable_doubles;
        self.enable_sandwich = payload.enable_sandwich;
        self.burn_penalty = payload.burn_penalty.min(5);
        self.enable_slap_in = payload.enable_slap_in;
        self.max_slap_ins = payload.max_slap_ins.clamp(1, 10);
    }

    /// The wire representation.
    pub fn payload(&self) -> SettingsPayload {
        SettingsPayload {
            max_players: self.max_players,
            slap_cooldown_ms: self.slap_cooldown_ms,
            turn_timeout_ms: self.turn_timeout_ms,
            enable_doubles: self.enable_doubles,
            enable_sandwich: self.enable_sandwich,
            burn_penalty: self.burn_penalty,
            enable_slap_in: self.enable_slap_in,
            max_slap_ins: self.max_slap_ins,
        }
    }

    /// Freezes these settings into a game configuration at deal time.
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            enable_doubles: self.enable_doubles,
            enable_sandwich: self.enable_sandwich,
            burn_penalty: self.burn_penalty,
            slap_cooldown: Duration::from_millis(self.slap_cooldown_ms),
            turn_timeout: Duration::from_millis(self.turn_timeout_ms),
            enable_slap_in: self.enable_slap_in,
            max_slap_ins: self.max_slap_ins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(settings: RoomSettings) -> SettingsPayload {
        settings.payload()
    }

    #[test]
    fn test_default_settings() {
        let s = RoomSettings::default();
        assert_eq!(s.max_players, 4);
        assert_eq!(s.slap_cooldown_ms, 200);
        assert_eq!(s.turn_timeout_ms, 10_000);
        assert!(s.enable_doubles);
        assert!(s.enable_sandwich);
        assert_eq!(s.burn_penalty, 1);
        assert!(s.enable_slap_in);
        assert_eq!(s.max_slap_ins, 3);
    }

    #[test]
    fn test_apply_in_range_values_pass_through() {
        let mut s = RoomSettings::default();
        s.apply(SettingsPayload {
            max_players: 6,
            slap_cooldown_ms: 500,
            turn_timeout_ms: 20_000,
            enable_doubles: false,
            enable_sandwich: false,
            burn_penalty: 3,
            enable_slap_in: false,
            max_slap_ins: 5,
        });

        assert_eq!(s.max_players, 6);
        assert_eq!(s.slap_cooldown_ms, 500);
        assert_eq!(s.turn_timeout_ms, 20_000);
        assert!(!s.enable_doubles);
        assert!(!s.enable_sandwich);
        assert_eq!(s.burn_penalty, 3);
        assert!(!s.enable_slap_in);
        assert_eq!(s.max_slap_ins, 5);
    }

    #[test]
    fn test_apply_clamps_out_of_range_values() {
        let mut s = RoomSettings::default();
        s.apply(SettingsPayload {
            max_players: 99,
            slap_cooldown_ms: 10_000,
            turn_timeout_ms: 1,
            enable_doubles: true,
            enable_sandwich: true,
            burn_penalty: 50,
            enable_slap_in: true,
            max_slap_ins: 0,
        });

        assert_eq!(s.max_players, 8);
        assert_eq!(s.slap_cooldown_ms, 1000);
        assert_eq!(s.turn_timeout_ms, 5_000);
        assert_eq!(s.burn_penalty, 5);
        assert_eq!(s.max_slap_ins, 1);
    }

    #[test]
    fn test_payload_round_trips_through_apply() {
        let original = RoomSettings::default();
        let mut other = RoomSettings::default();
        other.apply(payload(original));
        assert_eq!(original, other);
    }

    #[test]
    fn test_game_config_mirrors_settings() {
        let mut s = RoomSettings::default();
        s.slap_cooldown_ms = 300;
        s.turn_timeout_ms = 15_000;
        s.burn_penalty = 2;

        let config = s.game_config();
        assert_eq!(config.slap_cooldown, Duration::from_millis(300));
        assert_eq!(config.turn_timeout, Duration::from_millis(15_000));
        assert_eq!(config.burn_penalty, 2);
        assert!(config.enable_doubles);
    }
}
