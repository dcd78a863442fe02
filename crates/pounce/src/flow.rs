//! Game flow driving: the start countdown, turn timers, and the
//! elimination/victory sweep.
//!
//! Everything here runs with the room lock held (or takes it itself for
//! timer firings), and broadcasts through the registry while holding it —
//! lock order is always room → registry, which is consistent with the
//! handler and therefore cycle-free.

use std::sync::Arc;
use std::time::Duration;

use pounce_game::TimerHandle;
use pounce_protocol::{RoomCode, RoomStatus, ServerMessage};
use pounce_room::Room;
use pounce_session::KeyValueStore;
use tokio::time::sleep;

use crate::server::ServerState;

/// The warning fires this long before the turn timeout.
const TURN_WARNING_LEAD: Duration = Duration::from_secs(3);

/// Countdown ticks, descending.
const COUNTDOWN_START: u32 = 3;

// ---------------------------------------------------------------------------
// Start countdown
// ---------------------------------------------------------------------------

/// Runs the 3→1 start countdown, then deals the game.
///
/// The room was already moved to `Starting` by the caller, so no joins
/// can race in. The room may be disbanded mid-countdown (host vanished),
/// so existence is re-checked before every emission; the deal itself
/// additionally re-checks the status, which makes a replayed countdown a
/// no-op.
pub(crate) fn spawn_countdown<S: KeyValueStore>(
    state: Arc<ServerState<S>>,
    code: RoomCode,
) {
    tokio::spawn(async move {
        for tick in (1..=COUNTDOWN_START).rev() {
            if state.rooms.get(&code).await.is_none() {
                tracing::debug!(room_code = %code, "room vanished mid-countdown");
                return;
            }
            state
                .registry
                .broadcast_to_room(
                    &code,
                    &ServerMessage::GameStarting { countdown: tick },
                )
                .await;
            sleep(Duration::from_secs(1)).await;
        }

        let Some(shared) = state.rooms.get(&code).await else {
            return;
        };
        let mut room = shared.lock().await;
        if room.status != RoomStatus::Starting {
            // A disband/end-game raced us; nothing to deal.
            return;
        }

        room.start_game();
        state.rooms.mirror_room(&room).await;

        let game = room.game.as_ref().expect("just dealt");
        let snapshot = game.snapshot();
        let counts = game.card_counts();
        let first = game.current_player().clone();

        state
            .registry
            .broadcast_to_room(&code, &ServerMessage::GameStarted { game_state: snapshot })
            .await;
        state
            .registry
            .broadcast_to_room(&code, &ServerMessage::CardsDealt { player_cards: counts })
            .await;
        state
            .registry
            .broadcast_to_room(
                &code,
                &ServerMessage::TurnChanged { current_player_id: first },
            )
            .await;

        arm_turn_timer(&state, &code, &mut room);
    });
}

// ---------------------------------------------------------------------------
// Turn timer
// ---------------------------------------------------------------------------

/// Arms the turn timeout/warning pair for the current player, cancelling
/// any predecessor (the game stores at most one handle).
pub(crate) fn arm_turn_timer<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    code: &RoomCode,
    room: &mut Room,
) {
    let Some(game) = room.game.as_mut() else { return };
    let timeout = game.config().turn_timeout;

    let (handle, mut signal) = TimerHandle::pair();
    game.arm_turn_timer(handle);

    let state = Arc::clone(state);
    let code = code.clone();
    tokio::spawn(async move {
        let lead = timeout.saturating_sub(TURN_WARNING_LEAD);
        tokio::select! {
            _ = signal.cancelled() => return,
            _ = sleep(lead) => {}
        }
        state
            .registry
            .broadcast_to_room(
                &code,
                &ServerMessage::TurnWarning {
                    seconds_remaining: TURN_WARNING_LEAD.as_secs() as u32,
                },
            )
            .await;
        tokio::select! {
            _ = signal.cancelled() => return,
            _ = sleep(timeout - lead) => {}
        }

        let Some(shared) = state.rooms.get(&code).await else {
            return;
        };
        let mut room = shared.lock().await;
        // A play may have squeaked in while we waited for the lock; it
        // cancelled us, so stand down.
        if signal.is_cancelled() {
            return;
        }
        fire_turn_timeout(&state, &code, &mut room).await;
    });
}

/// The timeout path: auto-plays the current player's front card, exactly
/// like a manual play, then re-arms for the next player.
async fn fire_turn_timeout<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    code: &RoomCode,
    room: &mut Room,
) {
    let Some(game) = room.game.as_mut() else { return };
    let Some((player_id, card)) = game.auto_play() else {
        // Current player has no cards; the winner sweep owns this state.
        return;
    };
    let pile_count = game.pile_len();
    let next = game.current_player().clone();
    tracing::debug!(room_code = %code, %player_id, "turn timed out, card auto-played");

    state
        .registry
        .broadcast_to_room(
            code,
            &ServerMessage::CardPlayed {
                player_id,
                card,
                pile_count,
            },
        )
        .await;
    state
        .registry
        .broadcast_to_room(
            code,
            &ServerMessage::TurnChanged { current_player_id: next },
        )
        .await;

    let finished = sweep_outcomes(state, code, room).await;
    if !finished {
        arm_turn_timer(state, code, room);
    }
}

// ---------------------------------------------------------------------------
// Elimination & victory sweep
// ---------------------------------------------------------------------------

/// Re-checks eliminations and victory after a pile mutation (play, slap
/// resolution, burn, auto-play). Returns `true` when the game just
/// ended — the caller must not re-arm timers past that point.
pub(crate) async fn sweep_outcomes<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    code: &RoomCode,
    room: &mut Room,
) -> bool {
    let (eliminated, winner, stats) = {
        let Some(game) = room.game.as_mut() else {
            return true;
        };
        let eliminated = game.newly_eliminated();
        let winner = game.winner().cloned();
        let stats = if winner.is_some() {
            game.disarm_turn_timer();
            Some(game.stats())
        } else {
            None
        };
        (eliminated, winner, stats)
    };

    for player_id in eliminated {
        state
            .registry
            .broadcast_to_room(code, &ServerMessage::PlayerEliminated { player_id })
            .await;
    }

    let Some(winner_id) = winner else {
        return false;
    };
    let winner_name = room
        .player(&winner_id)
        .map(|p| p.name.clone())
        .unwrap_or_default();
    room.status = RoomStatus::Finished;
    tracing::info!(room_code = %code, %winner_id, "game over");

    state
        .registry
        .broadcast_to_room(
            code,
            &ServerMessage::GameOver {
                winner_id,
                winner_name,
                stats: stats.expect("stats captured with winner"),
            },
        )
        .await;
    state.rooms.mirror_room(room).await;
    true
}
