//! Integration tests driving rooms and games together through the
//! manager, the way the server does it.

use std::sync::Arc;
use std::time::Instant;

use pounce_protocol::{RoomStatus, SessionId};
use pounce_room::{RoomManager, SharedRoom};
use pounce_session::{MemoryStore, SessionConfig};

fn manager() -> RoomManager<MemoryStore> {
    RoomManager::new(SessionConfig::default(), Some(Arc::new(MemoryStore::new())))
}

/// Creates a room with `extra` additional players and starts the game.
/// The slap cooldown is zeroed so rapid scripted slaps are judged on
/// their merits instead of all landing in the cooldown window.
async fn playing_room(
    mgr: &RoomManager<MemoryStore>,
    extra: usize,
) -> SharedRoom {
    let (code, shared, _) = mgr.create_room("ada").await.unwrap();
    for i in 0..extra {
        mgr.join_room(&code, format!("player-{i}")).await.unwrap();
    }
    let mut room = shared.lock().await;
    room.settings.slap_cooldown_ms = 0;
    room.start_game();
    drop(room);
    shared
}

#[tokio::test]
async fn test_card_conservation_across_a_long_mixed_session() {
    let mgr = manager();
    let shared = playing_room(&mgr, 3).await;
    let mut room = shared.lock().await;
    let players = room.connected_player_ids();

    // Hundreds of plays and slaps from every seat; the 52-card multiset
    // must never leak, whatever succeeds or fails.
    for i in 0..300 {
        let game = room.game.as_mut().unwrap();
        let current = game.current_player().clone();
        let _ = game.play_card(&current);
        let slapper = &players[i % players.len()];
        let _ = game.process_slap(slapper, Instant::now());
        assert_eq!(game.total_cards(), 52, "iteration {i}");
        let _ = game.newly_eliminated();
        if game.winner().is_some() {
            break;
        }
    }
}

#[tokio::test]
async fn test_out_of_turn_play_never_mutates_state() {
    let mgr = manager();
    let shared = playing_room(&mgr, 1).await;
    let mut room = shared.lock().await;
    let players = room.connected_player_ids();
    let game = room.game.as_mut().unwrap();

    let current = game.current_player().clone();
    let bystander = players.iter().find(|p| **p != current).unwrap().clone();
    let counts_before = game.card_counts();

    assert!(game.play_card(&bystander).is_err());
    assert_eq!(game.card_counts(), counts_before);
    assert_eq!(game.pile_len(), 0);
    assert_eq!(game.current_player(), &current);
}

#[tokio::test]
async fn test_slap_race_exactly_one_winner() {
    let mgr = manager();
    let shared = playing_room(&mgr, 1).await;
    let mut room = shared.lock().await;
    let players = room.connected_player_ids();

    // Play until the pile turns slappable, then have both players slap
    // "simultaneously" (the room lock has already serialized them).
    let game = room.game.as_mut().unwrap();
    for _ in 0..52 {
        let current = game.current_player().clone();
        if game.play_card(&current).is_err() {
            break;
        }

        let first = game.process_slap(&players[0], Instant::now());
        if first.success {
            // First attempt through took the whole pile; the loser is
            // judged against the already-cleared pile and cannot win.
            assert!(first.cards_won.is_some());
            assert_eq!(game.pile_len(), 0, "pile transferred whole");
            let second = game.process_slap(&players[1], Instant::now());
            assert!(!second.success, "later attempt sees post-win state");
            assert_eq!(game.total_cards(), 52);
            return;
        }
        let second = game.process_slap(&players[1], Instant::now());
        assert_eq!(game.total_cards(), 52);
        if second.success {
            assert_eq!(game.pile_len(), 0);
            return;
        }
    }
    // Statistically near-impossible to get here (a Jack always lands
    // eventually), but an exhausted deck is not a failure of the race
    // property this test is about.
}

#[tokio::test]
async fn test_finished_game_room_is_swept() {
    let mgr = manager();
    let shared = playing_room(&mgr, 1).await;
    let code = shared.lock().await.code.clone();
    shared.lock().await.status = RoomStatus::Finished;

    let removed = mgr.sweep_idle().await;
    assert_eq!(removed, 1);
    assert!(mgr.get(&code).await.is_none());
}

#[tokio::test]
async fn test_session_survives_disconnect_and_restores_seat() {
    let mgr = manager();
    let (code, shared, host_id) = mgr.create_room("ada").await.unwrap();
    mgr.save_session(SessionId::new("s1"), host_id.clone(), code.clone())
        .await;

    // Abrupt network loss: no leave, just the connected flag dropping.
    shared.lock().await.set_connected(&host_id, false);

    // Reconnection: the binding still resolves, and the seat is intact.
    let binding = mgr.get_session(&SessionId::new("s1")).await.unwrap();
    assert_eq!(binding.room_code, code);
    let room = mgr.get(&binding.room_code).await.unwrap();
    let mut room = room.lock().await;
    assert!(room.player(&binding.player_id).is_some());
    room.set_connected(&binding.player_id, true);
    assert_eq!(room.connected_count(), 1);
}

#[tokio::test]
async fn test_leaving_mid_game_keeps_the_game_consistent() {
    let mgr = manager();
    let (code, shared, _) = mgr.create_room("ada").await.unwrap();
    let (_, bo, _) = mgr.join_room(&code, "bo").await.unwrap();
    mgr.join_room(&code, "cy").await.unwrap();
    shared.lock().await.start_game();

    // bo walks out mid-game; the roster shrinks but the dealt cards
    // stay conserved (their hand is drained by turn timeouts in the
    // live server).
    let deleted = mgr.leave_room(&code, &bo).await.unwrap();
    assert!(!deleted);

    let room = shared.lock().await;
    assert!(room.player(&bo).is_none());
    assert_eq!(room.players().len(), 2);
    assert_eq!(room.game.as_ref().unwrap().total_cards(), 52);
}
