//! Per-connection handling: session restore, the read/write loops, and
//! exhaustive dispatch of every client message.
//!
//! Each accepted connection gets one task running [`handle_connection`]
//! plus one write-loop task. The flow is:
//!
//!   1. Resolve the session id (fresh, or presented for reconnection)
//!   2. Register with the registry, start the write loop
//!   3. Emit `CONNECTED` (and `RECONNECTED` + room restore if bound)
//!   4. Loop: receive frames → split lines → decode → dispatch
//!   5. On stream close: unregister and run the room disconnect path
//!
//! Every client-triggered failure becomes one `ERROR` envelope to the
//! originator; nothing a client sends can take the room down with it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use pounce_game::GameError;
use pounce_protocol::{
    split_frames, ClientEnvelope, ClientMessage, Codec, JsonCodec, PlayerId,
    RoomCode, ServerMessage, SessionId, SettingsPayload,
};
use pounce_room::SharedRoom;
use pounce_session::{generate_token, KeyValueStore};
use pounce_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::flow;
use crate::registry::OUTBOUND_BUFFER;
use crate::server::ServerState;

/// Transport-level keep-alive ping period.
const KEEPALIVE_PERIOD: Duration = Duration::from_secs(30);

/// Display names are capped at this many characters.
const MAX_NAME_CHARS: usize = 20;

// ---------------------------------------------------------------------------
// Connection lifecycle
// ---------------------------------------------------------------------------

/// Handles one connection from accept to close.
pub(crate) async fn handle_connection<S: KeyValueStore>(
    conn: WebSocketConnection,
    state: Arc<ServerState<S>>,
) {
    let conn_id = conn.id();

    // The client may present a previous session token for reconnection.
    let presented = conn.query_param("sessionId").map(SessionId::new);
    let session_id = presented
        .clone()
        .unwrap_or_else(|| SessionId::new(generate_token()));
    tracing::debug!(%conn_id, %session_id, reconnecting = presented.is_some(), "client connected");

    let conn = Arc::new(conn);
    let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
    state.registry.register(conn_id, session_id.clone(), tx).await;
    let writer = tokio::spawn(write_loop(Arc::clone(&conn), rx));

    state
        .registry
        .send_to_conn(
            conn_id,
            &ServerMessage::Connected {
                session_id: session_id.clone(),
            },
        )
        .await;

    if presented.is_some() {
        try_restore_session(&state, conn_id, &session_id).await;
    }

    // -- Read loop --
    loop {
        let frame = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        // Frames may carry several newline-separated envelopes; each
        // line decodes independently.
        for line in split_frames(&frame) {
            let envelope: ClientEnvelope = match JsonCodec.decode(line) {
                Ok(env) => env,
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "malformed frame");
                    send_error(&state, conn_id, "PARSE_ERROR", "Invalid message format")
                        .await;
                    continue;
                }
            };
            dispatch(&state, conn_id, &session_id, envelope.message).await;
        }
    }

    // -- Disconnect path --
    if let Some(binding) = state.registry.unregister(conn_id).await {
        tracing::debug!(%conn_id, session_id = %binding.session_id, "client gone");
        if let (Some(player_id), Some(room_code)) =
            (binding.player_id, binding.room_code)
        {
            handle_disconnect(&state, &room_code, &player_id).await;
        }
    }
    // Dropping the registry entry closed the outbound queue; the write
    // loop drains, closes the socket, and exits on its own.
    let _ = writer.await;
}

/// Drains the outbound queue to the socket, coalescing whatever is ready
/// into one newline-separated frame, and pings on idle.
async fn write_loop(conn: Arc<WebSocketConnection>, mut rx: mpsc::Receiver<Vec<u8>>) {
    let mut keepalive = tokio::time::interval(KEEPALIVE_PERIOD);
    keepalive.tick().await; // immediate first tick

    loop {
        tokio::select! {
            queued = rx.recv() => {
                let Some(first) = queued else {
                    let _ = conn.close().await;
                    return;
                };
                let mut frames = vec![first];
                while let Ok(more) = rx.try_recv() {
                    frames.push(more);
                }
                let frame = pounce_protocol::join_frames(&frames);
                if conn.send(&frame).await.is_err() {
                    return;
                }
            }
            _ = keepalive.tick() => {
                if conn.ping().await.is_err() {
                    return;
                }
            }
        }
    }
}

/// Restores a presented session: reseat the player, mark them connected,
/// and hand them the full room snapshot.
async fn try_restore_session<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    conn_id: ConnectionId,
    session_id: &SessionId,
) {
    let Some(binding) = state.rooms.get_session(session_id).await else {
        return;
    };
    let Some(shared) = state.rooms.get(&binding.room_code).await else {
        return;
    };

    let mut room = shared.lock().await;
    let Some(player) = room.player(&binding.player_id) else {
        // Seat is gone (kicked, or roster rebuilt); treat as a fresh
        // connection.
        return;
    };
    let name = player.name.clone();
    room.set_connected(&binding.player_id, true);

    state
        .registry
        .bind(conn_id, binding.player_id.clone(), binding.room_code.clone(), name)
        .await;
    state
        .registry
        .send_to_conn(
            conn_id,
            &ServerMessage::Reconnected {
                room: room.snapshot(),
            },
        )
        .await;
    state
        .registry
        .broadcast_to_room_except(
            &binding.room_code,
            conn_id,
            &ServerMessage::PlayerReconnected {
                player_id: binding.player_id.clone(),
            },
        )
        .await;
    state
        .registry
        .broadcast_to_room_except(
            &binding.room_code,
            conn_id,
            &ServerMessage::RoomUpdated {
                room: room.snapshot(),
            },
        )
        .await;
    tracing::info!(room_code = %binding.room_code, player_id = %binding.player_id, "player reconnected");
}

/// Disbands a room outright and tells everyone it's gone.
async fn teardown_room<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    room_code: &RoomCode,
    reason: &str,
) {
    if state.rooms.disband(room_code).await.is_some() {
        state
            .registry
            .broadcast_to_room(
                room_code,
                &ServerMessage::RoomClosed {
                    reason: reason.to_string(),
                },
            )
            .await;
        state.registry.clear_room_bindings(room_code).await;
    }
}

/// The room-side consequences of a dropped stream. The session binding
/// is deliberately kept alive — reconnection within the TTL restores the
/// seat; the idle sweep reaps rooms nobody comes back to.
async fn handle_disconnect<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    room_code: &RoomCode,
    player_id: &PlayerId,
) {
    let Some(shared) = state.rooms.get(room_code).await else {
        return;
    };

    let (host_gone_mid_game, snapshot) = {
        let mut room = shared.lock().await;
        room.set_connected(player_id, false);
        let host_gone = &room.host_id == player_id && room.status.is_active();
        (host_gone, room.snapshot())
    };

    if host_gone_mid_game {
        // Host loss ends the game outright; no handoff once cards are in
        // the air. Lobby departures reassign instead (see Room).
        tracing::info!(room_code = %room_code, "host disconnected mid-game, disbanding room");
        teardown_room(state, room_code, "Host left").await;
        return;
    }

    state
        .registry
        .broadcast_to_room(room_code, &ServerMessage::RoomUpdated { room: snapshot })
        .await;
    tracing::debug!(room_code = %room_code, %player_id, "player disconnected");
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Routes one decoded client message. Exhaustive: a new message variant
/// fails compilation here until it's handled.
async fn dispatch<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    conn_id: ConnectionId,
    session_id: &SessionId,
    message: ClientMessage,
) {
    match message {
        ClientMessage::CreateRoom { player_name } => {
            handle_create_room(state, conn_id, session_id, player_name).await;
        }
        ClientMessage::JoinRoom {
            room_code,
            player_name,
        } => {
            handle_join_room(state, conn_id, session_id, room_code, player_name)
                .await;
        }
        ClientMessage::LeaveRoom => {
            handle_leave_room(state, conn_id, session_id).await;
        }
        ClientMessage::UpdateSettings(payload) => {
            handle_update_settings(state, conn_id, payload).await;
        }
        ClientMessage::ChangeName { new_name } => {
            handle_change_name(state, conn_id, new_name).await;
        }
        ClientMessage::StartGame => {
            handle_start_game(state, conn_id).await;
        }
        ClientMessage::PlayCard => {
            handle_play_card(state, conn_id).await;
        }
        ClientMessage::Slap { timestamp: _ } => {
            // The client clock rides along for diagnostics; arbitration
            // uses server arrival order under the room lock.
            handle_slap(state, conn_id).await;
        }
        ClientMessage::React { emoji } => {
            handle_react(state, conn_id, emoji).await;
        }
        ClientMessage::KickPlayer { player_id } => {
            handle_kick_player(state, conn_id, player_id).await;
        }
        ClientMessage::EndGame => {
            handle_end_game(state, conn_id).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Room membership
// ---------------------------------------------------------------------------

async fn handle_create_room<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    conn_id: ConnectionId,
    session_id: &SessionId,
    player_name: String,
) {
    if let Err(msg) = validate_name(&player_name) {
        send_error(state, conn_id, "INVALID_NAME", msg).await;
        return;
    }

    // A client opening a new room while seated elsewhere leaves first.
    if let Some((player_id, room_code)) = current_seat(state, conn_id).await {
        leave_and_notify(state, conn_id, session_id, &player_id, &room_code).await;
    }

    let (code, shared, host_id) = match state.rooms.create_room(&player_name).await
    {
        Ok(created) => created,
        Err(e) => {
            tracing::error!(error = %e, "room creation failed");
            send_error(state, conn_id, e.code(), &e.to_string()).await;
            return;
        }
    };

    state
        .registry
        .bind(conn_id, host_id.clone(), code.clone(), player_name.clone())
        .await;
    state
        .rooms
        .save_session(session_id.clone(), host_id, code.clone())
        .await;

    let snapshot = shared.lock().await.snapshot();
    state
        .registry
        .send_to_conn(
            conn_id,
            &ServerMessage::RoomCreated {
                room_code: code.clone(),
                room: snapshot,
            },
        )
        .await;
    tracing::info!(room_code = %code, host = %player_name, "room created by client");
}

async fn handle_join_room<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    conn_id: ConnectionId,
    session_id: &SessionId,
    room_code: String,
    player_name: String,
) {
    if room_code.is_empty() {
        send_error(state, conn_id, "INVALID_CODE", "Room code is required").await;
        return;
    }
    if let Err(msg) = validate_name(&player_name) {
        send_error(state, conn_id, "INVALID_NAME", msg).await;
        return;
    }
    let code = RoomCode::normalized(&room_code);

    if let Some((player_id, old_code)) = current_seat(state, conn_id).await {
        leave_and_notify(state, conn_id, session_id, &player_id, &old_code).await;
    }

    let (shared, player_id, info) =
        match state.rooms.join_room(&code, &player_name).await {
            Ok(joined) => joined,
            Err(e) => {
                send_error(state, conn_id, e.code(), &e.to_string()).await;
                return;
            }
        };

    state
        .registry
        .bind(conn_id, player_id.clone(), code.clone(), player_name)
        .await;
    state
        .rooms
        .save_session(session_id.clone(), player_id, code.clone())
        .await;

    let snapshot = shared.lock().await.snapshot();
    state
        .registry
        .send_to_conn(conn_id, &ServerMessage::RoomJoined { room: snapshot })
        .await;
    state
        .registry
        .broadcast_to_room_except(
            &code,
            conn_id,
            &ServerMessage::PlayerJoined { player: info },
        )
        .await;
}

async fn handle_leave_room<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    conn_id: ConnectionId,
    session_id: &SessionId,
) {
    let Some((player_id, room_code)) = require_seat(state, conn_id).await else {
        return;
    };
    leave_and_notify(state, conn_id, session_id, &player_id, &room_code).await;
}

/// Shared leave path: unseat, unbind, drop the session, tell the room.
async fn leave_and_notify<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    conn_id: ConnectionId,
    session_id: &SessionId,
    player_id: &PlayerId,
    room_code: &RoomCode,
) {
    let deleted = match state.rooms.leave_room(room_code, player_id).await {
        Ok(deleted) => deleted,
        Err(e) => {
            tracing::debug!(room_code = %room_code, error = %e, "leave failed");
            state.registry.clear_binding(conn_id).await;
            state.rooms.remove_session(session_id).await;
            return;
        }
    };

    state.registry.clear_binding(conn_id).await;
    state.rooms.remove_session(session_id).await;

    if !deleted {
        state
            .registry
            .broadcast_to_room(
                room_code,
                &ServerMessage::PlayerLeft {
                    player_id: player_id.clone(),
                },
            )
            .await;
        // Host may have been reassigned and positions reindexed.
        if let Some(shared) = state.rooms.get(room_code).await {
            let snapshot = shared.lock().await.snapshot();
            state
                .registry
                .broadcast_to_room(room_code, &ServerMessage::RoomUpdated { room: snapshot })
                .await;
        }
    }
}

// ---------------------------------------------------------------------------
// Lobby operations
// ---------------------------------------------------------------------------

async fn handle_update_settings<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    conn_id: ConnectionId,
    payload: SettingsPayload,
) {
    let Some((player_id, room_code, shared)) =
        require_seated_room(state, conn_id).await
    else {
        return;
    };

    let mut room = shared.lock().await;
    if room.host_id != player_id {
        send_error(state, conn_id, "NOT_HOST", "Only the host can change settings")
            .await;
        return;
    }
    if !room.status.is_joinable() {
        send_error(
            state,
            conn_id,
            "GAME_IN_PROGRESS",
            "Cannot change settings while game is in progress",
        )
        .await;
        return;
    }

    room.settings.apply(payload);
    state.rooms.mirror_room(&room).await;
    state
        .registry
        .broadcast_to_room(
            &room_code,
            &ServerMessage::SettingsChanged {
                settings: room.settings.payload(),
            },
        )
        .await;
    tracing::debug!(room_code = %room_code, "settings updated");
}

async fn handle_change_name<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    conn_id: ConnectionId,
    new_name: String,
) {
    if let Err(msg) = validate_name(&new_name) {
        send_error(state, conn_id, "INVALID_NAME", msg).await;
        return;
    }
    let Some((player_id, room_code, shared)) =
        require_seated_room(state, conn_id).await
    else {
        return;
    };

    let mut room = shared.lock().await;
    if !room.status.is_joinable() {
        send_error(
            state,
            conn_id,
            "GAME_IN_PROGRESS",
            "Cannot change name while game is in progress",
        )
        .await;
        return;
    }
    let Some(player) = room.player_mut(&player_id) else {
        send_error(state, conn_id, "PLAYER_NOT_FOUND", "Player not found").await;
        return;
    };
    player.name = new_name.clone();

    state
        .registry
        .bind(conn_id, player_id.clone(), room_code.clone(), new_name.clone())
        .await;
    state
        .registry
        .broadcast_to_room(
            &room_code,
            &ServerMessage::NameChanged {
                player_id,
                new_name,
            },
        )
        .await;
}

async fn handle_kick_player<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    conn_id: ConnectionId,
    target: PlayerId,
) {
    let Some((player_id, room_code, shared)) =
        require_seated_room(state, conn_id).await
    else {
        return;
    };

    let mut room = shared.lock().await;
    if room.host_id != player_id {
        send_error(state, conn_id, "NOT_HOST", "Only the host can kick players")
            .await;
        return;
    }
    if target == player_id {
        send_error(state, conn_id, "INVALID_KICK", "Cannot kick yourself").await;
        return;
    }
    let Some(player) = room.player(&target) else {
        send_error(state, conn_id, "PLAYER_NOT_FOUND", "Player not found").await;
        return;
    };
    let target_name = player.name.clone();

    room.remove_player(&target);
    state.rooms.mirror_room(&room).await;

    // The kicked client is still bound, so it hears this too.
    state
        .registry
        .broadcast_to_room(
            &room_code,
            &ServerMessage::PlayerKicked {
                player_id: target.clone(),
                player_name: target_name.clone(),
            },
        )
        .await;

    if let Some(kicked_session) = state
        .registry
        .clear_player_binding(&room_code, &target)
        .await
    {
        state.rooms.remove_session(&kicked_session).await;
    }

    state
        .registry
        .broadcast_to_room(
            &room_code,
            &ServerMessage::RoomUpdated {
                room: room.snapshot(),
            },
        )
        .await;
    tracing::info!(room_code = %room_code, player = %target_name, "player kicked by host");
}

// ---------------------------------------------------------------------------
// Game operations
// ---------------------------------------------------------------------------

async fn handle_start_game<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    conn_id: ConnectionId,
) {
    let Some((player_id, room_code, shared)) =
        require_seated_room(state, conn_id).await
    else {
        return;
    };

    {
        let mut room = shared.lock().await;
        if room.host_id != player_id {
            send_error(state, conn_id, "NOT_HOST", "Only the host can start the game")
                .await;
            return;
        }
        if !room.status.is_joinable() {
            send_error(
                state,
                conn_id,
                "GAME_IN_PROGRESS",
                "Game is already in progress",
            )
            .await;
            return;
        }
        if room.connected_count() < 2 {
            send_error(
                state,
                conn_id,
                "NOT_ENOUGH_PLAYERS",
                "Need at least 2 players to start",
            )
            .await;
            return;
        }
        // Freeze the lobby before the countdown's first suspension, so
        // no join can race the deal.
        room.status = pounce_protocol::RoomStatus::Starting;
    }

    flow::spawn_countdown(Arc::clone(state), room_code.clone());
    tracing::info!(room_code = %room_code, "game starting");
}

async fn handle_play_card<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    conn_id: ConnectionId,
) {
    let Some((player_id, room_code, shared)) =
        require_seated_room(state, conn_id).await
    else {
        return;
    };

    let mut room = shared.lock().await;
    let Some(game) = room.game.as_mut() else {
        send_error(state, conn_id, "NO_GAME", "Game has not started").await;
        return;
    };

    let (card, pile_count, next) = match game.play_card(&player_id) {
        Ok(card) => (card, game.pile_len(), game.current_player().clone()),
        Err(e @ GameError::UnknownPlayer(_)) => {
            // The roster and the dealt game disagree: an invariant
            // violation. Tear down this room rather than leave it in an
            // inconsistent state; everyone else is unaffected.
            tracing::error!(room_code = %room_code, error = %e, "game invariant violated, tearing down room");
            drop(room);
            teardown_room(state, &room_code, "Internal error").await;
            return;
        }
        Err(e) => {
            send_error(state, conn_id, "PLAY_FAILED", &e.to_string()).await;
            return;
        }
    };

    state
        .registry
        .broadcast_to_room(
            &room_code,
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
            &room_code,
            &ServerMessage::TurnChanged {
                current_player_id: next,
            },
        )
        .await;

    let finished = flow::sweep_outcomes(state, &room_code, &mut room).await;
    if !finished {
        flow::arm_turn_timer(state, &room_code, &mut room);
    }
}

async fn handle_slap<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    conn_id: ConnectionId,
) {
    let Some((player_id, room_code, shared)) =
        require_seated_room(state, conn_id).await
    else {
        return;
    };

    let mut room = shared.lock().await;
    let Some(player_name) = room.player(&player_id).map(|p| p.name.clone()) else {
        send_error(state, conn_id, "PLAYER_NOT_FOUND", "Player not found").await;
        return;
    };
    if room.game.is_none() {
        send_error(state, conn_id, "NO_GAME", "Game has not started").await;
        return;
    }

    // Everyone sees the hand come down before the verdict.
    state
        .registry
        .broadcast_to_room(
            &room_code,
            &ServerMessage::SlapAttempted {
                player_id: player_id.clone(),
                player_name,
            },
        )
        .await;

    let result = {
        let game = room.game.as_mut().expect("checked above");
        game.process_slap(&player_id, Instant::now())
    };
    let success = result.success;

    state
        .registry
        .broadcast_to_room(&room_code, &ServerMessage::SlapResult(result))
        .await;

    let finished = flow::sweep_outcomes(state, &room_code, &mut room).await;
    if finished || !success {
        return;
    }

    // The slap winner leads the next turn.
    let next = room
        .game
        .as_ref()
        .map(|g| g.current_player().clone())
        .expect("game survives a successful slap");
    state
        .registry
        .broadcast_to_room(
            &room_code,
            &ServerMessage::TurnChanged {
                current_player_id: next,
            },
        )
        .await;
    flow::arm_turn_timer(state, &room_code, &mut room);
}

async fn handle_end_game<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    conn_id: ConnectionId,
) {
    let Some((player_id, room_code, shared)) =
        require_seated_room(state, conn_id).await
    else {
        return;
    };

    let mut room = shared.lock().await;
    if room.host_id != player_id {
        send_error(state, conn_id, "NOT_HOST", "Only the host can end the game")
            .await;
        return;
    }
    if room.game.is_none() {
        send_error(state, conn_id, "NO_GAME", "Game has not started").await;
        return;
    }

    // Dropping the game cancels its armed turn timer.
    room.end_game();
    state.rooms.mirror_room(&room).await;

    state
        .registry
        .broadcast_to_room(
            &room_code,
            &ServerMessage::GameEnded {
                reason: "Host ended the game".into(),
            },
        )
        .await;
    state
        .registry
        .broadcast_to_room(
            &room_code,
            &ServerMessage::RoomUpdated {
                room: room.snapshot(),
            },
        )
        .await;
    tracing::info!(room_code = %room_code, "game ended by host");
}

async fn handle_react<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    conn_id: ConnectionId,
    emoji: String,
) {
    // Reactions are fire-and-forget; not being in a room just drops it.
    let Some((player_id, room_code)) = current_seat(state, conn_id).await else {
        return;
    };
    state
        .registry
        .broadcast_to_room(&room_code, &ServerMessage::React { player_id, emoji })
        .await;
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The connection's seat, if it has one. Sends nothing.
async fn current_seat<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    conn_id: ConnectionId,
) -> Option<(PlayerId, RoomCode)> {
    let binding = state.registry.binding(conn_id).await?;
    Some((binding.player_id?, binding.room_code?))
}

/// The connection's seat, or a `NOT_IN_ROOM` error to the client.
async fn require_seat<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    conn_id: ConnectionId,
) -> Option<(PlayerId, RoomCode)> {
    let seat = current_seat(state, conn_id).await;
    if seat.is_none() {
        send_error(state, conn_id, "NOT_IN_ROOM", "You are not in a room").await;
    }
    seat
}

/// Seat plus a live room handle, or the matching error to the client.
async fn require_seated_room<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    conn_id: ConnectionId,
) -> Option<(PlayerId, RoomCode, SharedRoom)> {
    let (player_id, room_code) = require_seat(state, conn_id).await?;
    match state.rooms.get(&room_code).await {
        Some(shared) => Some((player_id, room_code, shared)),
        None => {
            send_error(state, conn_id, "ROOM_NOT_FOUND", "Room not found").await;
            None
        }
    }
}

/// One structured error envelope to the originating connection only.
async fn send_error<S: KeyValueStore>(
    state: &Arc<ServerState<S>>,
    conn_id: ConnectionId,
    code: &str,
    message: &str,
) {
    state
        .registry
        .send_to_conn(
            conn_id,
            &ServerMessage::Error {
                code: code.to_string(),
                message: message.to_string(),
            },
        )
        .await;
}

/// Display-name validation shared by create/join/rename.
fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("Player name is required");
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err("Player name must be 20 characters or less");
    }
    Ok(())
}
