//! The per-room game state machine.
//!
//! ```text
//!        ┌────────────────────────────────────────────────┐
//!        ▼                                                │
//!  idle (turn N) ──play/timeout──→ slap window open ──────┤
//!        ▲                               │                │
//!        │                          valid slap            │
//!        └───────── winner leads ────────┘          next player
//! ```
//!
//! The invariant the whole engine hangs on: cards are only ever *moved*
//! between hands and the pile. `Σ|hand| + |pile| == 52` after every
//! operation.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use pounce_protocol::{Card, GameSnapshot, GameStats, PlayerId, SlapReason, SlapResult};

use crate::{Deck, GameError, SlapRules, TimerHandle};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Rule knobs a game is started with, frozen for the game's lifetime.
/// Derived from the room settings at deal time.
#[derive(Debug, Clone, Copy)]
pub struct GameConfig {
    pub enable_doubles: bool,
    pub enable_sandwich: bool,
    /// Cards forfeited for slapping an invalid pile.
    pub burn_penalty: usize,
    /// Minimum spacing between one player's slap attempts.
    pub slap_cooldown: Duration,
    /// How long the current player has before their card is auto-played.
    pub turn_timeout: Duration,
    pub enable_slap_in: bool,
    /// How many times a zero-card player may re-enter by winning a slap.
    pub max_slap_ins: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            enable_doubles: true,
            enable_sandwich: true,
            burn_penalty: 1,
            slap_cooldown: Duration::from_millis(200),
            turn_timeout: Duration::from_millis(10_000),
            enable_slap_in: true,
            max_slap_ins: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct StatsTracker {
    total_slaps: u64,
    successful_slaps: HashMap<PlayerId, u64>,
    cards_burned: HashMap<PlayerId, u64>,
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// One running card game: hands, pile, turn order, slap arbitration.
///
/// Not internally synchronized — the owning room's lock serializes every
/// call, which is exactly what makes concurrent slap attempts resolve in
/// one total order.
pub struct Game {
    hands: HashMap<PlayerId, VecDeque<Card>>,
    /// The shared pile; back = top (most recently played).
    pile: VecDeque<Card>,
    /// Fixed seating order for turns.
    turn_order: Vec<PlayerId>,
    current_turn: usize,
    rules: SlapRules,
    config: GameConfig,
    /// Last slap attempt per player, for cooldown enforcement.
    last_slap: HashMap<PlayerId, Instant>,
    /// How many times each player has slapped back in.
    slap_ins: HashMap<PlayerId, u32>,
    slap_window_open: bool,
    /// Players already reported eliminated, so the sweep only surfaces
    /// each elimination once (and re-surfaces it after a re-entry).
    announced_eliminated: HashSet<PlayerId>,
    stats: StatsTracker,
    started_at: Instant,
    /// The armed turn timeout/warning pair. At most one per game;
    /// replacing or dropping it cancels the old task.
    turn_timer: Option<TimerHandle>,
}

impl Game {
    /// Deals a shuffled deck to the given players and starts at seat 0.
    pub fn deal(players: &[PlayerId], config: GameConfig) -> Self {
        let mut deck = Deck::standard();
        deck.shuffle();
        let hands = deck.deal(players.len());
        Self::from_hands(players, hands, config)
    }

    fn from_hands(
        players: &[PlayerId],
        hands: Vec<VecDeque<Card>>,
        config: GameConfig,
    ) -> Self {
        debug_assert_eq!(players.len(), hands.len());
        let hands: HashMap<PlayerId, VecDeque<Card>> = players
            .iter()
            .cloned()
            .zip(hands)
            .collect();

        Self {
            hands,
            pile: VecDeque::with_capacity(52),
            turn_order: players.to_vec(),
            current_turn: 0,
            rules: SlapRules::new(config.enable_doubles, config.enable_sandwich),
            config,
            last_slap: HashMap::new(),
            slap_ins: players.iter().cloned().map(|p| (p, 0)).collect(),
            slap_window_open: false,
            announced_eliminated: HashSet::new(),
            stats: StatsTracker::default(),
            started_at: Instant::now(),
            turn_timer: None,
        }
    }

    // -- Turn flow ---------------------------------------------------------

    /// The player whose turn it is.
    pub fn current_player(&self) -> &PlayerId {
        &self.turn_order[self.current_turn]
    }

    /// Plays the front card of `player`'s hand onto the pile.
    ///
    /// Cancels the armed turn timer, opens the slap window, and advances
    /// the turn. The caller re-arms the timer for the next player.
    pub fn play_card(&mut self, player: &PlayerId) -> Result<Card, GameError> {
        if self.current_player() != player {
            return Err(GameError::NotYourTurn);
        }
        let hand = self
            .hands
            .get_mut(player)
            .ok_or_else(|| GameError::UnknownPlayer(player.clone()))?;
        let card = hand.pop_front().ok_or(GameError::EmptyHand)?;

        self.turn_timer = None;
        self.pile.push_back(card);
        self.slap_window_open = true;
        self.advance_turn();
        Ok(card)
    }

    /// Timeout path: plays the current player's front card on their
    /// behalf. Identical state transition to a manual play. Returns
    /// `None` if the current player has no cards (a winner should already
    /// have been declared by then).
    pub fn auto_play(&mut self) -> Option<(PlayerId, Card)> {
        let player = self.current_player().clone();
        match self.play_card(&player) {
            Ok(card) => Some((player, card)),
            Err(_) => None,
        }
    }

    /// Steps the turn index circularly to the next seat holding at least
    /// one card. A full wrap leaves the index unchanged — every other
    /// seat is empty, and the winner check owns that situation.
    fn advance_turn(&mut self) {
        let start = self.current_turn;
        loop {
            self.current_turn = (self.current_turn + 1) % self.turn_order.len();
            let player = &self.turn_order[self.current_turn];
            if self.hands.get(player).is_some_and(|h| !h.is_empty()) {
                return;
            }
            if self.current_turn == start {
                return;
            }
        }
    }

    // -- Slap arbitration --------------------------------------------------

    /// Arbitrates one slap attempt.
    ///
    /// Callers already hold the room lock, so concurrent attempts arrive
    /// here in some total order: the first valid one takes the pile and
    /// every later attempt is judged against the post-resolution (empty)
    /// pile.
    pub fn process_slap(&mut self, player: &PlayerId, now: Instant) -> SlapResult {
        self.stats.total_slaps += 1;

        // Cooldown gate. Attempts inside the window don't refresh it —
        // a rejected slap is not a new attempt for spacing purposes.
        if let Some(last) = self.last_slap.get(player) {
            if now.duration_since(*last) < self.config.slap_cooldown {
                return SlapResult {
                    player_id: player.clone(),
                    success: false,
                    reason: SlapReason::Cooldown,
                    cards_won: None,
                    burn_penalty: None,
                };
            }
        }
        self.last_slap.insert(player.clone(), now);

        let has_cards = self.hands.get(player).is_some_and(|h| !h.is_empty());
        let reason = self.rules.check(&self.pile);

        if !has_cards {
            let used = self.slap_ins.get(player).copied().unwrap_or(u32::MAX);
            let can_slap_in =
                self.config.enable_slap_in && used < self.config.max_slap_ins;
            if !can_slap_in {
                return SlapResult {
                    player_id: player.clone(),
                    success: false,
                    reason: SlapReason::Eliminated,
                    cards_won: None,
                    burn_penalty: None,
                };
            }
            // A zero-card player only earns re-entry on a valid slap and
            // is never burned for a miss.
            if reason == SlapReason::Invalid {
                return SlapResult {
                    player_id: player.clone(),
                    success: false,
                    reason: SlapReason::Invalid,
                    cards_won: None,
                    burn_penalty: None,
                };
            }
        }

        if reason == SlapReason::Invalid {
            let burned = self.apply_burn(player);
            *self.stats.cards_burned.entry(player.clone()).or_default() +=
                burned as u64;
            return SlapResult {
                player_id: player.clone(),
                success: false,
                reason: SlapReason::Invalid,
                cards_won: None,
                burn_penalty: Some(burned),
            };
        }

        // Valid slap: the whole pile goes to the winner, who leads next.
        let cards_won = self.pile.len();
        if !has_cards {
            *self.slap_ins.entry(player.clone()).or_default() += 1;
            self.announced_eliminated.remove(player);
            tracing::info!(%player, "player slapped back in");
        }

        let hand = self.hands.entry(player.clone()).or_default();
        hand.extend(self.pile.drain(..));
        self.slap_window_open = false;
        *self.stats.successful_slaps.entry(player.clone()).or_default() += 1;

        if let Some(idx) = self.turn_order.iter().position(|p| p == player) {
            self.current_turn = idx;
        }

        SlapResult {
            player_id: player.clone(),
            success: true,
            reason,
            cards_won: Some(cards_won),
            burn_penalty: None,
        }
    }

    /// Moves up to `burn_penalty` cards from the front of the player's
    /// hand to the *bottom* of the pile, preserving both orderings.
    fn apply_burn(&mut self, player: &PlayerId) -> usize {
        let Some(hand) = self.hands.get_mut(player) else {
            return 0;
        };
        let count = self.config.burn_penalty.min(hand.len());
        let burned: Vec<Card> = hand.drain(..count).collect();
        for card in burned.into_iter().rev() {
            self.pile.push_front(card);
        }
        count
    }

    // -- Elimination & victory ---------------------------------------------

    /// Seats with an empty hand while the pile offers no valid slap.
    ///
    /// Run after every pile-mutating operation. Returns only eliminations
    /// not yet surfaced; a player who slaps back in and empties out again
    /// is surfaced again.
    pub fn newly_eliminated(&mut self) -> Vec<PlayerId> {
        let currently: HashSet<PlayerId> = if self.rules.is_valid(&self.pile) {
            // A slappable pile keeps zero-card players in the game.
            HashSet::new()
        } else {
            self.turn_order
                .iter()
                .filter(|p| self.hands.get(*p).is_none_or(|h| h.is_empty()))
                .cloned()
                .collect()
        };

        let newly: Vec<PlayerId> = currently
            .iter()
            .filter(|p| !self.announced_eliminated.contains(*p))
            .cloned()
            .collect();
        self.announced_eliminated = currently;
        newly
    }

    /// The winner, if the game is over: exactly one seat holds cards and
    /// the pile offers no valid slap.
    pub fn winner(&self) -> Option<&PlayerId> {
        let mut holders = self
            .turn_order
            .iter()
            .filter(|p| self.hands.get(*p).is_some_and(|h| !h.is_empty()));
        let first = holders.next()?;
        if holders.next().is_some() {
            return None;
        }
        if self.rules.is_valid(&self.pile) {
            return None;
        }
        Some(first)
    }

    // -- Timer ownership ---------------------------------------------------

    /// Arms the turn timer, cancelling any predecessor. Exactly one
    /// timeout/warning pair exists per game at any time.
    pub fn arm_turn_timer(&mut self, handle: TimerHandle) {
        self.turn_timer = Some(handle);
    }

    /// Cancels the armed turn timer, if any.
    pub fn disarm_turn_timer(&mut self) {
        self.turn_timer = None;
    }

    // -- Views -------------------------------------------------------------

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn pile_len(&self) -> usize {
        self.pile.len()
    }

    pub fn slap_window_open(&self) -> bool {
        self.slap_window_open
    }

    pub fn player_card_count(&self, player: &PlayerId) -> usize {
        self.hands.get(player).map_or(0, |h| h.len())
    }

    pub fn card_counts(&self) -> HashMap<PlayerId, usize> {
        self.hands
            .iter()
            .map(|(p, h)| (p.clone(), h.len()))
            .collect()
    }

    /// Total cards across hands and pile. Always 52.
    pub fn total_cards(&self) -> usize {
        self.hands.values().map(|h| h.len()).sum::<usize>() + self.pile.len()
    }

    /// Client-facing snapshot. Only the top three pile cards are exposed
    /// (bottom → top), enough for doubles/sandwich judgement.
    pub fn snapshot(&self) -> GameSnapshot {
        let visible_from = self.pile.len().saturating_sub(3);
        GameSnapshot {
            pile: self.pile.iter().skip(visible_from).copied().collect(),
            current_player_id: self.current_player().clone(),
            player_card_counts: self.card_counts(),
            can_slap: self.rules.is_valid(&self.pile),
        }
    }

    /// Aggregate statistics for `GAME_OVER`.
    pub fn stats(&self) -> GameStats {
        GameStats {
            total_slaps: self.stats.total_slaps,
            successful_slaps: self.stats.successful_slaps.clone(),
            cards_burned: self.stats.cards_burned.clone(),
            duration_ms: self.started_at.elapsed().as_millis() as u64,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use pounce_protocol::{Rank, Suit};

    use super::*;

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id)
    }

    fn card(suit: Suit, rank: Rank) -> Card {
        Card::new(suit, rank)
    }

    /// A game with fixed hands for deterministic scenarios. Pads nothing:
    /// conservation tests use `deal` instead.
    fn rigged(hands: Vec<(&str, Vec<Card>)>, config: GameConfig) -> Game {
        let players: Vec<PlayerId> = hands.iter().map(|(p, _)| pid(p)).collect();
        let hands: Vec<VecDeque<Card>> = hands
            .into_iter()
            .map(|(_, cards)| cards.into_iter().collect())
            .collect();
        Game::from_hands(&players, hands, config)
    }

    fn no_cooldown() -> GameConfig {
        GameConfig {
            slap_cooldown: Duration::ZERO,
            ..GameConfig::default()
        }
    }

    fn long_ago() -> Instant {
        Instant::now()
    }

    // -- Dealing & conservation -------------------------------------------

    #[test]
    fn test_deal_conserves_52_cards() {
        let players = [pid("a"), pid("b"), pid("c")];
        let game = Game::deal(&players, GameConfig::default());
        assert_eq!(game.total_cards(), 52);
        assert_eq!(game.pile_len(), 0);
    }

    #[test]
    fn test_conservation_through_play_slap_burn_sequences() {
        let players = [pid("a"), pid("b"), pid("c"), pid("d")];
        let mut game = Game::deal(&players, no_cooldown());

        // Drive a few dozen mixed operations; the multiset never leaks.
        for i in 0..40 {
            let current = game.current_player().clone();
            let _ = game.play_card(&current);
            assert_eq!(game.total_cards(), 52, "after play {i}");

            let slapper = players[i % players.len()].clone();
            let _ = game.process_slap(&slapper, long_ago());
            assert_eq!(game.total_cards(), 52, "after slap {i}");

            if game.winner().is_some() {
                break;
            }
        }
    }

    // -- Turn flow ---------------------------------------------------------

    #[test]
    fn test_play_card_out_of_turn_is_rejected_without_mutation() {
        let mut game = rigged(
            vec![
                ("a", vec![card(Suit::Hearts, Rank::Two)]),
                ("b", vec![card(Suit::Clubs, Rank::Three)]),
            ],
            GameConfig::default(),
        );

        let result = game.play_card(&pid("b"));
        assert!(matches!(result, Err(GameError::NotYourTurn)));
        assert_eq!(game.pile_len(), 0);
        assert_eq!(game.player_card_count(&pid("b")), 1);
    }

    #[test]
    fn test_play_card_moves_front_card_to_pile_top_and_advances() {
        let mut game = rigged(
            vec![
                (
                    "a",
                    vec![
                        card(Suit::Hearts, Rank::Two),
                        card(Suit::Hearts, Rank::Five),
                    ],
                ),
                ("b", vec![card(Suit::Clubs, Rank::Three)]),
            ],
            GameConfig::default(),
        );

        let played = game.play_card(&pid("a")).unwrap();
        assert_eq!(played, card(Suit::Hearts, Rank::Two), "front card plays");
        assert_eq!(game.pile_len(), 1);
        assert_eq!(game.current_player(), &pid("b"));
        assert!(game.slap_window_open());
    }

    #[test]
    fn test_turn_skips_empty_seats() {
        let mut game = rigged(
            vec![
                ("a", vec![card(Suit::Hearts, Rank::Two)]),
                ("b", vec![]),
                ("c", vec![card(Suit::Clubs, Rank::Three)]),
            ],
            GameConfig::default(),
        );

        game.play_card(&pid("a")).unwrap();
        assert_eq!(game.current_player(), &pid("c"), "b has no cards");
    }

    #[test]
    fn test_turn_full_wrap_leaves_index_unchanged() {
        // Only "a" has a card; after playing it everyone is empty.
        let mut game = rigged(
            vec![
                ("a", vec![card(Suit::Hearts, Rank::Two)]),
                ("b", vec![]),
            ],
            GameConfig::default(),
        );

        game.play_card(&pid("a")).unwrap();
        assert_eq!(game.current_player(), &pid("a"), "wrap is a no-op");
    }

    #[test]
    fn test_auto_play_matches_manual_play() {
        let mut game = rigged(
            vec![
                ("a", vec![card(Suit::Hearts, Rank::Two)]),
                ("b", vec![card(Suit::Clubs, Rank::Three)]),
            ],
            GameConfig::default(),
        );

        let (who, what) = game.auto_play().unwrap();
        assert_eq!(who, pid("a"));
        assert_eq!(what, card(Suit::Hearts, Rank::Two));
        assert_eq!(game.current_player(), &pid("b"));
        assert!(game.slap_window_open());
    }

    // -- Slap arbitration --------------------------------------------------

    /// Sets up b-to-act with a Jack on the pile (a just played it).
    fn game_with_jack_on_pile() -> Game {
        let mut game = rigged(
            vec![
                (
                    "a",
                    vec![
                        card(Suit::Spades, Rank::Jack),
                        card(Suit::Hearts, Rank::Two),
                    ],
                ),
                (
                    "b",
                    vec![
                        card(Suit::Clubs, Rank::Three),
                        card(Suit::Clubs, Rank::Four),
                    ],
                ),
            ],
            no_cooldown(),
        );
        game.play_card(&pid("a")).unwrap();
        game
    }

    #[test]
    fn test_valid_slap_wins_pile_and_leads_next() {
        let mut game = game_with_jack_on_pile();

        let result = game.process_slap(&pid("b"), long_ago());
        assert!(result.success);
        assert_eq!(result.reason, SlapReason::Jack);
        assert_eq!(result.cards_won, Some(1));
        assert_eq!(game.pile_len(), 0);
        assert!(!game.slap_window_open());
        assert_eq!(game.current_player(), &pid("b"), "slap winner leads");
        assert_eq!(game.player_card_count(&pid("b")), 3);
    }

    #[test]
    fn test_second_slap_sees_post_resolution_pile() {
        // Two "simultaneous" attempts arrive in some order; the loser is
        // judged against the already-cleared pile.
        let mut game = game_with_jack_on_pile();

        let first = game.process_slap(&pid("b"), long_ago());
        assert!(first.success);

        let second = game.process_slap(&pid("a"), long_ago());
        assert!(!second.success);
        assert_eq!(game.total_cards(), 4, "rigged deck stays conserved");
    }

    #[test]
    fn test_cooldown_rejects_rapid_attempts_regardless_of_pile() {
        let mut game = rigged(
            vec![
                (
                    "a",
                    vec![
                        card(Suit::Spades, Rank::Jack),
                        card(Suit::Hearts, Rank::Two),
                    ],
                ),
                ("b", vec![card(Suit::Clubs, Rank::Three)]),
            ],
            GameConfig {
                slap_cooldown: Duration::from_millis(200),
                ..GameConfig::default()
            },
        );
        game.play_card(&pid("a")).unwrap();

        let t0 = Instant::now();
        // First attempt misses nothing — Jack on top, b wins.
        let first = game.process_slap(&pid("b"), t0);
        assert!(first.success);

        // a plays again so the pile is live, then b hammers the button.
        game.play_card(&pid("b")).unwrap();
        let spam1 = game.process_slap(&pid("b"), t0 + Duration::from_millis(50));
        let spam2 = game.process_slap(&pid("b"), t0 + Duration::from_millis(150));
        assert_eq!(spam1.reason, SlapReason::Cooldown);
        assert_eq!(spam2.reason, SlapReason::Cooldown);

        // Past the window the attempt is judged on its merits again.
        let later = game.process_slap(&pid("b"), t0 + Duration::from_millis(400));
        assert_ne!(later.reason, SlapReason::Cooldown);
    }

    #[test]
    fn test_cooldown_rejection_does_not_burn_or_mutate() {
        let mut game = rigged(
            vec![
                ("a", vec![card(Suit::Hearts, Rank::Two), card(Suit::Hearts, Rank::Six)]),
                ("b", vec![card(Suit::Clubs, Rank::Three)]),
            ],
            GameConfig {
                slap_cooldown: Duration::from_millis(200),
                ..GameConfig::default()
            },
        );
        game.play_card(&pid("a")).unwrap();

        let t0 = Instant::now();
        let first = game.process_slap(&pid("b"), t0);
        assert_eq!(first.reason, SlapReason::Invalid, "burned once");

        let pile_after_burn = game.pile_len();
        let spam = game.process_slap(&pid("b"), t0 + Duration::from_millis(10));
        assert_eq!(spam.reason, SlapReason::Cooldown);
        assert_eq!(game.pile_len(), pile_after_burn, "no second burn");
    }

    #[test]
    fn test_invalid_slap_burns_from_hand_front_to_pile_bottom() {
        // Burn penalty 1, player with 3 cards slaps a dead pile.
        let mut game = rigged(
            vec![
                ("a", vec![card(Suit::Hearts, Rank::Two)]),
                (
                    "b",
                    vec![
                        card(Suit::Clubs, Rank::Seven),
                        card(Suit::Clubs, Rank::Eight),
                        card(Suit::Clubs, Rank::Nine),
                    ],
                ),
            ],
            no_cooldown(),
        );
        game.play_card(&pid("a")).unwrap(); // pile: [2♥]

        let result = game.process_slap(&pid("b"), long_ago());
        assert!(!result.success);
        assert_eq!(result.reason, SlapReason::Invalid);
        assert_eq!(result.burn_penalty, Some(1));
        assert_eq!(game.player_card_count(&pid("b")), 2);
        assert_eq!(game.pile_len(), 2);
        // Burned 7♣ sits under the 2♥; top of pile is unchanged.
        assert_eq!(game.pile[0], card(Suit::Clubs, Rank::Seven));
        assert_eq!(game.pile[1], card(Suit::Hearts, Rank::Two));
        assert_eq!(game.stats().cards_burned[&pid("b")], 1);
    }

    #[test]
    fn test_burn_is_capped_by_hand_size() {
        let mut game = rigged(
            vec![
                ("a", vec![card(Suit::Hearts, Rank::Two)]),
                ("b", vec![card(Suit::Clubs, Rank::Seven)]),
            ],
            GameConfig {
                burn_penalty: 5,
                slap_cooldown: Duration::ZERO,
                ..GameConfig::default()
            },
        );
        game.play_card(&pid("a")).unwrap();

        let result = game.process_slap(&pid("b"), long_ago());
        assert_eq!(result.burn_penalty, Some(1), "min(penalty, hand)");
        assert_eq!(game.player_card_count(&pid("b")), 0);
        assert_eq!(game.total_cards(), 2, "rigged deck stays conserved");
    }

    // -- Slap-back-in ------------------------------------------------------

    #[test]
    fn test_zero_card_player_with_slap_in_disabled_gets_eliminated_reason() {
        // Valid pile, but the feature is off: non-success with the
        // ineligibility reason, and no card transfer.
        let mut game = rigged(
            vec![
                ("a", vec![card(Suit::Spades, Rank::Jack)]),
                ("b", vec![]),
            ],
            GameConfig {
                enable_slap_in: false,
                slap_cooldown: Duration::ZERO,
                ..GameConfig::default()
            },
        );
        game.play_card(&pid("a")).unwrap(); // Jack on top: valid pile

        let result = game.process_slap(&pid("b"), long_ago());
        assert!(!result.success);
        assert_eq!(result.reason, SlapReason::Eliminated);
        assert_eq!(game.pile_len(), 1, "no card transfer");
        assert_eq!(game.player_card_count(&pid("b")), 0);
    }

    #[test]
    fn test_zero_card_player_invalid_slap_is_not_burned() {
        let mut game = rigged(
            vec![
                ("a", vec![card(Suit::Hearts, Rank::Two)]),
                ("b", vec![]),
            ],
            no_cooldown(),
        );
        game.play_card(&pid("a")).unwrap(); // dead pile

        let result = game.process_slap(&pid("b"), long_ago());
        assert!(!result.success);
        assert_eq!(result.reason, SlapReason::Invalid);
        assert_eq!(result.burn_penalty, None, "no penalty at zero cards");
        assert_eq!(game.pile_len(), 1);
    }

    #[test]
    fn test_slap_back_in_succeeds_and_counts() {
        let mut game = rigged(
            vec![
                ("a", vec![card(Suit::Spades, Rank::Jack), card(Suit::Hearts, Rank::Two)]),
                ("b", vec![]),
            ],
            no_cooldown(),
        );
        game.play_card(&pid("a")).unwrap(); // Jack on top

        let result = game.process_slap(&pid("b"), long_ago());
        assert!(result.success);
        assert_eq!(game.player_card_count(&pid("b")), 1);
        assert_eq!(game.slap_ins[&pid("b")], 1);
    }

    #[test]
    fn test_slap_back_in_limit_is_enforced() {
        let mut game = rigged(
            vec![
                ("a", vec![card(Suit::Spades, Rank::Jack)]),
                ("b", vec![]),
            ],
            GameConfig {
                max_slap_ins: 1,
                slap_cooldown: Duration::ZERO,
                ..GameConfig::default()
            },
        );
        // Pretend b already used their one re-entry.
        game.slap_ins.insert(pid("b"), 1);
        game.play_card(&pid("a")).unwrap();

        let result = game.process_slap(&pid("b"), long_ago());
        assert!(!result.success);
        assert_eq!(result.reason, SlapReason::Eliminated);
    }

    // -- Elimination & victory ---------------------------------------------

    #[test]
    fn test_elimination_waits_for_dead_pile() {
        let mut game = rigged(
            vec![
                ("a", vec![card(Suit::Spades, Rank::Jack), card(Suit::Hearts, Rank::Two)]),
                ("b", vec![]),
            ],
            no_cooldown(),
        );
        game.play_card(&pid("a")).unwrap(); // Jack on top: slappable

        assert!(
            game.newly_eliminated().is_empty(),
            "b can still slap back in"
        );

        game.play_card(&pid("a")).unwrap(); // 2♥ covers the Jack
        assert_eq!(game.newly_eliminated(), vec![pid("b")]);
    }

    #[test]
    fn test_elimination_is_announced_once() {
        let mut game = rigged(
            vec![
                ("a", vec![card(Suit::Hearts, Rank::Two), card(Suit::Hearts, Rank::Five)]),
                ("b", vec![]),
            ],
            no_cooldown(),
        );
        game.play_card(&pid("a")).unwrap();

        assert_eq!(game.newly_eliminated(), vec![pid("b")]);
        assert!(game.newly_eliminated().is_empty(), "no re-announcement");
    }

    #[test]
    fn test_winner_requires_single_holder_and_dead_pile() {
        let mut game = rigged(
            vec![
                ("a", vec![card(Suit::Spades, Rank::Jack), card(Suit::Hearts, Rank::Two)]),
                ("b", vec![]),
            ],
            no_cooldown(),
        );

        // Before any play: a holds everything, pile empty → a wins.
        assert_eq!(game.winner(), Some(&pid("a")));

        game.play_card(&pid("a")).unwrap(); // Jack on pile: slappable
        assert_eq!(game.winner(), None, "b could slap back in");

        game.play_card(&pid("a")).unwrap(); // covers the Jack
        // a is now empty-handed too: nobody holds cards, no winner.
        assert_eq!(game.winner(), None);
    }

    #[test]
    fn test_winner_none_while_two_players_hold_cards() {
        let game = rigged(
            vec![
                ("a", vec![card(Suit::Hearts, Rank::Two)]),
                ("b", vec![card(Suit::Clubs, Rank::Three)]),
            ],
            GameConfig::default(),
        );
        assert_eq!(game.winner(), None);
    }

    // -- Stats & snapshot --------------------------------------------------

    #[test]
    fn test_stats_count_attempts_successes_and_burns() {
        let mut game = game_with_jack_on_pile();

        game.process_slap(&pid("b"), long_ago()); // success
        game.play_card(&pid("b")).unwrap();
        game.process_slap(&pid("a"), long_ago()); // invalid → burn

        let stats = game.stats();
        assert_eq!(stats.total_slaps, 2);
        assert_eq!(stats.successful_slaps[&pid("b")], 1);
        assert_eq!(stats.cards_burned[&pid("a")], 1);
    }

    #[test]
    fn test_snapshot_exposes_top_three_pile_cards() {
        let mut game = rigged(
            vec![
                (
                    "a",
                    vec![
                        card(Suit::Hearts, Rank::Two),
                        card(Suit::Hearts, Rank::Five),
                        card(Suit::Hearts, Rank::Eight),
                        card(Suit::Hearts, Rank::King),
                    ],
                ),
                ("b", vec![card(Suit::Clubs, Rank::Three)]),
            ],
            no_cooldown(),
        );
        // Alternate until b runs dry, then a's turns chain together.
        game.play_card(&pid("a")).unwrap();
        game.play_card(&pid("b")).unwrap();
        game.play_card(&pid("a")).unwrap();
        game.play_card(&pid("a")).unwrap();

        let snapshot = game.snapshot();
        assert_eq!(snapshot.pile.len(), 3, "only top three visible");
        assert_eq!(
            snapshot.pile.last().copied(),
            Some(card(Suit::Hearts, Rank::Eight)),
            "last = pile top"
        );
        assert_eq!(snapshot.player_card_counts[&pid("a")], 1);
    }
}
