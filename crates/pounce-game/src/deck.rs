//! The standard 52-card deck: construction, shuffling, dealing.

use std::collections::VecDeque;

use pounce_protocol::{Card, Rank, Suit};
use rand::seq::SliceRandom;

/// A deck of cards, consumed by dealing.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Builds the full 52-card deck in suit/rank order.
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card::new(suit, rank));
            }
        }
        Self { cards }
    }

    /// Shuffles the deck in place.
    pub fn shuffle(&mut self) {
        let mut rng = rand::rng();
        self.cards.shuffle(&mut rng);
    }

    /// Deals the whole deck round-robin into `num_players` hands.
    ///
    /// Hand sizes differ by at most one when 52 doesn't divide evenly.
    /// The front of each hand is the next card that player will play.
    pub fn deal(self, num_players: usize) -> Vec<VecDeque<Card>> {
        let mut hands: Vec<VecDeque<Card>> = (0..num_players)
            .map(|_| VecDeque::with_capacity(52 / num_players + 1))
            .collect();
        for (i, card) in self.cards.into_iter().enumerate() {
            hands[i % num_players].push_back(card);
        }
        hands
    }

    /// Number of cards remaining in the deck.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
