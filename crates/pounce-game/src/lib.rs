//! The Pounce game engine: deck, slap rules, and per-room arbitration.
//!
//! One [`Game`] lives inside each playing room and owns everything the
//! room's table holds: the hands, the pile, the turn order, slap cooldowns
//! and slap-back-in counters, statistics, and the armed turn timer. All
//! mutation goes through the owning room's lock, which is what turns
//! simultaneous slap attempts into a single total order — the first
//! attempt through wins the pile, later ones are judged against the
//! post-resolution state.
//!
//! The engine is deliberately free of networking: it returns values
//! ([`SlapResult`](pounce_protocol::SlapResult), played cards, winners)
//! and the layer above decides who hears about them.

mod deck;
mod error;
mod game;
mod rules;
mod timer;

pub use deck::Deck;
pub use error::GameError;
pub use game::{Game, GameConfig};
pub use rules::SlapRules;
pub use timer::{CancelSignal, TimerHandle};
