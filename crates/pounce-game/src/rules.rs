//! Slap validity rules.
//!
//! A slap is judged purely against the pile — never against who is
//! slapping or when. Cooldowns and slap-back-in eligibility are the
//! [`Game`](crate::Game)'s business.

use std::collections::VecDeque;

use pounce_protocol::{Card, SlapReason};

/// Which optional slap conditions are active for a room.
///
/// Jacks are always slappable; doubles and sandwiches are toggles.
#[derive(Debug, Clone, Copy)]
pub struct SlapRules {
    pub doubles: bool,
    pub sandwich: bool,
}

impl SlapRules {
    pub fn new(doubles: bool, sandwich: bool) -> Self {
        Self { doubles, sandwich }
    }

    /// Judges the pile top-down; the first matching condition wins.
    ///
    /// 1. Top card is a Jack → [`SlapReason::Jack`]
    /// 2. Top two cards share a rank → [`SlapReason::Doubles`] (if enabled)
    /// 3. Top and third-from-top share a rank → [`SlapReason::Sandwich`]
    ///    (if enabled)
    /// 4. Otherwise → [`SlapReason::Invalid`]
    pub fn check(&self, pile: &VecDeque<Card>) -> SlapReason {
        let len = pile.len();
        let Some(top) = pile.back() else {
            return SlapReason::Invalid;
        };

        if top.is_jack() {
            return SlapReason::Jack;
        }

        if self.doubles && len >= 2 && top.rank == pile[len - 2].rank {
            return SlapReason::Doubles;
        }

        if self.sandwich && len >= 3 && top.rank == pile[len - 3].rank {
            return SlapReason::Sandwich;
        }

        SlapReason::Invalid
    }

    /// Whether the pile offers any valid slap.
    pub fn is_valid(&self, pile: &VecDeque<Card>) -> bool {
        self.check(pile) != SlapReason::Invalid
    }
}
