//! The draw bag: tokens out of play, waiting for a board refill.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::gem::{GemCounts, GemType};
use crate::core::rng::GameRng;

/// Ordered multiset of tokens. Refills draw from the front.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bag {
    tokens: VecDeque<GemType>,
}

impl Bag {
    /// An empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A bag holding `tokens` in the given order.
    #[must_use]
    pub fn from_tokens(tokens: Vec<GemType>) -> Self {
        Self { tokens: tokens.into() }
    }

    /// A bag holding `counts`, grouped by kind.
    #[must_use]
    pub fn from_counts(counts: &GemCounts) -> Self {
        let mut bag = Self::new();
        bag.extend_counts(counts);
        bag
    }

    /// Return one token to the bag.
    pub fn push(&mut self, gem: GemType) {
        debug_assert!(gem.is_token());
        self.tokens.push_back(gem);
    }

    /// Return every token in `counts`.
    pub fn extend_counts(&mut self, counts: &GemCounts) {
        for (gem, n) in counts.nonzero() {
            for _ in 0..n {
                self.tokens.push_back(gem);
            }
        }
    }

    /// Take the front token.
    pub fn draw_front(&mut self) -> Option<GemType> {
        self.tokens.pop_front()
    }

    /// Shuffle in place.
    pub fn shuffle(&mut self, rng: &mut GameRng) {
        rng.shuffle(self.tokens.make_contiguous());
    }

    /// Tally by kind.
    #[must_use]
    pub fn counts(&self) -> GemCounts {
        let mut counts = GemCounts::new();
        for &gem in &self.tokens {
            counts.add(gem, 1);
        }
        counts
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True when nothing is left to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draws_front_first() {
        let mut bag = Bag::from_tokens(vec![GemType::White, GemType::Gold]);
        bag.push(GemType::Red);

        assert_eq!(bag.draw_front(), Some(GemType::White));
        assert_eq!(bag.draw_front(), Some(GemType::Gold));
        assert_eq!(bag.draw_front(), Some(GemType::Red));
        assert_eq!(bag.draw_front(), None);
    }

    #[test]
    fn test_counts_round_trip() {
        let universe = GemCounts::universe();
        let bag = Bag::from_counts(&universe);
        assert_eq!(bag.len(), 25);
        assert_eq!(bag.counts(), universe);
    }

    #[test]
    fn test_shuffle_preserves_contents() {
        let mut rng = GameRng::new(3);
        let mut bag = Bag::from_counts(&GemCounts::universe());
        bag.shuffle(&mut rng);
        assert_eq!(bag.counts(), GemCounts::universe());
    }
}
