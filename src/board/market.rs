//! Per-level decks and face-up card rows.
//!
//! Each level keeps a hidden deck (top = last element) and a fixed-width row
//! of face-up slots. A slot vacated by a purchase or reserve stays empty until
//! the turn ends, then is refilled in place from the same level's deck.

use serde::{Deserialize, Serialize};

use crate::cards::{catalog, CardId, CardLevel};
use crate::core::rng::GameRng;

/// A face-up slot address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRef {
    pub level: CardLevel,
    pub index: usize,
}

/// Decks and face-up rows for all three levels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Market {
    decks: [Vec<CardId>; 3],
    face_up: [Vec<Option<CardId>>; 3],
}

impl Market {
    /// Empty decks and empty rows of the standard widths.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            decks: Default::default(),
            face_up: CardLevel::ALL.map(|level| vec![None; level.face_up_slots()]),
        }
    }

    /// Shuffle every level of the catalog and deal the face-up rows.
    #[must_use]
    pub fn new_shuffled(rng: &mut GameRng) -> Self {
        let mut market = Self::empty();
        for level in CardLevel::ALL {
            let mut deck = catalog().by_level(level).to_vec();
            rng.shuffle(&mut deck);
            market.decks[level.index()] = deck;
            for index in 0..level.face_up_slots() {
                market.refill_slot(SlotRef { level, index });
            }
        }
        market
    }

    /// Build from explicit decks (top = last), dealing the rows from them.
    #[must_use]
    pub fn from_decks(decks: [Vec<CardId>; 3]) -> Self {
        let mut market = Self::empty();
        market.decks = decks;
        for level in CardLevel::ALL {
            for index in 0..level.face_up_slots() {
                market.refill_slot(SlotRef { level, index });
            }
        }
        market
    }

    /// Unseen cards remaining in a level.
    #[must_use]
    pub fn deck_len(&self, level: CardLevel) -> usize {
        self.decks[level.index()].len()
    }

    /// Face-up row for a level.
    #[must_use]
    pub fn face_up(&self, level: CardLevel) -> &[Option<CardId>] {
        &self.face_up[level.index()]
    }

    /// Find a face-up card.
    #[must_use]
    pub fn locate_face_up(&self, card: CardId) -> Option<SlotRef> {
        CardLevel::ALL.iter().find_map(|&level| {
            self.face_up(level)
                .iter()
                .position(|&slot| slot == Some(card))
                .map(|index| SlotRef { level, index })
        })
    }

    /// Empty a slot, returning its card.
    pub fn take_face_up(&mut self, slot: SlotRef) -> Option<CardId> {
        self.face_up[slot.level.index()].get_mut(slot.index)?.take()
    }

    /// Draw the top card of a level's deck.
    pub fn draw(&mut self, level: CardLevel) -> Option<CardId> {
        self.decks[level.index()].pop()
    }

    /// Fill an empty slot from its level's deck. Returns the revealed card;
    /// `None` if the slot was occupied or the deck is exhausted.
    pub fn refill_slot(&mut self, slot: SlotRef) -> Option<CardId> {
        let deck = &mut self.decks[slot.level.index()];
        let cell = self.face_up[slot.level.index()].get_mut(slot.index)?;
        if cell.is_some() {
            return None;
        }
        let card = deck.pop()?;
        *cell = Some(card);
        Some(card)
    }

    /// Remove a card from wherever it sits in the market. Returns false if the
    /// market does not hold it.
    pub fn extract(&mut self, card: CardId) -> bool {
        if let Some(slot) = self.locate_face_up(card) {
            self.take_face_up(slot);
            return true;
        }
        for deck in &mut self.decks {
            if let Some(i) = deck.iter().position(|&c| c == card) {
                deck.remove(i);
                return true;
            }
        }
        false
    }

    /// Every card still in the market, decks first.
    pub fn cards(&self) -> impl Iterator<Item = CardId> + '_ {
        self.decks
            .iter()
            .flatten()
            .copied()
            .chain(self.face_up.iter().flatten().flatten().copied())
    }
}
