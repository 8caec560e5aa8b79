//! Validated game actions.
//!
//! The session layer converts wire payloads into an `Action` at the
//! boundary; everything past that point works with typed positions, card ids
//! and token counts.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::board::Position;
use crate::cards::{CardId, CardLevel};
use crate::effects::EffectChoices;

use super::gem::{GemCounts, GemType};

/// What a reserve takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReserveTarget {
    /// A specific face-up card.
    FaceUp(CardId),
    /// The top card of one level's deck, unseen.
    Blind(CardLevel),
    /// The top card of a random non-empty level.
    RandomLevel,
}

/// A game action submitted by a seated player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    StartGame,
    TakeGems {
        positions: SmallVec<[Position; 3]>,
    },
    BuyCard {
        card: CardId,
        payment: GemCounts,
        choices: EffectChoices,
    },
    ReserveCard {
        target: ReserveTarget,
        gold: Position,
    },
    SpendPrivilege {
        count: u8,
        positions: SmallVec<[Position; 3]>,
    },
    RefillBoard,
    GrantOpponentPrivilege,
    DiscardGem {
        gem: GemType,
    },
    DiscardGems {
        gems: GemCounts,
    },
    EndTurn,
}

impl Action {
    /// Take tokens at `positions`.
    #[must_use]
    pub fn take(positions: &[Position]) -> Self {
        Action::TakeGems {
            positions: SmallVec::from_slice(positions),
        }
    }

    /// Buy `card` paying `payment`, with no effect selections.
    #[must_use]
    pub fn buy(card: CardId, payment: GemCounts) -> Self {
        Action::BuyCard {
            card,
            payment,
            choices: EffectChoices::none(),
        }
    }

    /// Spend one privilege per position.
    #[must_use]
    pub fn spend(positions: &[Position]) -> Self {
        Action::SpendPrivilege {
            count: positions.len() as u8,
            positions: SmallVec::from_slice(positions),
        }
    }

    /// Wire name of the action type.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Action::StartGame => "start_game",
            Action::TakeGems { .. } => "takeGems",
            Action::BuyCard { .. } => "buyCard",
            Action::ReserveCard { .. } => "reserveCard",
            Action::SpendPrivilege { .. } => "spendPrivilege",
            Action::RefillBoard => "refillBoard",
            Action::GrantOpponentPrivilege => "grantOpponentPrivilege",
            Action::DiscardGem { .. } => "discardGem",
            Action::DiscardGems { .. } => "discardGemsBatch",
            Action::EndTurn => "endTurn",
        }
    }

    /// True for the once-per-turn main actions.
    #[must_use]
    pub const fn is_main(&self) -> bool {
        matches!(
            self,
            Action::TakeGems { .. } | Action::BuyCard { .. } | Action::ReserveCard { .. }
        )
    }
}
