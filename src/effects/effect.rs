//! Selections for choice effects, carried in a purchase payload.
//!
//! Each choice effect (extra token, steal, wildcard color) and the noble
//! claim resolves inside the same round trip as the purchase. A selection is
//! either an explicit skip or a concrete pick; an absent selection behaves
//! like a skip.

use serde::{Deserialize, Serialize};

use crate::board::Position;
use crate::cards::NobleId;
use crate::core::gem::GemType;

/// A skip-or-pick selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice<T> {
    Skip,
    Select(T),
}

impl<T: Copy> Choice<T> {
    /// The picked value, if any.
    #[must_use]
    pub fn selected(self) -> Option<T> {
        match self {
            Choice::Skip => None,
            Choice::Select(value) => Some(value),
        }
    }
}

/// A noble claim with the noble's own steal selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NobleChoice {
    pub noble: NobleId,
    /// Only read when the claimed noble steals.
    pub steal: Option<GemType>,
}

/// All selections a purchase may carry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectChoices {
    pub extra_token: Option<Choice<Position>>,
    pub steal: Option<Choice<GemType>>,
    pub wildcard: Option<Choice<GemType>>,
    pub noble: Option<Choice<NobleChoice>>,
}

impl EffectChoices {
    /// No selections at all.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Pick the board cell for an extra-token effect.
    #[must_use]
    pub fn with_extra_token(mut self, pos: Position) -> Self {
        self.extra_token = Some(Choice::Select(pos));
        self
    }

    /// Pick the token kind to steal.
    #[must_use]
    pub fn with_steal(mut self, gem: GemType) -> Self {
        self.steal = Some(Choice::Select(gem));
        self
    }

    /// Pick the wildcard bonus color.
    #[must_use]
    pub fn with_wildcard(mut self, color: GemType) -> Self {
        self.wildcard = Some(Choice::Select(color));
        self
    }

    /// Claim a noble.
    #[must_use]
    pub fn with_noble(mut self, noble: NobleId, steal: Option<GemType>) -> Self {
        self.noble = Some(Choice::Select(NobleChoice { noble, steal }));
        self
    }
}
