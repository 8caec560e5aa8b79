//! Development card definitions.
//!
//! A `DevelopmentCard` is immutable catalog data. The only per-match change
//! a card can see, a wildcard color choice, lives in the match state's color
//! overlay rather than on the card.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

use crate::core::gem::{GemCounts, GemType};

use super::catalog::catalog;

/// Identifier of one physical development card.
///
/// Indexes the static catalog. On the wire it is the printed card code
/// (`"a1"`, `"f2"`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(pub u16);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Raw catalog index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Printed code, or `"?"` for an id outside the catalog.
    #[must_use]
    pub fn code(self) -> &'static str {
        catalog().get(self).map_or("?", |card| card.id_code.as_str())
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for CardId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match catalog().get(*self) {
            Some(card) => serializer.serialize_str(&card.id_code),
            None => Err(serde::ser::Error::custom(format!("card index {} not in catalog", self.0))),
        }
    }
}

impl<'de> Deserialize<'de> for CardId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        catalog()
            .lookup(&code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown card id {code:?}")))
    }
}

/// Card tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CardLevel {
    One,
    Two,
    Three,
}

impl CardLevel {
    /// All levels, lowest first.
    pub const ALL: [CardLevel; 3] = [CardLevel::One, CardLevel::Two, CardLevel::Three];

    /// Numeric level (1..=3).
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            CardLevel::One => 1,
            CardLevel::Two => 2,
            CardLevel::Three => 3,
        }
    }

    /// Zero-based index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.number() as usize - 1
    }

    /// Number of face-up slots kept for this level.
    #[must_use]
    pub const fn face_up_slots(self) -> usize {
        match self {
            CardLevel::One => 5,
            CardLevel::Two => 4,
            CardLevel::Three => 3,
        }
    }

    /// Parse a numeric level.
    #[must_use]
    pub const fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(CardLevel::One),
            2 => Some(CardLevel::Two),
            3 => Some(CardLevel::Three),
            _ => None,
        }
    }
}

impl TryFrom<u8> for CardLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        CardLevel::from_number(value).ok_or_else(|| format!("card level must be 1..=3, got {value}"))
    }
}

impl From<CardLevel> for u8 {
    fn from(level: CardLevel) -> u8 {
        level.number()
    }
}

impl std::fmt::Display for CardLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "level {}", self.number())
    }
}

/// One-shot effect printed on a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardEffect {
    /// Take one board token matching the card's color.
    ExtraToken,
    /// Bank an extra turn.
    NewTurn,
    /// Buyer picks the card's bonus color.
    Wildcard,
    /// Receive a privilege token.
    GetPrivilege,
    /// Take one non-gold token from the opponent.
    Steal,
}

impl CardEffect {
    /// True when the effect needs a selection in the purchase payload.
    #[must_use]
    pub const fn needs_choice(self) -> bool {
        matches!(self, CardEffect::ExtraToken | CardEffect::Wildcard | CardEffect::Steal)
    }
}

/// Static card data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DevelopmentCard {
    pub id: CardId,
    /// Printed card id, e.g. `"a1"`.
    #[serde(skip)]
    pub id_code: String,
    /// Template code shared by the five color variants, e.g. `"a"`.
    pub code: String,
    pub level: CardLevel,
    /// Printed bonus color. Gray for special cards.
    pub color: GemType,
    pub points: u32,
    pub crowns: u32,
    pub cost: GemCounts,
    pub effects: SmallVec<[CardEffect; 2]>,
    pub is_special: bool,
}

impl DevelopmentCard {
    /// True when the card carries `effect`.
    #[must_use]
    pub fn has_effect(&self, effect: CardEffect) -> bool {
        self.effects.contains(&effect)
    }

    /// True for gray cards whose bonus color is chosen by the buyer.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.has_effect(CardEffect::Wildcard)
    }
}
