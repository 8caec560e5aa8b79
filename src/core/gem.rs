//! Gem token kinds and per-kind token counts.
//!
//! ## GemType
//!
//! Five common colors plus pearl and gold are physical tokens. `Gray` is the
//! neutral bonus color printed on special cards; it never exists as a token.
//!
//! ## GemCounts
//!
//! A fixed array indexed by token kind. Used for hands, bonuses, card costs,
//! payment plans and bag tallies. Serializes as a `{"white": n, ...}` map.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A gem kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GemType {
    White,
    Blue,
    Green,
    Red,
    Black,
    Pearl,
    Gold,
    /// Neutral color of special cards before a wildcard color is chosen.
    Gray,
}

impl GemType {
    /// The five common colors, in catalog order.
    pub const COLORS: [GemType; 5] = [
        GemType::White,
        GemType::Blue,
        GemType::Green,
        GemType::Red,
        GemType::Black,
    ];

    /// Every kind that exists as a physical token.
    pub const TOKENS: [GemType; 7] = [
        GemType::White,
        GemType::Blue,
        GemType::Green,
        GemType::Red,
        GemType::Black,
        GemType::Pearl,
        GemType::Gold,
    ];

    /// Slot in a [`GemCounts`] array. `None` for gray.
    #[must_use]
    pub const fn token_index(self) -> Option<usize> {
        match self {
            GemType::White => Some(0),
            GemType::Blue => Some(1),
            GemType::Green => Some(2),
            GemType::Red => Some(3),
            GemType::Black => Some(4),
            GemType::Pearl => Some(5),
            GemType::Gold => Some(6),
            GemType::Gray => None,
        }
    }

    /// True for the five common colors.
    #[must_use]
    pub const fn is_color(self) -> bool {
        matches!(
            self,
            GemType::White | GemType::Blue | GemType::Green | GemType::Red | GemType::Black
        )
    }

    /// True for kinds that exist as tokens (everything but gray).
    #[must_use]
    pub const fn is_token(self) -> bool {
        !matches!(self, GemType::Gray)
    }

    /// Lowercase wire name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            GemType::White => "white",
            GemType::Blue => "blue",
            GemType::Green => "green",
            GemType::Red => "red",
            GemType::Black => "black",
            GemType::Pearl => "pearl",
            GemType::Gold => "gold",
            GemType::Gray => "gray",
        }
    }

    /// Parse a lowercase wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "white" => Some(GemType::White),
            "blue" => Some(GemType::Blue),
            "green" => Some(GemType::Green),
            "red" => Some(GemType::Red),
            "black" => Some(GemType::Black),
            "pearl" => Some(GemType::Pearl),
            "gold" => Some(GemType::Gold),
            "gray" => Some(GemType::Gray),
            _ => None,
        }
    }
}

impl fmt::Display for GemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Token counts for the seven token kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GemCounts([u32; 7]);

impl GemCounts {
    /// All zeros.
    #[must_use]
    pub const fn new() -> Self {
        Self([0; 7])
    }

    /// The full 25-token universe: 4 of each color, 2 pearls, 3 gold.
    #[must_use]
    pub const fn universe() -> Self {
        Self([4, 4, 4, 4, 4, 2, 3])
    }

    /// Build from `(kind, amount)` pairs. Gray entries are ignored.
    #[must_use]
    pub fn from_pairs(pairs: &[(GemType, u32)]) -> Self {
        let mut counts = Self::new();
        for &(gem, amount) in pairs {
            counts.add(gem, amount);
        }
        counts
    }

    /// Count for a kind. Always zero for gray.
    #[must_use]
    pub fn get(&self, gem: GemType) -> u32 {
        gem.token_index().map_or(0, |i| self.0[i])
    }

    /// Overwrite the count for a kind. Gray is ignored.
    pub fn set(&mut self, gem: GemType, amount: u32) {
        if let Some(i) = gem.token_index() {
            self.0[i] = amount;
        }
    }

    /// Add tokens of a kind. Gray is ignored.
    pub fn add(&mut self, gem: GemType, amount: u32) {
        if let Some(i) = gem.token_index() {
            self.0[i] += amount;
        }
    }

    /// Remove tokens of a kind. Returns false (and changes nothing) when
    /// fewer than `amount` are held.
    pub fn remove(&mut self, gem: GemType, amount: u32) -> bool {
        match gem.token_index() {
            Some(i) if self.0[i] >= amount => {
                self.0[i] -= amount;
                true
            }
            Some(_) => false,
            None => amount == 0,
        }
    }

    /// Sum over every kind.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    /// True when every count is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&n| n == 0)
    }

    /// True when `self` holds at least `other` of every kind.
    #[must_use]
    pub fn covers(&self, other: &GemCounts) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| a >= b)
    }

    /// Add every count of `other`.
    pub fn add_all(&mut self, other: &GemCounts) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a += b;
        }
    }

    /// Subtract every count of `other`. Returns false (and changes nothing)
    /// if any count would underflow.
    pub fn remove_all(&mut self, other: &GemCounts) -> bool {
        if !self.covers(other) {
            return false;
        }
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a -= b;
        }
        true
    }

    /// Iterate `(kind, count)` over all seven token kinds.
    pub fn iter(&self) -> impl Iterator<Item = (GemType, u32)> + '_ {
        GemType::TOKENS.iter().map(move |&g| (g, self.get(g)))
    }

    /// Iterate `(kind, count)` over kinds with a non-zero count.
    pub fn nonzero(&self) -> impl Iterator<Item = (GemType, u32)> + '_ {
        self.iter().filter(|&(_, n)| n > 0)
    }
}

impl Serialize for GemCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(GemType::TOKENS.len()))?;
        for (gem, count) in self.iter() {
            map.serialize_entry(gem.name(), &count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for GemCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CountsVisitor;

        impl<'de> Visitor<'de> for CountsVisitor {
            type Value = GemCounts;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from token kind to non-negative count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<GemCounts, A::Error> {
                let mut counts = GemCounts::new();
                let mut seen = [false; 7];
                while let Some((gem, amount)) = access.next_entry::<GemType, u32>()? {
                    let Some(i) = gem.token_index() else {
                        return Err(serde::de::Error::custom("gray is not a token kind"));
                    };
                    if seen[i] {
                        return Err(serde::de::Error::custom(format!("duplicate entry for {gem}")));
                    }
                    seen[i] = true;
                    counts.0[i] = amount;
                }
                Ok(counts)
            }
        }

        deserializer.deserialize_map(CountsVisitor)
    }
}
