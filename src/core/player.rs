//! Player identity, seats, and per-player match data.
//!
//! ## PlayerId
//!
//! Opaque identifier handed to a client when it creates or joins a room.
//!
//! ## Seat
//!
//! Turn-order position (0 = host, 1 = guest). The rules engine indexes
//! players by seat; the session layer maps ids to seats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

use crate::cards::{CardId, NobleId};

use super::gem::{GemCounts, GemType};

/// Player identifier, stable for the lifetime of a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Fresh random id.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Deterministic id, mostly for tests.
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Seat index in a two-player match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seat(pub u8);

impl Seat {
    /// Number of seats at the table.
    pub const COUNT: usize = 2;

    /// The host's seat.
    pub const HOST: Seat = Seat(0);

    /// Create a seat.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The seat that moves after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self((self.0 + 1) % Self::COUNT as u8)
    }

    /// The other seat.
    #[must_use]
    pub const fn opponent(self) -> Self {
        self.next()
    }

    /// Both seats in turn order.
    pub fn all() -> impl Iterator<Item = Seat> {
        (0..Self::COUNT as u8).map(Seat)
    }
}

impl std::fmt::Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Seat {}", self.0)
    }
}

/// Everything one player owns in a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Held tokens, all seven kinds.
    pub gems: GemCounts,
    /// Permanent discounts from owned cards. Only the five colors are used.
    pub bonus: GemCounts,
    pub reserved: SmallVec<[CardId; 3]>,
    /// Reserved cards drawn face down from a deck. Only the owner sees them.
    #[serde(skip)]
    pub blind: SmallVec<[CardId; 3]>,
    pub owned: Vec<CardId>,
    /// Privilege tokens held (0..=3).
    pub privileges: u8,
    pub crowns: u32,
    pub points: u32,
    pub nobles: SmallVec<[NobleId; 4]>,
    /// Banked extra-turn credits.
    pub extra_turns: u32,
    pub is_host: bool,
    pub last_active: DateTime<Utc>,
}

impl Player {
    /// A fresh player with empty holdings.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, is_host: bool) -> Self {
        Self {
            id,
            name: name.into(),
            gems: GemCounts::new(),
            bonus: GemCounts::new(),
            reserved: SmallVec::new(),
            blind: SmallVec::new(),
            owned: Vec::new(),
            privileges: 0,
            crowns: 0,
            points: 0,
            nobles: SmallVec::new(),
            extra_turns: 0,
            is_host,
            last_active: Utc::now(),
        }
    }

    /// Total held tokens.
    #[must_use]
    pub fn held_tokens(&self) -> u32 {
        self.gems.total()
    }

    /// Largest bonus in a single common color.
    #[must_use]
    pub fn max_color_bonus(&self) -> u32 {
        GemType::COLORS
            .iter()
            .map(|&c| self.bonus.get(c))
            .max()
            .unwrap_or(0)
    }

    /// Record activity.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_active = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_rotation() {
        assert_eq!(Seat::HOST.next(), Seat::new(1));
        assert_eq!(Seat::new(1).next(), Seat::HOST);
        assert_eq!(Seat::new(1).opponent(), Seat::HOST);
        assert_eq!(Seat::all().count(), 2);
    }

    #[test]
    fn test_player_defaults() {
        let player = Player::new(PlayerId::from_u128(7), "ada", true);
        assert_eq!(player.held_tokens(), 0);
        assert_eq!(player.max_color_bonus(), 0);
        assert!(player.reserved.is_empty());
        assert_eq!(player.privileges, 0);
    }

    #[test]
    fn test_max_color_bonus_ignores_tokens() {
        let mut player = Player::new(PlayerId::random(), "bo", false);
        player.bonus.add(GemType::Green, 4);
        player.bonus.add(GemType::Red, 2);
        assert_eq!(player.max_color_bonus(), 4);
    }

    #[test]
    fn test_player_serializes_camel_case() {
        let player = Player::new(PlayerId::from_u128(1), "cy", false);
        let json = serde_json::to_value(&player).unwrap();
        assert!(json.get("extraTurns").is_some());
        assert!(json.get("lastActive").is_some());
        assert!(json.get("isHost").is_some());
    }
}
