//! Domain events emitted by accepted actions.
//!
//! Events itemize exactly what moved so the session layer can build history
//! entries without diffing states. A blind reserve records the card it drew;
//! the history layer decides what spectators may see.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::board::{Position, SlotRef};
use crate::cards::{CardEffect, CardId, CardLevel, NobleId};

use super::gem::{GemCounts, GemType};
use super::player::Seat;

/// Where a privilege token came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivilegeSource {
    Pool,
    Opponent,
}

/// Why a choice selection had no effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoredReason {
    Skipped,
    Missing,
    Invalid,
}

/// Something that happened in the match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    MatchStarted {
        first: Seat,
    },
    GemsTaken {
        seat: Seat,
        taken: SmallVec<[(Position, GemType); 3]>,
    },
    PrivilegeSpent {
        seat: Seat,
        count: u8,
        taken: SmallVec<[(Position, GemType); 3]>,
    },
    BoardRefilled {
        seat: Seat,
        placed: Vec<(Position, GemType)>,
    },
    PrivilegeGranted {
        to: Seat,
        from: PrivilegeSource,
    },
    CardReserved {
        seat: Seat,
        card: CardId,
        level: CardLevel,
        blind: bool,
        slot: Option<SlotRef>,
    },
    CardPurchased {
        seat: Seat,
        card: CardId,
        payment: GemCounts,
        from_reserve: bool,
        slot: Option<SlotRef>,
    },
    ExtraTokenTaken {
        seat: Seat,
        position: Position,
        gem: GemType,
    },
    GemStolen {
        seat: Seat,
        gem: GemType,
    },
    WildcardColored {
        seat: Seat,
        card: CardId,
        color: GemType,
    },
    ExtraTurnBanked {
        seat: Seat,
    },
    NobleClaimed {
        seat: Seat,
        noble: NobleId,
    },
    EffectIgnored {
        seat: Seat,
        effect: CardEffect,
        reason: IgnoredReason,
    },
    NobleIgnored {
        seat: Seat,
        reason: IgnoredReason,
    },
    SlotRefilled {
        slot: SlotRef,
        card: Option<CardId>,
    },
    DiscardRequired {
        seat: Seat,
        target: u32,
    },
    GemsDiscarded {
        seat: Seat,
        gems: GemCounts,
    },
    TurnPassed {
        seat: Seat,
        turn: u32,
    },
    ExtraTurnUsed {
        seat: Seat,
    },
    MatchWon {
        seat: Seat,
    },
}
