//! Authoritative match state.
//!
//! ## MatchState
//!
//! Everything one match owns: seats, board, bag, market, privilege pool,
//! nobles, turn bookkeeping and the per-match wildcard color overlay. The
//! rules engine is the only writer.
//!
//! ## Turn bookkeeping
//!
//! - `phase`: waiting for an action, or for the owner's discard
//! - `pending_refill`: face-up slot vacated this turn, refilled at turn end
//! - `flags`: what has happened so far this turn
//!
//! ## Invariants
//!
//! Checked by [`MatchState::verify_invariants`] after every accepted action:
//! privilege tokens total 3, each token kind totals its universe count across
//! board, bag and hands, every card sits in exactly one location, and no
//! player exceeds 3 reserved cards or 3 privileges.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::board::{Bag, Board, Market, SlotRef};
use crate::cards::{card, catalog, CardId, NobleId};

use super::error::InvariantViolation;
use super::gem::{GemCounts, GemType};
use super::player::{Player, PlayerId, Seat};
use super::rng::GameRng;

/// Privilege tokens in the game.
pub const PRIVILEGE_TOKENS: u8 = 3;

/// Most reserved cards any player may hold.
pub const MAX_RESERVED: usize = 3;

/// Match lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Waiting,
    Playing,
    Finished,
}

/// What the match is waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum TurnPhase {
    AwaitingAction,
    /// `owner` must discard down to `target` held tokens before play resumes.
    AwaitingDiscard { target: u32, owner: Seat },
}

/// Per-turn progress. Reset whenever the turn passes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnFlags {
    pub main_action_taken: bool,
    pub refilled: bool,
    /// A greedy take owes the opponent a privilege token.
    pub opponent_privilege_owed: bool,
}

/// One match.
#[derive(Clone, Debug)]
pub struct MatchState {
    pub status: MatchStatus,
    /// Indexed by seat.
    pub players: Vec<Player>,
    pub current: Seat,
    /// Starts at 1 when play begins.
    pub turn: u32,
    pub winner: Option<Seat>,
    pub phase: TurnPhase,
    pub pending_refill: Option<SlotRef>,
    pub flags: TurnFlags,
    pub privilege_pool: u8,
    pub board: Board,
    pub bag: Bag,
    pub market: Market,
    pub available_nobles: SmallVec<[NobleId; 4]>,
    /// Bonus colors chosen for wildcard cards in this match.
    pub card_colors: FxHashMap<CardId, GemType>,
    pub rng: GameRng,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
}

impl MatchState {
    /// A waiting match: board filled along the spiral from a shuffled bag,
    /// decks shuffled and dealt, nobody seated.
    #[must_use]
    pub fn new(mut rng: GameRng) -> Self {
        let (board, bag) = Board::new_shuffled(&mut rng);
        let market = Market::new_shuffled(&mut rng);

        Self::from_parts(board, bag, market, rng)
    }

    /// A waiting match over explicit components.
    #[must_use]
    pub fn from_parts(board: Board, bag: Bag, market: Market, rng: GameRng) -> Self {
        Self {
            status: MatchStatus::Waiting,
            players: Vec::with_capacity(Seat::COUNT),
            current: Seat::HOST,
            turn: 0,
            winner: None,
            phase: TurnPhase::AwaitingAction,
            pending_refill: None,
            flags: TurnFlags::default(),
            privilege_pool: PRIVILEGE_TOKENS,
            board,
            bag,
            market,
            available_nobles: SmallVec::from_slice(&NobleId::ALL),
            card_colors: FxHashMap::default(),
            rng,
            created_at: Utc::now(),
            started_at: None,
        }
    }

    /// Seat a player in the next free seat. `None` when the table is full.
    pub fn seat_player(&mut self, player: Player) -> Option<Seat> {
        if self.players.len() >= Seat::COUNT {
            return None;
        }
        let seat = Seat::new(self.players.len() as u8);
        self.players.push(player);
        Some(seat)
    }

    /// True when both seats are taken.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.players.len() == Seat::COUNT
    }

    /// Seat held by `id`.
    #[must_use]
    pub fn seat_of(&self, id: PlayerId) -> Option<Seat> {
        self.players
            .iter()
            .position(|p| p.id == id)
            .map(|i| Seat::new(i as u8))
    }

    /// Player in a seat. Seats handed out by `seat_player` are always valid.
    #[must_use]
    pub fn player(&self, seat: Seat) -> &Player {
        &self.players[seat.index()]
    }

    /// Mutable player in a seat.
    pub fn player_mut(&mut self, seat: Seat) -> &mut Player {
        &mut self.players[seat.index()]
    }

    /// Player by id.
    #[must_use]
    pub fn player_by_id(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Effective bonus color of a card: the wildcard overlay if set, else
    /// the printed color.
    #[must_use]
    pub fn card_color(&self, id: CardId) -> GemType {
        self.card_colors
            .get(&id)
            .copied()
            .unwrap_or_else(|| card(id).color)
    }

    /// Tokens across board, bag and hands.
    #[must_use]
    pub fn token_totals(&self) -> GemCounts {
        let mut totals = self.board.counts();
        totals.add_all(&self.bag.counts());
        for player in &self.players {
            totals.add_all(&player.gems);
        }
        totals
    }

    /// Check every conservation rule.
    pub fn verify_invariants(&self) -> Result<(), InvariantViolation> {
        let held: u32 = self.players.iter().map(|p| u32::from(p.privileges)).sum();
        let privileges = u32::from(self.privilege_pool) + held;
        if privileges != u32::from(PRIVILEGE_TOKENS) {
            return Err(InvariantViolation::PrivilegeTotal(privileges));
        }

        let totals = self.token_totals();
        let universe = GemCounts::universe();
        for gem in GemType::TOKENS {
            if totals.get(gem) != universe.get(gem) {
                return Err(InvariantViolation::TokenTotal {
                    gem,
                    counted: totals.get(gem),
                    expected: universe.get(gem),
                });
            }
        }

        let mut locations = vec![0usize; catalog().len()];
        let mut place = |id: CardId| {
            if let Some(slot) = locations.get_mut(id.index()) {
                *slot += 1;
            }
        };
        self.market.cards().for_each(&mut place);
        for player in &self.players {
            player.reserved.iter().copied().for_each(&mut place);
            player.owned.iter().copied().for_each(&mut place);
        }
        if let Some((i, &count)) = locations.iter().enumerate().find(|&(_, &n)| n != 1) {
            return Err(InvariantViolation::CardLocation {
                card: CardId::new(i as u16),
                count,
            });
        }

        for player in &self.players {
            if player.reserved.len() > MAX_RESERVED {
                return Err(InvariantViolation::ReserveOverflow {
                    player: player.id,
                    count: player.reserved.len(),
                });
            }
            if player.privileges > PRIVILEGE_TOKENS {
                return Err(InvariantViolation::PrivilegeOverflow {
                    player: player.id,
                    count: player.privileges,
                });
            }
        }

        Ok(())
    }
}
