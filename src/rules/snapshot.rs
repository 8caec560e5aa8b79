//! Serializable view of a match for clients.
//!
//! Face-up cards are expanded to full card data, while decks and the bag are
//! reduced to counts. A captured snapshot still names every reserved card;
//! [`MatchSnapshot::masked_for`] hides cards reserved blind from everyone
//! but their owner before the snapshot leaves the server.

use chrono::{DateTime, Utc};
use serde::Serialize;
use smallvec::SmallVec;

use crate::board::{Board, SlotRef};
use crate::cards::{card, noble, CardId, CardLevel, DevelopmentCard, NobleCard};
use crate::core::gem::{GemCounts, GemType};
use crate::core::player::{Player, PlayerId, Seat};
use crate::core::state::{MatchState, MatchStatus, TurnFlags, TurnPhase};

/// Face-up cards and deck size for one level.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelView {
    pub level: CardLevel,
    /// `None` marks an empty slot.
    pub face_up: Vec<Option<&'static DevelopmentCard>>,
    pub deck_count: usize,
}

/// A seated player as one viewer sees them.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    #[serde(flatten)]
    pub player: Player,
    /// Levels of reserved cards withheld from this viewer.
    pub hidden_reserved: Vec<CardLevel>,
}

impl PlayerView {
    fn mask(&mut self) {
        let blind = std::mem::take(&mut self.player.blind);
        self.player.reserved.retain(|id| !blind.contains(id));
        self.hidden_reserved.extend(blind.iter().map(|&id| card(id).level));
    }
}

/// Full state at one version.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSnapshot {
    /// Incremented on every accepted action.
    pub version: u64,
    pub status: MatchStatus,
    pub current_seat: Seat,
    pub current_player: Option<PlayerId>,
    pub turn: u32,
    pub winner: Option<PlayerId>,
    pub phase: TurnPhase,
    pub pending_refill: Option<SlotRef>,
    pub flags: TurnFlags,
    pub privilege_pool: u8,
    pub board: Board,
    pub bag: GemCounts,
    pub market: Vec<LevelView>,
    pub available_nobles: SmallVec<[&'static NobleCard; 4]>,
    pub players: Vec<PlayerView>,
    pub card_colors: Vec<(CardId, GemType)>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
}

impl MatchSnapshot {
    /// The snapshot as `viewer` may see it. Spectators pass `None`.
    #[must_use]
    pub fn masked_for(&self, viewer: Option<PlayerId>) -> Self {
        let mut view = self.clone();
        for seated in view.players.iter_mut().filter(|p| Some(p.player.id) != viewer) {
            seated.mask();
        }
        view
    }
}

/// Capture the full view of `state`.
#[must_use]
pub fn capture(state: &MatchState, version: u64) -> MatchSnapshot {
    let market = CardLevel::ALL
        .iter()
        .map(|&level| LevelView {
            level,
            face_up: state.market.face_up(level).iter().map(|slot| slot.map(card)).collect(),
            deck_count: state.market.deck_len(level),
        })
        .collect();

    let mut card_colors: Vec<_> = state.card_colors.iter().map(|(&id, &gem)| (id, gem)).collect();
    card_colors.sort_unstable();

    let id_at = |seat: Seat| state.players.get(seat.index()).map(|p| p.id);

    MatchSnapshot {
        version,
        status: state.status,
        current_seat: state.current,
        current_player: id_at(state.current),
        turn: state.turn,
        winner: state.winner.and_then(id_at),
        phase: state.phase,
        pending_refill: state.pending_refill,
        flags: state.flags,
        privilege_pool: state.privilege_pool,
        board: state.board.clone(),
        bag: state.bag.counts(),
        market,
        available_nobles: state.available_nobles.iter().map(|&id| noble(id)).collect(),
        players: state
            .players
            .iter()
            .map(|player| PlayerView { player: player.clone(), hidden_reserved: Vec::new() })
            .collect(),
        card_colors,
        created_at: state.created_at,
        started_at: state.started_at,
    }
}
