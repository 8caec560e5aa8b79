//! Chat and action history, kept for replay to joining connections.
//!
//! History entries are derived from the events of one accepted action. Each
//! carries a short English description plus the tokens, cards and nobles it
//! mentions so a client can render its own icons. Cards reserved blind from
//! a deck are never named, the same way state frames withhold them from
//! the owner's opponent.

use chrono::{DateTime, Utc};
use im::Vector;
use serde::Serialize;
use uuid::Uuid;

use crate::cards::{card, CardId, NobleId};
use crate::core::event::{GameEvent, PrivilegeSource};
use crate::core::gem::{GemCounts, GemType};
use crate::core::player::{PlayerId, Seat};
use crate::core::state::MatchState;

/// One line of chat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEntry {
    pub id: Uuid,
    pub player_id: PlayerId,
    pub player_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// One audit line describing part of an accepted action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub player_id: PlayerId,
    pub player_name: String,
    /// Wire name of the action that produced this entry.
    pub action_type: &'static str,
    pub description: String,
    pub gems: Vec<GemType>,
    pub cards: Vec<CardId>,
    pub nobles: Vec<NobleId>,
    pub timestamp: DateTime<Utc>,
}

/// Bounded replay buffers. Cloning is O(1).
#[derive(Clone, Debug, Default)]
pub struct ReplayLog {
    chat: Vector<ChatEntry>,
    history: Vector<HistoryEntry>,
    cap: usize,
}

impl ReplayLog {
    /// Empty log keeping at most `cap` entries of each kind.
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self { chat: Vector::new(), history: Vector::new(), cap }
    }

    pub fn push_chat(&mut self, entry: ChatEntry) {
        self.chat.push_back(entry);
        while self.chat.len() > self.cap {
            self.chat.pop_front();
        }
    }

    pub fn push_history(&mut self, entry: HistoryEntry) {
        self.history.push_back(entry);
        while self.history.len() > self.cap {
            self.history.pop_front();
        }
    }

    #[must_use]
    pub fn chat(&self) -> &Vector<ChatEntry> {
        &self.chat
    }

    #[must_use]
    pub fn history(&self) -> &Vector<HistoryEntry> {
        &self.history
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chat.is_empty() && self.history.is_empty()
    }
}

fn expand(counts: &GemCounts) -> Vec<GemType> {
    counts
        .nonzero()
        .flat_map(|(gem, n)| std::iter::repeat(gem).take(n as usize))
        .collect()
}

fn list(gems: &[GemType]) -> String {
    gems.iter().map(|g| g.name()).collect::<Vec<_>>().join(", ")
}

fn name_of(state: &MatchState, seat: Seat) -> &str {
    state.players.get(seat.index()).map_or("?", |p| p.name.as_str())
}

struct Line {
    description: String,
    gems: Vec<GemType>,
    cards: Vec<CardId>,
    nobles: Vec<NobleId>,
}

impl Line {
    fn text(description: impl Into<String>) -> Self {
        Self { description: description.into(), gems: Vec::new(), cards: Vec::new(), nobles: Vec::new() }
    }

    fn gems(mut self, gems: Vec<GemType>) -> Self {
        self.gems = gems;
        self
    }

    fn card(mut self, id: CardId) -> Self {
        self.cards.push(id);
        self
    }

    fn noble(mut self, id: NobleId) -> Self {
        self.nobles.push(id);
        self
    }
}

fn describe_event(state: &MatchState, event: &GameEvent) -> Option<Line> {
    let line = match event {
        GameEvent::MatchStarted { first } => {
            Line::text(format!("started the match; {} moves first", name_of(state, *first)))
        }
        GameEvent::GemsTaken { taken, .. } => {
            let gems: Vec<_> = taken.iter().map(|&(_, g)| g).collect();
            Line::text(format!("took gems: {}", list(&gems))).gems(gems)
        }
        GameEvent::PrivilegeSpent { count, taken, .. } => {
            let gems: Vec<_> = taken.iter().map(|&(_, g)| g).collect();
            Line::text(format!("spent {count} privilege(s) to take {}", list(&gems))).gems(gems)
        }
        GameEvent::BoardRefilled { placed, .. } => {
            Line::text(format!("refilled the board with {} token(s)", placed.len()))
        }
        GameEvent::PrivilegeGranted { to, from } => {
            let source = match from {
                PrivilegeSource::Pool => "from the pool",
                PrivilegeSource::Opponent => "from the opponent",
            };
            Line::text(format!("{} received a privilege token {source}", name_of(state, *to)))
        }
        GameEvent::CardReserved { level, blind: true, .. } => {
            Line::text(format!("reserved a {level} card from the deck and took 1 gold"))
                .gems(vec![GemType::Gold])
        }
        GameEvent::CardReserved { card: id, level, .. } => {
            Line::text(format!("reserved {id} ({level}) and took 1 gold"))
                .gems(vec![GemType::Gold])
                .card(*id)
        }
        GameEvent::CardPurchased { card: id, payment, from_reserve, .. } => {
            let level = card(*id).level;
            let line = if payment.is_empty() {
                Line::text(format!("took {id} ({level}) for free"))
            } else {
                let source = if *from_reserve { "reserved card " } else { "" };
                let paid = expand(payment);
                Line::text(format!("paid {} for {source}{id} ({level})", list(&paid))).gems(paid)
            };
            line.card(*id)
        }
        GameEvent::ExtraTokenTaken { gem, .. } => {
            Line::text(format!("took an extra {gem} token")).gems(vec![*gem])
        }
        GameEvent::GemStolen { gem, .. } => {
            Line::text(format!("stole a {gem} token")).gems(vec![*gem])
        }
        GameEvent::WildcardColored { card: id, color, .. } => {
            Line::text(format!("placed wildcard {id} in the {color} group")).card(*id)
        }
        GameEvent::ExtraTurnBanked { .. } => Line::text("gained an extra turn"),
        GameEvent::ExtraTurnUsed { .. } => Line::text("takes the extra turn"),
        GameEvent::NobleClaimed { noble, .. } => Line::text(format!("claimed {noble}")).noble(*noble),
        GameEvent::DiscardRequired { target, .. } => {
            Line::text(format!("must discard down to {target} tokens"))
        }
        GameEvent::GemsDiscarded { gems, .. } => {
            let gems = expand(gems);
            Line::text(format!("discarded {}", list(&gems))).gems(gems)
        }
        GameEvent::MatchWon { .. } => Line::text("won the match"),
        GameEvent::SlotRefilled { .. }
        | GameEvent::TurnPassed { .. }
        | GameEvent::EffectIgnored { .. }
        | GameEvent::NobleIgnored { .. } => return None,
    };
    Some(line)
}

/// History entries for the events of one action by `actor`.
#[must_use]
pub fn describe(
    state: &MatchState,
    actor: PlayerId,
    action_type: &'static str,
    events: &[GameEvent],
    now: DateTime<Utc>,
) -> Vec<HistoryEntry> {
    let player_name = state.player_by_id(actor).map(|p| p.name.clone()).unwrap_or_default();
    events
        .iter()
        .filter_map(|event| describe_event(state, event))
        .map(|line| HistoryEntry {
            id: Uuid::new_v4(),
            player_id: actor,
            player_name: player_name.clone(),
            action_type,
            description: line.description,
            gems: line.gems,
            cards: line.cards,
            nobles: line.nobles,
            timestamp: now,
        })
        .collect()
}
