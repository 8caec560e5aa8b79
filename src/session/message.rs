//! Wire messages.
//!
//! ## Inbound
//!
//! Every client frame is a JSON envelope tagged by `type`:
//!
//! | `type` | fields |
//! |---|---|
//! | `player_join` | `playerId`, `playerName?` |
//! | `chat_message` | `playerId?`, `message` |
//! | `start_game` | `playerId?` |
//! | `game_action` | `playerId?`, `actionType`, `data` |
//!
//! `data` is parsed strictly per `actionType` into an [`Action`]: unknown,
//! missing and mistyped fields are rejected rather than skipped.
//!
//! ## Outbound
//!
//! [`ServerMessage`] is encoded once per broadcast into a shared [`Frame`]
//! and queued to every connection.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

use crate::board::Position;
use crate::cards::{catalog, CardId, CardLevel, NobleId};
use crate::core::action::{Action, ReserveTarget};
use crate::core::error::ProtocolError;
use crate::core::gem::{GemCounts, GemType};
use crate::core::player::PlayerId;
use crate::effects::{Choice, EffectChoices, NobleChoice};
use crate::rules::MatchSnapshot;

use super::history::{ChatEntry, HistoryEntry};
use super::registry::RoomId;

/// An encoded outbound message, shared by every queue it is sent to.
pub type Frame = Arc<str>;

/// Prefix of a blind-reserve `cardId`, followed by the level number.
const BLIND_PREFIX: &str = "deck_level_";

// =============================================================================
// Inbound
// =============================================================================

/// A decoded client frame.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    PlayerJoin(Presence),
    ChatMessage(ChatIn),
    StartGame(Presence),
    GameAction(ActionEnvelope),
}

/// Identifies the sender.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presence {
    #[serde(default)]
    pub player_id: Option<PlayerId>,
    #[serde(default)]
    pub player_name: Option<String>,
}

/// A chat line from a client.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatIn {
    #[serde(default)]
    pub player_id: Option<PlayerId>,
    #[serde(default)]
    pub player_name: Option<String>,
    pub message: String,
}

/// A game action with its untyped payload.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEnvelope {
    #[serde(default)]
    pub player_id: Option<PlayerId>,
    #[serde(default)]
    pub player_name: Option<String>,
    pub action_type: String,
    #[serde(default)]
    pub data: Value,
}

impl ClientMessage {
    /// Decode a text frame, enforcing the size limit first.
    pub fn parse(text: &str, max_bytes: usize) -> Result<Self, ProtocolError> {
        if text.len() > max_bytes {
            return Err(ProtocolError::FrameTooLarge { size: text.len(), limit: max_bytes });
        }
        serde_json::from_str(text).map_err(|err| ProtocolError::Malformed(err.to_string()))
    }

    /// Player the client claims to be.
    #[must_use]
    pub fn claimed_player(&self) -> Option<PlayerId> {
        match self {
            ClientMessage::PlayerJoin(p) | ClientMessage::StartGame(p) => p.player_id,
            ClientMessage::ChatMessage(c) => c.player_id,
            ClientMessage::GameAction(a) => a.player_id,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Coord {
    x: i64,
    y: i64,
}

impl Coord {
    fn position(self, action: &str) -> Result<Position, ProtocolError> {
        Position::try_new(self.x, self.y).map_err(|err| invalid(action, err))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Empty {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct TakePayload {
    #[serde(alias = "gemPositions")]
    positions: Vec<Coord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct BuyPayload {
    card_id: CardId,
    #[serde(default)]
    payment_plan: GemCounts,
    #[serde(default)]
    effects: EffectsPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct EffectsPayload {
    extra_token: Option<ExtraTokenPick>,
    steal: Option<GemPick>,
    wildcard: Option<ColorPick>,
    noble: Option<NoblePick>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ExtraTokenPick {
    #[serde(default)]
    skip: bool,
    selected_gem: Option<Coord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct GemPick {
    #[serde(default)]
    skip: bool,
    gem_type: Option<GemType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ColorPick {
    #[serde(default)]
    skip: bool,
    color: Option<GemType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct NoblePick {
    #[serde(default)]
    skip: bool,
    id: Option<NobleId>,
    /// The noble's own steal. Falls back to the purchase's `steal` pick.
    gem_type: Option<GemType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ReservePayload {
    card_id: String,
    gold_x: i64,
    gold_y: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SpendPayload {
    privilege_count: u8,
    #[serde(alias = "gemPositions")]
    positions: Vec<Coord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct DiscardPayload {
    gem_type: GemType,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DiscardBatchPayload {
    Wrapped {
        #[serde(rename = "gemDiscards")]
        gem_discards: GemCounts,
    },
    Flat(GemCounts),
}

fn invalid(action: &str, reason: impl ToString) -> ProtocolError {
    ProtocolError::InvalidPayload { action: action.to_owned(), reason: reason.to_string() }
}

fn payload<T: DeserializeOwned>(action: &str, data: &Value) -> Result<T, ProtocolError> {
    let data = match data {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other.clone(),
    };
    serde_json::from_value(data).map_err(|err| invalid(action, err))
}

fn positions(action: &str, coords: &[Coord]) -> Result<SmallVec<[Position; 3]>, ProtocolError> {
    coords.iter().map(|c| c.position(action)).collect()
}

/// `skip: true` wins; otherwise a present value selects; neither is invalid.
fn choice<T>(action: &str, skip: bool, value: Option<T>) -> Result<Choice<T>, ProtocolError> {
    match (skip, value) {
        (true, _) => Ok(Choice::Skip),
        (false, Some(value)) => Ok(Choice::Select(value)),
        (false, None) => Err(invalid(action, "selection needs a value or skip")),
    }
}

fn reserve_target(action: &str, card_id: &str) -> Result<ReserveTarget, ProtocolError> {
    if card_id.is_empty() {
        return Ok(ReserveTarget::RandomLevel);
    }
    if let Some(level) = card_id.strip_prefix(BLIND_PREFIX) {
        return level
            .parse::<u8>()
            .ok()
            .and_then(CardLevel::from_number)
            .map(ReserveTarget::Blind)
            .ok_or_else(|| invalid(action, format!("unknown deck {card_id:?}")));
    }
    catalog()
        .lookup(card_id)
        .map(ReserveTarget::FaceUp)
        .ok_or_else(|| invalid(action, format!("unknown card id {card_id:?}")))
}

impl EffectsPayload {
    fn into_choices(self, action: &str) -> Result<EffectChoices, ProtocolError> {
        let extra_token = match self.extra_token {
            None => None,
            Some(pick) => {
                let pos = pick.selected_gem.map(|c| c.position(action)).transpose()?;
                Some(choice(action, pick.skip, pos)?)
            }
        };
        let steal_gem = self.steal.as_ref().and_then(|pick| pick.gem_type);
        let steal = self.steal.map(|pick| choice(action, pick.skip, pick.gem_type)).transpose()?;
        let wildcard = self.wildcard.map(|pick| choice(action, pick.skip, pick.color)).transpose()?;
        let noble = self
            .noble
            .map(|pick| {
                let id = pick.id.map(|noble| NobleChoice { noble, steal: pick.gem_type.or(steal_gem) });
                choice(action, pick.skip, id)
            })
            .transpose()?;

        Ok(EffectChoices { extra_token, steal, wildcard, noble })
    }
}

impl ActionEnvelope {
    /// Parse `data` for `action_type` into a typed action.
    pub fn to_action(&self) -> Result<Action, ProtocolError> {
        let kind = self.action_type.as_str();
        let data = &self.data;
        let action = match kind {
            "start_game" => {
                payload::<Empty>(kind, data)?;
                Action::StartGame
            }
            "takeGems" => {
                let p: TakePayload = payload(kind, data)?;
                Action::TakeGems { positions: positions(kind, &p.positions)? }
            }
            "buyCard" => {
                let p: BuyPayload = payload(kind, data)?;
                Action::BuyCard {
                    card: p.card_id,
                    payment: p.payment_plan,
                    choices: p.effects.into_choices(kind)?,
                }
            }
            "reserveCard" => {
                let p: ReservePayload = payload(kind, data)?;
                Action::ReserveCard {
                    target: reserve_target(kind, &p.card_id)?,
                    gold: Coord { x: p.gold_x, y: p.gold_y }.position(kind)?,
                }
            }
            "spendPrivilege" => {
                let p: SpendPayload = payload(kind, data)?;
                Action::SpendPrivilege {
                    count: p.privilege_count,
                    positions: positions(kind, &p.positions)?,
                }
            }
            "refillBoard" => {
                payload::<Empty>(kind, data)?;
                Action::RefillBoard
            }
            "grantOpponentPrivilege" => {
                payload::<Empty>(kind, data)?;
                Action::GrantOpponentPrivilege
            }
            "discardGem" => {
                let p: DiscardPayload = payload(kind, data)?;
                Action::DiscardGem { gem: p.gem_type }
            }
            "discardGemsBatch" => {
                let gems = match payload::<DiscardBatchPayload>(kind, data)? {
                    DiscardBatchPayload::Wrapped { gem_discards } => gem_discards,
                    DiscardBatchPayload::Flat(gems) => gems,
                };
                Action::DiscardGems { gems }
            }
            "endTurn" => {
                payload::<Empty>(kind, data)?;
                Action::EndTurn
            }
            other => return Err(ProtocolError::UnknownAction(other.to_owned())),
        };
        Ok(action)
    }
}

// =============================================================================
// Outbound
// =============================================================================

/// Room identity plus the current match view, sent on connect.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub id: RoomId,
    pub name: String,
    pub game_state: MatchSnapshot,
}

/// Buffered chat and history replayed to a joining connection.
#[derive(Clone, Debug, Serialize)]
pub struct ReplayView {
    pub chat: Vec<ChatEntry>,
    pub history: Vec<HistoryEntry>,
}

/// A server frame.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    RoomInfo {
        data: RoomView,
    },
    HistorySnapshot {
        data: ReplayView,
    },
    GameStateUpdate {
        #[serde(rename = "gameState")]
        game_state: MatchSnapshot,
    },
    GameStart {
        #[serde(rename = "gameState")]
        game_state: MatchSnapshot,
    },
    GameAction {
        action: HistoryEntry,
    },
    ChatMessage(ChatEntry),
    PlayerJoined {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        #[serde(rename = "playerName")]
        player_name: String,
    },
    PlayerLeft {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        #[serde(rename = "playerName")]
        player_name: String,
    },
    /// Sent to the submitter only.
    ActionRejected {
        #[serde(rename = "actionType")]
        action_type: String,
        message: String,
    },
    Error {
        message: String,
    },
    Ping,
}

impl ServerMessage {
    /// An `error` frame.
    #[must_use]
    pub fn error(message: impl ToString) -> Self {
        ServerMessage::Error { message: message.to_string() }
    }

    /// Encode once for any number of queues.
    pub fn encode(&self) -> Result<Frame, serde_json::Error> {
        serde_json::to_string(self).map(Frame::from)
    }
}
