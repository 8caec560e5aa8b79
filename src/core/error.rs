//! Error types.
//!
//! Validation failures are ordinary values returned to the caller; the match
//! state is left untouched. `InvariantViolation` is different: it reports a
//! conservation breach, which is a bug in the engine, and callers panic on it.

use thiserror::Error;

use crate::board::Position;
use crate::cards::{CardId, CardLevel};

use super::gem::GemType;
use super::player::PlayerId;

/// Malformed built-in card data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("{0} has no rotation row")]
    NotACommonColor(GemType),
    #[error("malformed token {token:?} in cost formula {formula:?}")]
    MalformedToken { formula: String, token: String },
    #[error("unknown symbol {symbol:?} in cost formula {formula:?}")]
    UnknownSymbol { formula: String, symbol: char },
    #[error("symbol {symbol:?} repeated in cost formula {formula:?}")]
    DuplicateSymbol { formula: String, symbol: char },
    #[error("card id {0:?} defined twice")]
    DuplicateCard(String),
}

/// A rejected game action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("player {0} is not seated in this match")]
    NotSeated(PlayerId),
    #[error("the match has not started")]
    NotStarted,
    #[error("the match has already started")]
    AlreadyStarted,
    #[error("the match is finished")]
    Finished,
    #[error("two players are needed to start")]
    NotEnoughPlayers,
    #[error("it is not your turn")]
    NotYourTurn,

    #[error("a discard is pending")]
    DiscardPending,
    #[error("no discard is pending")]
    NoDiscardPending,
    #[error("main action already taken this turn")]
    MainActionTaken,
    #[error("a main action is required before ending the turn")]
    MainActionRequired,
    #[error("the board was already refilled this turn")]
    AlreadyRefilled,
    #[error("privileges cannot be spent after refilling the board")]
    RefilledThisTurn,
    #[error("no privilege is owed to the opponent")]
    NoPrivilegeOwed,

    #[error("position ({x}, {y}) is off the board")]
    OutOfBounds { x: i64, y: i64 },
    #[error("cell {0} is empty")]
    EmptyCell(Position),
    #[error("position {0} selected twice")]
    DuplicatePosition(Position),
    #[error("select between {min} and {max} cells, got {got}")]
    SelectionSize { min: usize, max: usize, got: usize },
    #[error("selected cells are not a straight contiguous line")]
    NotALine,
    #[error("cell {0} does not hold gold")]
    NotGold(Position),

    #[error("need {need} privilege tokens, hold {have}")]
    InsufficientPrivileges { need: u8, have: u8 },
    #[error("privilege count must be 1..=3, got {0}")]
    InvalidPrivilegeCount(u8),
    #[error("{count} privileges spent for {positions} cells")]
    PrivilegeMismatch { count: u8, positions: usize },
    #[error("the bag is empty")]
    BagEmpty,

    #[error("reserve limit of {0} reached")]
    ReserveLimit(usize),
    #[error("no cards left in {0}")]
    DeckEmpty(CardLevel),
    #[error("no deck has cards left")]
    AllDecksEmpty,
    #[error("card {0} is not available to you")]
    CardNotAvailable(CardId),

    #[error("hold {held} {gem}, payment needs {needed}")]
    InsufficientTokens { gem: GemType, held: u32, needed: u32 },
    #[error("{gem} payment of {offered} exceeds the {required} required")]
    Overpayment { gem: GemType, offered: u32, required: u32 },
    #[error("gold payment must be exactly {required}, got {offered}")]
    GoldMismatch { offered: u32, required: u32 },

    #[error("{0} is not a token kind")]
    NotAToken(GemType),
    #[error("only {owner} may discard now")]
    NotDiscardOwner { owner: PlayerId },
    #[error("discarding {requested} would drop below the limit of {target}")]
    OverDiscard { requested: u32, target: u32 },
    #[error("discard batch is empty")]
    EmptyDiscard,
}

/// A room directory failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("room name must not be empty")]
    EmptyRoomName,
    #[error("player name must not be empty")]
    EmptyPlayerName,
    #[error("room {0:?} already exists")]
    DuplicateRoom(String),
    #[error("room {0:?} not found")]
    UnknownRoom(String),
    #[error("room {0:?} is full")]
    RoomFull(String),
    #[error("name {0:?} is already taken in this room")]
    DuplicatePlayerName(String),
    #[error("player {0} is not in this room")]
    UnknownPlayer(PlayerId),
}

/// A malformed inbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("frame of {size} bytes exceeds the {limit} byte limit")]
    FrameTooLarge { size: usize, limit: usize },
    #[error("malformed message: {0}")]
    Malformed(String),
    #[error("unknown action type {0:?}")]
    UnknownAction(String),
    #[error("invalid {action} payload: {reason}")]
    InvalidPayload { action: String, reason: String },
    #[error("message needs a playerId")]
    MissingPlayer,
    #[error("connection is bound to a different player")]
    PlayerMismatch,
    #[error("connection is no longer attached to the room")]
    Detached,
}

/// A conservation rule that no accepted action may break.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("privilege tokens total {0}, expected 3")]
    PrivilegeTotal(u32),
    #[error("{gem} tokens total {counted}, expected {expected}")]
    TokenTotal { gem: GemType, counted: u32, expected: u32 },
    #[error("card {card} found in {count} locations")]
    CardLocation { card: CardId, count: usize },
    #[error("{player} holds {count} reserved cards")]
    ReserveOverflow { player: PlayerId, count: usize },
    #[error("{player} holds {count} privilege tokens")]
    PrivilegeOverflow { player: PlayerId, count: u8 },
}
