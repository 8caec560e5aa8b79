//! # gem-duel
//!
//! Authoritative rules engine and session layer for a two-player gem
//! drafting duel.
//!
//! ## Design Principles
//!
//! 1. **One writer**: match state changes only through
//!    `RulesEngine::apply_action`. Handlers validate completely before the
//!    first write, so a rejected action leaves the state untouched.
//!
//! 2. **Typed at the boundary**: wire payloads become a typed `Action` before
//!    they reach the engine; unknown or malformed fields are rejected.
//!
//! 3. **Deterministic**: all randomness flows through a seeded `GameRng`.
//!    Same seed, same match.
//!
//! ## Architecture
//!
//! - **Immutable catalog**: card data is built once. Per-match changes such
//!   as wildcard colors live in an overlay on the match state.
//!
//! - **Explicit turn phase**: pending discards and deferred slot refills are
//!   modelled as state, not flags scattered across handlers.
//!
//! - **Bounded fan-out**: each connection has a bounded outbound queue; a
//!   consumer that falls behind is evicted rather than slowing the match.
//!
//! ## Modules
//!
//! - `core`: Gems, players, RNG, configuration, actions, events, errors, state
//! - `cards`: Development cards, cost formulas, catalog, nobles
//! - `board`: Token grid, bag, card market
//! - `effects`: Effect selections, privilege circulation, effect resolution
//! - `rules`: `RulesEngine` and the duel rules, snapshots
//! - `session`: Rooms, wire messages, broadcast, connection tasks

pub mod board;
pub mod cards;
pub mod core;
pub mod effects;
pub mod rules;
pub mod session;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionError, GameConfig, GameEvent, GameRng, GemCounts, GemType, MatchState,
    MatchStatus, Player, PlayerId, ReserveTarget, Seat, StartingPlayer, TurnPhase,
};

pub use crate::board::{Bag, Board, Market, Position, SlotRef};

pub use crate::cards::{card, catalog, CardEffect, CardId, CardLevel, DevelopmentCard, NobleId};

pub use crate::effects::{Choice, EffectChoices, NobleChoice};

pub use crate::rules::{capture, DuelRules, GameResult, MatchSnapshot, RulesEngine};

pub use crate::session::{serve_connection, Hub, Registry, RoomId, ServerConfig, Session};
