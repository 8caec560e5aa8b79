//! Core match types: gems, players, RNG, configuration, actions, events,
//! errors and the authoritative match state.

pub mod action;
pub mod config;
pub mod error;
pub mod event;
pub mod gem;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{Action, ReserveTarget};
pub use config::{GameConfig, StartingPlayer};
pub use error::{ActionError, CatalogError, InvariantViolation, ProtocolError, RoomError};
pub use event::{GameEvent, IgnoredReason, PrivilegeSource};
pub use gem::{GemCounts, GemType};
pub use player::{Player, PlayerId, Seat};
pub use rng::GameRng;
pub use state::{MatchState, MatchStatus, TurnFlags, TurnPhase, MAX_RESERVED, PRIVILEGE_TOKENS};
