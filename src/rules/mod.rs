//! Rules engine for the duel.
//!
//! `DuelRules` implements `RulesEngine`. Each action family lives in its own
//! module:
//! - `gems`: taking tokens, spending privileges, refilling the board
//! - `cards`: reserving and buying development cards
//! - `turn`: start, end of turn, discards, extra turns, win check
//! - `snapshot`: the public view sent to clients

mod cards;
pub mod engine;
mod gems;
pub mod payment;
pub mod snapshot;
mod turn;

pub use engine::{DuelRules, GameResult, RulesEngine};
pub use gems::MAX_TAKE;
pub use payment::{required_payment, validate_payment};
pub use snapshot::{capture, LevelView, MatchSnapshot, PlayerView};
pub use turn::check_winner;
