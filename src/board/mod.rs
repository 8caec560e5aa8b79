//! Board and bag model: the token grid, the draw bag, and the card market.
//!
//! Mutated only by the rules engine.

pub mod bag;
pub mod grid;
pub mod market;

pub use bag::Bag;
pub use grid::{is_straight_line, Board, Position, BOARD_SIZE, SPIRAL_ORDER};
pub use market::{Market, SlotRef};
