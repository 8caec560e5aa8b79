//! Card data: development cards, cost formulas, the catalog and nobles.
//!
//! ## Key Types
//!
//! - `CardId`: Catalog index, printed code on the wire
//! - `DevelopmentCard`: Immutable card data
//! - `Catalog`: Enumerate, filter by level, look up by id or code
//! - `NobleCard`: The four crown-threshold rewards
//!
//! Everything here is pure and deterministic. Randomness belongs to deck
//! shuffling in the board module.

pub mod catalog;
pub mod definition;
pub mod formula;
pub mod noble;

pub use catalog::{card, catalog, Catalog};
pub use definition::{CardEffect, CardId, CardLevel, DevelopmentCard};
pub use formula::{parse_cost_formula, rotation_row, ROTATION};
pub use noble::{noble, NobleCard, NobleId};
