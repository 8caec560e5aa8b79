//! Cost formulas for ordinary cards.
//!
//! A formula such as `"3Z 2B 1P"` names quantities by rotation symbol rather
//! than by color. Each card resolves the symbols through the rotation row
//! whose `C` entry is its own color, so one template yields five costs.
//!
//! | Symbol | Meaning |
//! |---|---|
//! | `Z` `X` `C` `V` `B` | columns 0..5 of the card's rotation row (`C` = own color) |
//! | `P` | pearl, independent of rotation |

use crate::core::error::CatalogError;
use crate::core::gem::{GemCounts, GemType};

use crate::core::gem::GemType::{Black as K, Blue as U, Green as G, Red as R, White as W};

/// The five cyclic shifts of the color order.
pub const ROTATION: [[GemType; 5]; 5] = [
    [W, U, G, R, K],
    [U, G, R, K, W],
    [G, R, K, W, U],
    [R, K, W, U, G],
    [K, W, U, G, R],
];

/// Rotation row used by a card of `color`.
#[must_use]
pub fn rotation_row(color: GemType) -> Option<&'static [GemType; 5]> {
    ROTATION.iter().find(|row| row[2] == color)
}

fn symbol_gem(symbol: char, row: &[GemType; 5]) -> Option<GemType> {
    match symbol {
        'Z' => Some(row[0]),
        'X' => Some(row[1]),
        'C' => Some(row[2]),
        'V' => Some(row[3]),
        'B' => Some(row[4]),
        'P' => Some(GemType::Pearl),
        _ => None,
    }
}

/// Resolve `formula` for a card of `color`.
///
/// Every whitespace-separated token must be a positive count followed by one
/// symbol, and no kind may appear twice.
pub fn parse_cost_formula(formula: &str, color: GemType) -> Result<GemCounts, CatalogError> {
    let row = rotation_row(color).ok_or(CatalogError::NotACommonColor(color))?;
    let mut cost = GemCounts::new();

    for token in formula.split_whitespace() {
        let malformed = || CatalogError::MalformedToken {
            formula: formula.to_string(),
            token: token.to_string(),
        };

        let symbol = token.chars().last().ok_or_else(malformed)?;
        let digits = &token[..token.len() - symbol.len_utf8()];
        let amount: u32 = digits.parse().map_err(|_| malformed())?;
        if amount == 0 {
            return Err(malformed());
        }
        let gem = symbol_gem(symbol, row).ok_or(CatalogError::UnknownSymbol {
            formula: formula.to_string(),
            symbol,
        })?;
        if cost.get(gem) != 0 {
            return Err(CatalogError::DuplicateSymbol {
                formula: formula.to_string(),
                symbol,
            });
        }
        cost.set(gem, amount);
    }

    Ok(cost)
}
