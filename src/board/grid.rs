//! The 5×5 token grid.
//!
//! Cells are addressed as `board[x][y]`. Setup and every refill walk the same
//! spiral, starting at the center and unwinding outward; only the bag's
//! contents are random, never the placement order.

use serde::{Deserialize, Serialize};

use crate::core::error::ActionError;
use crate::core::gem::{GemCounts, GemType};
use crate::core::rng::GameRng;

use super::bag::Bag;

/// Side length of the grid.
pub const BOARD_SIZE: usize = 5;

/// A cell coordinate, guaranteed in bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: u8,
    pub y: u8,
}

impl Position {
    /// In-bounds position. Panics on out-of-range input; use [`Position::try_new`]
    /// for untrusted coordinates.
    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        assert!((x as usize) < BOARD_SIZE && (y as usize) < BOARD_SIZE);
        Self { x, y }
    }

    /// Validate untrusted coordinates.
    pub fn try_new(x: i64, y: i64) -> Result<Self, ActionError> {
        let in_range = |v: i64| (0..BOARD_SIZE as i64).contains(&v);
        if in_range(x) && in_range(y) {
            Ok(Self { x: x as u8, y: y as u8 })
        } else {
            Err(ActionError::OutOfBounds { x, y })
        }
    }

    /// Neighbor in any of the eight directions.
    #[must_use]
    pub fn is_adjacent(self, other: Position) -> bool {
        let dx = (self.x as i32 - other.x as i32).abs();
        let dy = (self.y as i32 - other.y as i32).abs();
        dx.max(dy) == 1
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

const fn p(x: u8, y: u8) -> Position {
    Position { x, y }
}

/// Placement order for setup and refills.
pub const SPIRAL_ORDER: [Position; 25] = [
    p(2, 2), p(3, 2), p(3, 1), p(2, 1), p(1, 1),
    p(1, 2), p(1, 3), p(2, 3), p(3, 3), p(4, 3),
    p(4, 2), p(4, 1), p(4, 0), p(3, 0), p(2, 0),
    p(1, 0), p(0, 0), p(0, 1), p(0, 2), p(0, 3),
    p(0, 4), p(1, 4), p(2, 4), p(3, 4), p(4, 4),
];

/// True when `positions` is 1..=3 distinct cells in one straight, contiguous
/// line: every pair colinear and each consecutive pair (in input order)
/// 8-adjacent.
#[must_use]
pub fn is_straight_line(positions: &[Position]) -> bool {
    if positions.is_empty() || positions.len() > 3 {
        return false;
    }
    for (i, a) in positions.iter().enumerate() {
        if positions[i + 1..].contains(a) {
            return false;
        }
    }
    if !positions.windows(2).all(|w| w[0].is_adjacent(w[1])) {
        return false;
    }

    let origin = positions[0];
    let delta = |q: Position| (q.x as i32 - origin.x as i32, q.y as i32 - origin.y as i32);
    positions.iter().enumerate().all(|(i, &a)| {
        positions[i + 1..].iter().all(|&b| {
            let (ax, ay) = delta(a);
            let (bx, by) = delta(b);
            ax * by - ay * bx == 0
        })
    })
}

/// The grid itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [[Option<GemType>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// An empty grid.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Deal every token from a freshly shuffled bag along the spiral.
    /// Returns the grid and the bag with whatever did not fit.
    #[must_use]
    pub fn new_shuffled(rng: &mut GameRng) -> (Self, Bag) {
        let mut bag = Bag::from_counts(&GemCounts::universe());
        bag.shuffle(rng);
        let mut board = Self::empty();
        board.fill_spiral(&mut bag);
        (board, bag)
    }

    /// Token at a cell.
    #[must_use]
    pub fn get(&self, pos: Position) -> Option<GemType> {
        self.cells[pos.x as usize][pos.y as usize]
    }

    /// Overwrite a cell.
    pub fn set(&mut self, pos: Position, gem: Option<GemType>) {
        self.cells[pos.x as usize][pos.y as usize] = gem;
    }

    /// Remove and return a cell's token.
    pub fn take(&mut self, pos: Position) -> Option<GemType> {
        self.cells[pos.x as usize][pos.y as usize].take()
    }

    /// Iterate `(position, token)` over occupied cells, in spiral order.
    pub fn occupied(&self) -> impl Iterator<Item = (Position, GemType)> + '_ {
        SPIRAL_ORDER.iter().filter_map(|&pos| self.get(pos).map(|gem| (pos, gem)))
    }

    /// Tally of tokens on the grid.
    #[must_use]
    pub fn counts(&self) -> GemCounts {
        let mut counts = GemCounts::new();
        for (_, gem) in self.occupied() {
            counts.add(gem, 1);
        }
        counts
    }

    /// True when every cell is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupied().next().is_none()
    }

    /// Walk the spiral, placing the bag's front token into each empty cell
    /// until the grid is full or the bag runs out. Returns the placements.
    pub fn fill_spiral(&mut self, bag: &mut Bag) -> Vec<(Position, GemType)> {
        let mut placed = Vec::new();
        for &pos in &SPIRAL_ORDER {
            if self.get(pos).is_some() {
                continue;
            }
            let Some(gem) = bag.draw_front() else {
                break;
            };
            self.set(pos, Some(gem));
            placed.push((pos, gem));
        }
        placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spiral_covers_grid_once() {
        let mut seen = [[false; BOARD_SIZE]; BOARD_SIZE];
        for pos in SPIRAL_ORDER {
            assert!(!seen[pos.x as usize][pos.y as usize]);
            seen[pos.x as usize][pos.y as usize] = true;
        }
        assert_eq!(SPIRAL_ORDER[0], Position::new(2, 2));
        assert_eq!(SPIRAL_ORDER[24], Position::new(4, 4));
    }

    #[test]
    fn test_try_new_bounds() {
        assert!(Position::try_new(4, 0).is_ok());
        assert_eq!(Position::try_new(5, 0), Err(ActionError::OutOfBounds { x: 5, y: 0 }));
        assert!(Position::try_new(-1, 2).is_err());
    }

    #[test]
    fn test_straight_lines() {
        let line = |pts: &[(u8, u8)]| {
            let v: Vec<_> = pts.iter().map(|&(x, y)| Position::new(x, y)).collect();
            is_straight_line(&v)
        };

        assert!(line(&[(1, 1)]));
        assert!(line(&[(0, 0), (0, 1), (0, 2)]));
        assert!(line(&[(0, 0), (1, 1), (2, 2)]));
        assert!(line(&[(2, 0), (1, 1), (0, 2)]));
        assert!(line(&[(1, 1), (2, 1)]));

        assert!(!line(&[]));
        assert!(!line(&[(0, 0), (2, 2)]));
        assert!(!line(&[(0, 0), (0, 1), (1, 1)]));
        assert!(!line(&[(0, 0), (0, 0)]));
        assert!(!line(&[(0, 0), (0, 1), (0, 2), (0, 3)]));
        // Colinear but not contiguous in input order.
        assert!(!line(&[(0, 1), (0, 0), (0, 2)]));
    }

    #[test]
    fn test_fill_spiral_stops_when_bag_empties() {
        let mut board = Board::empty();
        let mut bag = Bag::from_tokens(vec![GemType::Red, GemType::Gold]);

        let placed = board.fill_spiral(&mut bag);

        assert_eq!(placed.len(), 2);
        assert_eq!(board.get(Position::new(2, 2)), Some(GemType::Red));
        assert_eq!(board.get(Position::new(3, 2)), Some(GemType::Gold));
        assert!(bag.is_empty());
        assert_eq!(board.counts().total(), 2);
    }

    #[test]
    fn test_fill_spiral_skips_occupied_cells() {
        let mut board = Board::empty();
        board.set(Position::new(2, 2), Some(GemType::Pearl));
        let mut bag = Bag::from_tokens(vec![GemType::Blue]);

        board.fill_spiral(&mut bag);

        assert_eq!(board.get(Position::new(2, 2)), Some(GemType::Pearl));
        assert_eq!(board.get(Position::new(3, 2)), Some(GemType::Blue));
    }
}
