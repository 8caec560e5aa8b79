//! Board, bag, market and catalog integration tests.
//!
//! These tests exercise the static data and the board model without going
//! through the rules engine.

use gem_duel::board::{is_straight_line, Bag, Board, Market, Position, SlotRef, SPIRAL_ORDER};
use gem_duel::cards::{catalog, parse_cost_formula, CardEffect, CardLevel, NobleId, noble};
use gem_duel::core::{CatalogError, GameRng, GemCounts, GemType};

fn pos(x: u8, y: u8) -> Position {
    Position::new(x, y)
}

// =============================================================================
// Spiral Fill Tests
// =============================================================================

/// Refilling an empty board from [white, white, white, gold] fills the first
/// four spiral cells in order and leaves the rest empty.
#[test]
fn test_spiral_refill_scenario() {
    let mut board = Board::empty();
    let mut bag = Bag::from_tokens(vec![GemType::White, GemType::White, GemType::White, GemType::Gold]);

    let placed = board.fill_spiral(&mut bag);

    assert_eq!(
        placed,
        vec![
            (pos(2, 2), GemType::White),
            (pos(3, 2), GemType::White),
            (pos(3, 1), GemType::White),
            (pos(2, 1), GemType::Gold),
        ]
    );
    assert!(bag.is_empty());
    for &cell in &SPIRAL_ORDER[4..] {
        assert_eq!(board.get(cell), None, "cell {cell} should stay empty");
    }
}

/// Occupied cells are skipped, not overwritten.
#[test]
fn test_spiral_skips_occupied_cells() {
    let mut board = Board::empty();
    board.set(pos(3, 2), Some(GemType::Pearl));
    let mut bag = Bag::from_tokens(vec![GemType::Red, GemType::Blue]);

    board.fill_spiral(&mut bag);

    assert_eq!(board.get(pos(2, 2)), Some(GemType::Red));
    assert_eq!(board.get(pos(3, 2)), Some(GemType::Pearl));
    assert_eq!(board.get(pos(3, 1)), Some(GemType::Blue));
}

/// A fresh board holds every token and nothing is left in the bag.
#[test]
fn test_new_board_uses_every_token() {
    let mut rng = GameRng::new(42);
    let (board, bag) = Board::new_shuffled(&mut rng);

    assert_eq!(board.counts(), GemCounts::universe());
    assert!(bag.is_empty());
    assert_eq!(board.occupied().count(), 25);
}

/// Same seed, same layout.
#[test]
fn test_board_layout_is_seeded() {
    let (a, _) = Board::new_shuffled(&mut GameRng::new(7));
    let (b, _) = Board::new_shuffled(&mut GameRng::new(7));
    assert_eq!(a, b);
}

// =============================================================================
// Line Selection Tests
// =============================================================================

/// Non-adjacent cells are never a line, even when colinear.
#[test]
fn test_gap_is_not_a_line() {
    assert!(!is_straight_line(&[pos(0, 0), pos(2, 2)]));
    assert!(!is_straight_line(&[pos(0, 0), pos(0, 2)]));
}

/// Rows, columns and both diagonals are accepted.
#[test]
fn test_all_directions() {
    assert!(is_straight_line(&[pos(0, 0), pos(1, 0), pos(2, 0)]));
    assert!(is_straight_line(&[pos(4, 0), pos(4, 1), pos(4, 2)]));
    assert!(is_straight_line(&[pos(0, 0), pos(1, 1), pos(2, 2)]));
    assert!(is_straight_line(&[pos(2, 0), pos(1, 1), pos(0, 2)]));
}

/// Bent and oversized selections are rejected.
#[test]
fn test_bent_and_long_selections() {
    assert!(!is_straight_line(&[pos(0, 0), pos(1, 0), pos(1, 1)]));
    assert!(!is_straight_line(&[pos(0, 0), pos(1, 0), pos(2, 0), pos(3, 0)]));
    assert!(!is_straight_line(&[]));
}

/// Untrusted coordinates are bounds-checked.
#[test]
fn test_position_bounds() {
    assert!(Position::try_new(4, 4).is_ok());
    assert!(Position::try_new(5, 0).is_err());
    assert!(Position::try_new(0, -1).is_err());
}

// =============================================================================
// Bag Tests
// =============================================================================

/// Draws come from the front; counts track contents.
#[test]
fn test_bag_draw_order() {
    let mut bag = Bag::from_tokens(vec![GemType::Gold, GemType::Pearl]);
    bag.push(GemType::Red);

    assert_eq!(bag.counts().get(GemType::Red), 1);
    assert_eq!(bag.draw_front(), Some(GemType::Gold));
    assert_eq!(bag.draw_front(), Some(GemType::Pearl));
    assert_eq!(bag.draw_front(), Some(GemType::Red));
    assert_eq!(bag.draw_front(), None);
}

// =============================================================================
// Market Tests
// =============================================================================

/// Rows are 5/4/3 wide and every catalog card is somewhere in the market.
#[test]
fn test_market_deal() {
    let market = Market::new_shuffled(&mut GameRng::new(1));

    assert_eq!(market.face_up(CardLevel::One).len(), 5);
    assert_eq!(market.face_up(CardLevel::Two).len(), 4);
    assert_eq!(market.face_up(CardLevel::Three).len(), 3);
    assert_eq!(market.cards().count(), catalog().len());
    assert_eq!(market.deck_len(CardLevel::Three), 10);
}

/// A vacated slot is refilled in place from its own level.
#[test]
fn test_slot_refills_in_place() {
    let mut market = Market::new_shuffled(&mut GameRng::new(2));
    let slot = SlotRef { level: CardLevel::Two, index: 2 };

    let taken = market.take_face_up(slot).unwrap();
    assert_eq!(market.face_up(CardLevel::Two)[2], None);
    assert_eq!(market.locate_face_up(taken), None);

    let revealed = market.refill_slot(slot).unwrap();
    assert_eq!(market.face_up(CardLevel::Two)[2], Some(revealed));
    assert_eq!(gem_duel::card(revealed).level, CardLevel::Two);
    assert_eq!(market.deck_len(CardLevel::Two), 24 - 4 - 1);
}

// =============================================================================
// Catalog Tests
// =============================================================================

/// 30 / 24 / 13 cards per level.
#[test]
fn test_catalog_sizes() {
    assert_eq!(catalog().by_level(CardLevel::One).len(), 30);
    assert_eq!(catalog().by_level(CardLevel::Two).len(), 24);
    assert_eq!(catalog().by_level(CardLevel::Three).len(), 13);
}

/// Template effects land on every color variant.
#[test]
fn test_template_effects() {
    for (code, effect) in [("c", CardEffect::ExtraToken), ("d", CardEffect::NewTurn), ("i", CardEffect::GetPrivilege), ("j", CardEffect::Steal)] {
        for n in 1..=5 {
            let id = catalog().lookup(&format!("{code}{n}")).unwrap();
            assert!(gem_duel::card(id).has_effect(effect), "{code}{n}");
        }
    }
}

/// Specials are gray; wildcards are marked.
#[test]
fn test_specials() {
    let f1 = gem_duel::card(catalog().lookup("f1").unwrap());
    assert_eq!(f1.color, GemType::Gray);
    assert!(!f1.is_wildcard());
    assert_eq!(f1.points, 3);

    let o3 = gem_duel::card(catalog().lookup("o3").unwrap());
    assert!(o3.is_wildcard());
    assert_eq!(o3.crowns, 3);
}

/// Pearl is pearl no matter the color row.
#[test]
fn test_formula_pearl() {
    for color in GemType::COLORS {
        let cost = parse_cost_formula("2V 2B 1P", color).unwrap();
        assert_eq!(cost.get(GemType::Pearl), 1);
        assert_eq!(cost.total(), 5);
    }
}

/// Malformed formulas fail loudly.
#[test]
fn test_formula_errors() {
    assert!(matches!(parse_cost_formula("3Q", GemType::Red), Err(CatalogError::UnknownSymbol { .. })));
    assert!(parse_cost_formula("V", GemType::Red).is_err());
    assert!(parse_cost_formula("2V 1V", GemType::Red).is_err());
}

/// Four nobles with their fixed rewards.
#[test]
fn test_nobles() {
    assert_eq!(NobleId::ALL.len(), 4);
    assert_eq!(noble(NobleId::Noble4).points, 3);
    assert_eq!(noble(NobleId::Noble1).effect, Some(CardEffect::Steal));
}
