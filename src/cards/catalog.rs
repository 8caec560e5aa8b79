//! The static card catalog.
//!
//! Built once per process and never mutated. Ordinary cards come from
//! templates resolved through the rotation table; special cards have literal
//! costs and a gray color.
//!
//! ## Contents
//!
//! | Level | Templates (×5 colors) | Specials | Total |
//! |---|---|---|---|
//! | 1 | a b c d e | f1 f2 f3 g1 g2 | 30 |
//! | 2 | h i j k | l1 l2 l3 l4 | 24 |
//! | 3 | m n | o1 o2 o3 | 13 |

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::core::error::CatalogError;
use crate::core::gem::{GemCounts, GemType};

use super::definition::{CardEffect, CardId, CardLevel, DevelopmentCard};
use super::formula::parse_cost_formula;

use crate::core::gem::GemType::{Black, Blue, Green, Pearl, Red, White};
use super::definition::CardEffect::{NewTurn, Wildcard};

struct Template {
    code: &'static str,
    level: CardLevel,
    formula: &'static str,
    points: u32,
    crowns: u32,
    effects: &'static [CardEffect],
}

const TEMPLATES: &[Template] = &[
    Template { code: "a", level: CardLevel::One, formula: "3V", points: 0, crowns: 1, effects: &[] },
    Template { code: "b", level: CardLevel::One, formula: "1Z 1X 1V 1B", points: 0, crowns: 0, effects: &[] },
    Template { code: "c", level: CardLevel::One, formula: "2Z 2X", points: 0, crowns: 0, effects: &[CardEffect::ExtraToken] },
    Template { code: "d", level: CardLevel::One, formula: "2V 2B 1P", points: 0, crowns: 0, effects: &[CardEffect::NewTurn] },
    Template { code: "e", level: CardLevel::One, formula: "3Z 2B", points: 1, crowns: 0, effects: &[] },
    Template { code: "h", level: CardLevel::Two, formula: "2X 2V 2B 1P", points: 2, crowns: 1, effects: &[] },
    Template { code: "i", level: CardLevel::Two, formula: "4C 2X 1P", points: 2, crowns: 0, effects: &[CardEffect::GetPrivilege] },
    Template { code: "j", level: CardLevel::Two, formula: "4V 3Z", points: 1, crowns: 0, effects: &[CardEffect::Steal] },
    Template { code: "k", level: CardLevel::Two, formula: "5V 2B", points: 1, crowns: 0, effects: &[] },
    Template { code: "m", level: CardLevel::Three, formula: "6C 2X 2V", points: 4, crowns: 0, effects: &[] },
    Template { code: "n", level: CardLevel::Three, formula: "5Z 3X 3V 1P", points: 3, crowns: 2, effects: &[] },
];

struct Special {
    code: &'static str,
    level: CardLevel,
    cost: &'static [(GemType, u32)],
    points: u32,
    crowns: u32,
    effects: &'static [CardEffect],
}

const SPECIALS: &[Special] = &[
    Special { code: "f1", level: CardLevel::One, cost: &[(Red, 4), (Pearl, 1)], points: 3, crowns: 0, effects: &[] },
    Special { code: "f2", level: CardLevel::One, cost: &[(Black, 4), (Pearl, 1)], points: 1, crowns: 0, effects: &[Wildcard] },
    Special { code: "f3", level: CardLevel::One, cost: &[(White, 4), (Pearl, 1)], points: 0, crowns: 1, effects: &[Wildcard] },
    Special { code: "g1", level: CardLevel::One, cost: &[(White, 2), (Green, 2), (Black, 1), (Pearl, 1)], points: 1, crowns: 0, effects: &[Wildcard] },
    Special { code: "g2", level: CardLevel::One, cost: &[(Blue, 2), (Red, 2), (Black, 1), (Pearl, 1)], points: 1, crowns: 0, effects: &[Wildcard] },
    Special { code: "l1", level: CardLevel::Two, cost: &[(Blue, 6), (Pearl, 1)], points: 5, crowns: 0, effects: &[] },
    Special { code: "l2", level: CardLevel::Two, cost: &[(Green, 6), (Pearl, 1)], points: 2, crowns: 0, effects: &[Wildcard] },
    Special { code: "l3", level: CardLevel::Two, cost: &[(Blue, 6), (Pearl, 1)], points: 0, crowns: 2, effects: &[Wildcard] },
    Special { code: "l4", level: CardLevel::Two, cost: &[(Green, 6), (Pearl, 1)], points: 0, crowns: 2, effects: &[Wildcard] },
    Special { code: "o1", level: CardLevel::Three, cost: &[(White, 8)], points: 6, crowns: 0, effects: &[] },
    Special { code: "o2", level: CardLevel::Three, cost: &[(Red, 8)], points: 3, crowns: 0, effects: &[Wildcard, NewTurn] },
    Special { code: "o3", level: CardLevel::Three, cost: &[(Black, 8)], points: 0, crowns: 3, effects: &[Wildcard] },
];

/// Immutable card tables with lookup indexes.
#[derive(Debug)]
pub struct Catalog {
    cards: Vec<DevelopmentCard>,
    by_code: FxHashMap<String, CardId>,
    by_level: [Vec<CardId>; 3],
}

impl Catalog {
    /// Build the catalog from the built-in tables.
    pub fn build() -> Result<Self, CatalogError> {
        let mut cards = Vec::new();

        for template in TEMPLATES {
            for (i, &color) in GemType::COLORS.iter().enumerate() {
                let id = CardId::new(cards.len() as u16);
                cards.push(DevelopmentCard {
                    id,
                    id_code: format!("{}{}", template.code, i + 1),
                    code: template.code.to_string(),
                    level: template.level,
                    color,
                    points: template.points,
                    crowns: template.crowns,
                    cost: parse_cost_formula(template.formula, color)?,
                    effects: SmallVec::from_slice(template.effects),
                    is_special: false,
                });
            }
        }

        for special in SPECIALS {
            let id = CardId::new(cards.len() as u16);
            cards.push(DevelopmentCard {
                id,
                id_code: special.code.to_string(),
                code: special.code.to_string(),
                level: special.level,
                color: GemType::Gray,
                points: special.points,
                crowns: special.crowns,
                cost: GemCounts::from_pairs(special.cost),
                effects: SmallVec::from_slice(special.effects),
                is_special: true,
            });
        }

        let mut by_code = FxHashMap::default();
        let mut by_level: [Vec<CardId>; 3] = Default::default();
        for card in &cards {
            if by_code.insert(card.id_code.clone(), card.id).is_some() {
                return Err(CatalogError::DuplicateCard(card.id_code.clone()));
            }
            by_level[card.level.index()].push(card.id);
        }

        Ok(Self { cards, by_code, by_level })
    }

    /// Every card, in catalog order.
    #[must_use]
    pub fn cards(&self) -> &[DevelopmentCard] {
        &self.cards
    }

    /// Ids of every card of one level.
    #[must_use]
    pub fn by_level(&self, level: CardLevel) -> &[CardId] {
        &self.by_level[level.index()]
    }

    /// Look up a card by id.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&DevelopmentCard> {
        self.cards.get(id.index())
    }

    /// Resolve a printed card code.
    #[must_use]
    pub fn lookup(&self, code: &str) -> Option<CardId> {
        self.by_code.get(code).copied()
    }

    /// Total number of cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Always false for the built-in catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

static CATALOG: Lazy<Catalog> = Lazy::new(|| match Catalog::build() {
    Ok(catalog) => catalog,
    Err(err) => panic!("built-in card table is malformed: {err}"),
});

/// The process-wide catalog.
#[must_use]
pub fn catalog() -> &'static Catalog {
    &CATALOG
}

/// Look up a card that is known to exist (ids only come from the catalog).
#[must_use]
pub fn card(id: CardId) -> &'static DevelopmentCard {
    &catalog().cards[id.index()]
}
