//! Noble cards. Exactly four per match, each granted at most once.

use serde::{Deserialize, Serialize};

use super::definition::CardEffect;

/// Noble identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NobleId {
    Noble1,
    Noble2,
    Noble3,
    Noble4,
}

impl NobleId {
    /// Every noble, in table order.
    pub const ALL: [NobleId; 4] = [NobleId::Noble1, NobleId::Noble2, NobleId::Noble3, NobleId::Noble4];

    /// Wire name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            NobleId::Noble1 => "noble1",
            NobleId::Noble2 => "noble2",
            NobleId::Noble3 => "noble3",
            NobleId::Noble4 => "noble4",
        }
    }
}

impl std::fmt::Display for NobleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Static noble data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NobleCard {
    pub id: NobleId,
    pub points: u32,
    /// Steal, extra turn or privilege; `None` for the plain 3-point noble.
    pub effect: Option<CardEffect>,
}

const NOBLES: [NobleCard; 4] = [
    NobleCard { id: NobleId::Noble1, points: 2, effect: Some(CardEffect::Steal) },
    NobleCard { id: NobleId::Noble2, points: 2, effect: Some(CardEffect::NewTurn) },
    NobleCard { id: NobleId::Noble3, points: 2, effect: Some(CardEffect::GetPrivilege) },
    NobleCard { id: NobleId::Noble4, points: 3, effect: None },
];

/// Static data for a noble.
#[must_use]
pub fn noble(id: NobleId) -> &'static NobleCard {
    &NOBLES[id as usize]
}
