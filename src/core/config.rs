//! Rule configuration for a single match.

use serde::{Deserialize, Serialize};

/// Who moves first once the match starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartingPlayer {
    /// The room creator always opens.
    #[default]
    Host,
    /// Coin flip from the match RNG.
    Random,
}

/// Rule knobs for one match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    /// Opening-player policy.
    pub starting_player: StartingPlayer,

    /// RNG seed. `None` draws one from OS entropy at match creation.
    pub seed: Option<u64>,

    /// Held tokens above this force a discard at turn end.
    pub token_limit: u32,

    /// Maximum reserved cards per player.
    pub reserve_limit: usize,

    /// Prestige points that win immediately.
    pub winning_points: u32,

    /// Crowns that win immediately.
    pub winning_crowns: u32,

    /// Bonus in one common color that wins immediately.
    pub winning_color_bonus: u32,

    /// Crown totals at which a noble becomes claimable.
    pub noble_thresholds: Vec<u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_player: StartingPlayer::Host,
            seed: None,
            token_limit: 10,
            reserve_limit: 3,
            winning_points: 20,
            winning_crowns: 10,
            winning_color_bonus: 10,
            noble_thresholds: vec![3, 6],
        }
    }
}

impl GameConfig {
    /// Use a fixed RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Choose the opening-player policy.
    pub fn with_starting_player(mut self, policy: StartingPlayer) -> Self {
        self.starting_player = policy;
        self
    }

    /// Change the held-token limit.
    pub fn with_token_limit(mut self, limit: u32) -> Self {
        self.token_limit = limit;
        self
    }

    /// Change the immediate-win thresholds.
    pub fn with_win_thresholds(mut self, points: u32, crowns: u32, color_bonus: u32) -> Self {
        self.winning_points = points;
        self.winning_crowns = crowns;
        self.winning_color_bonus = color_bonus;
        self
    }

    /// Number of nobles claimable at `crowns`.
    #[must_use]
    pub fn nobles_earned(&self, crowns: u32) -> usize {
        self.noble_thresholds.iter().filter(|&&t| crowns >= t).count()
    }
}
