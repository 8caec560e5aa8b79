//! Rules engine trait and the duel implementation.
//!
//! `apply_action` is the only way match state changes. Every handler
//! validates completely before its first write, so a rejected action leaves
//! the state exactly as it was. After an accepted action the conservation
//! invariants are re-checked; a violation is an engine bug and panics.

use chrono::Utc;
use tracing::debug;

use crate::core::action::Action;
use crate::core::config::GameConfig;
use crate::core::error::ActionError;
use crate::core::event::GameEvent;
use crate::core::player::{PlayerId, Seat};
use crate::core::state::{MatchState, MatchStatus, TurnPhase};

use super::{cards, gems, turn};

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameResult {
    /// Single winner. There are no draws in a duel.
    Winner(PlayerId),
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
        }
    }
}

/// Rules engine trait.
///
/// ## Implementation Notes
///
/// - `apply_action`: validate-then-mutate; `Err` means nothing changed
/// - `is_terminal`: `None` while the match continues
pub trait RulesEngine {
    /// Get the game configuration.
    fn config(&self) -> &GameConfig;

    /// Apply an action submitted by `player`.
    fn apply_action(
        &self,
        state: &mut MatchState,
        player: PlayerId,
        action: &Action,
    ) -> Result<Vec<GameEvent>, ActionError>;

    /// Check if the game is over.
    fn is_terminal(&self, state: &MatchState) -> Option<GameResult>;
}

/// The two-player duel rules.
#[derive(Clone, Debug, Default)]
pub struct DuelRules {
    config: GameConfig,
}

impl DuelRules {
    /// Rules with the given configuration.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self { config }
    }

    fn dispatch(
        &self,
        state: &mut MatchState,
        player: PlayerId,
        action: &Action,
    ) -> Result<Vec<GameEvent>, ActionError> {
        let seat = state.seat_of(player).ok_or(ActionError::NotSeated(player))?;
        let config = &self.config;

        match action {
            Action::StartGame => turn::start(state, config, seat),
            Action::DiscardGem { gem } => {
                ensure_playing(state)?;
                turn::discard_one(state, seat, *gem)
            }
            Action::DiscardGems { gems } => {
                ensure_playing(state)?;
                turn::discard(state, seat, gems)
            }
            Action::TakeGems { positions } => {
                ensure_turn(state, seat)?;
                gems::take_gems(state, seat, positions)
            }
            Action::SpendPrivilege { count, positions } => {
                ensure_turn(state, seat)?;
                gems::spend_privilege(state, seat, *count, positions)
            }
            Action::RefillBoard => {
                ensure_turn(state, seat)?;
                gems::refill_board(state, seat)
            }
            Action::GrantOpponentPrivilege => {
                ensure_turn(state, seat)?;
                gems::grant_opponent_privilege(state, seat)
            }
            Action::ReserveCard { target, gold } => {
                ensure_turn(state, seat)?;
                cards::reserve(state, config, seat, *target, *gold)
            }
            Action::BuyCard { card, payment, choices } => {
                ensure_turn(state, seat)?;
                cards::buy(state, config, seat, *card, payment, choices)
            }
            Action::EndTurn => {
                ensure_turn(state, seat)?;
                turn::end_turn(state, config, seat)
            }
        }
    }
}

fn ensure_playing(state: &MatchState) -> Result<(), ActionError> {
    match state.status {
        MatchStatus::Waiting => Err(ActionError::NotStarted),
        MatchStatus::Finished => Err(ActionError::Finished),
        MatchStatus::Playing => Ok(()),
    }
}

/// The acting seat may take a regular action right now.
fn ensure_turn(state: &MatchState, seat: Seat) -> Result<(), ActionError> {
    ensure_playing(state)?;
    if seat != state.current {
        return Err(ActionError::NotYourTurn);
    }
    if let TurnPhase::AwaitingDiscard { .. } = state.phase {
        return Err(ActionError::DiscardPending);
    }
    Ok(())
}

impl RulesEngine for DuelRules {
    fn config(&self) -> &GameConfig {
        &self.config
    }

    fn apply_action(
        &self,
        state: &mut MatchState,
        player: PlayerId,
        action: &Action,
    ) -> Result<Vec<GameEvent>, ActionError> {
        let events = self.dispatch(state, player, action)?;

        if let Some(seat) = state.seat_of(player) {
            state.player_mut(seat).touch(Utc::now());
        }
        if let Err(violation) = state.verify_invariants() {
            panic!("invariant broken by {}: {violation}", action.kind());
        }

        debug!(%player, action = action.kind(), events = events.len(), "action applied");
        Ok(events)
    }

    fn is_terminal(&self, state: &MatchState) -> Option<GameResult> {
        match (state.status, state.winner) {
            (MatchStatus::Finished, Some(seat)) => {
                Some(GameResult::Winner(state.player(seat).id))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::player::Player;
    use crate::core::rng::GameRng;

    fn waiting_match() -> (DuelRules, MatchState) {
        let mut state = MatchState::new(GameRng::new(8));
        state.seat_player(Player::new(PlayerId::from_u128(1), "host", true));
        state.seat_player(Player::new(PlayerId::from_u128(2), "guest", false));
        (DuelRules::default(), state)
    }

    #[test]
    fn test_game_result_is_winner() {
        let result = GameResult::Winner(PlayerId::from_u128(1));
        assert!(result.is_winner(PlayerId::from_u128(1)));
        assert!(!result.is_winner(PlayerId::from_u128(2)));
    }

    #[test]
    fn test_actions_before_start_rejected() {
        let (rules, mut state) = waiting_match();
        let err = rules
            .apply_action(&mut state, PlayerId::from_u128(1), &Action::EndTurn)
            .unwrap_err();
        assert_eq!(err, ActionError::NotStarted);
    }

    #[test]
    fn test_unknown_player_rejected() {
        let (rules, mut state) = waiting_match();
        let stranger = PlayerId::from_u128(9);
        let err = rules.apply_action(&mut state, stranger, &Action::StartGame).unwrap_err();
        assert_eq!(err, ActionError::NotSeated(stranger));
    }

    #[test]
    fn test_wrong_turn_rejected() {
        let (rules, mut state) = waiting_match();
        rules.apply_action(&mut state, PlayerId::from_u128(1), &Action::StartGame).unwrap();
        assert_eq!(state.current, Seat::HOST);

        let err = rules
            .apply_action(&mut state, PlayerId::from_u128(2), &Action::RefillBoard)
            .unwrap_err();
        assert_eq!(err, ActionError::NotYourTurn);
    }

    #[test]
    fn test_is_terminal() {
        let (rules, mut state) = waiting_match();
        assert_eq!(rules.is_terminal(&state), None);

        state.status = MatchStatus::Finished;
        state.winner = Some(Seat::new(1));
        assert_eq!(rules.is_terminal(&state), Some(GameResult::Winner(PlayerId::from_u128(2))));
    }
}
