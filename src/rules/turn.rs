//! Lifecycle and turn flow: starting, ending turns, discards, extra turns
//! and the win check.
//!
//! ## States
//!
//! `AwaitingAction → AwaitingDiscard (held > limit) → AwaitingAction`
//!
//! Ending a turn first reveals a card into any slot vacated this turn, then
//! settles an unsent owed privilege. If the player is over the token limit
//! the turn freezes until they discard; the turn then passes on the next
//! `EndTurn`.

use chrono::Utc;
use tracing::info;

use crate::core::config::{GameConfig, StartingPlayer};
use crate::core::error::ActionError;
use crate::core::event::GameEvent;
use crate::core::gem::{GemCounts, GemType};
use crate::core::player::Seat;
use crate::core::state::{MatchState, MatchStatus, TurnFlags, TurnPhase};
use crate::effects::grant_privilege;

use super::gems::settle_owed_privilege;

/// Begin play. The second seat receives a privilege token.
pub fn start(
    state: &mut MatchState,
    config: &GameConfig,
    _seat: Seat,
) -> Result<Vec<GameEvent>, ActionError> {
    match state.status {
        MatchStatus::Waiting => {}
        MatchStatus::Playing => return Err(ActionError::AlreadyStarted),
        MatchStatus::Finished => return Err(ActionError::Finished),
    }
    if !state.is_full() {
        return Err(ActionError::NotEnoughPlayers);
    }

    let first = match config.starting_player {
        StartingPlayer::Host => Seat::HOST,
        StartingPlayer::Random => {
            if state.rng.gen_bool(0.5) {
                Seat::HOST
            } else {
                Seat::HOST.next()
            }
        }
    };

    state.status = MatchStatus::Playing;
    state.current = first;
    state.turn = 1;
    state.phase = TurnPhase::AwaitingAction;
    state.flags = TurnFlags::default();
    state.started_at = Some(Utc::now());

    let mut events = vec![GameEvent::MatchStarted { first }];
    let second = first.opponent();
    if let Some(from) = grant_privilege(state, second) {
        events.push(GameEvent::PrivilegeGranted { to: second, from });
    }
    info!(first = %state.player(first).id, "match started");
    Ok(events)
}

/// Finish the current turn.
pub fn end_turn(
    state: &mut MatchState,
    config: &GameConfig,
    seat: Seat,
) -> Result<Vec<GameEvent>, ActionError> {
    if !state.flags.main_action_taken {
        return Err(ActionError::MainActionRequired);
    }

    let mut events = Vec::new();
    if let Some(slot) = state.pending_refill.take() {
        let card = state.market.refill_slot(slot);
        events.push(GameEvent::SlotRefilled { slot, card });
    }
    if state.flags.opponent_privilege_owed {
        events.extend(settle_owed_privilege(state, seat));
    }

    if state.player(seat).held_tokens() > config.token_limit {
        let target = config.token_limit;
        state.phase = TurnPhase::AwaitingDiscard { target, owner: seat };
        events.push(GameEvent::DiscardRequired { seat, target });
        return Ok(events);
    }

    events.push(next_turn(state));
    Ok(events)
}

/// Pass play on, honoring banked extra turns.
pub fn next_turn(state: &mut MatchState) -> GameEvent {
    let seat = state.current;
    state.flags = TurnFlags::default();
    state.phase = TurnPhase::AwaitingAction;

    let player = state.player_mut(seat);
    if player.extra_turns > 0 {
        player.extra_turns -= 1;
        return GameEvent::ExtraTurnUsed { seat };
    }

    state.current = seat.next();
    state.turn += 1;
    GameEvent::TurnPassed { seat: state.current, turn: state.turn }
}

/// Discard one token toward the pending target.
pub fn discard_one(
    state: &mut MatchState,
    seat: Seat,
    gem: GemType,
) -> Result<Vec<GameEvent>, ActionError> {
    if !gem.is_token() {
        return Err(ActionError::NotAToken(gem));
    }
    discard(state, seat, &GemCounts::from_pairs(&[(gem, 1)]))
}

/// Discard a batch of tokens toward the pending target.
pub fn discard(
    state: &mut MatchState,
    seat: Seat,
    gems: &GemCounts,
) -> Result<Vec<GameEvent>, ActionError> {
    let TurnPhase::AwaitingDiscard { target, owner } = state.phase else {
        return Err(ActionError::NoDiscardPending);
    };
    if seat != owner {
        return Err(ActionError::NotDiscardOwner { owner: state.player(owner).id });
    }
    if gems.is_empty() {
        return Err(ActionError::EmptyDiscard);
    }
    let held = state.player(seat).gems;
    for (gem, needed) in gems.nonzero() {
        if held.get(gem) < needed {
            return Err(ActionError::InsufficientTokens { gem, held: held.get(gem), needed });
        }
    }
    let requested = gems.total();
    if held.total() - requested < target {
        return Err(ActionError::OverDiscard { requested, target });
    }

    state.player_mut(seat).gems.remove_all(gems);
    state.bag.extend_counts(gems);

    let events = vec![GameEvent::GemsDiscarded { seat, gems: *gems }];
    if state.player(seat).held_tokens() <= target {
        state.phase = TurnPhase::AwaitingAction;
    }
    Ok(events)
}

/// End the match if `seat` has met any win condition.
pub fn check_winner(state: &mut MatchState, config: &GameConfig, seat: Seat) -> Option<GameEvent> {
    let player = state.player(seat);
    let won = player.points >= config.winning_points
        || player.crowns >= config.winning_crowns
        || player.max_color_bonus() >= config.winning_color_bonus;
    if !won {
        return None;
    }
    state.status = MatchStatus::Finished;
    state.winner = Some(seat);
    state.phase = TurnPhase::AwaitingAction;
    Some(GameEvent::MatchWon { seat })
}
