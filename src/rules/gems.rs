//! Board actions: taking tokens, spending privileges, refilling, and
//! settling the privilege owed for a greedy take.

use smallvec::SmallVec;

use crate::board::{is_straight_line, Position};
use crate::core::error::ActionError;
use crate::core::event::GameEvent;
use crate::core::gem::GemType;
use crate::core::player::Seat;
use crate::core::state::{MatchState, PRIVILEGE_TOKENS};
use crate::effects::grant_privilege;

/// Most tokens a single take may select.
pub const MAX_TAKE: usize = 3;

/// Distinct, occupied cells; returns the tokens found there.
fn occupied_cells(
    state: &MatchState,
    positions: &[Position],
) -> Result<SmallVec<[(Position, GemType); 3]>, ActionError> {
    let mut found = SmallVec::new();
    for (i, &pos) in positions.iter().enumerate() {
        if positions[..i].contains(&pos) {
            return Err(ActionError::DuplicatePosition(pos));
        }
        let gem = state.board.get(pos).ok_or(ActionError::EmptyCell(pos))?;
        found.push((pos, gem));
    }
    Ok(found)
}

fn remove_from_board(state: &mut MatchState, seat: Seat, cells: &[(Position, GemType)]) {
    for &(pos, gem) in cells {
        state.board.take(pos);
        state.player_mut(seat).gems.add(gem, 1);
    }
}

/// Three of one non-gold kind, or two pearls.
fn is_greedy(cells: &[(Position, GemType)]) -> bool {
    let pearls = cells.iter().filter(|(_, g)| *g == GemType::Pearl).count();
    let same_kind = cells.len() == MAX_TAKE
        && cells[0].1 != GemType::Gold
        && cells.iter().all(|(_, g)| *g == cells[0].1);
    pearls >= 2 || same_kind
}

/// Take 1..=3 tokens forming a straight contiguous line.
pub fn take_gems(
    state: &mut MatchState,
    seat: Seat,
    positions: &[Position],
) -> Result<Vec<GameEvent>, ActionError> {
    if state.flags.main_action_taken {
        return Err(ActionError::MainActionTaken);
    }
    if positions.is_empty() || positions.len() > MAX_TAKE {
        return Err(ActionError::SelectionSize { min: 1, max: MAX_TAKE, got: positions.len() });
    }
    let cells = occupied_cells(state, positions)?;
    if !is_straight_line(positions) {
        return Err(ActionError::NotALine);
    }

    remove_from_board(state, seat, &cells);
    state.flags.main_action_taken = true;
    if is_greedy(&cells) {
        state.flags.opponent_privilege_owed = true;
    }

    Ok(vec![GameEvent::GemsTaken { seat, taken: cells }])
}

/// Trade `count` privilege tokens for `count` arbitrary occupied cells.
pub fn spend_privilege(
    state: &mut MatchState,
    seat: Seat,
    count: u8,
    positions: &[Position],
) -> Result<Vec<GameEvent>, ActionError> {
    if state.flags.main_action_taken {
        return Err(ActionError::MainActionTaken);
    }
    if state.flags.refilled {
        return Err(ActionError::RefilledThisTurn);
    }
    if count == 0 || count > PRIVILEGE_TOKENS {
        return Err(ActionError::InvalidPrivilegeCount(count));
    }
    if positions.len() != usize::from(count) {
        return Err(ActionError::PrivilegeMismatch { count, positions: positions.len() });
    }
    let have = state.player(seat).privileges;
    if have < count {
        return Err(ActionError::InsufficientPrivileges { need: count, have });
    }
    let cells = occupied_cells(state, positions)?;

    state.player_mut(seat).privileges -= count;
    state.privilege_pool += count;
    remove_from_board(state, seat, &cells);

    Ok(vec![GameEvent::PrivilegeSpent { seat, count, taken: cells }])
}

/// Shuffle the bag and refill the board along the spiral. The opponent
/// receives a privilege token.
pub fn refill_board(state: &mut MatchState, seat: Seat) -> Result<Vec<GameEvent>, ActionError> {
    if state.flags.main_action_taken {
        return Err(ActionError::MainActionTaken);
    }
    if state.flags.refilled {
        return Err(ActionError::AlreadyRefilled);
    }
    if state.bag.is_empty() {
        return Err(ActionError::BagEmpty);
    }

    let MatchState { bag, rng, board, .. } = state;
    bag.shuffle(rng);
    let placed = board.fill_spiral(bag);
    state.flags.refilled = true;

    let mut events = vec![GameEvent::BoardRefilled { seat, placed }];
    let opponent = seat.opponent();
    if let Some(from) = grant_privilege(state, opponent) {
        events.push(GameEvent::PrivilegeGranted { to: opponent, from });
    }
    Ok(events)
}

/// Hand the opponent the privilege owed for a greedy take.
pub fn grant_opponent_privilege(
    state: &mut MatchState,
    seat: Seat,
) -> Result<Vec<GameEvent>, ActionError> {
    if !state.flags.opponent_privilege_owed {
        return Err(ActionError::NoPrivilegeOwed);
    }
    Ok(settle_owed_privilege(state, seat))
}

/// Clear the owed flag and grant through the circulation rule.
pub(crate) fn settle_owed_privilege(state: &mut MatchState, seat: Seat) -> Vec<GameEvent> {
    state.flags.opponent_privilege_owed = false;
    let opponent = seat.opponent();
    grant_privilege(state, opponent)
        .map(|from| GameEvent::PrivilegeGranted { to: opponent, from })
        .into_iter()
        .collect()
}
