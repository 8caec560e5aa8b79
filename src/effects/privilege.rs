//! Privilege token circulation.
//!
//! Every grant in the game goes through [`grant_privilege`]: a recipient
//! already holding 3 gets nothing; otherwise the token comes from the shared
//! pool, or failing that from the opponent. Tokens are never created or
//! destroyed, so pool plus holdings stays at 3.

use crate::core::event::PrivilegeSource;
use crate::core::player::Seat;
use crate::core::state::{MatchState, PRIVILEGE_TOKENS};

/// Move one privilege token to `to`. Returns where it came from, or `None`
/// when nothing moved.
pub fn grant_privilege(state: &mut MatchState, to: Seat) -> Option<PrivilegeSource> {
    if state.player(to).privileges >= PRIVILEGE_TOKENS {
        return None;
    }

    if state.privilege_pool > 0 {
        state.privilege_pool -= 1;
        state.player_mut(to).privileges += 1;
        return Some(PrivilegeSource::Pool);
    }

    let from = to.opponent();
    if state.players.len() > from.index() && state.player(from).privileges > 0 {
        state.player_mut(from).privileges -= 1;
        state.player_mut(to).privileges += 1;
        return Some(PrivilegeSource::Opponent);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::player::{Player, PlayerId};
    use crate::core::rng::GameRng;

    fn state() -> MatchState {
        let mut state = MatchState::new(GameRng::new(1));
        state.seat_player(Player::new(PlayerId::from_u128(1), "a", true));
        state.seat_player(Player::new(PlayerId::from_u128(2), "b", false));
        state
    }

    #[test]
    fn test_pool_first() {
        let mut state = state();
        assert_eq!(grant_privilege(&mut state, Seat::HOST), Some(PrivilegeSource::Pool));
        assert_eq!(state.privilege_pool, 2);
        assert_eq!(state.player(Seat::HOST).privileges, 1);
    }

    #[test]
    fn test_takes_from_opponent_when_pool_empty() {
        let mut state = state();
        state.privilege_pool = 0;
        state.player_mut(Seat::new(1)).privileges = 3;

        assert_eq!(grant_privilege(&mut state, Seat::HOST), Some(PrivilegeSource::Opponent));
        assert_eq!(state.player(Seat::new(1)).privileges, 2);
        assert_eq!(state.player(Seat::HOST).privileges, 1);
        assert!(state.verify_invariants().is_ok());
    }

    #[test]
    fn test_full_hand_is_noop() {
        let mut state = state();
        state.privilege_pool = 0;
        state.player_mut(Seat::HOST).privileges = 3;

        assert_eq!(grant_privilege(&mut state, Seat::HOST), None);
        assert_eq!(state.player(Seat::HOST).privileges, 3);
    }

    #[test]
    fn test_tokens_circulate_between_players() {
        let mut state = state();
        state.privilege_pool = 0;
        state.player_mut(Seat::HOST).privileges = 2;
        state.player_mut(Seat::new(1)).privileges = 1;

        assert_eq!(grant_privilege(&mut state, Seat::HOST), Some(PrivilegeSource::Opponent));
        assert_eq!(state.player(Seat::HOST).privileges, 3);
        assert_eq!(state.player(Seat::new(1)).privileges, 0);

        assert_eq!(grant_privilege(&mut state, Seat::new(1)), Some(PrivilegeSource::Opponent));
        assert_eq!(state.player(Seat::HOST).privileges, 2);
        assert_eq!(state.player(Seat::new(1)).privileges, 1);
        assert!(state.verify_invariants().is_ok());
    }
}
