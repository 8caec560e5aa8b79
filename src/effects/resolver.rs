//! Card effect and noble resolution.
//!
//! Runs after a purchase has been paid for and the card is owned. Effects
//! resolve in printed order, then at most one noble claim. A selection that
//! cannot apply (empty cell, wrong color, nothing to steal) is dropped with an
//! `EffectIgnored` event; effects already applied by the same purchase stay.

use tracing::debug;

use crate::board::Position;
use crate::cards::{card, noble, CardEffect, CardId};
use crate::core::config::GameConfig;
use crate::core::event::{GameEvent, IgnoredReason};
use crate::core::gem::GemType;
use crate::core::player::Seat;
use crate::core::state::MatchState;

use super::effect::{Choice, EffectChoices, NobleChoice};
use super::privilege::grant_privilege;

/// Applies one-shot effects to match state.
pub struct EffectResolver;

impl EffectResolver {
    /// Resolve every effect printed on `id`, bought by `seat`.
    pub fn resolve_card(
        state: &mut MatchState,
        seat: Seat,
        id: CardId,
        choices: &EffectChoices,
    ) -> Vec<GameEvent> {
        let mut events = Vec::new();

        for &effect in &card(id).effects {
            match effect {
                CardEffect::NewTurn => {
                    state.player_mut(seat).extra_turns += 1;
                    events.push(GameEvent::ExtraTurnBanked { seat });
                }
                CardEffect::GetPrivilege => {
                    if let Some(from) = grant_privilege(state, seat) {
                        events.push(GameEvent::PrivilegeGranted { to: seat, from });
                    }
                }
                CardEffect::ExtraToken => {
                    let outcome = Self::pick(choices.extra_token, |pos| {
                        Self::take_extra_token(state, seat, id, pos)
                    });
                    events.push(outcome.into_event(seat, effect));
                }
                CardEffect::Steal => {
                    let outcome = Self::pick(choices.steal, |gem| Self::steal(state, seat, gem));
                    events.push(outcome.into_event(seat, effect));
                }
                CardEffect::Wildcard => {
                    let outcome = Self::pick(choices.wildcard, |color| {
                        Self::assign_color(state, seat, id, color)
                    });
                    events.push(outcome.into_event(seat, effect));
                }
            }
        }

        events
    }

    /// Claim a noble if `seat` has crossed a crown threshold it has not yet
    /// been rewarded for and the payload names an available noble.
    pub fn resolve_nobles(
        state: &mut MatchState,
        config: &GameConfig,
        seat: Seat,
        choices: &EffectChoices,
    ) -> Vec<GameEvent> {
        let player = state.player(seat);
        let claimable = config
            .nobles_earned(player.crowns)
            .saturating_sub(player.nobles.len());

        if claimable == 0 {
            if matches!(choices.noble, Some(Choice::Select(_))) {
                debug!(%seat, "noble selection without a crossed threshold");
                return vec![GameEvent::NobleIgnored { seat, reason: IgnoredReason::Invalid }];
            }
            return Vec::new();
        }

        match choices.noble {
            None => vec![GameEvent::NobleIgnored { seat, reason: IgnoredReason::Missing }],
            Some(Choice::Skip) => vec![GameEvent::NobleIgnored { seat, reason: IgnoredReason::Skipped }],
            Some(Choice::Select(pick)) => Self::claim_noble(state, seat, pick),
        }
    }

    fn claim_noble(state: &mut MatchState, seat: Seat, pick: NobleChoice) -> Vec<GameEvent> {
        let Some(i) = state.available_nobles.iter().position(|&n| n == pick.noble) else {
            debug!(%seat, noble = %pick.noble, "noble not available");
            return vec![GameEvent::NobleIgnored { seat, reason: IgnoredReason::Invalid }];
        };
        state.available_nobles.remove(i);

        let data = noble(pick.noble);
        let player = state.player_mut(seat);
        player.nobles.push(pick.noble);
        player.points += data.points;

        let mut events = vec![GameEvent::NobleClaimed { seat, noble: pick.noble }];
        match data.effect {
            Some(CardEffect::NewTurn) => {
                state.player_mut(seat).extra_turns += 1;
                events.push(GameEvent::ExtraTurnBanked { seat });
            }
            Some(CardEffect::GetPrivilege) => {
                if let Some(from) = grant_privilege(state, seat) {
                    events.push(GameEvent::PrivilegeGranted { to: seat, from });
                }
            }
            Some(CardEffect::Steal) => {
                let outcome = match pick.steal {
                    None => Outcome::Ignored(IgnoredReason::Missing),
                    Some(gem) => Self::steal(state, seat, gem),
                };
                events.push(outcome.into_event(seat, CardEffect::Steal));
            }
            Some(CardEffect::ExtraToken | CardEffect::Wildcard) | None => {}
        }
        events
    }

    fn pick<T: Copy>(choice: Option<Choice<T>>, apply: impl FnOnce(T) -> Outcome) -> Outcome {
        match choice {
            None => Outcome::Ignored(IgnoredReason::Missing),
            Some(Choice::Skip) => Outcome::Ignored(IgnoredReason::Skipped),
            Some(Choice::Select(value)) => apply(value),
        }
    }

    fn take_extra_token(state: &mut MatchState, seat: Seat, id: CardId, pos: Position) -> Outcome {
        let color = state.card_color(id);
        if state.board.get(pos) != Some(color) {
            debug!(%seat, %pos, %color, "extra token cell does not hold the card's color");
            return Outcome::Ignored(IgnoredReason::Invalid);
        }
        state.board.take(pos);
        state.player_mut(seat).gems.add(color, 1);
        Outcome::Applied(GameEvent::ExtraTokenTaken { seat, position: pos, gem: color })
    }

    fn steal(state: &mut MatchState, seat: Seat, gem: GemType) -> Outcome {
        let victim = seat.opponent();
        if !gem.is_token() || gem == GemType::Gold || !state.player_mut(victim).gems.remove(gem, 1) {
            debug!(%seat, %gem, "nothing to steal");
            return Outcome::Ignored(IgnoredReason::Invalid);
        }
        state.player_mut(seat).gems.add(gem, 1);
        Outcome::Applied(GameEvent::GemStolen { seat, gem })
    }

    fn assign_color(state: &mut MatchState, seat: Seat, id: CardId, color: GemType) -> Outcome {
        if !color.is_color() || state.card_colors.contains_key(&id) {
            debug!(%seat, %color, "wildcard color rejected");
            return Outcome::Ignored(IgnoredReason::Invalid);
        }
        state.card_colors.insert(id, color);
        state.player_mut(seat).bonus.add(color, 1);
        Outcome::Applied(GameEvent::WildcardColored { seat, card: id, color })
    }
}

enum Outcome {
    Applied(GameEvent),
    Ignored(IgnoredReason),
}

impl Outcome {
    fn into_event(self, seat: Seat, effect: CardEffect) -> GameEvent {
        match self {
            Outcome::Applied(event) => event,
            Outcome::Ignored(reason) => GameEvent::EffectIgnored { seat, effect, reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{catalog, NobleId};
    use crate::core::player::{Player, PlayerId};
    use crate::core::rng::GameRng;

    fn state() -> MatchState {
        let mut state = MatchState::new(GameRng::new(4));
        state.seat_player(Player::new(PlayerId::from_u128(1), "a", true));
        state.seat_player(Player::new(PlayerId::from_u128(2), "b", false));
        state
    }

    fn id(code: &str) -> CardId {
        catalog().lookup(code).unwrap()
    }

    #[test]
    fn test_extra_token_needs_matching_color() {
        let mut state = state();
        let c1 = id("c1"); // white
        let pos = Position::new(0, 0);
        state.board.set(pos, Some(GemType::Red));

        let events = EffectResolver::resolve_card(
            &mut state,
            Seat::HOST,
            c1,
            &EffectChoices::none().with_extra_token(pos),
        );
        assert!(matches!(
            events[0],
            GameEvent::EffectIgnored { reason: IgnoredReason::Invalid, .. }
        ));
        assert_eq!(state.board.get(pos), Some(GemType::Red));

        state.board.set(pos, Some(GemType::White));
        EffectResolver::resolve_card(&mut state, Seat::HOST, c1, &EffectChoices::none().with_extra_token(pos));
        assert_eq!(state.board.get(pos), None);
        assert_eq!(state.player(Seat::HOST).gems.get(GemType::White), 1);
    }

    #[test]
    fn test_steal_skips_gold() {
        let mut state = state();
        state.player_mut(Seat::new(1)).gems.add(GemType::Gold, 1);
        state.player_mut(Seat::new(1)).gems.add(GemType::Pearl, 1);

        let events = EffectResolver::resolve_card(
            &mut state,
            Seat::HOST,
            id("j1"),
            &EffectChoices::none().with_steal(GemType::Gold),
        );
        assert!(matches!(events[0], GameEvent::EffectIgnored { .. }));

        EffectResolver::resolve_card(&mut state, Seat::HOST, id("j1"), &EffectChoices::none().with_steal(GemType::Pearl));
        assert_eq!(state.player(Seat::HOST).gems.get(GemType::Pearl), 1);
        assert_eq!(state.player(Seat::new(1)).gems.get(GemType::Pearl), 0);
    }

    #[test]
    fn test_wildcard_is_permanent() {
        let mut state = state();
        let f2 = id("f2");

        EffectResolver::resolve_card(&mut state, Seat::HOST, f2, &EffectChoices::none().with_wildcard(GemType::Green));
        assert_eq!(state.card_color(f2), GemType::Green);
        assert_eq!(state.player(Seat::HOST).bonus.get(GemType::Green), 1);

        let events = EffectResolver::resolve_card(&mut state, Seat::HOST, f2, &EffectChoices::none().with_wildcard(GemType::Red));
        assert!(matches!(events[0], GameEvent::EffectIgnored { .. }));
        assert_eq!(state.card_color(f2), GemType::Green);
        assert_eq!(state.player(Seat::HOST).bonus.get(GemType::Red), 0);
    }

    #[test]
    fn test_wildcard_rejects_pearl_and_skip_is_recorded() {
        let mut state = state();
        let f3 = id("f3");

        let events = EffectResolver::resolve_card(&mut state, Seat::HOST, f3, &EffectChoices::none().with_wildcard(GemType::Pearl));
        assert!(matches!(events[0], GameEvent::EffectIgnored { reason: IgnoredReason::Invalid, .. }));

        let mut skip = EffectChoices::none();
        skip.wildcard = Some(Choice::Skip);
        let events = EffectResolver::resolve_card(&mut state, Seat::HOST, f3, &skip);
        assert!(matches!(events[0], GameEvent::EffectIgnored { reason: IgnoredReason::Skipped, .. }));
        assert_eq!(state.card_color(f3), GemType::Gray);
    }

    #[test]
    fn test_unconditional_effects() {
        let mut state = state();
        EffectResolver::resolve_card(&mut state, Seat::HOST, id("d1"), &EffectChoices::none());
        assert_eq!(state.player(Seat::HOST).extra_turns, 1);

        EffectResolver::resolve_card(&mut state, Seat::HOST, id("i1"), &EffectChoices::none());
        assert_eq!(state.player(Seat::HOST).privileges, 1);
        assert_eq!(state.privilege_pool, 2);
    }

    #[test]
    fn test_noble_claim_at_threshold() {
        let mut state = state();
        let config = GameConfig::default();
        state.player_mut(Seat::HOST).crowns = 3;

        let choices = EffectChoices::none().with_noble(NobleId::Noble3, None);
        let events = EffectResolver::resolve_nobles(&mut state, &config, Seat::HOST, &choices);

        assert!(events.contains(&GameEvent::NobleClaimed { seat: Seat::HOST, noble: NobleId::Noble3 }));
        assert_eq!(state.player(Seat::HOST).points, 2);
        assert_eq!(state.player(Seat::HOST).privileges, 1);
        assert!(!state.available_nobles.contains(&NobleId::Noble3));

        // Threshold already rewarded.
        let again = EffectResolver::resolve_nobles(&mut state, &config, Seat::HOST, &EffectChoices::none().with_noble(NobleId::Noble4, None));
        assert!(matches!(again[0], GameEvent::NobleIgnored { reason: IgnoredReason::Invalid, .. }));
        assert_eq!(state.player(Seat::HOST).nobles.len(), 1);
    }

    #[test]
    fn test_noble_steal_uses_nested_choice() {
        let mut state = state();
        let config = GameConfig::default();
        state.player_mut(Seat::HOST).crowns = 6;
        state.player_mut(Seat::new(1)).gems.add(GemType::Blue, 2);

        let choices = EffectChoices::none().with_noble(NobleId::Noble1, Some(GemType::Blue));
        EffectResolver::resolve_nobles(&mut state, &config, Seat::HOST, &choices);

        assert_eq!(state.player(Seat::HOST).gems.get(GemType::Blue), 1);
        assert_eq!(state.player(Seat::new(1)).gems.get(GemType::Blue), 1);

        // A second threshold is still unclaimed.
        let missing = EffectResolver::resolve_nobles(&mut state, &config, Seat::HOST, &EffectChoices::none());
        assert_eq!(missing, vec![GameEvent::NobleIgnored { seat: Seat::HOST, reason: IgnoredReason::Missing }]);
    }
}
