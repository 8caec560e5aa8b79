//! Card actions: reserving and buying.

use smallvec::SmallVec;
use tracing::info;

use crate::board::{Position, SlotRef};
use crate::cards::{card, CardId, CardLevel};
use crate::core::action::ReserveTarget;
use crate::core::config::GameConfig;
use crate::core::error::ActionError;
use crate::core::event::GameEvent;
use crate::core::gem::{GemCounts, GemType};
use crate::core::player::Seat;
use crate::core::state::MatchState;
use crate::effects::{EffectChoices, EffectResolver};

use super::payment::{required_payment, validate_payment};
use super::turn::check_winner;

/// Where a reserve will come from, resolved before any state changes.
enum ReserveSource {
    FaceUp(SlotRef, CardId),
    Deck(CardLevel),
}

/// Take a gold token and reserve a card.
pub fn reserve(
    state: &mut MatchState,
    config: &GameConfig,
    seat: Seat,
    target: ReserveTarget,
    gold: Position,
) -> Result<Vec<GameEvent>, ActionError> {
    if state.flags.main_action_taken {
        return Err(ActionError::MainActionTaken);
    }
    if state.player(seat).reserved.len() >= config.reserve_limit {
        return Err(ActionError::ReserveLimit(config.reserve_limit));
    }
    if state.board.get(gold) != Some(GemType::Gold) {
        return Err(ActionError::NotGold(gold));
    }

    let source = match target {
        ReserveTarget::FaceUp(id) => ReserveSource::FaceUp(
            state
                .market
                .locate_face_up(id)
                .ok_or(ActionError::CardNotAvailable(id))?,
            id,
        ),
        ReserveTarget::Blind(level) => {
            if state.market.deck_len(level) == 0 {
                return Err(ActionError::DeckEmpty(level));
            }
            ReserveSource::Deck(level)
        }
        ReserveTarget::RandomLevel => {
            let stocked: SmallVec<[CardLevel; 3]> = CardLevel::ALL
                .into_iter()
                .filter(|&level| state.market.deck_len(level) > 0)
                .collect();
            let level = *state.rng.choose(&stocked).ok_or(ActionError::AllDecksEmpty)?;
            ReserveSource::Deck(level)
        }
    };

    let (id, level, slot) = match source {
        ReserveSource::FaceUp(slot, id) => {
            state.market.take_face_up(slot);
            (id, slot.level, Some(slot))
        }
        ReserveSource::Deck(level) => {
            let id = state.market.draw(level).ok_or(ActionError::DeckEmpty(level))?;
            (id, level, None)
        }
    };

    state.board.take(gold);
    let player = state.player_mut(seat);
    player.gems.add(GemType::Gold, 1);
    player.reserved.push(id);
    if slot.is_none() {
        player.blind.push(id);
    }
    if slot.is_some() {
        state.pending_refill = slot;
    }
    state.flags.main_action_taken = true;

    Ok(vec![GameEvent::CardReserved {
        seat,
        card: id,
        level,
        blind: slot.is_none(),
        slot,
    }])
}

/// Buy a face-up or reserved card with an explicit payment plan.
pub fn buy(
    state: &mut MatchState,
    config: &GameConfig,
    seat: Seat,
    id: CardId,
    plan: &GemCounts,
    choices: &EffectChoices,
) -> Result<Vec<GameEvent>, ActionError> {
    if state.flags.main_action_taken {
        return Err(ActionError::MainActionTaken);
    }

    let player = state.player(seat);
    let reserved_at = player.reserved.iter().position(|&c| c == id);
    let slot = match reserved_at {
        Some(_) => None,
        None => Some(
            state
                .market
                .locate_face_up(id)
                .ok_or(ActionError::CardNotAvailable(id))?,
        ),
    };

    let data = card(id);
    let required = required_payment(&data.cost, &player.bonus);
    validate_payment(plan, &required, &player.gems)?;

    // Everything below is infallible.
    match (reserved_at, slot) {
        (Some(i), _) => {
            let player = state.player_mut(seat);
            player.reserved.remove(i);
            player.blind.retain(|c| *c != id);
        }
        (None, Some(slot)) => {
            state.market.take_face_up(slot);
            state.pending_refill = Some(slot);
        }
        (None, None) => {}
    }

    let player = state.player_mut(seat);
    player.gems.remove_all(plan);
    player.owned.push(id);
    player.points += data.points;
    player.crowns += data.crowns;
    if data.color.is_color() {
        player.bonus.add(data.color, 1);
    }
    state.bag.extend_counts(plan);
    state.flags.main_action_taken = true;

    let mut events = vec![GameEvent::CardPurchased {
        seat,
        card: id,
        payment: *plan,
        from_reserve: reserved_at.is_some(),
        slot,
    }];
    events.extend(EffectResolver::resolve_card(state, seat, id, choices));
    events.extend(EffectResolver::resolve_nobles(state, config, seat, choices));

    if let Some(won) = check_winner(state, config, seat) {
        info!(%seat, card = %id, "match won");
        events.push(won);
    }
    Ok(events)
}
