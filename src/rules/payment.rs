//! Purchase payment rules.
//!
//! Each kind costs `max(0, cost − bonus)`. A plan may pay any kind up to that
//! amount in the kind itself; whatever it leaves short must be paid in gold,
//! exactly. Gold never appears in a cost.

use crate::core::error::ActionError;
use crate::core::gem::{GemCounts, GemType};

/// Tokens owed for `cost` after `bonus` discounts.
#[must_use]
pub fn required_payment(cost: &GemCounts, bonus: &GemCounts) -> GemCounts {
    let mut required = GemCounts::new();
    for (gem, amount) in cost.nonzero() {
        required.set(gem, amount.saturating_sub(bonus.get(gem)));
    }
    required
}

/// Check `plan` against `required` and the payer's `held` tokens.
pub fn validate_payment(
    plan: &GemCounts,
    required: &GemCounts,
    held: &GemCounts,
) -> Result<(), ActionError> {
    let mut shortfall = 0;
    for gem in GemType::TOKENS {
        if gem == GemType::Gold {
            continue;
        }
        let offered = plan.get(gem);
        let owed = required.get(gem);
        if offered > owed {
            return Err(ActionError::Overpayment { gem, offered, required: owed });
        }
        shortfall += owed - offered;
    }

    let gold = plan.get(GemType::Gold);
    if gold != shortfall {
        return Err(ActionError::GoldMismatch { offered: gold, required: shortfall });
    }

    for (gem, needed) in plan.nonzero() {
        let have = held.get(gem);
        if have < needed {
            return Err(ActionError::InsufficientTokens { gem, held: have, needed });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(GemType, u32)]) -> GemCounts {
        GemCounts::from_pairs(pairs)
    }

    #[test]
    fn test_bonus_discount_floors_at_zero() {
        let cost = counts(&[(GemType::Red, 3), (GemType::Pearl, 1)]);
        let bonus = counts(&[(GemType::Red, 5)]);
        let required = required_payment(&cost, &bonus);
        assert_eq!(required.get(GemType::Red), 0);
        assert_eq!(required.get(GemType::Pearl), 1);
    }

    #[test]
    fn test_exact_plan_with_gold() {
        let required = counts(&[(GemType::Blue, 3)]);
        let held = counts(&[(GemType::Blue, 2), (GemType::Gold, 1)]);
        let plan = counts(&[(GemType::Blue, 2), (GemType::Gold, 1)]);
        assert_eq!(validate_payment(&plan, &required, &held), Ok(()));
    }

    #[test]
    fn test_missing_gold_rejected() {
        let required = counts(&[(GemType::Blue, 3)]);
        let held = counts(&[(GemType::Blue, 2), (GemType::Gold, 1)]);
        let plan = counts(&[(GemType::Blue, 2)]);
        assert_eq!(
            validate_payment(&plan, &required, &held),
            Err(ActionError::GoldMismatch { offered: 0, required: 1 })
        );
    }

    #[test]
    fn test_overpayment_rejected() {
        let required = counts(&[(GemType::Blue, 1)]);
        let held = counts(&[(GemType::Blue, 2), (GemType::Gold, 1)]);

        let plan = counts(&[(GemType::Blue, 2)]);
        assert!(matches!(
            validate_payment(&plan, &required, &held),
            Err(ActionError::Overpayment { gem: GemType::Blue, .. })
        ));

        let plan = counts(&[(GemType::Blue, 1), (GemType::Gold, 1)]);
        assert_eq!(
            validate_payment(&plan, &required, &held),
            Err(ActionError::GoldMismatch { offered: 1, required: 0 })
        );
    }

    #[test]
    fn test_plan_must_be_held() {
        let required = counts(&[(GemType::Green, 2)]);
        let held = counts(&[(GemType::Green, 1)]);
        let plan = counts(&[(GemType::Green, 2)]);
        assert_eq!(
            validate_payment(&plan, &required, &held),
            Err(ActionError::InsufficientTokens { gem: GemType::Green, held: 1, needed: 2 })
        );
    }
}
