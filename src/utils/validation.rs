use rust_decimal::Decimal;
use validator::ValidationError;

use crate::error::{Error, Result};

/// Budgets are stored as `NUMERIC(14, 2)`.
pub const BUDGET_SCALE: u32 = 2;
pub const BUDGET_LIMIT: i64 = 1_000_000_000_000;

/// Rejects strings that are empty once trimmed.
pub fn non_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Rejects amounts the budget column cannot hold exactly.
pub fn storable_amount(amount: Decimal) -> Result<Decimal> {
    if amount.normalize().scale() > BUDGET_SCALE {
        return Err(Error::InvalidRadiusOrBudget(format!(
            "budget {} has more than {} decimal places",
            amount, BUDGET_SCALE
        )));
    }
    if amount.abs() >= Decimal::from(BUDGET_LIMIT) {
        return Err(Error::InvalidRadiusOrBudget(format!(
            "budget {} must be less than {}",
            amount, BUDGET_LIMIT
        )));
    }
    Ok(amount)
}

pub fn positive_budget(budget: Decimal) -> Result<Decimal> {
    if budget <= Decimal::ZERO {
        return Err(Error::InvalidRadiusOrBudget(format!(
            "budget must be positive, got {}",
            budget
        )));
    }
    storable_amount(budget)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_fail() {
        assert!(non_blank("   ").is_err());
        assert!(non_blank("").is_err());
        assert!(non_blank("Jakarta").is_ok());
    }

    #[test]
    fn budget_must_be_positive() {
        assert!(positive_budget(Decimal::ZERO).is_err());
        assert!(positive_budget(Decimal::from(-5)).is_err());
        assert_eq!(positive_budget(Decimal::from(250)).unwrap(), Decimal::from(250));
    }

    #[test]
    fn budget_must_fit_the_stored_precision() {
        let sub_cent = Decimal::new(150_005, 3);
        assert!(matches!(
            positive_budget(sub_cent),
            Err(Error::InvalidRadiusOrBudget(_))
        ));
        assert!(matches!(
            positive_budget(Decimal::from(BUDGET_LIMIT)),
            Err(Error::InvalidRadiusOrBudget(_))
        ));

        let cents = Decimal::new(15_001, 2);
        assert_eq!(positive_budget(cents).unwrap(), cents);
        // Trailing zeros are not extra precision.
        assert!(positive_budget(Decimal::new(1_500_000, 4)).is_ok());
        assert!(positive_budget(Decimal::from(BUDGET_LIMIT - 1)).is_ok());
    }
}
