//! Tip derivation
//!
//! The tip is entered either as a percentage of the pre-tip total or as a
//! fixed amount. Whichever mode is active is the source of truth; the other
//! value is derived for display.

use crate::domain::types::TipMode;
use rust_decimal::{Decimal, RoundingStrategy};

/// Derive `(tip_percent, tip_amount)` from the entered value.
///
/// Returns `None` when either value falls outside the `Decimal` range.
pub fn derive_tip(total: Decimal, value: Decimal, mode: TipMode) -> Option<(Decimal, Decimal)> {
    match mode {
        TipMode::Percent => {
            let amount = total.checked_mul(value)?.checked_div(Decimal::ONE_HUNDRED)?;
            Some((value, amount))
        }
        TipMode::Amount => {
            let percent = if total > Decimal::ZERO {
                value.checked_div(total)?.checked_mul(Decimal::ONE_HUNDRED)?
            } else {
                Decimal::ZERO
            };
            Some((percent, value))
        }
    }
}

/// Convert an entered tip value when the user flips the `%`/`$` toggle.
///
/// `from` is the mode the value was entered in. Percent to amount rounds to
/// cents, amount to percent rounds to one decimal place. Returns `None`
/// (blank input) unless both the total and the value are positive, or when
/// the converted value is out of range.
pub fn convert_tip_input(total: Decimal, value: Decimal, from: TipMode) -> Option<Decimal> {
    if total <= Decimal::ZERO || value <= Decimal::ZERO {
        return None;
    }

    let (percent, amount) = derive_tip(total, value, from)?;
    let converted = match from {
        TipMode::Percent => {
            amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        }
        TipMode::Amount => {
            percent.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
        }
    };
    Some(converted)
}
