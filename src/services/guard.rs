//! Negative-amount guard
//!
//! Before an item is added or a minor override is set, the mutation is
//! simulated through the allocation engine. The mutation is refused if the
//! amount left to split, or any participant's final share, would drop below
//! zero. Exactly zero is allowed. A proposal whose amounts overflow
//! `Decimal` is refused the same way.
//!
//! Blank or zero candidate values never reach the guard: clearing an
//! override only lowers allocation pressure.

use crate::domain::bill::BillState;
use crate::domain::types::PersonId;
use crate::error::BillResult;
use crate::services::allocation::{simulate, Allocation, Proposal};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// First thing that would go negative under a proposal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// Items and overrides exceed the grand total
    AmountToSplit { amount: Decimal },
    /// A participant's final share would be negative
    Participant { id: PersonId, amount: Decimal },
    /// The amounts no longer fit in a `Decimal`
    Overflow,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::AmountToSplit { amount } => {
                write!(f, "amount left to split would be {}", amount.round_dp(2))
            }
            Violation::Participant { id, amount } => {
                write!(f, "{} would owe {}", id, amount.round_dp(2))
            }
            Violation::Overflow => f.write_str("amounts would exceed the supported range"),
        }
    }
}

/// Outcome of a guard check
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Allowed,
    Rejected(Violation),
}

impl Verdict {
    #[inline]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Verdict::Rejected(_))
    }
}

/// Inspect an allocation for negative values. Adults are checked before
/// minors, each in roster order.
pub fn inspect(allocation: &Allocation) -> Verdict {
    if allocation.amount_to_split < Decimal::ZERO {
        return Verdict::Rejected(Violation::AmountToSplit { amount: allocation.amount_to_split });
    }

    match allocation.shares.iter().find(|s| s.amount < Decimal::ZERO) {
        Some(share) => {
            Verdict::Rejected(Violation::Participant { id: share.id.clone(), amount: share.amount })
        }
        None => Verdict::Allowed,
    }
}

/// Simulate `proposal` and report whether it may be committed
pub fn check(state: &BillState, proposal: &Proposal<'_>) -> Verdict {
    let Some(allocation) = simulate(state, proposal) else {
        debug!(session_id = %state.session_id(), proposal = ?proposal, "guard_overflow");
        return Verdict::Rejected(Violation::Overflow);
    };
    let verdict = inspect(&allocation);

    debug!(
        session_id = %state.session_id(),
        proposal = ?proposal,
        amount_to_split = %allocation.amount_to_split,
        adult_base_amount = %allocation.adult_base_amount,
        rejected = verdict.is_rejected(),
        "guard_checked"
    );

    verdict
}

/// Would adding an item of `item_amount` to `adult_id` drive anyone negative?
///
/// Fails if `adult_id` is not an adult on the roster.
pub fn would_cause_negative_item(
    state: &BillState,
    adult_id: &PersonId,
    item_amount: Decimal,
) -> BillResult<bool> {
    state.adult(adult_id)?;
    Ok(check(state, &Proposal::AddItem { adult: adult_id, amount: item_amount }).is_rejected())
}

/// Would overriding `minor_id` with `direct_amount` drive anyone negative?
///
/// Fails if `minor_id` is not a minor on the roster.
pub fn would_cause_negative_minor(
    state: &BillState,
    minor_id: &PersonId,
    direct_amount: Decimal,
) -> BillResult<bool> {
    state.minor(minor_id)?;
    Ok(check(state, &Proposal::DirectAmount { minor: minor_id, amount: direct_amount })
        .is_rejected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ItemType, TipMode};
    use crate::error::BillError;
    use crate::services::session::{add_item, create_session, set_minor_direct_amount};

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn one_adult_one_minor() -> BillState {
        create_session(d("100"), d("10"), TipMode::Percent, 1, 1).unwrap()
    }

    #[test]
    fn test_override_above_grand_total_is_rejected() {
        let state = one_adult_one_minor();
        let minor = PersonId::minor(0);

        assert!(would_cause_negative_minor(&state, &minor, d("200")).unwrap());
        assert_eq!(
            check(&state, &Proposal::DirectAmount { minor: &minor, amount: d("200") }),
            Verdict::Rejected(Violation::AmountToSplit { amount: d("-90") })
        );
    }

    #[test]
    fn test_override_boundary_leaves_adult_at_zero() {
        // Overrides come off the split and again off the remainder:
        // 110 - 55 = 55 to split, 55 - 55 = 0 for the adult
        let state = one_adult_one_minor();
        assert!(!would_cause_negative_minor(&state, &PersonId::minor(0), d("55")).unwrap());
        assert!(would_cause_negative_minor(&state, &PersonId::minor(0), d("55.01")).unwrap());
    }

    #[test]
    fn test_item_equal_to_grand_total_is_allowed() {
        let state = create_session(d("100"), d("10"), TipMode::Percent, 2, 0).unwrap();
        assert!(!would_cause_negative_item(&state, &PersonId::adult(0), d("110")).unwrap());
        assert!(would_cause_negative_item(&state, &PersonId::adult(0), d("110.01")).unwrap());
    }

    #[test]
    fn test_item_rejected_when_other_adult_goes_negative() {
        let mut state = create_session(d("100"), d("0"), TipMode::Percent, 2, 1).unwrap();
        set_minor_direct_amount(&mut state, &PersonId::minor(0), d("30")).unwrap();
        add_item(&mut state, &PersonId::adult(0), ItemType::Food, d("30")).unwrap();

        // 100 - 75 = 25 to split, 25 - 30 = -5 left for two adults
        let verdict = check(
            &state,
            &Proposal::AddItem { adult: &PersonId::adult(0), amount: d("15") },
        );
        assert_eq!(
            verdict,
            Verdict::Rejected(Violation::Participant { id: PersonId::adult(1), amount: d("-2.5") })
        );
    }

    #[test]
    fn test_guard_requires_matching_kind() {
        let state = one_adult_one_minor();
        assert!(matches!(
            would_cause_negative_item(&state, &PersonId::minor(0), d("5")),
            Err(BillError::WrongPersonKind { .. })
        ));
        assert!(matches!(
            would_cause_negative_minor(&state, &PersonId::adult(0), d("5")),
            Err(BillError::WrongPersonKind { .. })
        ));
        assert!(matches!(
            would_cause_negative_minor(&state, &PersonId::minor(9), d("5")),
            Err(BillError::UnknownPerson(_))
        ));
    }

    #[test]
    fn test_overflowing_proposals_are_rejected() {
        let big = d("40000000000000000000000000000");
        let mut state = create_session(big, d("0"), TipMode::Percent, 1, 1).unwrap();
        let adult = PersonId::adult(0);
        add_item(&mut state, &adult, ItemType::Food, big).unwrap();

        assert!(would_cause_negative_item(&state, &adult, big).unwrap());
        assert_eq!(
            check(&state, &Proposal::AddItem { adult: &adult, amount: big }),
            Verdict::Rejected(Violation::Overflow)
        );
        assert!(would_cause_negative_minor(&state, &PersonId::minor(0), big).unwrap());
    }

    #[test]
    fn test_existing_items_count_against_new_override() {
        let mut state = one_adult_one_minor();
        add_item(&mut state, &PersonId::adult(0), ItemType::Beverage, d("100")).unwrap();

        assert!(!would_cause_negative_minor(&state, &PersonId::minor(0), d("10")).unwrap());
        assert!(would_cause_negative_minor(&state, &PersonId::minor(0), d("10.01")).unwrap());
    }
}
