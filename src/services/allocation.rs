//! Allocation engine
//!
//! Turns a `BillState` into the amount each participant owes:
//!
//! 1. tip from the active tip mode, grand total = total + tip
//! 2. itemized charges and minor overrides are taken off the top
//! 3. the rest is split evenly over everyone
//! 4. percent-mode minors pay their fraction of that even split
//! 5. adults share what remains equally, plus their own items
//!
//! Nothing is clamped. A negative share is only prevented by running the
//! guard (`services::guard`) before a mutation is committed, and the guard
//! runs this same computation with the proposed value substituted in.

use crate::domain::bill::BillState;
use crate::domain::types::{AllocationMode, PersonId, PersonKind};
use crate::error::{BillError, BillResult};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// A hypothetical mutation to evaluate without touching the real state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Proposal<'a> {
    /// Append an item of `amount` to `adult`
    AddItem { adult: &'a PersonId, amount: Decimal },
    /// Set `minor`'s direct override to `amount`; other overrides stay
    DirectAmount { minor: &'a PersonId, amount: Decimal },
}

/// Amount owed by one participant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub id: PersonId,
    pub kind: PersonKind,
    pub amount: Decimal,
}

/// Result of one allocation run, including every intermediate quantity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub tip_amount: Decimal,
    pub grand_total: Decimal,
    pub total_items_amount: Decimal,
    pub total_direct_minor_amount: Decimal,
    /// Grand total minus items and overrides; may be negative
    pub amount_to_split: Decimal,
    pub even_split_per_person: Decimal,
    pub total_minor_amount: Decimal,
    pub remaining_amount: Decimal,
    pub adult_base_amount: Decimal,
    /// Adults first, then minors, each in roster order
    pub shares: Vec<Share>,
}

impl Allocation {
    pub fn amount_for(&self, id: &PersonId) -> Option<Decimal> {
        self.shares.iter().find(|s| &s.id == id).map(|s| s.amount)
    }

    /// Sum of all shares (equals the grand total unless something went negative)
    pub fn total_allocated(&self) -> Decimal {
        self.shares.iter().map(|s| s.amount).sum()
    }

    pub fn into_map(self) -> HashMap<PersonId, Decimal> {
        self.shares.into_iter().map(|s| (s.id, s.amount)).collect()
    }
}

/// Amount owed by every participant, keyed by person ID
pub fn compute_amounts(state: &BillState) -> BillResult<HashMap<PersonId, Decimal>> {
    allocate(state).map(Allocation::into_map)
}

/// Allocate the bill as it currently stands.
///
/// Sessions built through `services::session` always allocate; the error
/// only surfaces for amounts outside the `Decimal` range.
pub fn allocate(state: &BillState) -> BillResult<Allocation> {
    run(state, None).ok_or(BillError::AmountOverflow)
}

/// Allocate the bill as it would stand after `proposal`, without mutating it.
///
/// Returns `None` when the proposed amounts overflow `Decimal`.
pub fn simulate(state: &BillState, proposal: &Proposal<'_>) -> Option<Allocation> {
    run(state, Some(proposal))
}

fn checked_sum(mut amounts: impl Iterator<Item = Decimal>) -> Option<Decimal> {
    amounts.try_fold(Decimal::ZERO, |sum, amount| sum.checked_add(amount))
}

fn run(state: &BillState, proposal: Option<&Proposal<'_>>) -> Option<Allocation> {
    let tip_amount = state.tip_amount();
    let grand_total = state.grand_total();

    let extra_item = match proposal {
        Some(Proposal::AddItem { adult, amount }) => Some((*adult, *amount)),
        _ => None,
    };
    let minor_mode = |id: &PersonId, current: AllocationMode| match proposal {
        Some(Proposal::DirectAmount { minor, amount }) if *minor == id => {
            AllocationMode::DirectAmount(*amount)
        }
        _ => current,
    };

    let items = state.items().values().flatten().map(|item| item.amount);
    let total_items_amount =
        checked_sum(items.chain(extra_item.map(|(_, amount)| amount)))?;

    let total_direct_minor_amount = checked_sum(
        state.minors().iter().filter_map(|m| minor_mode(&m.id, m.allocation).direct_amount()),
    )?;

    let amount_to_split = grand_total
        .checked_sub(total_items_amount)?
        .checked_sub(total_direct_minor_amount)?;

    let total_people = state.people_count();
    let even_split_per_person = if total_people > 0 {
        amount_to_split.checked_div(Decimal::from(total_people))?
    } else {
        Decimal::ZERO
    };

    let minor_shares = state
        .minors()
        .iter()
        .map(|m| {
            let amount = match minor_mode(&m.id, m.allocation) {
                AllocationMode::DirectAmount(amount) => amount,
                AllocationMode::Percent(percent) => {
                    even_split_per_person.checked_mul(percent.fraction())?
                }
            };
            Some(Share { id: m.id.clone(), kind: PersonKind::Minor, amount })
        })
        .collect::<Option<Vec<Share>>>()?;
    let total_minor_amount = checked_sum(minor_shares.iter().map(|s| s.amount))?;

    let remaining_amount = amount_to_split.checked_sub(total_minor_amount)?;
    let adult_count = state.adults().len();
    let adult_base_amount = if adult_count > 0 {
        remaining_amount.checked_div(Decimal::from(adult_count))?
    } else {
        Decimal::ZERO
    };

    let mut shares: Vec<Share> = Vec::with_capacity(total_people);
    for adult in state.adults() {
        let own_items = checked_sum(state.items_for(&adult.id).iter().map(|item| item.amount))?;
        let mut amount = adult_base_amount.checked_add(own_items)?;
        if let Some((target, extra)) = extra_item {
            if target == &adult.id {
                amount = amount.checked_add(extra)?;
            }
        }
        shares.push(Share { id: adult.id.clone(), kind: PersonKind::Adult, amount });
    }
    shares.extend(minor_shares);

    Some(Allocation {
        tip_amount,
        grand_total,
        total_items_amount,
        total_direct_minor_amount,
        amount_to_split,
        even_split_per_person,
        total_minor_amount,
        remaining_amount,
        adult_base_amount,
        shares,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bill::Item;
    use crate::domain::types::{ItemType, MinorPercent, TipMode};
    use crate::services::session::{
        add_item, create_session, set_minor_direct_amount, set_minor_percent,
    };

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn one_adult_one_minor() -> BillState {
        create_session(d("100"), d("10"), TipMode::Percent, 1, 1).unwrap()
    }

    #[test]
    fn test_one_adult_one_minor_half() {
        let state = one_adult_one_minor();
        let allocation = allocate(&state).unwrap();

        assert_eq!(allocation.tip_amount, d("10"));
        assert_eq!(allocation.grand_total, d("110"));
        assert_eq!(allocation.amount_to_split, d("110"));
        assert_eq!(allocation.even_split_per_person, d("55"));
        assert_eq!(allocation.amount_for(&PersonId::minor(0)), Some(d("27.50")));
        assert_eq!(allocation.amount_for(&PersonId::adult(0)), Some(d("82.50")));
        assert_eq!(allocation.total_allocated(), d("110"));
    }

    #[test]
    fn test_adult_item_is_taken_off_the_top() {
        let mut state = one_adult_one_minor();
        add_item(&mut state, &PersonId::adult(0), ItemType::Food, d("20")).unwrap();

        let allocation = allocate(&state).unwrap();
        assert_eq!(allocation.total_items_amount, d("20"));
        assert_eq!(allocation.amount_to_split, d("90"));
        assert_eq!(allocation.even_split_per_person, d("45"));
        assert_eq!(allocation.amount_for(&PersonId::minor(0)), Some(d("22.50")));
        assert_eq!(allocation.amount_for(&PersonId::adult(0)), Some(d("87.50")));
        assert_eq!(allocation.total_allocated(), d("110"));
    }

    #[test]
    fn test_direct_minor_amount_is_exact() {
        let mut state = create_session(d("200"), d("0"), TipMode::Percent, 2, 2).unwrap();
        set_minor_direct_amount(&mut state, &PersonId::minor(1), d("12.34")).unwrap();

        let allocation = allocate(&state).unwrap();
        assert_eq!(allocation.amount_for(&PersonId::minor(1)), Some(d("12.34")));
        assert_eq!(allocation.total_direct_minor_amount, d("12.34"));
        // 187.66 split over 4 people, minor-0 pays half of a share
        assert_eq!(allocation.even_split_per_person, d("46.915"));
        assert_eq!(allocation.amount_for(&PersonId::minor(0)), Some(d("23.4575")));
        // Overrides come off both the split and the remainder
        assert_eq!(allocation.remaining_amount, d("151.8625"));
        assert_eq!(allocation.total_allocated(), d("187.66"));
    }

    #[test]
    fn test_amount_tip_mode_uses_stored_amount() {
        let state = create_session(d("90"), d("9"), TipMode::Amount, 3, 0).unwrap();
        let amounts = compute_amounts(&state).unwrap();

        assert_eq!(amounts.len(), 3);
        for i in 0..3 {
            assert_eq!(amounts[&PersonId::adult(i)], d("33"));
        }
    }

    #[test]
    fn test_percent_presets_scale_even_split() {
        let mut state = create_session(d("120"), d("0"), TipMode::Percent, 1, 2).unwrap();
        set_minor_percent(&mut state, &PersonId::minor(0), MinorPercent::Quarter).unwrap();
        set_minor_percent(&mut state, &PersonId::minor(1), MinorPercent::ThreeQuarters).unwrap();

        let amounts = compute_amounts(&state).unwrap();
        assert_eq!(amounts[&PersonId::minor(0)], d("10"));
        assert_eq!(amounts[&PersonId::minor(1)], d("30"));
        assert_eq!(amounts[&PersonId::adult(0)], d("80"));
    }

    #[test]
    fn test_shares_follow_roster_order() {
        let state = create_session(d("60"), d("0"), TipMode::Percent, 2, 1).unwrap();
        let ids: Vec<_> = allocate(&state).unwrap().shares.into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![PersonId::adult(0), PersonId::adult(1), PersonId::minor(0)]);
    }

    #[test]
    fn test_negative_shares_are_not_clamped() {
        let mut state = one_adult_one_minor();
        // Bypass the guard to build a state the engine must still report faithfully
        state.minors[0].allocation = AllocationMode::DirectAmount(d("200"));

        let allocation = allocate(&state).unwrap();
        assert_eq!(allocation.amount_to_split, d("-90"));
        assert_eq!(allocation.amount_for(&PersonId::adult(0)), Some(d("-290")));
    }

    #[test]
    fn test_simulate_add_item_leaves_state_untouched() {
        let state = one_adult_one_minor();
        let adult = PersonId::adult(0);
        let simulated =
            simulate(&state, &Proposal::AddItem { adult: &adult, amount: d("20") }).unwrap();

        assert_eq!(simulated.amount_for(&adult), Some(d("87.50")));
        assert!(state.items().is_empty());
        assert_eq!(allocate(&state).unwrap().amount_for(&adult), Some(d("82.50")));
    }

    #[test]
    fn test_simulate_direct_amount_substitutes_only_target() {
        let mut state = create_session(d("100"), d("0"), TipMode::Percent, 1, 2).unwrap();
        set_minor_direct_amount(&mut state, &PersonId::minor(0), d("10")).unwrap();

        let target = PersonId::minor(1);
        let proposal = Proposal::DirectAmount { minor: &target, amount: d("15") };
        let simulated = simulate(&state, &proposal).unwrap();

        assert_eq!(simulated.total_direct_minor_amount, d("25"));
        assert_eq!(simulated.amount_for(&PersonId::minor(0)), Some(d("10")));
        assert_eq!(simulated.amount_for(&target), Some(d("15")));
        assert_eq!(simulated.amount_for(&PersonId::adult(0)), Some(d("50")));
    }

    #[test]
    fn test_overflowing_proposal_simulates_to_none() {
        let big = d("40000000000000000000000000000");
        let mut state = create_session(big, d("0"), TipMode::Percent, 1, 0).unwrap();
        let adult = PersonId::adult(0);
        add_item(&mut state, &adult, ItemType::Food, big).unwrap();

        assert!(simulate(&state, &Proposal::AddItem { adult: &adult, amount: big }).is_none());
        assert_eq!(allocate(&state).unwrap().amount_for(&adult), Some(big));
    }

    #[test]
    fn test_allocate_reports_overflow() {
        let mut state = one_adult_one_minor();
        state.minors[0].allocation = AllocationMode::DirectAmount(Decimal::MAX);
        let item =
            Item { name: "Food-1".to_string(), amount: Decimal::MAX, item_type: ItemType::Food };
        state.items.insert(PersonId::adult(0), vec![item]);

        assert_eq!(allocate(&state), Err(BillError::AmountOverflow));
        assert_eq!(compute_amounts(&state), Err(BillError::AmountOverflow));
    }

    #[test]
    fn test_compute_amounts_is_idempotent() {
        let mut state = create_session(d("87.13"), d("18"), TipMode::Percent, 3, 2).unwrap();
        add_item(&mut state, &PersonId::adult(2), ItemType::Beverage, d("6.5")).unwrap();

        assert_eq!(compute_amounts(&state).unwrap(), compute_amounts(&state).unwrap());
    }
}
