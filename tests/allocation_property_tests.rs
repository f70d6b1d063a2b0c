//! Property-based invariant tests for the allocation engine and its guard.
//!
//! Verifies:
//! 1. Without direct overrides the shares add up to the grand total
//! 2. Without items or overrides, percent minors pay their preset fraction of
//!    grand total / head count
//! 3. An accepted override is exactly what the minor owes
//! 4. Accepted mutations never leave anyone owing a negative amount
//! 5. The item guard refuses exactly when the simulated split goes negative
//! 6. Allocation is deterministic and does not touch the state

use billsplit::domain::{AllocationMode, BillState, ItemType, MinorPercent, PersonId, TipMode};
use billsplit::services::{
    add_item, allocate, compute_amounts, create_session, set_minor_direct_amount,
    set_minor_percent, simulate, would_cause_negative_item, Allocation, Proposal,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_cents(max: i64) -> impl Strategy<Value = Decimal> {
    (1i64..=max).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_minor_percent() -> impl Strategy<Value = MinorPercent> {
    prop_oneof![
        Just(MinorPercent::Quarter),
        Just(MinorPercent::Half),
        Just(MinorPercent::ThreeQuarters),
    ]
}

fn arb_item_type() -> impl Strategy<Value = ItemType> {
    prop_oneof![Just(ItemType::Beverage), Just(ItemType::Food)]
}

#[derive(Debug, Clone)]
struct Scenario {
    total: Decimal,
    tip_percent: Decimal,
    adults: usize,
    percents: Vec<MinorPercent>,
    items: Vec<(usize, ItemType, Decimal)>,
}

fn arb_scenario() -> impl Strategy<Value = Scenario> {
    (
        arb_cents(50_000),
        0u32..=30,
        1usize..=5,
        prop::collection::vec(arb_minor_percent(), 0..=4),
        prop::collection::vec((0usize..5, arb_item_type(), arb_cents(10_000)), 0..=6),
    )
        .prop_map(|(total, tip, adults, percents, items)| Scenario {
            total,
            tip_percent: Decimal::from(tip),
            adults,
            percents,
            items,
        })
}

/// Build the session, skipping any item the guard refuses
fn build(scenario: &Scenario) -> BillState {
    let mut state = create_session(
        scenario.total,
        scenario.tip_percent,
        TipMode::Percent,
        scenario.adults,
        scenario.percents.len(),
    )
    .unwrap();

    for (i, percent) in scenario.percents.iter().enumerate() {
        set_minor_percent(&mut state, &PersonId::minor(i), *percent).unwrap();
    }
    for (adult, item_type, amount) in &scenario.items {
        let adult = PersonId::adult(adult % scenario.adults);
        let _ = add_item(&mut state, &adult, *item_type, *amount);
    }

    state
}

fn has_negative(allocation: &Allocation) -> bool {
    allocation.amount_to_split < Decimal::ZERO
        || allocation.shares.iter().any(|share| share.amount < Decimal::ZERO)
}

fn tolerance() -> Decimal {
    Decimal::new(1, 6)
}

// ── Properties ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn shares_sum_to_grand_total_without_overrides(scenario in arb_scenario()) {
        let state = build(&scenario);
        let allocation = allocate(&state).unwrap();

        let drift = (allocation.total_allocated() - allocation.grand_total).abs();
        prop_assert!(drift < tolerance(), "drift {} on {:?}", drift, allocation);
        prop_assert_eq!(allocation.grand_total, state.summary().grand_total);
    }

    #[test]
    fn percent_minors_take_their_fraction(scenario in arb_scenario()) {
        let scenario = Scenario { items: Vec::new(), ..scenario };
        let state = build(&scenario);
        let allocation = allocate(&state).unwrap();

        let grand_total =
            scenario.total + scenario.total * scenario.tip_percent / Decimal::ONE_HUNDRED;
        let people = Decimal::from(scenario.adults + scenario.percents.len());
        for (i, percent) in scenario.percents.iter().enumerate() {
            prop_assert_eq!(
                allocation.amount_for(&PersonId::minor(i)),
                Some(grand_total / people * percent.fraction())
            );
        }
    }

    #[test]
    fn accepted_override_is_what_the_minor_owes(
        scenario in arb_scenario(),
        amount in arb_cents(60_000),
    ) {
        prop_assume!(!scenario.percents.is_empty());
        let mut state = build(&scenario);
        let minor = PersonId::minor(0);

        if set_minor_direct_amount(&mut state, &minor, amount).is_ok() {
            prop_assert_eq!(compute_amounts(&state).unwrap()[&minor], amount);
            prop_assert!(!has_negative(&allocate(&state).unwrap()));
        } else {
            prop_assert_eq!(
                state.minor(&minor).unwrap().allocation,
                AllocationMode::Percent(scenario.percents[0])
            );
        }
    }

    #[test]
    fn built_sessions_never_owe_negative(scenario in arb_scenario()) {
        let state = build(&scenario);
        prop_assert!(!has_negative(&allocate(&state).unwrap()));
    }

    #[test]
    fn item_guard_matches_simulation(
        scenario in arb_scenario(),
        adult in 0usize..5,
        amount in arb_cents(80_000),
    ) {
        let state = build(&scenario);
        let adult = PersonId::adult(adult % scenario.adults);

        let rejected = would_cause_negative_item(&state, &adult, amount).unwrap();
        let simulated = simulate(&state, &Proposal::AddItem { adult: &adult, amount });

        prop_assert_eq!(rejected, simulated.as_ref().map_or(true, has_negative));
    }

    #[test]
    fn allocation_is_idempotent(scenario in arb_scenario()) {
        let state = build(&scenario);
        let before = state.clone();

        prop_assert_eq!(allocate(&state).unwrap(), allocate(&state).unwrap());
        prop_assert_eq!(state, before);
    }
}
