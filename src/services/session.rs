//! Session operations
//!
//! Every mutation of a `BillState` goes through this module. Operations that
//! move money (adding an item, setting a minor override) run the guard first
//! and commit only if it passes. Each function either applies its change in
//! full or returns an error with the state untouched. The `&mut BillState`
//! borrow keeps the guard check and the commit in one transaction.

use crate::domain::bill::{BillState, Item};
use crate::domain::types::{AllocationMode, ItemType, MinorPercent, PersonId, TipMode};
use crate::error::{BillError, BillResult};
use crate::services::allocation::Proposal;
use crate::services::guard::{self, Verdict};
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Start a new calculation session from the landing-step inputs
pub fn create_session(
    total_amount: Decimal,
    tip_value: Decimal,
    tip_mode: TipMode,
    adults_count: usize,
    minors_count: usize,
) -> BillResult<BillState> {
    if total_amount <= Decimal::ZERO {
        return Err(BillError::non_positive("total amount", total_amount));
    }
    if tip_value < Decimal::ZERO {
        return Err(BillError::InvalidInput {
            field: "tip",
            message: format!("must not be negative, got {tip_value}"),
        });
    }
    if adults_count == 0 {
        return Err(BillError::InvalidInput {
            field: "adults",
            message: "at least one adult is required".to_string(),
        });
    }

    let state = BillState::new(total_amount, tip_value, tip_mode, adults_count, minors_count)?;

    info!(
        session_id = %state.session_id(),
        total_amount = %total_amount,
        tip_mode = %tip_mode.as_str(),
        tip_percent = %state.tip_percent(),
        tip_amount = %state.tip_amount(),
        adults = adults_count,
        minors = minors_count,
        "session_created"
    );

    Ok(state)
}

/// Add an itemized charge to an adult.
///
/// The item is named `<Drink|Food>-<n>` where `n` is one more than the
/// number of items of that type the adult currently holds.
pub fn add_item<'a>(
    state: &'a mut BillState,
    adult_id: &PersonId,
    item_type: ItemType,
    amount: Decimal,
) -> BillResult<&'a Item> {
    if amount <= Decimal::ZERO {
        return Err(BillError::non_positive("item amount", amount));
    }
    state.adult(adult_id)?;

    if let Verdict::Rejected(violation) =
        guard::check(state, &Proposal::AddItem { adult: adult_id, amount })
    {
        debug!(
            session_id = %state.session_id(),
            person_id = %adult_id,
            amount = %amount,
            violation = %violation,
            "item_rejected"
        );
        return Err(BillError::WouldCauseNegative(violation));
    }

    let items = state.items.entry(adult_id.clone()).or_default();
    let number = items.iter().filter(|item| item.item_type == item_type).count() + 1;
    items.push(Item { name: format!("{}-{}", item_type.label(), number), amount, item_type });

    let session_id = state.session_id;
    let items = &state.items[adult_id];
    let item = &items[items.len() - 1];

    info!(
        session_id = %session_id,
        person_id = %adult_id,
        item = %item.name,
        amount = %amount,
        "item_added"
    );

    Ok(item)
}

/// Remove an adult's item by position. Later items shift down by one.
pub fn remove_item(state: &mut BillState, adult_id: &PersonId, index: usize) -> BillResult<Item> {
    state.adult(adult_id)?;

    let out_of_range = |len| BillError::ItemIndexOutOfRange { id: adult_id.clone(), index, len };
    let Some(items) = state.items.get_mut(adult_id) else {
        return Err(out_of_range(0));
    };
    if index >= items.len() {
        return Err(out_of_range(items.len()));
    }

    let removed = items.remove(index);
    if items.is_empty() {
        state.items.remove(adult_id);
    }

    info!(
        session_id = %state.session_id(),
        person_id = %adult_id,
        item = %removed.name,
        index,
        "item_removed"
    );

    Ok(removed)
}

/// Switch a minor to a percent preset, dropping any direct override
pub fn set_minor_percent(
    state: &mut BillState,
    minor_id: &PersonId,
    percent: MinorPercent,
) -> BillResult<()> {
    let session_id = state.session_id();
    let minor = state.minor_mut(minor_id)?;
    minor.allocation = AllocationMode::Percent(percent);

    info!(
        session_id = %session_id,
        person_id = %minor_id,
        percent = percent.value(),
        "minor_percent_set"
    );

    Ok(())
}

/// Same as `set_minor_percent`, for a raw value that must be one of the presets
pub fn set_minor_percent_value(
    state: &mut BillState,
    minor_id: &PersonId,
    percent: u8,
) -> BillResult<()> {
    let percent = MinorPercent::try_from(percent).map_err(BillError::UnsupportedPercent)?;
    set_minor_percent(state, minor_id, percent)
}

/// Give a minor a fixed amount, replacing the percent share.
///
/// Clearing the override later falls back to the default 50% preset.
pub fn set_minor_direct_amount(
    state: &mut BillState,
    minor_id: &PersonId,
    amount: Decimal,
) -> BillResult<()> {
    if amount <= Decimal::ZERO {
        return Err(BillError::non_positive("minor amount", amount));
    }
    state.minor(minor_id)?;

    if let Verdict::Rejected(violation) =
        guard::check(state, &Proposal::DirectAmount { minor: minor_id, amount })
    {
        debug!(
            session_id = %state.session_id(),
            person_id = %minor_id,
            amount = %amount,
            violation = %violation,
            "minor_override_rejected"
        );
        return Err(BillError::WouldCauseNegative(violation));
    }

    let session_id = state.session_id();
    let minor = state.minor_mut(minor_id)?;
    minor.allocation = AllocationMode::DirectAmount(amount);

    info!(
        session_id = %session_id,
        person_id = %minor_id,
        amount = %amount,
        "minor_override_set"
    );

    Ok(())
}

/// Drop a minor's direct override and return it. Never guarded: it only
/// lowers the amount taken off the top. A minor without an override is left
/// as it is and `None` is returned.
pub fn clear_minor_direct_amount(
    state: &mut BillState,
    minor_id: &PersonId,
) -> BillResult<Option<Decimal>> {
    let session_id = state.session_id();
    let minor = state.minor_mut(minor_id)?;

    let Some(previous) = minor.allocation.direct_amount() else {
        debug!(session_id = %session_id, person_id = %minor_id, "minor_override_absent");
        return Ok(None);
    };
    minor.allocation = AllocationMode::default();

    info!(
        session_id = %session_id,
        person_id = %minor_id,
        previous = %previous,
        "minor_override_cleared"
    );

    Ok(Some(previous))
}

/// Change a display name. Empty names are kept as-is.
pub fn rename_person(state: &mut BillState, person_id: &PersonId, name: &str) -> BillResult<()> {
    let session_id = state.session_id();
    let slot = state.name_mut(person_id)?;
    *slot = name.to_string();

    debug!(session_id = %session_id, person_id = %person_id, name = %name, "person_renamed");

    Ok(())
}
