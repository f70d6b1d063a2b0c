//! Text rendering of a session and its allocation
//!
//! Amounts are rounded to cents only here; the engine keeps full precision.

use crate::domain::bill::BillState;
use crate::domain::types::AllocationMode;
use crate::services::allocation::Allocation;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Write;

const NAME_WIDTH: usize = 28;
const AMOUNT_WIDTH: usize = 12;

/// Round to cents for display
#[inline]
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `$12.50` style amount
pub fn format_money(amount: Decimal, symbol: &str) -> String {
    format!("{}{:.2}", symbol, round_cents(amount))
}

/// Label shown for a minor's allocation mode
pub fn allocation_label(mode: &AllocationMode) -> String {
    match mode {
        AllocationMode::Percent(percent) => percent.to_string(),
        AllocationMode::DirectAmount(_) => "fixed".to_string(),
    }
}

/// Name as displayed; an empty stored name falls back to the id
fn display_name<'a>(name: &'a str, id: &'a str) -> &'a str {
    if name.is_empty() {
        id
    } else {
        name
    }
}

/// Render the summary banner, one row per participant with their items,
/// and optionally the allocation breakdown.
pub fn render_table(
    state: &BillState,
    allocation: &Allocation,
    symbol: &str,
    show_breakdown: bool,
) -> String {
    let mut out = String::new();
    let money = |amount: Decimal| format_money(amount, symbol);
    let summary = state.summary();

    // Writing into a String cannot fail
    let _ = writeln!(out, "{:<NAME_WIDTH$}{:>AMOUNT_WIDTH$}", "Total", money(summary.total));
    let _ = writeln!(out, "{:<NAME_WIDTH$}{:>AMOUNT_WIDTH$}", "Tip", money(summary.tip_amount));
    let _ = writeln!(
        out,
        "{:<NAME_WIDTH$}{:>AMOUNT_WIDTH$}",
        "Grand total",
        money(summary.grand_total)
    );
    let _ = writeln!(out, "{}", "-".repeat(NAME_WIDTH + AMOUNT_WIDTH));

    for adult in state.adults() {
        let amount = allocation.amount_for(&adult.id).unwrap_or_default();
        let label = format!("{} ({})", display_name(&adult.name, adult.id.as_str()), adult.id);
        let _ = writeln!(out, "{:<NAME_WIDTH$}{:>AMOUNT_WIDTH$}", label, money(amount));

        for (index, item) in state.items_for(&adult.id).iter().enumerate() {
            let label = format!("  [{index}] {}", item.name);
            let _ = writeln!(out, "{:<NAME_WIDTH$}{:>AMOUNT_WIDTH$}", label, money(item.amount));
        }
    }

    for minor in state.minors() {
        let amount = allocation.amount_for(&minor.id).unwrap_or_default();
        let label = format!(
            "{} ({}) {}",
            display_name(&minor.name, minor.id.as_str()),
            minor.id,
            allocation_label(&minor.allocation)
        );
        let _ = writeln!(out, "{:<NAME_WIDTH$}{:>AMOUNT_WIDTH$}", label, money(amount));
    }

    if show_breakdown {
        let _ = writeln!(out, "{}", "-".repeat(NAME_WIDTH + AMOUNT_WIDTH));
        let rows = [
            ("Items", allocation.total_items_amount),
            ("Minor overrides", allocation.total_direct_minor_amount),
            ("Amount to split", allocation.amount_to_split),
            ("Even split / person", allocation.even_split_per_person),
            ("Minors total", allocation.total_minor_amount),
            ("Remaining for adults", allocation.remaining_amount),
            ("Adult base", allocation.adult_base_amount),
        ];
        for (label, amount) in rows {
            let _ = writeln!(out, "{:<NAME_WIDTH$}{:>AMOUNT_WIDTH$}", label, money(amount));
        }
    }

    out
}
