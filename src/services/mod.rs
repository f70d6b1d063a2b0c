//! Services - allocation engine and session operations
//!
//! This module contains the computational core:
//! - `allocation` - Per-person amounts from a `BillState` (pure)
//! - `guard` - Negative-amount check over a simulated mutation
//! - `session` - Session creation and guarded mutations

pub mod allocation;
pub mod guard;
pub mod session;

// Re-export commonly used types
pub use allocation::{allocate, compute_amounts, simulate, Allocation, Proposal, Share};
pub use guard::{would_cause_negative_item, would_cause_negative_minor, Verdict, Violation};
pub use session::{
    add_item, clear_minor_direct_amount, create_session, remove_item, rename_person,
    set_minor_direct_amount, set_minor_percent, set_minor_percent_value,
};
