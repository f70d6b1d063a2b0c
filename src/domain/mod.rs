//! Domain models - core bill-splitting types
//!
//! This module contains the canonical data types used throughout the system:
//! - `BillState` - the aggregate root of one calculation session
//! - `Adult` / `Minor` - roster members
//! - `Item` - itemized charge attributed to an adult
//! - `AllocationMode` - percent preset or direct override for a minor
//! - `tip` - tip derivation and the percent/amount toggle conversion

pub mod bill;
pub mod tip;
pub mod types;

// Re-export commonly used types at module level
pub use bill::{Adult, BillState, BillSummary, Item, Minor};
pub use types::{AllocationMode, ItemType, MinorPercent, PersonId, PersonKind, TipMode};
