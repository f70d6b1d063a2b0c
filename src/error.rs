//! Error types for the bill-splitting engine

use crate::domain::types::{PersonId, PersonKind};
use crate::services::guard::Violation;
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for engine operations
pub type BillResult<T> = Result<T, BillError>;

/// Errors returned by session operations. No variant is ever returned after
/// a partial mutation: a failed operation leaves the state untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BillError {
    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: &'static str, message: String },

    #[error("Percentage {0}% is not offered (choose 25, 50 or 75)")]
    UnsupportedPercent(u8),

    #[error("This amount would cause other attendees to have negative amounts ({0})")]
    WouldCauseNegative(Violation),

    #[error("Unknown person: {0}")]
    UnknownPerson(PersonId),

    #[error("Expected {} id, but {id} is a {}", .expected.as_str(), .found.as_str())]
    WrongPersonKind { id: PersonId, expected: PersonKind, found: PersonKind },

    #[error("Item index {index} out of range for {id} ({len} items)")]
    ItemIndexOutOfRange { id: PersonId, index: usize, len: usize },

    #[error("Amounts exceed the supported range")]
    AmountOverflow,
}

impl BillError {
    /// Refusals reject the user's input and keep the session usable.
    /// Everything else is a stale or invalid reference from the caller.
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            BillError::InvalidInput { .. }
                | BillError::UnsupportedPercent(_)
                | BillError::WouldCauseNegative(_)
        )
    }

    pub(crate) fn non_positive(field: &'static str, value: Decimal) -> Self {
        BillError::InvalidInput {
            field,
            message: format!("must be greater than zero, got {value}"),
        }
    }
}
