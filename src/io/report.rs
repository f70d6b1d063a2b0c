//! JSON report of a session and its allocation

use crate::domain::bill::{BillState, BillSummary, Item};
use crate::domain::types::{AllocationMode, PersonId, PersonKind, TipMode};
use crate::io::commands::Rejection;
use crate::io::render::round_cents;
use crate::services::allocation::Allocation;
use rust_decimal::Decimal;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

/// One participant's line in the report
#[derive(Debug, Clone, Serialize)]
pub struct PersonReport {
    pub id: PersonId,
    pub name: String,
    pub kind: PersonKind,
    /// Owed amount rounded to cents
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation: Option<AllocationMode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,
}

/// A refused command as reported to the caller
#[derive(Debug, Clone, Serialize)]
pub struct RejectionReport {
    pub command: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: String,
    pub session_id: Uuid,
    pub tip_mode: TipMode,
    pub tip_percent: Decimal,
    pub summary: BillSummary,
    pub people: Vec<PersonReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectionReport>,
    /// Full-precision allocation, included on request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Allocation>,
}

impl Report {
    pub fn build(
        state: &BillState,
        allocation: &Allocation,
        rejections: &[Rejection],
        include_breakdown: bool,
    ) -> Self {
        let amount = |id: &PersonId| round_cents(allocation.amount_for(id).unwrap_or_default());

        let adults = state.adults().iter().map(|a| PersonReport {
            id: a.id.clone(),
            name: a.name.clone(),
            kind: PersonKind::Adult,
            amount: amount(&a.id),
            allocation: None,
            items: state.items_for(&a.id).to_vec(),
        });
        let minors = state.minors().iter().map(|m| PersonReport {
            id: m.id.clone(),
            name: m.name.clone(),
            kind: PersonKind::Minor,
            amount: amount(&m.id),
            allocation: Some(m.allocation),
            items: Vec::new(),
        });

        Self {
            generated_at: OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
            session_id: state.session_id(),
            tip_mode: state.tip_mode(),
            tip_percent: state.tip_percent(),
            summary: state.summary(),
            people: adults.chain(minors).collect(),
            rejected: rejections
                .iter()
                .map(|r| RejectionReport {
                    command: r.command.to_string(),
                    message: r.message.clone(),
                })
                .collect(),
            breakdown: include_breakdown.then(|| allocation.clone()),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
