//! Bill session data model
//!
//! `BillState` is the aggregate root of one calculation session. It is built
//! once from the landing-step inputs and then edited in place; the allocation
//! engine recomputes every amount from these source fields on demand.

use crate::domain::tip;
use crate::domain::types::{AllocationMode, ItemType, PersonId, PersonKind, TipMode};
use crate::error::{BillError, BillResult};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Adult participant. Only adults carry itemized charges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Adult {
    pub id: PersonId,
    pub name: String,
}

/// Minor participant with its allocation mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Minor {
    pub id: PersonId,
    pub name: String,
    pub allocation: AllocationMode,
}

/// Itemized charge attributed to a single adult
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub name: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub item_type: ItemType,
}

/// Bill total, tip and grand total as shown in the summary banner
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BillSummary {
    pub total: Decimal,
    pub tip_amount: Decimal,
    pub grand_total: Decimal,
}

/// One calculation session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillState {
    pub(crate) session_id: Uuid,
    pub(crate) total_amount: Decimal,
    pub(crate) tip_mode: TipMode,
    pub(crate) tip_percent: Decimal,
    pub(crate) tip_amount: Decimal,
    /// Total plus tip, range-checked once when the session is built
    pub(crate) grand_total: Decimal,
    pub(crate) adults: Vec<Adult>,
    pub(crate) minors: Vec<Minor>,
    /// Never holds an empty sequence; the key is removed instead
    pub(crate) items: BTreeMap<PersonId, Vec<Item>>,
}

impl BillState {
    /// Build the initial roster. Sign and head-count checks happen in
    /// `services::session::create_session`; this only refuses amounts whose
    /// tip or grand total falls outside the `Decimal` range.
    pub(crate) fn new(
        total_amount: Decimal,
        tip_value: Decimal,
        tip_mode: TipMode,
        adults_count: usize,
        minors_count: usize,
    ) -> BillResult<Self> {
        let out_of_range = |field| BillError::InvalidInput {
            field,
            message: "exceeds the supported amount range".to_string(),
        };
        let (tip_percent, tip_amount) =
            tip::derive_tip(total_amount, tip_value, tip_mode).ok_or_else(|| out_of_range("tip"))?;
        let grand_total =
            total_amount.checked_add(tip_amount).ok_or_else(|| out_of_range("total amount"))?;

        let adults = (0..adults_count)
            .map(|i| Adult { id: PersonId::adult(i), name: format!("Adult {}", i + 1) })
            .collect();

        let minors = (0..minors_count)
            .map(|i| Minor {
                id: PersonId::minor(i),
                name: format!("Minor {}", i + 1),
                allocation: AllocationMode::default(),
            })
            .collect();

        Ok(Self {
            session_id: Uuid::now_v7(),
            total_amount,
            tip_mode,
            tip_percent,
            tip_amount,
            grand_total,
            adults,
            minors,
            items: BTreeMap::new(),
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn tip_mode(&self) -> TipMode {
        self.tip_mode
    }

    pub fn tip_percent(&self) -> Decimal {
        self.tip_percent
    }

    /// Tip amount according to the active tip mode. In percent mode this is
    /// `total * tip_percent / 100`.
    pub fn tip_amount(&self) -> Decimal {
        self.tip_amount
    }

    pub fn grand_total(&self) -> Decimal {
        self.grand_total
    }

    pub fn summary(&self) -> BillSummary {
        BillSummary {
            total: self.total_amount,
            tip_amount: self.tip_amount,
            grand_total: self.grand_total,
        }
    }

    pub fn adults(&self) -> &[Adult] {
        &self.adults
    }

    pub fn minors(&self) -> &[Minor] {
        &self.minors
    }

    pub fn people_count(&self) -> usize {
        self.adults.len() + self.minors.len()
    }

    /// Items of a person, empty when the person has none
    pub fn items_for(&self, id: &PersonId) -> &[Item] {
        self.items.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn items(&self) -> &BTreeMap<PersonId, Vec<Item>> {
        &self.items
    }

    /// Category of a roster member
    pub fn person_kind(&self, id: &PersonId) -> Option<PersonKind> {
        if self.adults.iter().any(|a| &a.id == id) {
            Some(PersonKind::Adult)
        } else if self.minors.iter().any(|m| &m.id == id) {
            Some(PersonKind::Minor)
        } else {
            None
        }
    }

    /// Display name of a roster member
    pub fn person_name(&self, id: &PersonId) -> Option<&str> {
        self.adults
            .iter()
            .find(|a| &a.id == id)
            .map(|a| a.name.as_str())
            .or_else(|| self.minors.iter().find(|m| &m.id == id).map(|m| m.name.as_str()))
    }

    /// Look up an adult, failing with the appropriate invariant error
    pub fn adult(&self, id: &PersonId) -> BillResult<&Adult> {
        match self.adults.iter().find(|a| &a.id == id) {
            Some(adult) => Ok(adult),
            None => Err(self.wrong_kind_or_unknown(id, PersonKind::Adult)),
        }
    }

    /// Look up a minor, failing with the appropriate invariant error
    pub fn minor(&self, id: &PersonId) -> BillResult<&Minor> {
        match self.minors.iter().find(|m| &m.id == id) {
            Some(minor) => Ok(minor),
            None => Err(self.wrong_kind_or_unknown(id, PersonKind::Minor)),
        }
    }

    pub(crate) fn minor_mut(&mut self, id: &PersonId) -> BillResult<&mut Minor> {
        if let Some(pos) = self.minors.iter().position(|m| &m.id == id) {
            return Ok(&mut self.minors[pos]);
        }
        Err(self.wrong_kind_or_unknown(id, PersonKind::Minor))
    }

    /// Mutable handle on a roster member's name
    pub(crate) fn name_mut(&mut self, id: &PersonId) -> BillResult<&mut String> {
        if let Some(adult) = self.adults.iter_mut().find(|a| &a.id == id) {
            return Ok(&mut adult.name);
        }
        if let Some(minor) = self.minors.iter_mut().find(|m| &m.id == id) {
            return Ok(&mut minor.name);
        }
        Err(BillError::UnknownPerson(id.clone()))
    }

    fn wrong_kind_or_unknown(&self, id: &PersonId, expected: PersonKind) -> BillError {
        match self.person_kind(id) {
            Some(found) => BillError::WrongPersonKind { id: id.clone(), expected, found },
            None => BillError::UnknownPerson(id.clone()),
        }
    }
}
