//! Shared types for the bill-splitting engine

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Newtype wrapper for participant IDs (`adult-0`, `minor-2`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
    /// ID of the adult at roster position `index`
    pub fn adult(index: usize) -> Self {
        Self(format!("adult-{index}"))
    }

    /// ID of the minor at roster position `index`
    pub fn minor(index: usize) -> Self {
        Self(format!("minor-{index}"))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Participant category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonKind {
    Adult,
    Minor,
}

impl PersonKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonKind::Adult => "adult",
            PersonKind::Minor => "minor",
        }
    }
}

/// How the tip was entered: as a percentage of the total or as a fixed amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipMode {
    #[default]
    Percent,
    Amount,
}

impl TipMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TipMode::Percent => "percent",
            TipMode::Amount => "amount",
        }
    }

    /// The other mode (the landing-step `%`/`$` toggle)
    pub fn toggled(self) -> Self {
        match self {
            TipMode::Percent => TipMode::Amount,
            TipMode::Amount => TipMode::Percent,
        }
    }
}

impl std::str::FromStr for TipMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percent" | "%" => Ok(TipMode::Percent),
            "amount" | "$" => Ok(TipMode::Amount),
            other => Err(format!("unknown tip mode '{other}' (expected percent or amount)")),
        }
    }
}

/// Itemized charge category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Beverage,
    Food,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Beverage => "beverage",
            ItemType::Food => "food",
        }
    }

    /// Prefix of generated item names ("Drink-1", "Food-2")
    pub fn label(&self) -> &'static str {
        match self {
            ItemType::Beverage => "Drink",
            ItemType::Food => "Food",
        }
    }
}

impl std::str::FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beverage" | "drink" => Ok(ItemType::Beverage),
            "food" => Ok(ItemType::Food),
            other => Err(format!("unknown item type '{other}' (expected drink or food)")),
        }
    }
}

/// Share of the even split a percent-mode minor pays.
///
/// The set is closed: only the three presets offered to the user exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MinorPercent {
    Quarter,
    #[default]
    Half,
    ThreeQuarters,
}

impl MinorPercent {
    pub fn value(self) -> u8 {
        match self {
            MinorPercent::Quarter => 25,
            MinorPercent::Half => 50,
            MinorPercent::ThreeQuarters => 75,
        }
    }

    /// Multiplier applied to the even split (`0.25`, `0.50`, `0.75`)
    pub fn fraction(self) -> Decimal {
        Decimal::from(self.value()) / Decimal::ONE_HUNDRED
    }
}

impl TryFrom<u8> for MinorPercent {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            25 => Ok(MinorPercent::Quarter),
            50 => Ok(MinorPercent::Half),
            75 => Ok(MinorPercent::ThreeQuarters),
            other => Err(other),
        }
    }
}

impl From<MinorPercent> for u8 {
    fn from(percent: MinorPercent) -> Self {
        percent.value()
    }
}

impl fmt::Display for MinorPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.value())
    }
}

/// How a minor's share is determined. Exactly one mode is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum AllocationMode {
    /// Fraction of the even per-person split
    Percent(MinorPercent),
    /// Fixed amount, bypassing the even split entirely
    DirectAmount(Decimal),
}

impl Default for AllocationMode {
    fn default() -> Self {
        AllocationMode::Percent(MinorPercent::default())
    }
}

impl AllocationMode {
    #[inline]
    pub fn direct_amount(&self) -> Option<Decimal> {
        match self {
            AllocationMode::DirectAmount(amount) => Some(*amount),
            AllocationMode::Percent(_) => None,
        }
    }

    /// Active percent preset, `None` while an override is set
    #[inline]
    pub fn percent(&self) -> Option<MinorPercent> {
        match self {
            AllocationMode::Percent(percent) => Some(*percent),
            AllocationMode::DirectAmount(_) => None,
        }
    }
}
