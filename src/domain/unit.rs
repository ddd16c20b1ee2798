//! Measurement units
//!
//! Units are shared by ingredients, kitchen items and grocery items. They are
//! referenced, never owned, so a unit can only be deleted once nothing
//! points at it any more.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::id::UnitId;
use super::input::ValidationError;

/// Category a unit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitCategory {
    Weight,
    Volume,
    Count,
    Length,
    Temperature,
    Time,
}

impl UnitCategory {
    pub const ALL: [UnitCategory; 6] = [
        UnitCategory::Weight,
        UnitCategory::Volume,
        UnitCategory::Count,
        UnitCategory::Length,
        UnitCategory::Temperature,
        UnitCategory::Time,
    ];

    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitCategory::Weight => "WEIGHT",
            UnitCategory::Volume => "VOLUME",
            UnitCategory::Count => "COUNT",
            UnitCategory::Length => "LENGTH",
            UnitCategory::Temperature => "TEMPERATURE",
            UnitCategory::Time => "TIME",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            UnitCategory::Weight => "Weight",
            UnitCategory::Volume => "Volume",
            UnitCategory::Count => "Count",
            UnitCategory::Length => "Length",
            UnitCategory::Temperature => "Temperature",
            UnitCategory::Time => "Time",
        }
    }
}

impl fmt::Display for UnitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for UnitCategory {
    type Err = ValidationError;

    /// Accepts the stored name or the display name, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        UnitCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

/// A stored measurement unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementUnit {
    pub id: UnitId,
    pub name: String,
    pub abbreviation: String,
    pub category: UnitCategory,
}

impl MeasurementUnit {
    /// Label used when printing quantities, e.g. `"2 g"`
    pub fn format_quantity(&self, quantity: f64) -> String {
        format!("{} {}", format_number(quantity), self.abbreviation)
    }
}

/// How many rows reference a unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnitUsage {
    pub ingredients: usize,
    pub kitchen_items: usize,
    pub grocery_items: usize,
}

impl UnitUsage {
    pub fn total(&self) -> usize {
        self.ingredients + self.kitchen_items + self.grocery_items
    }

    pub fn is_in_use(&self) -> bool {
        self.total() > 0
    }
}

impl fmt::Display for UnitUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ingredient(s), {} kitchen item(s), {} grocery item(s)",
            self.ingredients, self.kitchen_items, self.grocery_items
        )
    }
}

/// Units created by `pantry init`
pub fn default_units() -> Vec<(&'static str, &'static str, UnitCategory)> {
    vec![
        ("gram", "g", UnitCategory::Weight),
        ("kilogram", "kg", UnitCategory::Weight),
        ("millilitre", "ml", UnitCategory::Volume),
        ("litre", "l", UnitCategory::Volume),
        ("cup", "cup", UnitCategory::Volume),
        ("tablespoon", "tbsp", UnitCategory::Volume),
        ("teaspoon", "tsp", UnitCategory::Volume),
        ("piece", "pc", UnitCategory::Count),
    ]
}

/// Prints `2.0` as `2` and `0.25` as `0.25`
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
