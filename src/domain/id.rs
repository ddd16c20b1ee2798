//! Integer IDs for stored entities
//!
//! IDs are issued by the database when a row is created and are never
//! reused. Every entity kind gets its own newtype so a recipe ID can't be
//! handed to something expecting a unit ID.
//!
//! On the command line an ID may be written as `12` or `#12`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid {kind} ID: expected a positive integer, got '{value}'")]
    Invalid { kind: &'static str, value: String },
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident => $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Human-readable entity kind, used in error messages
            pub const KIND: &'static str = $kind;

            /// Wraps a raw row ID
            pub fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw row ID
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_raw(s, $kind).map(Self)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

fn parse_raw(s: &str, kind: &'static str) -> Result<i64, IdError> {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

    match digits.parse::<i64>() {
        Ok(raw) if raw > 0 => Ok(raw),
        _ => Err(IdError::Invalid {
            kind,
            value: s.to_string(),
        }),
    }
}

entity_id!(
    /// ID of a [`MeasurementUnit`](super::MeasurementUnit)
    UnitId => "unit"
);
entity_id!(
    /// ID of a [`Recipe`](super::Recipe)
    RecipeId => "recipe"
);
entity_id!(IngredientId => "ingredient");
entity_id!(InstructionId => "instruction");
entity_id!(
    /// ID of a [`KitchenItem`](super::KitchenItem)
    KitchenItemId => "kitchen item"
);
entity_id!(
    /// ID of a [`GroceryList`](super::GroceryList)
    GroceryListId => "grocery list"
);
entity_id!(
    /// ID of a [`GroceryItem`](super::GroceryItem)
    GroceryItemId => "grocery item"
);
