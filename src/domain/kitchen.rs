//! Kitchen inventory items

use serde::{Deserialize, Serialize};

use super::id::{KitchenItemId, UnitId};
use super::input::contains_ignore_case;

/// Something currently in the kitchen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitchenItem {
    pub id: KitchenItemId,
    pub name: String,
    pub quantity: f64,
    pub unit_id: UnitId,
}

impl KitchenItem {
    pub fn matches(&self, query: &str) -> bool {
        contains_ignore_case(&self.name, query)
    }
}
