//! Grocery lists and their items
//!
//! A list carries `item_count`, a stored copy of how many items it owns.
//! The grocery store keeps it equal to the real count on every add, delete
//! and move.

use serde::{Deserialize, Serialize};

use super::id::{GroceryItemId, GroceryListId, UnitId};
use super::input::contains_ignore_case;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroceryList {
    pub id: GroceryListId,
    pub name: String,
    pub item_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroceryItem {
    pub id: GroceryItemId,
    pub grocery_list_id: GroceryListId,
    pub name: String,
    pub quantity: f64,
    pub unit_id: UnitId,
    pub is_checked: bool,
}

impl GroceryItem {
    pub fn matches(&self, query: &str) -> bool {
        contains_ignore_case(&self.name, query)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroceryListWithItems {
    pub list: GroceryList,
    pub items: Vec<GroceryItem>,
}

impl GroceryListWithItems {
    /// Number of items already ticked off
    pub fn checked_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_checked).count()
    }
}
