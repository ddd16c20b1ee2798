//! Pantry - recipes, kitchen inventory and grocery lists in one local database
//!
//! Recipes are matched against what's in the kitchen, and their ingredients
//! can be turned into grocery lists. Every store offers live views that
//! update themselves when the data changes.

pub mod domain;
pub mod storage;
pub mod engine;
pub mod cli;

pub use domain::{
    GroceryItem, GroceryList, KitchenItem, MeasurementUnit, Recipe, RecipeDraft, RecipeId,
    UnitCategory, UnitId,
};
pub use storage::{Database, Project, StoreError};
