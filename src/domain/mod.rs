//! Domain models for Pantry
//!
//! Contains the core rules without any I/O concerns: entity types, input
//! validation, recipe drafts, suggestion ranking and the browsing mode.

mod id;
mod input;
mod unit;
mod recipe;
mod kitchen;
mod grocery;
mod suggest;
mod query;

pub use id::{
    GroceryItemId, GroceryListId, IdError, IngredientId, InstructionId, KitchenItemId, RecipeId,
    UnitId,
};
pub use input::{
    checked_quantity, contains_ignore_case, is_blank_query, name_key, parse_quantity, required,
    ValidationError,
};
pub use unit::{default_units, format_number, MeasurementUnit, UnitCategory, UnitUsage};
pub use recipe::{
    Ingredient, IngredientLine, InstructionStep, Recipe, RecipeDetail, RecipeDraft,
    RecipeInstruction, RecipeWithIngredients, RecipeWithInstructions,
};
pub use kitchen::KitchenItem;
pub use grocery::{GroceryItem, GroceryList, GroceryListWithItems};
pub use suggest::{match_fraction, rank_recipes, InventoryIndex};
pub use query::{QueryMode, RecipeQuery};
