//! Recipe suggestions and ingredient transfer
//!
//! [`SuggestionEngine`] holds the browsing mode and answers the recipe list
//! for it: a substring search in search mode, every recipe ranked by how much
//! of it the kitchen already has in suggestion mode. It also copies a
//! recipe's ingredients onto grocery lists.

use crate::domain::{
    rank_recipes, GroceryItemId, GroceryListId, IngredientLine, Recipe, RecipeId, RecipeQuery,
};
use crate::storage::{
    insert_list_with, Database, GroceryListStore, InventoryStore, RecipeStore, StoreError,
    StoreResult, Table,
};

/// Recipe list for `query`
pub fn evaluate(
    recipes: &RecipeStore,
    inventory: &InventoryStore,
    query: &RecipeQuery,
) -> StoreResult<Vec<Recipe>> {
    if query.is_suggesting() {
        let index = inventory.inventory_index()?;
        Ok(rank_recipes(recipes.list_all_with_ingredients()?, &index))
    } else {
        recipes.search(query.text())
    }
}

pub struct SuggestionEngine {
    db: Database,
    recipes: RecipeStore,
    inventory: InventoryStore,
    grocery: GroceryListStore,
    query: RecipeQuery,
}

impl SuggestionEngine {
    pub fn new(db: &Database) -> Self {
        Self {
            db: db.clone(),
            recipes: RecipeStore::new(db.clone()),
            inventory: InventoryStore::new(db.clone()),
            grocery: GroceryListStore::new(db.clone()),
            query: RecipeQuery::default(),
        }
    }

    pub fn query(&self) -> &RecipeQuery {
        &self.query
    }

    /// Sets the search text, leaving suggestion mode
    pub fn set_query(&mut self, text: &str) {
        self.query.set_query(text);
    }

    pub fn suggest(&mut self) {
        self.query.suggest();
    }

    pub fn clear_suggestions(&mut self) {
        self.query.clear_suggestions();
    }

    /// Recipe list for the current mode
    pub fn recipes(&self) -> StoreResult<Vec<Recipe>> {
        evaluate(&self.recipes, &self.inventory, &self.query)
    }

    /// Every recipe, best kitchen match first
    pub fn ranked(&self) -> StoreResult<Vec<Recipe>> {
        evaluate(&self.recipes, &self.inventory, &RecipeQuery::suggesting())
    }

    /// Copies every ingredient of a recipe onto an existing list
    pub fn add_ingredients_to_grocery_list(
        &self,
        recipe_id: RecipeId,
        list_id: GroceryListId,
    ) -> StoreResult<Vec<GroceryItemId>> {
        let lines = self.lines_for(recipe_id)?;
        let added = self.grocery.add_lines(list_id, &lines)?;
        tracing::debug!(recipe = %recipe_id, list = %list_id, added = added.len(), "added ingredients to list");
        Ok(added)
    }

    /// Creates a list named `name` holding the recipe's ingredients
    pub fn create_list_with_ingredients(
        &self,
        recipe_id: RecipeId,
        name: &str,
    ) -> StoreResult<GroceryListId> {
        let lines = self.lines_for(recipe_id)?;
        let id = self.db.write(
            &[Table::GroceryLists, Table::GroceryItems],
            |conn| insert_list_with(conn, name, &lines),
        )?;
        tracing::debug!(recipe = %recipe_id, list = %id, "created list from recipe");
        Ok(id)
    }

    fn lines_for(&self, recipe_id: RecipeId) -> StoreResult<Vec<IngredientLine>> {
        let recipe = self
            .recipes
            .get_with_ingredients(recipe_id)?
            .ok_or_else(|| StoreError::missing(RecipeId::KIND, recipe_id))?;
        Ok(recipe.ingredients.iter().map(IngredientLine::from).collect())
    }
}
