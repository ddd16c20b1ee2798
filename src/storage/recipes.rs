//! Recipe store
//!
//! Recipes own their ingredients and instruction steps; deleting a recipe
//! cascades to both. [`RecipeStore::save`] writes a whole [`RecipeDraft`]
//! in one transaction, replacing every stored child.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::database::{Database, StoreError, StoreResult};
use super::live::{LiveView, Table};
use super::units::ensure_unit;
use crate::domain::{
    is_blank_query, required, Ingredient, Recipe, RecipeDetail, RecipeDraft, RecipeId,
    RecipeInstruction, RecipeWithIngredients, RecipeWithInstructions,
};

const SELECT_RECIPE: &str = "SELECT id, name, author, image FROM recipes";

const RECIPE_TABLES: [Table; 3] = [Table::Recipes, Table::Ingredients, Table::Instructions];

#[derive(Clone)]
pub struct RecipeStore {
    db: Database,
}

impl RecipeStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Creates a recipe row, or renames the one with `id`
    ///
    /// Children are left untouched.
    pub fn upsert(&self, id: Option<RecipeId>, name: &str, author: &str) -> StoreResult<RecipeId> {
        let name = required("recipe name", name)?;
        let author = author.trim().to_string();

        self.db
            .write(&[Table::Recipes], |conn| upsert_row(conn, id, &name, &author, None))
    }

    /// Saves a complete draft and returns the recipe's ID
    ///
    /// Stored ingredients and instructions are deleted and replaced by the
    /// draft's, with steps numbered `1..=n` in draft order. Nothing is
    /// written if any part fails.
    pub fn save(&self, draft: &RecipeDraft) -> StoreResult<RecipeId> {
        draft.validate()?;

        let id = self.db.write(&RECIPE_TABLES, |conn| {
            let id = upsert_row(conn, draft.id(), draft.name(), draft.author(), draft.image())?;

            conn.execute("DELETE FROM ingredients WHERE recipe_id = ?1", params![id])?;
            let mut insert = conn.prepare(
                "INSERT INTO ingredients (recipe_id, name, quantity, unit_id) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for line in draft.ingredients() {
                ensure_unit(conn, line.unit_id)?;
                insert.execute(params![id, line.name, line.quantity, line.unit_id])?;
            }

            conn.execute("DELETE FROM recipe_instructions WHERE recipe_id = ?1", params![id])?;
            let mut insert = conn.prepare(
                "INSERT INTO recipe_instructions (recipe_id, step_number, instruction) VALUES (?1, ?2, ?3)",
            )?;
            for (position, step) in draft.steps().iter().enumerate() {
                insert.execute(params![id, position as u32 + 1, step.text])?;
            }

            Ok(id)
        })?;

        tracing::debug!(
            %id,
            ingredients = draft.ingredients().len(),
            steps = draft.steps().len(),
            "saved recipe"
        );
        Ok(id)
    }

    pub fn get_by_id(&self, id: RecipeId) -> StoreResult<Option<Recipe>> {
        self.db.read(|conn| find(conn, id))
    }

    pub fn get_with_ingredients(&self, id: RecipeId) -> StoreResult<Option<RecipeWithIngredients>> {
        self.db.read(|conn| {
            let Some(recipe) = find(conn, id)? else {
                return Ok(None);
            };
            let ingredients = ingredients_of(conn, id)?;
            Ok(Some(RecipeWithIngredients {
                recipe,
                ingredients,
            }))
        })
    }

    pub fn get_with_instructions(
        &self,
        id: RecipeId,
    ) -> StoreResult<Option<RecipeWithInstructions>> {
        self.db.read(|conn| {
            let Some(recipe) = find(conn, id)? else {
                return Ok(None);
            };
            let instructions = instructions_of(conn, id)?;
            Ok(Some(RecipeWithInstructions {
                recipe,
                instructions,
            }))
        })
    }

    /// Recipe with both child collections
    pub fn get_detail(&self, id: RecipeId) -> StoreResult<Option<RecipeDetail>> {
        self.db.read(|conn| {
            let Some(recipe) = find(conn, id)? else {
                return Ok(None);
            };
            Ok(Some(RecipeDetail {
                recipe,
                ingredients: ingredients_of(conn, id)?,
                instructions: instructions_of(conn, id)?,
            }))
        })
    }

    pub fn ingredients_for(&self, id: RecipeId) -> StoreResult<Vec<Ingredient>> {
        self.db.read(|conn| ingredients_of(conn, id))
    }

    pub fn list_all(&self) -> StoreResult<Vec<Recipe>> {
        self.db.read(query_all)
    }

    /// Every recipe with its ingredients, in recipe ID order
    pub fn list_all_with_ingredients(&self) -> StoreResult<Vec<RecipeWithIngredients>> {
        self.db.read(query_all_with_ingredients)
    }

    /// Recipes whose name or author contains `query`
    ///
    /// A blank query returns every recipe.
    pub fn search(&self, query: &str) -> StoreResult<Vec<Recipe>> {
        self.db.read(|conn| query_search(conn, query))
    }

    /// Deletes a recipe and its children; returns whether it existed
    pub fn delete(&self, id: RecipeId) -> StoreResult<bool> {
        let removed = self.db.write(&RECIPE_TABLES, |conn| {
            Ok(conn.execute("DELETE FROM recipes WHERE id = ?1", params![id])? > 0)
        })?;
        if removed {
            tracing::debug!(%id, "deleted recipe");
        }
        Ok(removed)
    }

    pub fn watch_all(&self) -> StoreResult<LiveView<Vec<Recipe>>> {
        self.db.watch(&[Table::Recipes], query_all)
    }

    pub fn watch_search(&self, query: &str) -> StoreResult<LiveView<Vec<Recipe>>> {
        let query = query.to_string();
        self.db
            .watch(&[Table::Recipes], move |conn| query_search(conn, &query))
    }
}

fn upsert_row(
    conn: &Connection,
    id: Option<RecipeId>,
    name: &str,
    author: &str,
    image: Option<&str>,
) -> StoreResult<RecipeId> {
    match id {
        Some(id) => {
            let changed = conn.execute(
                "UPDATE recipes SET name = ?1, author = ?2, image = COALESCE(?3, image) WHERE id = ?4",
                params![name, author, image, id],
            )?;
            if changed == 0 {
                return Err(StoreError::missing(RecipeId::KIND, id));
            }
            Ok(id)
        }
        None => {
            conn.execute(
                "INSERT INTO recipes (name, author, image) VALUES (?1, ?2, ?3)",
                params![name, author, image],
            )?;
            Ok(RecipeId::new(conn.last_insert_rowid()))
        }
    }
}

fn map_recipe(row: &Row<'_>) -> rusqlite::Result<Recipe> {
    Ok(Recipe {
        id: row.get(0)?,
        name: row.get(1)?,
        author: row.get(2)?,
        image: row.get(3)?,
    })
}

fn map_ingredient(row: &Row<'_>) -> rusqlite::Result<Ingredient> {
    Ok(Ingredient {
        id: row.get(0)?,
        recipe_id: row.get(1)?,
        name: row.get(2)?,
        quantity: row.get(3)?,
        unit_id: row.get(4)?,
    })
}

fn find(conn: &Connection, id: RecipeId) -> StoreResult<Option<Recipe>> {
    Ok(conn
        .query_row(&format!("{SELECT_RECIPE} WHERE id = ?1"), params![id], map_recipe)
        .optional()?)
}

fn query_all(conn: &Connection) -> StoreResult<Vec<Recipe>> {
    let mut stmt = conn.prepare(&format!("{SELECT_RECIPE} ORDER BY id"))?;
    let recipes = stmt
        .query_map([], map_recipe)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(recipes)
}

fn query_search(conn: &Connection, query: &str) -> StoreResult<Vec<Recipe>> {
    let recipes = query_all(conn)?;
    if is_blank_query(query) {
        return Ok(recipes);
    }
    Ok(recipes.into_iter().filter(|r| r.matches(query)).collect())
}

fn ingredients_of(conn: &Connection, id: RecipeId) -> StoreResult<Vec<Ingredient>> {
    let mut stmt = conn.prepare(
        "SELECT id, recipe_id, name, quantity, unit_id FROM ingredients WHERE recipe_id = ?1 ORDER BY id",
    )?;
    let ingredients = stmt
        .query_map(params![id], map_ingredient)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ingredients)
}

fn instructions_of(conn: &Connection, id: RecipeId) -> StoreResult<Vec<RecipeInstruction>> {
    let mut stmt = conn.prepare(
        "SELECT id, recipe_id, step_number, instruction FROM recipe_instructions \
         WHERE recipe_id = ?1 ORDER BY step_number",
    )?;
    let steps = stmt
        .query_map(params![id], |row| {
            Ok(RecipeInstruction {
                id: row.get(0)?,
                recipe_id: row.get(1)?,
                step_number: row.get(2)?,
                instruction: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(steps)
}

fn query_all_with_ingredients(conn: &Connection) -> StoreResult<Vec<RecipeWithIngredients>> {
    query_all(conn)?
        .into_iter()
        .map(|recipe| {
            let ingredients = ingredients_of(conn, recipe.id)?;
            Ok(RecipeWithIngredients {
                recipe,
                ingredients,
            })
        })
        .collect()
}
