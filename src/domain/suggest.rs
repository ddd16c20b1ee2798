//! Recipe suggestions from kitchen inventory
//!
//! A recipe's match fraction is the share of its ingredients whose name is
//! in the kitchen, compared case-insensitively. Recipes without ingredients
//! score 0. Ranking sorts by fraction, highest first, and keeps the input
//! order between equal scores.

use std::collections::HashSet;

use super::input::name_key;
use super::kitchen::KitchenItem;
use super::recipe::{Ingredient, Recipe, RecipeWithIngredients};

/// Names of everything in the kitchen, normalized for lookup
#[derive(Debug, Clone, Default)]
pub struct InventoryIndex {
    names: HashSet<String>,
}

impl InventoryIndex {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names.into_iter().map(|n| name_key(n.as_ref())).collect(),
        }
    }

    pub fn from_items(items: &[KitchenItem]) -> Self {
        Self::from_names(items.iter().map(|i| i.name.as_str()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name_key(name))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Fraction of `ingredients` present in the kitchen, in `0.0..=1.0`
pub fn match_fraction(ingredients: &[Ingredient], inventory: &InventoryIndex) -> f64 {
    if ingredients.is_empty() {
        return 0.0;
    }
    let present = ingredients
        .iter()
        .filter(|i| inventory.contains(&i.name))
        .count();
    present as f64 / ingredients.len() as f64
}

/// Orders recipes by match fraction, best first
pub fn rank_recipes(recipes: Vec<RecipeWithIngredients>, inventory: &InventoryIndex) -> Vec<Recipe> {
    let mut scored: Vec<(f64, Recipe)> = recipes
        .into_iter()
        .map(|r| (match_fraction(&r.ingredients, inventory), r.recipe))
        .collect();

    // sort_by is stable, ties keep their input order
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, recipe)| recipe).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IngredientId, RecipeId, UnitId};

    fn recipe(id: i64, name: &str, ingredients: &[&str]) -> RecipeWithIngredients {
        let recipe_id = RecipeId::new(id);
        RecipeWithIngredients {
            recipe: Recipe {
                id: recipe_id,
                name: name.to_string(),
                author: "test".to_string(),
                image: None,
            },
            ingredients: ingredients
                .iter()
                .enumerate()
                .map(|(i, n)| Ingredient {
                    id: IngredientId::new(id * 100 + i as i64),
                    recipe_id,
                    name: n.to_string(),
                    quantity: 1.0,
                    unit_id: UnitId::new(1),
                })
                .collect(),
        }
    }

    fn names(recipes: &[Recipe]) -> Vec<&str> {
        recipes.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn full_match_ranks_before_partial() {
        let inventory = InventoryIndex::from_names(["flour", "sugar"]);
        let recipes = vec![
            recipe(2, "R2", &["flour", "yeast"]),
            recipe(1, "R1", &["flour", "sugar"]),
        ];

        let ranked = rank_recipes(recipes, &inventory);
        assert_eq!(names(&ranked), vec!["R1", "R2"]);
    }

    #[test]
    fn fraction_ignores_case_and_whitespace() {
        let inventory = InventoryIndex::from_names(["Flour ", "SUGAR"]);
        let r = recipe(1, "R", &["flour", "Sugar", "eggs", "milk"]);
        assert_eq!(match_fraction(&r.ingredients, &inventory), 0.5);
    }

    #[test]
    fn no_ingredients_scores_zero() {
        let inventory = InventoryIndex::from_names(["flour"]);
        assert_eq!(match_fraction(&[], &inventory), 0.0);
    }

    #[test]
    fn name_must_match_exactly() {
        let inventory = InventoryIndex::from_names(["brown sugar"]);
        let r = recipe(1, "R", &["sugar"]);
        assert_eq!(match_fraction(&r.ingredients, &inventory), 0.0);
    }

    #[test]
    fn ties_keep_input_order() {
        let inventory = InventoryIndex::from_names(["salt"]);
        let recipes = vec![
            recipe(1, "A", &["pepper"]),
            recipe(2, "B", &["salt"]),
            recipe(3, "C", &[]),
            recipe(4, "D", &["salt", "oil"]),
            recipe(5, "E", &["salt"]),
        ];

        let ranked = rank_recipes(recipes, &inventory);
        assert_eq!(names(&ranked), vec!["B", "E", "D", "A", "C"]);
    }
}
