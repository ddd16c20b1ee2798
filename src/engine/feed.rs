//! Live recipe list for browsing
//!
//! Typing waits for the quiet period. Switching into or out of suggestion
//! mode is evaluated right away, and any write to recipes or the kitchen
//! re-runs the current query.

use std::time::Duration;

use super::debounce::Debouncer;
use super::suggest::evaluate;
use crate::domain::{Recipe, RecipeQuery};
use crate::storage::{Database, InventoryStore, RecipeStore, StoreResult, Subscription, Table};

const WATCHED: [Table; 3] = [Table::Recipes, Table::Ingredients, Table::KitchenItems];

pub struct RecipeFeed {
    debouncer: Debouncer<RecipeQuery, Vec<Recipe>>,
    query: RecipeQuery,
    _subscription: Subscription,
}

impl RecipeFeed {
    /// Starts in search mode with an empty query; the full list is
    /// evaluated immediately
    pub fn new(db: &Database, quiet: Duration) -> Self {
        let recipes = RecipeStore::new(db.clone());
        let inventory = InventoryStore::new(db.clone());
        let debouncer = Debouncer::new(quiet, RecipeQuery::default(), move |query: &RecipeQuery| {
            evaluate(&recipes, &inventory, query)
        });

        let handle = debouncer.refresh_handle();
        let subscription = db.hub().subscribe(&WATCHED, move |_| handle.refresh());

        let query = RecipeQuery::default();
        debouncer.set_now(query.clone());

        Self {
            debouncer,
            query,
            _subscription: subscription,
        }
    }

    pub fn query(&self) -> &RecipeQuery {
        &self.query
    }

    pub fn set_query(&mut self, text: &str) {
        let was_suggesting = self.query.is_suggesting();
        self.query.set_query(text);

        if was_suggesting {
            self.debouncer.set_now(self.query.clone());
        } else {
            self.debouncer.set(self.query.clone());
        }
    }

    pub fn suggest(&mut self) {
        self.query.suggest();
        self.debouncer.set_now(self.query.clone());
    }

    pub fn clear_suggestions(&mut self) {
        self.query.clear_suggestions();
        self.debouncer.set_now(self.query.clone());
    }

    /// Waits up to `timeout` for the next result
    pub fn next_results(&self, timeout: Duration) -> Option<StoreResult<Vec<Recipe>>> {
        self.debouncer.next(timeout).map(|e| e.outcome)
    }

    /// Newest result already available, without waiting
    pub fn latest_results(&self) -> Option<StoreResult<Vec<Recipe>>> {
        self.debouncer.latest().map(|e| e.outcome)
    }

    /// Waits for the result of the current query unless it was already taken
    pub fn settled_results(&self, timeout: Duration) -> Option<StoreResult<Vec<Recipe>>> {
        self.debouncer.wait_settled(timeout).map(|e| e.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IngredientLine, QueryMode, RecipeDraft, UnitCategory};
    use crate::storage::UnitRegistry;

    const WAIT: Duration = Duration::from_secs(2);

    fn names(result: Option<StoreResult<Vec<Recipe>>>) -> Vec<String> {
        result
            .unwrap()
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect()
    }

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        let unit = UnitRegistry::new(db.clone())
            .create("piece", "pc", UnitCategory::Count)
            .unwrap();
        let recipes = RecipeStore::new(db.clone());
        for (name, ingredients) in [("Bread", ["flour", "yeast"]), ("Cookies", ["flour", "sugar"])] {
            let mut draft = RecipeDraft::new(name, "");
            for ingredient in ingredients {
                draft.add_ingredient(IngredientLine::new(ingredient, 1.0, unit).unwrap());
            }
            draft.add_instruction("Bake").unwrap();
            recipes.save(&draft).unwrap();
        }
        InventoryStore::new(db.clone()).create("sugar", 1.0, unit).unwrap();
        db
    }

    #[test]
    fn starts_with_every_recipe() {
        let db = setup();
        let feed = RecipeFeed::new(&db, Duration::from_secs(60));
        assert_eq!(names(feed.next_results(WAIT)), vec!["Bread", "Cookies"]);
    }

    #[test]
    fn typing_is_debounced() {
        let db = setup();
        let mut feed = RecipeFeed::new(&db, Duration::from_millis(100));
        feed.next_results(WAIT);

        feed.set_query("c");
        feed.set_query("co");
        feed.set_query("coo");
        assert_eq!(names(feed.next_results(WAIT)), vec!["Cookies"]);
        assert!(feed.next_results(Duration::from_millis(300)).is_none());
    }

    #[test]
    fn mode_switches_are_immediate() {
        let db = setup();
        let mut feed = RecipeFeed::new(&db, Duration::from_secs(60));
        feed.next_results(WAIT);

        feed.suggest();
        assert_eq!(feed.query().mode(), QueryMode::Suggesting);
        assert_eq!(names(feed.next_results(WAIT)), vec!["Cookies", "Bread"]);

        // Leaving suggestion mode by typing doesn't wait either
        feed.set_query("bre");
        assert_eq!(names(feed.next_results(WAIT)), vec!["Bread"]);

        feed.clear_suggestions();
        assert_eq!(names(feed.next_results(WAIT)).len(), 2);
    }

    #[test]
    fn kitchen_changes_rerank() {
        let db = setup();
        let mut feed = RecipeFeed::new(&db, Duration::from_secs(60));
        feed.suggest();
        assert_eq!(names(feed.settled_results(WAIT)), vec!["Cookies", "Bread"]);

        let unit = UnitRegistry::new(db.clone()).list_all().unwrap()[0].id;
        let inventory = InventoryStore::new(db.clone());
        inventory.create("yeast", 1.0, unit).unwrap();
        inventory.create("flour", 1.0, unit).unwrap();

        // Both writes trigger a refresh; the last one ranks Bread first
        let mut latest = Vec::new();
        while let Some(result) = feed.next_results(Duration::from_millis(500)) {
            latest = result.unwrap().into_iter().map(|r| r.name).collect();
        }
        assert_eq!(latest, vec!["Bread", "Cookies"]);
    }
}
