//! Debounced inventory search

use std::time::Duration;

use super::debounce::Debouncer;
use crate::domain::KitchenItem;
use crate::storage::{Database, InventoryStore, StoreResult, Subscription, Table};

/// Kitchen search that follows both the query and the data
///
/// Query changes wait for the quiet period; inventory writes re-run the
/// current query at once.
pub struct KitchenSearch {
    debouncer: Debouncer<String, Vec<KitchenItem>>,
    _subscription: Subscription,
}

impl KitchenSearch {
    pub fn new(db: &Database, quiet: Duration) -> Self {
        let store = InventoryStore::new(db.clone());
        let debouncer = Debouncer::new(quiet, String::new(), move |query: &String| {
            store.search(query)
        });

        let handle = debouncer.refresh_handle();
        let subscription = db
            .hub()
            .subscribe(&[Table::KitchenItems], move |_| handle.refresh());

        Self {
            debouncer,
            _subscription: subscription,
        }
    }

    pub fn set_query(&self, query: &str) {
        self.debouncer.set(query.to_string());
    }

    /// Evaluates the current query without waiting
    pub fn refresh(&self) {
        self.debouncer.refresh();
    }

    /// Waits up to `timeout` for the next result
    pub fn next_results(&self, timeout: Duration) -> Option<StoreResult<Vec<KitchenItem>>> {
        self.debouncer.next(timeout).map(|e| e.outcome)
    }

    /// Waits for the result of the most recent query
    pub fn settled_results(&self, timeout: Duration) -> Option<StoreResult<Vec<KitchenItem>>> {
        self.debouncer.wait_settled(timeout).map(|e| e.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UnitCategory;
    use crate::storage::UnitRegistry;

    fn names(items: Vec<KitchenItem>) -> Vec<String> {
        items.into_iter().map(|i| i.name).collect()
    }

    #[test]
    fn configured_quiet_period_defaults_to_300ms() {
        use crate::engine::DEFAULT_QUIET_PERIOD;
        use crate::storage::ProjectConfig;

        assert_eq!(ProjectConfig::default().search_debounce(), DEFAULT_QUIET_PERIOD);
    }

    #[test]
    fn only_final_query_is_evaluated() {
        let db = Database::open_in_memory().unwrap();
        let gram = UnitRegistry::new(db.clone())
            .create("gram", "g", UnitCategory::Weight)
            .unwrap();
        let store = InventoryStore::new(db.clone());
        store.create("Flour", 1.0, gram).unwrap();
        store.create("Sugar", 1.0, gram).unwrap();

        let search = KitchenSearch::new(&db, Duration::from_millis(100));
        search.set_query("f");
        search.set_query("su");
        search.set_query("sug");

        let found = search.next_results(Duration::from_secs(2)).unwrap().unwrap();
        assert_eq!(names(found), vec!["Sugar"]);
        assert!(search.next_results(Duration::from_millis(300)).is_none());
    }

    #[test]
    fn inventory_writes_refresh_results() {
        let db = Database::open_in_memory().unwrap();
        let gram = UnitRegistry::new(db.clone())
            .create("gram", "g", UnitCategory::Weight)
            .unwrap();

        let search = KitchenSearch::new(&db, Duration::from_millis(20));
        search.set_query("egg");
        assert!(search.next_results(Duration::from_secs(2)).unwrap().unwrap().is_empty());

        InventoryStore::new(db.clone()).create("Eggs", 6.0, gram).unwrap();
        let found = search.next_results(Duration::from_secs(2)).unwrap().unwrap();
        assert_eq!(names(found), vec!["Eggs"]);
    }
}
