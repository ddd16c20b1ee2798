//! Kitchen inventory store

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::database::{Database, StoreError, StoreResult};
use super::live::{LiveView, Table};
use super::units::ensure_unit;
use crate::domain::{
    checked_quantity, is_blank_query, required, InventoryIndex, KitchenItem, KitchenItemId, UnitId,
};

const SELECT_ITEM: &str = "SELECT id, name, quantity, unit_id FROM kitchen_items";

#[derive(Clone)]
pub struct InventoryStore {
    db: Database,
}

impl InventoryStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn create(&self, name: &str, quantity: f64, unit_id: UnitId) -> StoreResult<KitchenItemId> {
        let name = required("item name", name)?;
        let quantity = checked_quantity(quantity)?;

        let id = self.db.write(&[Table::KitchenItems], |conn| {
            ensure_unit(conn, unit_id)?;
            conn.execute(
                "INSERT INTO kitchen_items (name, quantity, unit_id) VALUES (?1, ?2, ?3)",
                params![name, quantity, unit_id],
            )?;
            Ok(KitchenItemId::new(conn.last_insert_rowid()))
        })?;

        tracing::debug!(%id, %name, "added kitchen item");
        Ok(id)
    }

    pub fn update(&self, item: &KitchenItem) -> StoreResult<()> {
        let name = required("item name", &item.name)?;
        let quantity = checked_quantity(item.quantity)?;

        self.db.write(&[Table::KitchenItems], |conn| {
            ensure_unit(conn, item.unit_id)?;
            let changed = conn.execute(
                "UPDATE kitchen_items SET name = ?1, quantity = ?2, unit_id = ?3 WHERE id = ?4",
                params![name, quantity, item.unit_id, item.id],
            )?;
            if changed == 0 {
                return Err(StoreError::missing(KitchenItemId::KIND, item.id));
            }
            Ok(())
        })
    }

    /// Returns whether a row was removed
    pub fn delete(&self, id: KitchenItemId) -> StoreResult<bool> {
        self.db.write(&[Table::KitchenItems], |conn| {
            let removed = conn.execute("DELETE FROM kitchen_items WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
    }

    pub fn get(&self, id: KitchenItemId) -> StoreResult<Option<KitchenItem>> {
        self.db.read(|conn| {
            Ok(conn
                .query_row(&format!("{SELECT_ITEM} WHERE id = ?1"), params![id], map_item)
                .optional()?)
        })
    }

    /// Every item in insertion order
    pub fn list_all(&self) -> StoreResult<Vec<KitchenItem>> {
        self.db.read(query_all)
    }

    /// Items whose name contains `query`; a blank query returns everything
    pub fn search(&self, query: &str) -> StoreResult<Vec<KitchenItem>> {
        self.db.read(|conn| query_search(conn, query))
    }

    /// Name index of everything currently in the kitchen
    pub fn inventory_index(&self) -> StoreResult<InventoryIndex> {
        Ok(InventoryIndex::from_items(&self.list_all()?))
    }

    pub fn watch_all(&self) -> StoreResult<LiveView<Vec<KitchenItem>>> {
        self.db.watch(&[Table::KitchenItems], query_all)
    }

    pub fn watch_search(&self, query: &str) -> StoreResult<LiveView<Vec<KitchenItem>>> {
        let query = query.to_string();
        self.db
            .watch(&[Table::KitchenItems], move |conn| query_search(conn, &query))
    }
}

fn map_item(row: &Row<'_>) -> rusqlite::Result<KitchenItem> {
    Ok(KitchenItem {
        id: row.get(0)?,
        name: row.get(1)?,
        quantity: row.get(2)?,
        unit_id: row.get(3)?,
    })
}

fn query_all(conn: &Connection) -> StoreResult<Vec<KitchenItem>> {
    let mut stmt = conn.prepare(&format!("{SELECT_ITEM} ORDER BY id"))?;
    let items = stmt
        .query_map([], map_item)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

fn query_search(conn: &Connection, query: &str) -> StoreResult<Vec<KitchenItem>> {
    let items = query_all(conn)?;
    if is_blank_query(query) {
        return Ok(items);
    }
    Ok(items.into_iter().filter(|i| i.matches(query)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UnitCategory;
    use crate::storage::UnitRegistry;
    use std::time::Duration;

    fn setup() -> (InventoryStore, UnitId) {
        let db = Database::open_in_memory().unwrap();
        let gram = UnitRegistry::new(db.clone())
            .create("gram", "g", UnitCategory::Weight)
            .unwrap();
        (InventoryStore::new(db), gram)
    }

    #[test]
    fn create_update_delete() {
        let (store, gram) = setup();
        let id = store.create("Flour", 500.0, gram).unwrap();

        let mut item = store.get(id).unwrap().unwrap();
        assert_eq!(item.name, "Flour");
        item.quantity = 250.0;
        store.update(&item).unwrap();
        assert_eq!(store.get(id).unwrap().unwrap().quantity, 250.0);

        assert!(store.delete(id).unwrap());
        assert!(!store.delete(id).unwrap());
        assert!(store.get(id).unwrap().is_none());
    }

    #[test]
    fn rejects_unknown_unit_and_bad_quantity() {
        let (store, gram) = setup();
        assert!(store
            .create("Flour", 1.0, UnitId::new(99))
            .unwrap_err()
            .is_not_found());
        assert!(matches!(
            store.create("Flour", -1.0, gram),
            Err(StoreError::Invalid(_))
        ));
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn update_missing_item_is_not_found() {
        let (store, gram) = setup();
        let ghost = KitchenItem {
            id: KitchenItemId::new(42),
            name: "ghost".to_string(),
            quantity: 1.0,
            unit_id: gram,
        };
        assert!(store.update(&ghost).unwrap_err().is_not_found());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let (store, gram) = setup();
        store.create("Flour", 1.0, gram).unwrap();
        store.create("Brown sugar", 1.0, gram).unwrap();
        store.create("Sugar", 1.0, gram).unwrap();

        let names: Vec<String> = store
            .search("SUG")
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Brown sugar", "Sugar"]);
        assert_eq!(store.search("  ").unwrap().len(), 3);
        assert!(store.search("%").unwrap().is_empty());
    }

    #[test]
    fn inventory_index_uses_name_keys() {
        let (store, gram) = setup();
        store.create(" Flour ", 1.0, gram).unwrap();

        let index = store.inventory_index().unwrap();
        assert!(index.contains("flour"));
        assert!(!index.contains("sugar"));
    }

    #[test]
    fn watch_search_follows_writes() {
        let (store, gram) = setup();
        let view = store.watch_search("egg").unwrap();
        assert!(view.current().is_empty());

        store.create("Eggs", 6.0, gram).unwrap();
        let update = view.next_update(Duration::from_secs(1)).unwrap();
        assert_eq!(update.len(), 1);

        store.create("Milk", 1.0, gram).unwrap();
        let update = view.next_update(Duration::from_secs(1)).unwrap();
        assert_eq!(update.len(), 1);
    }

    #[test]
    fn unit_in_use_by_item_cannot_be_deleted() {
        let db = Database::open_in_memory().unwrap();
        let units = UnitRegistry::new(db.clone());
        let gram = units.create("gram", "g", UnitCategory::Weight).unwrap();
        InventoryStore::new(db).create("Flour", 1.0, gram).unwrap();

        let outcome = units.delete(gram).unwrap();
        match outcome {
            crate::storage::UnitDeleteOutcome::Refused(usage) => {
                assert_eq!(usage.kitchen_items, 1)
            }
            other => panic!("expected refusal, got {other:?}"),
        }
        assert!(units.get(gram).unwrap().is_some());
    }
}
