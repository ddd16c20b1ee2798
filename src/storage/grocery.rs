//! Grocery list store
//!
//! Each list stores `item_count`. Every add and delete changes the item row
//! and the count in the same transaction, so readers never see them disagree.
//! [`GroceryListStore::recount`] rebuilds the count from the rows for lists
//! written by older builds or other tools.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::database::{Database, StoreError, StoreResult};
use super::live::{LiveView, Table};
use super::units::ensure_unit;
use crate::domain::{
    checked_quantity, is_blank_query, required, GroceryItem, GroceryItemId, GroceryList,
    GroceryListId, GroceryListWithItems, IngredientLine, UnitId,
};

const SELECT_LIST: &str = "SELECT id, name, item_count FROM grocery_lists";
const SELECT_ITEM: &str =
    "SELECT id, grocery_list_id, name, quantity, unit_id, is_checked FROM grocery_items";

const ITEM_TABLES: [Table; 2] = [Table::GroceryItems, Table::GroceryLists];

#[derive(Clone)]
pub struct GroceryListStore {
    db: Database,
}

impl GroceryListStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // =========================================================================
    // Lists
    // =========================================================================

    pub fn create(&self, name: &str) -> StoreResult<GroceryListId> {
        let name = required("list name", name)?;
        let id = self
            .db
            .write(&[Table::GroceryLists], |conn| insert_list(conn, &name))?;
        tracing::debug!(%id, %name, "created grocery list");
        Ok(id)
    }

    pub fn rename(&self, id: GroceryListId, name: &str) -> StoreResult<()> {
        let name = required("list name", name)?;
        self.db.write(&[Table::GroceryLists], |conn| {
            let changed = conn.execute(
                "UPDATE grocery_lists SET name = ?1 WHERE id = ?2",
                params![name, id],
            )?;
            if changed == 0 {
                return Err(StoreError::missing(GroceryListId::KIND, id));
            }
            Ok(())
        })
    }

    /// Deletes a list and all of its items; returns whether it existed
    pub fn delete(&self, id: GroceryListId) -> StoreResult<bool> {
        self.db.write(&ITEM_TABLES, |conn| {
            Ok(conn.execute("DELETE FROM grocery_lists WHERE id = ?1", params![id])? > 0)
        })
    }

    pub fn get_by_id(&self, id: GroceryListId) -> StoreResult<Option<GroceryList>> {
        self.db.read(|conn| find_list(conn, id))
    }

    pub fn get_with_items(&self, id: GroceryListId) -> StoreResult<Option<GroceryListWithItems>> {
        self.db.read(|conn| {
            let Some(list) = find_list(conn, id)? else {
                return Ok(None);
            };
            let items = items_of(conn, id)?;
            Ok(Some(GroceryListWithItems { list, items }))
        })
    }

    pub fn list_all(&self) -> StoreResult<Vec<GroceryList>> {
        self.db.read(query_lists)
    }

    pub fn watch_all(&self) -> StoreResult<LiveView<Vec<GroceryList>>> {
        self.db.watch(&[Table::GroceryLists], query_lists)
    }

    // =========================================================================
    // Items
    // =========================================================================

    pub fn items(&self, list_id: GroceryListId) -> StoreResult<Vec<GroceryItem>> {
        self.db.read(|conn| items_of(conn, list_id))
    }

    pub fn watch_items(&self, list_id: GroceryListId) -> StoreResult<LiveView<Vec<GroceryItem>>> {
        self.db
            .watch(&[Table::GroceryItems], move |conn| items_of(conn, list_id))
    }

    /// Items of one list whose name contains `query`
    pub fn search_items(&self, list_id: GroceryListId, query: &str) -> StoreResult<Vec<GroceryItem>> {
        let items = self.items(list_id)?;
        if is_blank_query(query) {
            return Ok(items);
        }
        Ok(items.into_iter().filter(|i| i.matches(query)).collect())
    }

    pub fn get_item(&self, id: GroceryItemId) -> StoreResult<Option<GroceryItem>> {
        self.db.read(|conn| {
            Ok(conn
                .query_row(&format!("{SELECT_ITEM} WHERE id = ?1"), params![id], map_item)
                .optional()?)
        })
    }

    /// Inserts an unchecked item and bumps the list's count
    pub fn add_item(
        &self,
        list_id: GroceryListId,
        name: &str,
        quantity: f64,
        unit_id: UnitId,
    ) -> StoreResult<GroceryItemId> {
        let line = IngredientLine::new(name, quantity, unit_id)?;
        let id = self
            .db
            .write(&ITEM_TABLES, |conn| insert_item(conn, list_id, &line))?;
        tracing::debug!(%id, list = %list_id, "added grocery item");
        Ok(id)
    }

    /// Adds every line to the list in one transaction
    pub fn add_lines(
        &self,
        list_id: GroceryListId,
        lines: &[IngredientLine],
    ) -> StoreResult<Vec<GroceryItemId>> {
        self.db.write(&ITEM_TABLES, |conn| {
            lines
                .iter()
                .map(|line| insert_item(conn, list_id, line))
                .collect()
        })
    }

    /// Rewrites an item's fields
    ///
    /// Moving an item to another list moves one unit of `item_count` with it.
    pub fn update_item(&self, item: &GroceryItem) -> StoreResult<()> {
        let name = required("item name", &item.name)?;
        let quantity = checked_quantity(item.quantity)?;

        self.db.write(&ITEM_TABLES, |conn| {
            let previous: Option<GroceryListId> = conn
                .query_row(
                    "SELECT grocery_list_id FROM grocery_items WHERE id = ?1",
                    params![item.id],
                    |r| r.get(0),
                )
                .optional()?;
            let Some(previous) = previous else {
                return Err(StoreError::missing(GroceryItemId::KIND, item.id));
            };

            ensure_unit(conn, item.unit_id)?;
            if previous != item.grocery_list_id {
                ensure_list(conn, item.grocery_list_id)?;
            }

            conn.execute(
                "UPDATE grocery_items SET grocery_list_id = ?1, name = ?2, quantity = ?3, \
                 unit_id = ?4, is_checked = ?5 WHERE id = ?6",
                params![item.grocery_list_id, name, quantity, item.unit_id, item.is_checked, item.id],
            )?;

            if previous != item.grocery_list_id {
                adjust_count(conn, previous, -1)?;
                adjust_count(conn, item.grocery_list_id, 1)?;
            }
            Ok(())
        })
    }

    pub fn set_checked(&self, id: GroceryItemId, checked: bool) -> StoreResult<()> {
        self.db.write(&[Table::GroceryItems], |conn| {
            let changed = conn.execute(
                "UPDATE grocery_items SET is_checked = ?1 WHERE id = ?2",
                params![checked, id],
            )?;
            if changed == 0 {
                return Err(StoreError::missing(GroceryItemId::KIND, id));
            }
            Ok(())
        })
    }

    /// Deletes an item and lowers its list's count; returns whether it existed
    pub fn delete_item(&self, id: GroceryItemId) -> StoreResult<bool> {
        self.db.write(&ITEM_TABLES, |conn| {
            let list_id: Option<GroceryListId> = conn
                .query_row(
                    "SELECT grocery_list_id FROM grocery_items WHERE id = ?1",
                    params![id],
                    |r| r.get(0),
                )
                .optional()?;
            let Some(list_id) = list_id else {
                return Ok(false);
            };

            conn.execute("DELETE FROM grocery_items WHERE id = ?1", params![id])?;
            adjust_count(conn, list_id, -1)?;
            Ok(true)
        })
    }

    // =========================================================================
    // Reconciliation
    // =========================================================================

    /// Resets one list's `item_count` to its real item count
    pub fn recount(&self, id: GroceryListId) -> StoreResult<u32> {
        self.db.write(&[Table::GroceryLists], |conn| {
            ensure_list(conn, id)?;
            conn.execute(
                "UPDATE grocery_lists SET item_count = \
                 (SELECT COUNT(*) FROM grocery_items WHERE grocery_list_id = ?1) WHERE id = ?1",
                params![id],
            )?;
            Ok(conn.query_row(
                "SELECT item_count FROM grocery_lists WHERE id = ?1",
                params![id],
                |r| r.get(0),
            )?)
        })
    }

    /// Recounts every list; returns how many counts were wrong
    pub fn reconcile_all(&self) -> StoreResult<usize> {
        let fixed = self.db.write(&[Table::GroceryLists], |conn| {
            Ok(conn.execute(
                "UPDATE grocery_lists SET item_count = \
                 (SELECT COUNT(*) FROM grocery_items WHERE grocery_list_id = grocery_lists.id) \
                 WHERE item_count <> \
                 (SELECT COUNT(*) FROM grocery_items WHERE grocery_list_id = grocery_lists.id)",
                [],
            )?)
        })?;

        if fixed > 0 {
            tracing::warn!(fixed, "corrected drifted grocery list counts");
        }
        Ok(fixed)
    }
}

fn insert_list(conn: &Connection, name: &str) -> StoreResult<GroceryListId> {
    conn.execute(
        "INSERT INTO grocery_lists (name, item_count) VALUES (?1, 0)",
        params![name],
    )?;
    Ok(GroceryListId::new(conn.last_insert_rowid()))
}

/// Inserts an item and increments the list's count
fn insert_item(
    conn: &Connection,
    list_id: GroceryListId,
    line: &IngredientLine,
) -> StoreResult<GroceryItemId> {
    ensure_list(conn, list_id)?;
    ensure_unit(conn, line.unit_id)?;

    conn.execute(
        "INSERT INTO grocery_items (grocery_list_id, name, quantity, unit_id, is_checked) \
         VALUES (?1, ?2, ?3, ?4, 0)",
        params![list_id, line.name, line.quantity, line.unit_id],
    )?;
    let id = GroceryItemId::new(conn.last_insert_rowid());
    adjust_count(conn, list_id, 1)?;
    Ok(id)
}

/// Creates a list and fills it in the caller's transaction
pub(crate) fn insert_list_with(
    conn: &Connection,
    name: &str,
    lines: &[IngredientLine],
) -> StoreResult<GroceryListId> {
    let name = required("list name", name)?;
    let id = insert_list(conn, &name)?;
    for line in lines {
        insert_item(conn, id, line)?;
    }
    Ok(id)
}

fn adjust_count(conn: &Connection, id: GroceryListId, delta: i64) -> StoreResult<()> {
    conn.execute(
        "UPDATE grocery_lists SET item_count = MAX(item_count + ?1, 0) WHERE id = ?2",
        params![delta, id],
    )?;
    Ok(())
}

fn ensure_list(conn: &Connection, id: GroceryListId) -> StoreResult<()> {
    if find_list(conn, id)?.is_some() {
        Ok(())
    } else {
        Err(StoreError::missing(GroceryListId::KIND, id))
    }
}

fn map_list(row: &Row<'_>) -> rusqlite::Result<GroceryList> {
    Ok(GroceryList {
        id: row.get(0)?,
        name: row.get(1)?,
        item_count: row.get(2)?,
    })
}

fn map_item(row: &Row<'_>) -> rusqlite::Result<GroceryItem> {
    Ok(GroceryItem {
        id: row.get(0)?,
        grocery_list_id: row.get(1)?,
        name: row.get(2)?,
        quantity: row.get(3)?,
        unit_id: row.get(4)?,
        is_checked: row.get(5)?,
    })
}

fn find_list(conn: &Connection, id: GroceryListId) -> StoreResult<Option<GroceryList>> {
    Ok(conn
        .query_row(&format!("{SELECT_LIST} WHERE id = ?1"), params![id], map_list)
        .optional()?)
}

fn query_lists(conn: &Connection) -> StoreResult<Vec<GroceryList>> {
    let mut stmt = conn.prepare(&format!("{SELECT_LIST} ORDER BY id"))?;
    let lists = stmt
        .query_map([], map_list)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lists)
}

fn items_of(conn: &Connection, list_id: GroceryListId) -> StoreResult<Vec<GroceryItem>> {
    let mut stmt = conn.prepare(&format!("{SELECT_ITEM} WHERE grocery_list_id = ?1 ORDER BY id"))?;
    let items = stmt
        .query_map(params![list_id], map_item)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}
