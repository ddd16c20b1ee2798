//! SQLite database shared by every store
//!
//! The database lives in `.pantry/pantry.db`. All stores share one
//! connection behind a mutex; every mutation runs in a single transaction
//! and reports the tables it touched to the [`ChangeHub`] after commit.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OptionalExtension};
use thiserror::Error;

use super::live::{lock, ChangeHub, LiveView, Table};
use crate::domain::{
    GroceryItemId, GroceryListId, IngredientId, InstructionId, KitchenItemId, RecipeId,
    UnitCategory, UnitId, ValidationError,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: i64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl StoreError {
    pub(crate) fn missing(kind: &'static str, id: impl Into<i64>) -> Self {
        StoreError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

macro_rules! sql_id {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToSql for $ty {
                fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                    Ok(ToSqlOutput::from(self.get()))
                }
            }

            impl FromSql for $ty {
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    i64::column_result(value).map(<$ty>::new)
                }
            }
        )*
    };
}

sql_id!(
    UnitId,
    RecipeId,
    IngredientId,
    InstructionId,
    KitchenItemId,
    GroceryListId,
    GroceryItemId,
);

impl ToSql for UnitCategory {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for UnitCategory {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: ValidationError| FromSqlError::Other(Box::new(e)))
    }
}

/// Handle to the pantry database
///
/// Cheap to clone; clones share the connection and the change hub.
#[derive(Clone)]
pub struct Database {
    path: Option<PathBuf>,
    conn: Arc<Mutex<Connection>>,
    hub: ChangeHub,
}

impl Database {
    /// Schema version - bump when schema changes
    const SCHEMA_VERSION: i32 = 1;

    /// Opens or creates the database file at `path`
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        // WAL lets a second process read while another writes
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        Self::from_connection(conn, Some(path.to_path_buf()))
    }

    /// Opens a private in-memory database
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?, None)
    }

    fn from_connection(conn: Connection, path: Option<PathBuf>) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        ensure_schema(&conn)?;

        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
            hub: ChangeHub::new(),
        })
    }

    /// Path of the database file, `None` when in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn hub(&self) -> &ChangeHub {
        &self.hub
    }

    /// Runs a read against the connection
    pub fn read<T>(&self, f: impl FnOnce(&Connection) -> StoreResult<T>) -> StoreResult<T> {
        let conn = lock(&self.conn);
        f(&conn)
    }

    /// Runs `f` in a transaction and notifies observers of `changed`
    ///
    /// Any error rolls the whole transaction back; observers are only
    /// notified after a successful commit.
    pub fn write<T>(
        &self,
        changed: &[Table],
        f: impl FnOnce(&Connection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let value = {
            let mut conn = lock(&self.conn);
            let tx = conn.transaction()?;
            let value = f(&tx)?;
            tx.commit()?;
            value
        };

        tracing::trace!(?changed, "committed write");
        self.hub.notify(changed);
        Ok(value)
    }

    /// Creates a live view over `query`, re-run whenever `tables` change
    pub(crate) fn watch<T, F>(&self, tables: &[Table], query: F) -> StoreResult<LiveView<T>>
    where
        T: Clone + Send + 'static,
        F: Fn(&Connection) -> StoreResult<T> + Send + Sync + 'static,
    {
        let query = Arc::new(query);

        // Hold the connection so no write commits before we're subscribed
        let conn = lock(&self.conn);
        let initial = query(&conn)?;

        let shared = Arc::clone(&self.conn);
        let refresh = move || {
            let conn = lock(&shared);
            query(&conn)
        };
        let view = LiveView::start(&self.hub, tables, initial, refresh);
        drop(conn);

        Ok(view)
    }

    /// Reads `PRAGMA user_version`
    pub fn schema_version(&self) -> StoreResult<i32> {
        self.read(|conn| schema_version(conn))
    }
}

fn schema_version(conn: &Connection) -> StoreResult<i32> {
    let result: Option<i32> = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .optional()?;

    Ok(result.unwrap_or(0))
}

fn ensure_schema(conn: &Connection) -> StoreResult<()> {
    let current = schema_version(conn)?;
    if current != Database::SCHEMA_VERSION {
        tracing::info!(from = current, to = Database::SCHEMA_VERSION, "creating schema");
        create_schema(conn)?;
    }
    Ok(())
}

/// Creates the schema from scratch; older layouts are dropped
fn create_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys=OFF;
        DROP TABLE IF EXISTS grocery_items;
        DROP TABLE IF EXISTS grocery_lists;
        DROP TABLE IF EXISTS recipe_instructions;
        DROP TABLE IF EXISTS ingredients;
        DROP TABLE IF EXISTS recipes;
        DROP TABLE IF EXISTS kitchen_items;
        DROP TABLE IF EXISTS units;
        PRAGMA foreign_keys=ON;
        ",
    )?;

    conn.execute_batch(
        "
        CREATE TABLE units (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            abbreviation TEXT NOT NULL,
            category TEXT NOT NULL
        );

        CREATE TABLE kitchen_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            quantity REAL NOT NULL,
            unit_id INTEGER NOT NULL REFERENCES units(id) ON DELETE RESTRICT
        );

        CREATE TABLE recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            author TEXT NOT NULL,
            image TEXT
        );

        CREATE TABLE ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            quantity REAL NOT NULL,
            unit_id INTEGER NOT NULL REFERENCES units(id) ON DELETE RESTRICT
        );

        CREATE TABLE recipe_instructions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            step_number INTEGER NOT NULL,
            instruction TEXT NOT NULL
        );

        CREATE TABLE grocery_lists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            item_count INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE grocery_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            grocery_list_id INTEGER NOT NULL REFERENCES grocery_lists(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            quantity REAL NOT NULL,
            unit_id INTEGER NOT NULL REFERENCES units(id) ON DELETE RESTRICT,
            is_checked INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX idx_units_category ON units(category);
        CREATE INDEX idx_kitchen_unit ON kitchen_items(unit_id);
        CREATE INDEX idx_ingredients_recipe ON ingredients(recipe_id);
        CREATE INDEX idx_ingredients_unit ON ingredients(unit_id);
        CREATE INDEX idx_instructions_recipe ON recipe_instructions(recipe_id);
        CREATE INDEX idx_grocery_items_list ON grocery_items(grocery_list_id);
        CREATE INDEX idx_grocery_items_unit ON grocery_items(unit_id);
        ",
    )?;

    conn.execute(
        &format!("PRAGMA user_version = {}", Database::SCHEMA_VERSION),
        [],
    )?;

    Ok(())
}
