//! Unit registry
//!
//! Owns measurement units. A unit referenced by any ingredient, kitchen item
//! or grocery item is never deleted; [`UnitRegistry::delete`] reports the
//! references instead.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use super::database::{Database, StoreError, StoreResult};
use super::live::{LiveView, Subscription, Table};
use crate::domain::{default_units, format_number, required, MeasurementUnit, UnitCategory, UnitId, UnitUsage};

const SELECT_UNIT: &str = "SELECT id, name, abbreviation, category FROM units";

/// Result of asking to delete a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UnitDeleteOutcome {
    Deleted,
    /// Still referenced; nothing was removed
    Refused(UnitUsage),
    NotFound,
}

#[derive(Clone)]
pub struct UnitRegistry {
    db: Database,
}

impl UnitRegistry {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn create(
        &self,
        name: &str,
        abbreviation: &str,
        category: UnitCategory,
    ) -> StoreResult<UnitId> {
        let name = required("unit name", name)?;
        let abbreviation = required("abbreviation", abbreviation)?;

        let id = self.db.write(&[Table::Units], |conn| {
            conn.execute(
                "INSERT INTO units (name, abbreviation, category) VALUES (?1, ?2, ?3)",
                params![name, abbreviation, category],
            )?;
            Ok(UnitId::new(conn.last_insert_rowid()))
        })?;

        tracing::debug!(%id, %name, "created unit");
        Ok(id)
    }

    /// Replaces the stored unit with the same ID
    pub fn update(&self, unit: &MeasurementUnit) -> StoreResult<()> {
        let name = required("unit name", &unit.name)?;
        let abbreviation = required("abbreviation", &unit.abbreviation)?;

        self.db.write(&[Table::Units], |conn| {
            let changed = conn.execute(
                "UPDATE units SET name = ?1, abbreviation = ?2, category = ?3 WHERE id = ?4",
                params![name, abbreviation, unit.category, unit.id],
            )?;
            if changed == 0 {
                return Err(StoreError::missing(UnitId::KIND, unit.id));
            }
            Ok(())
        })
    }

    /// Deletes a unit unless something still references it
    pub fn delete(&self, id: UnitId) -> StoreResult<UnitDeleteOutcome> {
        let outcome = self.db.write(&[Table::Units], |conn| {
            if find(conn, id)?.is_none() {
                return Ok(UnitDeleteOutcome::NotFound);
            }

            let usage = usage_of(conn, id)?;
            if usage.is_in_use() {
                return Ok(UnitDeleteOutcome::Refused(usage));
            }

            conn.execute("DELETE FROM units WHERE id = ?1", params![id])?;
            Ok(UnitDeleteOutcome::Deleted)
        })?;

        match outcome {
            UnitDeleteOutcome::Refused(usage) => {
                tracing::warn!(%id, %usage, "refused to delete unit in use")
            }
            _ => tracing::debug!(%id, ?outcome, "delete unit"),
        }
        Ok(outcome)
    }

    pub fn get(&self, id: UnitId) -> StoreResult<Option<MeasurementUnit>> {
        self.db.read(|conn| find(conn, id))
    }

    /// All units ordered by category, then name
    pub fn list_all(&self) -> StoreResult<Vec<MeasurementUnit>> {
        self.db.read(query_all)
    }

    /// Units of one category ordered by name
    pub fn list_by_category(&self, category: UnitCategory) -> StoreResult<Vec<MeasurementUnit>> {
        self.db.read(|conn| query_category(conn, category))
    }

    /// Counts the rows that reference `id`
    pub fn usage(&self, id: UnitId) -> StoreResult<UnitUsage> {
        self.db.read(|conn| usage_of(conn, id))
    }

    pub fn watch_all(&self) -> StoreResult<LiveView<Vec<MeasurementUnit>>> {
        self.db.watch(&[Table::Units], query_all)
    }

    pub fn watch_by_category(
        &self,
        category: UnitCategory,
    ) -> StoreResult<LiveView<Vec<MeasurementUnit>>> {
        self.db
            .watch(&[Table::Units], move |conn| query_category(conn, category))
    }

    /// Inserts the default unit set when the registry is empty
    ///
    /// Returns how many units were created.
    pub fn seed_defaults(&self) -> StoreResult<usize> {
        let created = self.db.write(&[Table::Units], |conn| {
            let existing: i64 = conn.query_row("SELECT COUNT(*) FROM units", [], |r| r.get(0))?;
            if existing > 0 {
                return Ok(0);
            }

            let mut stmt = conn
                .prepare("INSERT INTO units (name, abbreviation, category) VALUES (?1, ?2, ?3)")?;
            let defaults = default_units();
            for (name, abbreviation, category) in &defaults {
                stmt.execute(params![name, abbreviation, category])?;
            }
            Ok(defaults.len())
        })?;

        if created > 0 {
            tracing::info!(created, "seeded default units");
        }
        Ok(created)
    }
}

fn map_unit(row: &Row<'_>) -> rusqlite::Result<MeasurementUnit> {
    Ok(MeasurementUnit {
        id: row.get(0)?,
        name: row.get(1)?,
        abbreviation: row.get(2)?,
        category: row.get(3)?,
    })
}

fn find(conn: &Connection, id: UnitId) -> StoreResult<Option<MeasurementUnit>> {
    Ok(conn
        .query_row(&format!("{SELECT_UNIT} WHERE id = ?1"), params![id], map_unit)
        .optional()?)
}

fn query_all(conn: &Connection) -> StoreResult<Vec<MeasurementUnit>> {
    // Categories sort by their stored name: COUNT first, WEIGHT last
    let mut stmt = conn.prepare(&format!("{SELECT_UNIT} ORDER BY category, name, id"))?;
    let units = stmt
        .query_map([], map_unit)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(units)
}

fn query_category(conn: &Connection, category: UnitCategory) -> StoreResult<Vec<MeasurementUnit>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_UNIT} WHERE category = ?1 ORDER BY name, id"
    ))?;
    let units = stmt
        .query_map(params![category], map_unit)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(units)
}

fn usage_of(conn: &Connection, id: UnitId) -> StoreResult<UnitUsage> {
    let count = |table: &str| -> StoreResult<usize> {
        let n: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {table} WHERE unit_id = ?1"),
            params![id],
            |r| r.get(0),
        )?;
        Ok(n as usize)
    };

    Ok(UnitUsage {
        ingredients: count("ingredients")?,
        kitchen_items: count("kitchen_items")?,
        grocery_items: count("grocery_items")?,
    })
}

/// Fails with `NotFound` unless the unit exists
pub(crate) fn ensure_unit(conn: &Connection, id: UnitId) -> StoreResult<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM units WHERE id = ?1)",
        params![id],
        |r| r.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(StoreError::missing(UnitId::KIND, id))
    }
}

/// In-memory `id -> unit` map kept in step with the registry
///
/// A read-through cache for rendering; the database stays authoritative.
pub struct UnitLookup {
    units: Arc<RwLock<HashMap<UnitId, MeasurementUnit>>>,
    _subscription: Subscription,
}

impl UnitLookup {
    pub fn new(registry: &UnitRegistry) -> StoreResult<Self> {
        let units = Arc::new(RwLock::new(index(registry.list_all()?)));

        let shared = Arc::clone(&units);
        let source = registry.clone();
        let subscription = registry.db.hub().subscribe(&[Table::Units], move |_| {
            match source.list_all() {
                Ok(all) => {
                    let mut map = shared.write().unwrap_or_else(|e| e.into_inner());
                    *map = index(all);
                }
                Err(e) => tracing::warn!(error = %e, "unit lookup refresh failed"),
            }
        });

        Ok(Self {
            units,
            _subscription: subscription,
        })
    }

    pub fn get(&self, id: UnitId) -> Option<MeasurementUnit> {
        self.units
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned()
    }

    /// Formats `quantity` with the unit's abbreviation, or `?` if unknown
    pub fn format_quantity(&self, quantity: f64, id: UnitId) -> String {
        match self.get(id) {
            Some(unit) => unit.format_quantity(quantity),
            None => format!("{} ?", format_number(quantity)),
        }
    }

    pub fn len(&self) -> usize {
        self.units.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn index(units: Vec<MeasurementUnit>) -> HashMap<UnitId, MeasurementUnit> {
    units.into_iter().map(|u| (u.id, u)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> UnitRegistry {
        UnitRegistry::new(Database::open_in_memory().unwrap())
    }

    #[test]
    fn create_and_get() {
        let units = registry();
        let id = units.create(" gram ", "g", UnitCategory::Weight).unwrap();

        let unit = units.get(id).unwrap().unwrap();
        assert_eq!(unit.name, "gram");
        assert_eq!(unit.category, UnitCategory::Weight);
        assert!(units.get(UnitId::new(999)).unwrap().is_none());
    }

    #[test]
    fn create_rejects_blank_fields() {
        let units = registry();
        assert!(matches!(
            units.create("", "g", UnitCategory::Weight),
            Err(StoreError::Invalid(_))
        ));
        assert!(units.create("gram", " ", UnitCategory::Weight).is_err());
    }

    #[test]
    fn ids_are_monotonic() {
        let units = registry();
        let a = units.create("a", "a", UnitCategory::Count).unwrap();
        assert_eq!(units.delete(a).unwrap(), UnitDeleteOutcome::Deleted);
        let b = units.create("b", "b", UnitCategory::Count).unwrap();
        assert!(b > a);
    }

    #[test]
    fn list_all_orders_by_category_then_name() {
        let units = registry();
        units.create("minute", "min", UnitCategory::Time).unwrap();
        units.create("kilogram", "kg", UnitCategory::Weight).unwrap();
        units.create("cup", "cup", UnitCategory::Volume).unwrap();
        units.create("gram", "g", UnitCategory::Weight).unwrap();

        let names: Vec<String> = units.list_all().unwrap().into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["minute", "cup", "gram", "kilogram"]);
    }

    #[test]
    fn list_by_category_sorted_by_name() {
        let units = registry();
        units.create("teaspoon", "tsp", UnitCategory::Volume).unwrap();
        units.create("cup", "cup", UnitCategory::Volume).unwrap();
        units.create("gram", "g", UnitCategory::Weight).unwrap();

        let names: Vec<String> = units
            .list_by_category(UnitCategory::Volume)
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["cup", "teaspoon"]);
    }

    #[test]
    fn update_replaces_record() {
        let units = registry();
        let id = units.create("gram", "g", UnitCategory::Weight).unwrap();

        let mut unit = units.get(id).unwrap().unwrap();
        unit.name = "grams".to_string();
        unit.category = UnitCategory::Count;
        units.update(&unit).unwrap();

        assert_eq!(units.get(id).unwrap().unwrap(), unit);
    }

    #[test]
    fn update_missing_unit_is_not_found() {
        let units = registry();
        let ghost = MeasurementUnit {
            id: UnitId::new(7),
            name: "x".to_string(),
            abbreviation: "x".to_string(),
            category: UnitCategory::Count,
        };
        assert!(units.update(&ghost).unwrap_err().is_not_found());
    }

    #[test]
    fn delete_unused_and_missing() {
        let units = registry();
        let id = units.create("gram", "g", UnitCategory::Weight).unwrap();

        assert_eq!(units.delete(id).unwrap(), UnitDeleteOutcome::Deleted);
        assert_eq!(units.delete(id).unwrap(), UnitDeleteOutcome::NotFound);
    }

    #[test]
    fn seed_defaults_only_when_empty() {
        let units = registry();
        let created = units.seed_defaults().unwrap();
        assert_eq!(created, default_units().len());
        assert_eq!(units.seed_defaults().unwrap(), 0);
        assert_eq!(units.list_all().unwrap().len(), created);
    }

    #[test]
    fn watch_all_follows_writes() {
        let units = registry();
        let view = units.watch_all().unwrap();
        assert!(view.current().is_empty());

        units.create("gram", "g", UnitCategory::Weight).unwrap();
        let update = view.next_update(std::time::Duration::from_secs(1)).unwrap();
        assert_eq!(update.len(), 1);
        assert_eq!(view.current().len(), 1);
    }

    #[test]
    fn category_view_ignores_other_categories() {
        let units = registry();
        let volume = units.watch_by_category(UnitCategory::Volume).unwrap();

        units.create("gram", "g", UnitCategory::Weight).unwrap();
        let update = volume.next_update(std::time::Duration::from_secs(1)).unwrap();
        assert!(update.is_empty());

        units.create("litre", "l", UnitCategory::Volume).unwrap();
        let update = volume.next_update(std::time::Duration::from_secs(1)).unwrap();
        assert_eq!(update.len(), 1);
        assert_eq!(update[0].abbreviation, "l");
    }

    #[test]
    fn lookup_rebuilds_on_change() {
        let units = registry();
        let gram = units.create("gram", "g", UnitCategory::Weight).unwrap();

        let lookup = UnitLookup::new(&units).unwrap();
        assert_eq!(lookup.format_quantity(2.0, gram), "2 g");

        let cup = units.create("cup", "cup", UnitCategory::Volume).unwrap();
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.get(cup).unwrap().abbreviation, "cup");

        assert_eq!(units.delete(gram).unwrap(), UnitDeleteOutcome::Deleted);
        assert!(lookup.get(gram).is_none());
        assert_eq!(lookup.format_quantity(1.5, gram), "1.5 ?");
    }
}
