//! Project management
//!
//! Handles project initialization and provides access to stores.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::PANTRY_DIR;
use super::{
    Config, Database, GroceryListStore, InventoryStore, RecipeStore, UnitLookup, UnitRegistry,
};

/// File name of the database inside `.pantry/`
pub const DATABASE_FILE: &str = "pantry.db";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a pantry project. Run 'pantry init' first.")]
    NotInProject,
}

/// A pantry project: a directory holding `.pantry/`
pub struct Project {
    root: PathBuf,
    config: Config,
    db: Database,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let pantry_dir = root.join(PANTRY_DIR);

        if !pantry_dir.is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;
        let db_path = pantry_dir.join(DATABASE_FILE);
        let db = Database::open(&db_path)
            .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

        tracing::debug!(root = %root.display(), "opened project");
        Ok(Self { root, config, db })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    ///
    /// Safe to run on an existing project; existing files are kept.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let pantry_dir = root.join(PANTRY_DIR);

        fs::create_dir_all(&pantry_dir).with_context(|| {
            format!("Failed to create {PANTRY_DIR} directory: {}", pantry_dir.display())
        })?;

        // Create default config
        let config_path = pantry_dir.join("config.toml");
        if !config_path.exists() {
            let default_config = r#"# Pantry configuration

[search]
# Quiet period before a changed search query is evaluated
debounce_ms = 300

[watch]
# Debounce for database file events in 'pantry watch'
debounce_ms = 500

[units]
# Create the standard units (g, kg, ml, ...) on init
seed_defaults = true
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        // Create .gitignore for .pantry
        let gitignore_path = pantry_dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = r#"# SQLite write-ahead log and shared memory
pantry.db-wal
pantry.db-shm
"#;
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        let project = Self::open(root)?;
        if project.config.project.units.seed_defaults {
            project.units().seed_defaults()?;
        }
        Ok(project)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .pantry directory path
    pub fn pantry_dir(&self) -> PathBuf {
        self.root.join(PANTRY_DIR)
    }

    /// Returns the path of the database file
    pub fn database_path(&self) -> PathBuf {
        self.pantry_dir().join(DATABASE_FILE)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn units(&self) -> UnitRegistry {
        UnitRegistry::new(self.db.clone())
    }

    /// Unit cache that follows the registry
    pub fn unit_lookup(&self) -> Result<UnitLookup> {
        Ok(UnitLookup::new(&self.units())?)
    }

    pub fn inventory(&self) -> InventoryStore {
        InventoryStore::new(self.db.clone())
    }

    pub fn recipes(&self) -> RecipeStore {
        RecipeStore::new(self.db.clone())
    }

    pub fn grocery(&self) -> GroceryListStore {
        GroceryListStore::new(self.db.clone())
    }
}
