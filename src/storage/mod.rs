//! # Storage Layer
//!
//! Persistence for Pantry, backed by a single SQLite file.
//!
//! ## Tables
//!
//! | Data | Table | Deleting the parent |
//! |------|-------|---------------------|
//! | Units | `units` | restricted while referenced |
//! | Kitchen items | `kitchen_items` | |
//! | Recipes | `recipes` | |
//! | Ingredients | `ingredients` | cascades from recipe |
//! | Instructions | `recipe_instructions` | cascades from recipe |
//! | Grocery lists | `grocery_lists` | |
//! | Grocery items | `grocery_items` | cascades from list |
//!
//! ## Live Views
//!
//! Stores return one-shot reads and [`LiveView`]s. Every committed write
//! reports its tables to the [`ChangeHub`], which re-runs the affected views
//! and pushes the new results. [`ExternalChangeWatcher`] does the same for
//! writes from other processes.
//!
//! ## Project Structure
//!
//! ```text
//! .pantry/
//! ├── pantry.db             # SQLite database
//! ├── config.toml           # Project configuration
//! └── .gitignore            # Ignores WAL files
//! ```
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a pantry project
//! - [`UnitRegistry`], [`InventoryStore`], [`RecipeStore`], [`GroceryListStore`] - Stores
//! - [`Config`] - Project and global configuration

mod live;
mod database;
mod units;
mod kitchen;
mod recipes;
mod grocery;
mod watch;
mod config;
mod project;

pub use live::{ChangeHub, LiveView, Subscription, Table};
pub use database::{Database, StoreError, StoreResult};
pub use units::{UnitDeleteOutcome, UnitLookup, UnitRegistry};
pub use kitchen::InventoryStore;
pub use recipes::RecipeStore;
pub use grocery::GroceryListStore;
pub use watch::ExternalChangeWatcher;
pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, PANTRY_DIR};
pub use project::{Project, ProjectError, DATABASE_FILE};

pub(crate) use grocery::insert_list_with;
