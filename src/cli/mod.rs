//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project setup | `init` |
//! | Unit | Measurement units | `unit add`, `unit list`, `unit delete` |
//! | Kitchen | What's on hand | `kitchen add`, `kitchen search` |
//! | Recipe | Recipes and suggestions | `recipe add`, `recipe suggest`, `recipe to-list` |
//! | Grocery | Shopping lists | `grocery new`, `grocery add`, `grocery check` |
//! | Live | Following changes | `browse`, `watch` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug logs on stderr:
//! ```bash
//! pantry --verbose recipe suggest
//! ```
//! `RUST_LOG` overrides it.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod unit;
mod kitchen;
mod recipe;
mod grocery;
mod browse;
mod watch;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
