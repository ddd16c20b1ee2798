//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{browse, grocery, kitchen, recipe, unit, watch};
use crate::storage::{Config, GlobalConfig, Project};

#[derive(Parser)]
#[command(name = "pantry")]
#[command(author, version, about = "Recipes, kitchen inventory and grocery lists")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new pantry project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage measurement units
    #[command(subcommand)]
    Unit(unit::UnitCommands),

    /// Manage what's in the kitchen
    #[command(subcommand)]
    Kitchen(kitchen::KitchenCommands),

    /// Manage recipes
    #[command(subcommand)]
    Recipe(recipe::RecipeCommands),

    /// Manage grocery lists
    #[command(subcommand)]
    Grocery(grocery::GroceryCommands),

    /// Browse recipes interactively, one query per input line
    ///
    /// Each line replaces the search query. `:suggest` ranks recipes by
    /// what's in the kitchen and `:clear` returns to an empty search.
    Browse,

    /// Print changes to the data as they happen, including other processes' writes
    Watch {
        /// Stop after this many seconds
        #[arg(long)]
        seconds: Option<u64>,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let global = Config::load_global();

    init_logging(cli.verbose, global.as_ref().ok());
    let global = global?;

    let format = cli
        .format
        .unwrap_or_else(|| OutputFormat::from(global.default_format));
    let output = Output::new(format);

    output.verbose("Pantry starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Created database at: {}", project.database_path().display()),
            );
            output.success(&format!(
                "Initialized pantry project at {}",
                project.root().display()
            ));
        }

        Commands::Unit(cmd) => unit::run(cmd, &output)?,
        Commands::Kitchen(cmd) => kitchen::run(cmd, &output)?,
        Commands::Recipe(cmd) => recipe::run(cmd, &output)?,
        Commands::Grocery(cmd) => grocery::run(cmd, &output)?,
        Commands::Browse => browse::run(&output)?,
        Commands::Watch { seconds } => watch::run(&output, seconds)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}

/// `RUST_LOG` wins, then `--verbose`, then the global `log_filter`
fn init_logging(verbose: bool, global: Option<&GlobalConfig>) {
    let filter = if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("pantry_cli=debug")
    } else {
        global
            .and_then(|g| g.log_filter.as_deref())
            .and_then(|f| EnvFilter::try_new(f).ok())
            .unwrap_or_else(|| EnvFilter::new("warn"))
    };

    // Diagnostics go to stderr so stdout stays parseable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
