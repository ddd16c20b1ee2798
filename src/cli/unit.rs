//! Unit CLI commands

use anyhow::{bail, Result};
use clap::Subcommand;

use super::output::Output;
use crate::domain::{MeasurementUnit, UnitCategory, UnitId};
use crate::storage::{Project, UnitDeleteOutcome, UnitRegistry};

#[derive(Subcommand)]
pub enum UnitCommands {
    /// Add a unit
    ///
    /// Examples:
    ///   pantry unit add gram g --category weight
    ///   pantry unit add pinch pn --category count
    Add {
        name: String,

        abbreviation: String,

        /// Weight, volume, count, length, temperature or time
        #[arg(long, short)]
        category: UnitCategory,
    },

    /// List units, grouped by category
    List {
        /// Only units of this category
        #[arg(long, short)]
        category: Option<UnitCategory>,
    },

    /// Show a unit and what uses it
    Show {
        /// Unit ID, abbreviation or name
        unit: String,
    },

    /// Change a unit
    Update {
        /// Unit ID, abbreviation or name
        unit: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        abbreviation: Option<String>,

        #[arg(long, short)]
        category: Option<UnitCategory>,
    },

    /// Delete a unit that nothing uses
    Delete {
        /// Unit ID, abbreviation or name
        unit: String,
    },

    /// List unit categories
    Categories,
}

pub fn run(cmd: UnitCommands, output: &Output) -> Result<()> {
    match cmd {
        UnitCommands::Add {
            name,
            abbreviation,
            category,
        } => add_unit(output, &name, &abbreviation, category),
        UnitCommands::List { category } => list_units(output, category),
        UnitCommands::Show { unit } => show_unit(output, &unit),
        UnitCommands::Update {
            unit,
            name,
            abbreviation,
            category,
        } => update_unit(output, &unit, name, abbreviation, category),
        UnitCommands::Delete { unit } => delete_unit(output, &unit),
        UnitCommands::Categories => list_categories(output),
    }
}

/// Finds a unit by ID, then abbreviation, then name
///
/// Abbreviation and name comparisons ignore case.
pub(super) fn resolve_unit(units: &UnitRegistry, input: &str) -> Result<MeasurementUnit> {
    if let Ok(id) = input.parse::<UnitId>() {
        if let Some(unit) = units.get(id)? {
            return Ok(unit);
        }
    }

    let wanted = input.trim().to_lowercase();
    let all = units.list_all()?;
    all.iter()
        .find(|u| u.abbreviation.to_lowercase() == wanted)
        .or_else(|| all.iter().find(|u| u.name.to_lowercase() == wanted))
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Unit not found: {}", input))
}

fn add_unit(
    output: &Output,
    name: &str,
    abbreviation: &str,
    category: UnitCategory,
) -> Result<()> {
    let project = Project::open_current()?;
    let id = project.units().create(name, abbreviation, category)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "name": name.trim(),
            "abbreviation": abbreviation.trim(),
            "category": category,
        }));
    } else {
        output.success(&format!("Created unit {} ({})", id, abbreviation.trim()));
    }
    Ok(())
}

fn list_units(output: &Output, category: Option<UnitCategory>) -> Result<()> {
    let project = Project::open_current()?;
    let units = match category {
        Some(category) => project.units().list_by_category(category)?,
        None => project.units().list_all()?,
    };
    output.verbose_ctx("unit", &format!("Found {} units", units.len()));

    if output.is_json() {
        output.data(&units);
    } else if units.is_empty() {
        println!("No units");
    } else {
        println!("{:<6} {:<12} {:<8} NAME", "ID", "CATEGORY", "ABBR");
        println!("{}", "-".repeat(50));
        for unit in &units {
            println!(
                "{:<6} {:<12} {:<8} {}",
                unit.id,
                unit.category.display_name(),
                unit.abbreviation,
                unit.name
            );
        }
    }
    Ok(())
}

fn show_unit(output: &Output, input: &str) -> Result<()> {
    let project = Project::open_current()?;
    let units = project.units();
    let unit = resolve_unit(&units, input)?;
    let usage = units.usage(unit.id)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "unit": unit,
            "usage": usage,
        }));
    } else {
        println!("Unit: {}", unit.id);
        println!("Name: {}", unit.name);
        println!("Abbreviation: {}", unit.abbreviation);
        println!("Category: {}", unit.category.display_name());
        println!("Used by: {}", usage);
    }
    Ok(())
}

fn update_unit(
    output: &Output,
    input: &str,
    name: Option<String>,
    abbreviation: Option<String>,
    category: Option<UnitCategory>,
) -> Result<()> {
    let project = Project::open_current()?;
    let units = project.units();
    let mut unit = resolve_unit(&units, input)?;

    if let Some(name) = name {
        unit.name = name;
    }
    if let Some(abbreviation) = abbreviation {
        unit.abbreviation = abbreviation;
    }
    if let Some(category) = category {
        unit.category = category;
    }

    units.update(&unit)?;
    output.success(&format!("Updated unit {}", unit.id));
    Ok(())
}

fn delete_unit(output: &Output, input: &str) -> Result<()> {
    let project = Project::open_current()?;
    let units = project.units();
    let unit = resolve_unit(&units, input)?;

    match units.delete(unit.id)? {
        UnitDeleteOutcome::Deleted => {
            output.success(&format!("Deleted unit {} ({})", unit.id, unit.abbreviation));
            Ok(())
        }
        UnitDeleteOutcome::Refused(usage) => {
            bail!("Unit '{}' is in use by {}", unit.abbreviation, usage)
        }
        UnitDeleteOutcome::NotFound => bail!("Unit not found: {}", input),
    }
}

fn list_categories(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let units = project.units().list_all()?;

    let counts: Vec<(UnitCategory, usize)> = UnitCategory::ALL
        .iter()
        .map(|&category| {
            let count = units.iter().filter(|u| u.category == category).count();
            (category, count)
        })
        .collect();

    if output.is_json() {
        let items: Vec<_> = counts
            .iter()
            .map(|(category, count)| {
                serde_json::json!({
                    "category": category,
                    "name": category.display_name(),
                    "units": count,
                })
            })
            .collect();
        output.data(&items);
    } else {
        for (category, count) in counts {
            println!("{:<12} {}", category.display_name(), count);
        }
    }
    Ok(())
}
