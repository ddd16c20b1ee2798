//! Kitchen inventory CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use super::unit::resolve_unit;
use crate::domain::{parse_quantity, KitchenItem, KitchenItemId};
use crate::storage::{Project, UnitLookup};

#[derive(Subcommand)]
pub enum KitchenCommands {
    /// Add an item to the kitchen
    ///
    /// Examples:
    ///   pantry kitchen add flour 500 g
    ///   pantry kitchen add eggs 6 pc
    Add {
        name: String,

        /// Amount; anything unparsable counts as 0
        quantity: String,

        /// Unit ID, abbreviation or name
        unit: String,
    },

    /// List everything in the kitchen
    List,

    /// Find items by name
    Search {
        /// Case-insensitive text to look for; empty matches everything
        #[arg(default_value = "")]
        query: String,
    },

    /// Change an item
    Update {
        /// Item ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        quantity: Option<String>,

        /// Unit ID, abbreviation or name
        #[arg(long)]
        unit: Option<String>,
    },

    /// Remove an item
    Remove {
        /// Item ID
        id: String,
    },
}

pub fn run(cmd: KitchenCommands, output: &Output) -> Result<()> {
    match cmd {
        KitchenCommands::Add {
            name,
            quantity,
            unit,
        } => add_item(output, &name, &quantity, &unit),
        KitchenCommands::List => list_items(output, None),
        KitchenCommands::Search { query } => list_items(output, Some(&query)),
        KitchenCommands::Update {
            id,
            name,
            quantity,
            unit,
        } => update_item(output, &id, name, quantity, unit),
        KitchenCommands::Remove { id } => remove_item(output, &id),
    }
}

fn add_item(output: &Output, name: &str, quantity: &str, unit: &str) -> Result<()> {
    let project = Project::open_current()?;
    let unit = resolve_unit(&project.units(), unit)?;
    let quantity = parse_quantity(quantity);

    let id = project.inventory().create(name, quantity, unit.id)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "name": name.trim(),
            "quantity": quantity,
            "unit_id": unit.id,
        }));
    } else {
        output.success(&format!(
            "Added {} {} to the kitchen ({})",
            unit.format_quantity(quantity),
            name.trim(),
            id
        ));
    }
    Ok(())
}

fn list_items(output: &Output, query: Option<&str>) -> Result<()> {
    let project = Project::open_current()?;
    let inventory = project.inventory();

    let items = match query {
        Some(query) => {
            output.verbose_ctx("kitchen", &format!("Searching for: {}", query));
            inventory.search(query)?
        }
        None => inventory.list_all()?,
    };

    if output.is_json() {
        output.data(&items);
        return Ok(());
    }

    if items.is_empty() {
        match query {
            Some(query) => println!("No kitchen items matching '{}'", query),
            None => println!("The kitchen is empty"),
        }
        return Ok(());
    }

    let units = project.unit_lookup()?;
    print_items(&items, &units);
    Ok(())
}

fn print_items(items: &[KitchenItem], units: &UnitLookup) {
    println!("{:<6} {:<12} NAME", "ID", "QUANTITY");
    println!("{}", "-".repeat(40));
    for item in items {
        println!(
            "{:<6} {:<12} {}",
            item.id,
            units.format_quantity(item.quantity, item.unit_id),
            item.name
        );
    }
}

fn update_item(
    output: &Output,
    id: &str,
    name: Option<String>,
    quantity: Option<String>,
    unit: Option<String>,
) -> Result<()> {
    let project = Project::open_current()?;
    let inventory = project.inventory();

    let id: KitchenItemId = id.parse()?;
    let mut item = inventory
        .get(id)?
        .ok_or_else(|| anyhow::anyhow!("Kitchen item not found: {}", id))?;

    if let Some(name) = name {
        item.name = name;
    }
    if let Some(quantity) = quantity {
        item.quantity = parse_quantity(&quantity);
    }
    if let Some(unit) = unit {
        item.unit_id = resolve_unit(&project.units(), &unit)?.id;
    }

    inventory.update(&item)?;
    output.success(&format!("Updated kitchen item {}", id));
    Ok(())
}

fn remove_item(output: &Output, id: &str) -> Result<()> {
    let project = Project::open_current()?;
    let id: KitchenItemId = id.parse()?;

    if !project.inventory().delete(id)? {
        anyhow::bail!("Kitchen item not found: {}", id);
    }
    output.success(&format!("Removed kitchen item {}", id));
    Ok(())
}
