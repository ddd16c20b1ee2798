//! Grocery list CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use super::unit::resolve_unit;
use crate::domain::{parse_quantity, GroceryItem, GroceryItemId, GroceryListId};
use crate::storage::{Project, UnitLookup};

#[derive(Subcommand)]
pub enum GroceryCommands {
    /// Create a grocery list
    New { name: String },

    /// List grocery lists
    List,

    /// Show a list and its items
    Show {
        /// List ID
        id: String,
    },

    /// Rename a list
    Rename {
        /// List ID
        id: String,

        name: String,
    },

    /// Delete a list and all its items
    Delete {
        /// List ID
        id: String,
    },

    /// Add an item to a list
    ///
    /// Examples:
    ///   pantry grocery add 1 apples 6 pc
    Add {
        /// List ID
        list: String,

        name: String,

        /// Amount; anything unparsable counts as 0
        quantity: String,

        /// Unit ID, abbreviation or name
        unit: String,
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

        /// Move the item to another list
        #[arg(long)]
        list: Option<String>,
    },

    /// Tick an item off
    Check {
        /// Item ID
        id: String,
    },

    /// Untick an item
    Uncheck {
        /// Item ID
        id: String,
    },

    /// Remove an item from its list
    Remove {
        /// Item ID
        id: String,
    },

    /// Find items on a list by name
    Search {
        /// List ID
        list: String,

        #[arg(default_value = "")]
        query: String,
    },

    /// Recompute stored item counts (one list, or all)
    Recount {
        /// List ID
        list: Option<String>,
    },
}

pub fn run(cmd: GroceryCommands, output: &Output) -> Result<()> {
    match cmd {
        GroceryCommands::New { name } => new_list(output, &name),
        GroceryCommands::List => list_lists(output),
        GroceryCommands::Show { id } => show_list(output, &id, None),
        GroceryCommands::Rename { id, name } => rename_list(output, &id, &name),
        GroceryCommands::Delete { id } => delete_list(output, &id),
        GroceryCommands::Add {
            list,
            name,
            quantity,
            unit,
        } => add_item(output, &list, &name, &quantity, &unit),
        GroceryCommands::Update {
            id,
            name,
            quantity,
            unit,
            list,
        } => update_item(output, &id, name, quantity, unit, list),
        GroceryCommands::Check { id } => set_checked(output, &id, true),
        GroceryCommands::Uncheck { id } => set_checked(output, &id, false),
        GroceryCommands::Remove { id } => remove_item(output, &id),
        GroceryCommands::Search { list, query } => show_list(output, &list, Some(&query)),
        GroceryCommands::Recount { list } => recount(output, list.as_deref()),
    }
}

fn new_list(output: &Output, name: &str) -> Result<()> {
    let project = Project::open_current()?;
    let id = project.grocery().create(name)?;

    if output.is_json() {
        output.data(&serde_json::json!({ "id": id, "name": name.trim() }));
    } else {
        output.success(&format!("Created grocery list {}: {}", id, name.trim()));
    }
    Ok(())
}

fn list_lists(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let lists = project.grocery().list_all()?;

    if output.is_json() {
        output.data(&lists);
    } else if lists.is_empty() {
        println!("No grocery lists");
    } else {
        println!("{:<6} {:<8} NAME", "ID", "ITEMS");
        println!("{}", "-".repeat(40));
        for list in &lists {
            println!("{:<6} {:<8} {}", list.id, list.item_count, list.name);
        }
    }
    Ok(())
}

fn show_list(output: &Output, id: &str, query: Option<&str>) -> Result<()> {
    let project = Project::open_current()?;
    let grocery = project.grocery();
    let id: GroceryListId = id.parse()?;

    let mut list = grocery
        .get_with_items(id)?
        .ok_or_else(|| anyhow::anyhow!("Grocery list not found: {}", id))?;
    if let Some(query) = query {
        list.items = grocery.search_items(id, query)?;
    }

    if output.is_json() {
        output.data(&list);
        return Ok(());
    }

    println!("Grocery list: {}", list.list.id);
    println!("Name: {}", list.list.name);
    println!(
        "Items: {} ({} checked)",
        list.list.item_count,
        list.checked_count()
    );

    if !list.items.is_empty() {
        println!();
        let units = project.unit_lookup()?;
        print_items(&list.items, &units);
    }
    Ok(())
}

fn print_items(items: &[GroceryItem], units: &UnitLookup) {
    for item in items {
        let mark = if item.is_checked { "x" } else { " " };
        println!(
            "  [{}] {:<6} {:<12} {}",
            mark,
            item.id,
            units.format_quantity(item.quantity, item.unit_id),
            item.name
        );
    }
}

fn rename_list(output: &Output, id: &str, name: &str) -> Result<()> {
    let project = Project::open_current()?;
    let id: GroceryListId = id.parse()?;

    project.grocery().rename(id, name)?;
    output.success(&format!("Renamed grocery list {} to {}", id, name.trim()));
    Ok(())
}

fn delete_list(output: &Output, id: &str) -> Result<()> {
    let project = Project::open_current()?;
    let id: GroceryListId = id.parse()?;

    if !project.grocery().delete(id)? {
        anyhow::bail!("Grocery list not found: {}", id);
    }
    output.success(&format!("Deleted grocery list {}", id));
    Ok(())
}

fn add_item(output: &Output, list: &str, name: &str, quantity: &str, unit: &str) -> Result<()> {
    let project = Project::open_current()?;
    let list: GroceryListId = list.parse()?;
    let unit = resolve_unit(&project.units(), unit)?;
    let quantity = parse_quantity(quantity);

    let id = project.grocery().add_item(list, name, quantity, unit.id)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "grocery_list_id": list,
            "name": name.trim(),
            "quantity": quantity,
            "unit_id": unit.id,
        }));
    } else {
        output.success(&format!(
            "Added {} {} to grocery list {} ({})",
            unit.format_quantity(quantity),
            name.trim(),
            list,
            id
        ));
    }
    Ok(())
}

fn find_item(project: &Project, id: &str) -> Result<GroceryItem> {
    let id: GroceryItemId = id.parse()?;
    project
        .grocery()
        .get_item(id)?
        .ok_or_else(|| anyhow::anyhow!("Grocery item not found: {}", id))
}

fn update_item(
    output: &Output,
    id: &str,
    name: Option<String>,
    quantity: Option<String>,
    unit: Option<String>,
    list: Option<String>,
) -> Result<()> {
    let project = Project::open_current()?;
    let mut item = find_item(&project, id)?;

    if let Some(name) = name {
        item.name = name;
    }
    if let Some(quantity) = quantity {
        item.quantity = parse_quantity(&quantity);
    }
    if let Some(unit) = unit {
        item.unit_id = resolve_unit(&project.units(), &unit)?.id;
    }
    if let Some(list) = list {
        item.grocery_list_id = list.parse()?;
    }

    project.grocery().update_item(&item)?;
    output.success(&format!("Updated grocery item {}", item.id));
    Ok(())
}

fn set_checked(output: &Output, id: &str, checked: bool) -> Result<()> {
    let project = Project::open_current()?;
    let id: GroceryItemId = id.parse()?;

    project.grocery().set_checked(id, checked)?;
    let verb = if checked { "Checked" } else { "Unchecked" };
    output.success(&format!("{} grocery item {}", verb, id));
    Ok(())
}

fn remove_item(output: &Output, id: &str) -> Result<()> {
    let project = Project::open_current()?;
    let id: GroceryItemId = id.parse()?;

    if !project.grocery().delete_item(id)? {
        anyhow::bail!("Grocery item not found: {}", id);
    }
    output.success(&format!("Removed grocery item {}", id));
    Ok(())
}

fn recount(output: &Output, list: Option<&str>) -> Result<()> {
    let project = Project::open_current()?;
    let grocery = project.grocery();

    match list {
        Some(list) => {
            let id: GroceryListId = list.parse()?;
            let count = grocery.recount(id)?;
            output.success(&format!("Grocery list {} has {} items", id, count));
        }
        None => {
            let fixed = grocery.reconcile_all()?;
            output.success(&format!("Corrected {} grocery list count(s)", fixed));
        }
    }
    Ok(())
}
