//! Recipe CLI commands

use anyhow::{Context, Result};
use clap::Subcommand;

use super::output::Output;
use super::unit::resolve_unit;
use crate::domain::{
    parse_quantity, GroceryListId, IngredientLine, Recipe, RecipeDraft, RecipeId,
};
use crate::engine::SuggestionEngine;
use crate::storage::{Project, UnitRegistry};

#[derive(Subcommand)]
pub enum RecipeCommands {
    /// Add a recipe
    ///
    /// Ingredients are written as NAME,QUANTITY,UNIT.
    ///
    /// Examples:
    ///   pantry recipe add "Pancakes" -i "flour,200,g" -i "milk,300,ml" -s "Whisk" -s "Fry"
    Add {
        name: String,

        #[arg(long, short, default_value = "")]
        author: String,

        /// Image path or URL
        #[arg(long)]
        image: Option<String>,

        /// Ingredient as NAME,QUANTITY,UNIT (repeatable)
        #[arg(long = "ingredient", short = 'i')]
        ingredients: Vec<String>,

        /// Instruction step, in order (repeatable)
        #[arg(long = "step", short = 's')]
        steps: Vec<String>,
    },

    /// Change a recipe
    ///
    /// Positions are 1-based. Clears run first, then removals, then
    /// replacements, then additions.
    Edit {
        /// Recipe ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, short)]
        author: Option<String>,

        #[arg(long)]
        image: Option<String>,

        /// Append an ingredient as NAME,QUANTITY,UNIT (repeatable)
        #[arg(long = "add-ingredient", short = 'i')]
        add_ingredients: Vec<String>,

        /// Remove the ingredient at a position (repeatable)
        #[arg(long = "remove-ingredient")]
        remove_ingredients: Vec<usize>,

        /// Remove every ingredient
        #[arg(long)]
        clear_ingredients: bool,

        /// Append a step (repeatable)
        #[arg(long = "add-step", short = 's')]
        add_steps: Vec<String>,

        /// Replace a step as POSITION=TEXT (repeatable)
        #[arg(long = "set-step")]
        set_steps: Vec<String>,

        /// Remove the step at a position; later steps move up (repeatable)
        #[arg(long = "remove-step")]
        remove_steps: Vec<usize>,

        /// Remove every step
        #[arg(long)]
        clear_steps: bool,
    },

    /// Show a recipe with its ingredients and steps
    Show {
        /// Recipe ID
        id: String,
    },

    /// List all recipes
    List,

    /// Find recipes by name or author
    Search {
        /// Case-insensitive text to look for; empty matches everything
        #[arg(default_value = "")]
        query: String,
    },

    /// Delete a recipe with its ingredients and steps
    Delete {
        /// Recipe ID
        id: String,
    },

    /// List recipes by how much of them the kitchen already has
    Suggest,

    /// Put a recipe's ingredients on a grocery list
    ///
    /// Examples:
    ///   pantry recipe to-list 3 --list 1
    ///   pantry recipe to-list 3 --new "Pancake shopping"
    ToList {
        /// Recipe ID
        id: String,

        /// Existing grocery list ID
        #[arg(long, conflicts_with = "new", required_unless_present = "new")]
        list: Option<String>,

        /// Name of a new list to create
        #[arg(long)]
        new: Option<String>,
    },
}

pub fn run(cmd: RecipeCommands, output: &Output) -> Result<()> {
    match cmd {
        RecipeCommands::Add {
            name,
            author,
            image,
            ingredients,
            steps,
        } => add_recipe(output, &name, &author, image, &ingredients, &steps),
        RecipeCommands::Edit {
            id,
            name,
            author,
            image,
            add_ingredients,
            remove_ingredients,
            clear_ingredients,
            add_steps,
            set_steps,
            remove_steps,
            clear_steps,
        } => {
            let changes = DraftChanges {
                name,
                author,
                image,
                add_ingredients,
                remove_ingredients,
                clear_ingredients,
                add_steps,
                set_steps,
                remove_steps,
                clear_steps,
            };
            edit_recipe(output, &id, changes)
        }
        RecipeCommands::Show { id } => show_recipe(output, &id),
        RecipeCommands::List => list_recipes(output, None),
        RecipeCommands::Search { query } => list_recipes(output, Some(&query)),
        RecipeCommands::Delete { id } => delete_recipe(output, &id),
        RecipeCommands::Suggest => suggest_recipes(output),
        RecipeCommands::ToList { id, list, new } => {
            to_grocery_list(output, &id, list.as_deref(), new.as_deref())
        }
    }
}

/// Parses `NAME,QUANTITY,UNIT`; the name may itself contain commas
fn parse_ingredient(units: &UnitRegistry, raw: &str) -> Result<IngredientLine> {
    let mut parts = raw.rsplitn(3, ',');
    let (Some(unit), Some(quantity), Some(name)) = (parts.next(), parts.next(), parts.next())
    else {
        anyhow::bail!("Invalid ingredient '{}': expected NAME,QUANTITY,UNIT", raw);
    };

    let unit = resolve_unit(units, unit)?;
    let line = IngredientLine::new(name, parse_quantity(quantity), unit.id)
        .with_context(|| format!("Invalid ingredient '{}'", raw))?;
    Ok(line)
}

fn add_recipe(
    output: &Output,
    name: &str,
    author: &str,
    image: Option<String>,
    ingredients: &[String],
    steps: &[String],
) -> Result<()> {
    let project = Project::open_current()?;
    let units = project.units();

    let mut draft = RecipeDraft::new(name, author);
    draft.set_image(image);
    for raw in ingredients {
        draft.add_ingredient(parse_ingredient(&units, raw)?);
    }
    for step in steps {
        draft.add_instruction(step)?;
    }

    let id = project.recipes().save(&draft)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "name": draft.name(),
            "ingredients": draft.ingredients().len(),
            "steps": draft.steps().len(),
        }));
    } else {
        output.success(&format!("Created recipe {}: {}", id, draft.name()));
    }
    Ok(())
}

struct DraftChanges {
    name: Option<String>,
    author: Option<String>,
    image: Option<String>,
    add_ingredients: Vec<String>,
    remove_ingredients: Vec<usize>,
    clear_ingredients: bool,
    add_steps: Vec<String>,
    set_steps: Vec<String>,
    remove_steps: Vec<usize>,
    clear_steps: bool,
}

fn edit_recipe(output: &Output, id: &str, changes: DraftChanges) -> Result<()> {
    let project = Project::open_current()?;
    let units = project.units();
    let recipes = project.recipes();

    let id: RecipeId = id.parse()?;
    let detail = recipes
        .get_detail(id)?
        .ok_or_else(|| anyhow::anyhow!("Recipe not found: {}", id))?;
    let mut draft = RecipeDraft::edit(&detail);

    if let Some(name) = &changes.name {
        draft.set_name(name);
    }
    if let Some(author) = &changes.author {
        draft.set_author(author);
    }
    if changes.image.is_some() {
        draft.set_image(changes.image);
    }

    if changes.clear_ingredients {
        draft.clear_ingredients();
    }
    if changes.clear_steps {
        draft.clear_instructions();
    }

    // Highest position first so earlier removals don't shift later ones
    let mut removals = changes.remove_ingredients;
    removals.sort_unstable_by(|a, b| b.cmp(a));
    removals.dedup();
    for position in removals {
        if draft.remove_ingredient(position.wrapping_sub(1)).is_none() {
            anyhow::bail!("No ingredient at position {}", position);
        }
    }

    let mut removals = changes.remove_steps;
    removals.sort_unstable_by(|a, b| b.cmp(a));
    removals.dedup();
    for position in removals {
        if draft.remove_instruction(position.wrapping_sub(1)).is_none() {
            anyhow::bail!("No step at position {}", position);
        }
    }

    for raw in &changes.set_steps {
        let (position, text) = raw
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Invalid step '{}': expected POSITION=TEXT", raw))?;
        let position: usize = position
            .trim()
            .parse()
            .with_context(|| format!("Invalid step position in '{}'", raw))?;
        if !draft.update_instruction(position.wrapping_sub(1), text)? {
            anyhow::bail!("No step at position {}", position);
        }
    }

    for raw in &changes.add_ingredients {
        draft.add_ingredient(parse_ingredient(&units, raw)?);
    }
    for step in &changes.add_steps {
        draft.add_instruction(step)?;
    }

    recipes.save(&draft)?;
    output.success(&format!("Updated recipe {}", id));
    Ok(())
}

fn show_recipe(output: &Output, id: &str) -> Result<()> {
    let project = Project::open_current()?;
    let id: RecipeId = id.parse()?;

    let detail = project
        .recipes()
        .get_detail(id)?
        .ok_or_else(|| anyhow::anyhow!("Recipe not found: {}", id))?;

    if output.is_json() {
        output.data(&detail);
        return Ok(());
    }

    let units = project.unit_lookup()?;
    println!("Recipe: {}", detail.recipe.id);
    println!("Name: {}", detail.recipe.name);
    if !detail.recipe.author.is_empty() {
        println!("Author: {}", detail.recipe.author);
    }
    if let Some(image) = &detail.recipe.image {
        println!("Image: {}", image);
    }

    println!();
    println!("Ingredients:");
    for ingredient in &detail.ingredients {
        println!(
            "  - {} {}",
            units.format_quantity(ingredient.quantity, ingredient.unit_id),
            ingredient.name
        );
    }

    println!();
    println!("Steps:");
    for step in &detail.instructions {
        println!("  {}. {}", step.step_number, step.instruction);
    }
    Ok(())
}

fn list_recipes(output: &Output, query: Option<&str>) -> Result<()> {
    let project = Project::open_current()?;
    let recipes = project.recipes();

    let found = match query {
        Some(query) => {
            output.verbose_ctx("recipe", &format!("Searching for: {}", query));
            recipes.search(query)?
        }
        None => recipes.list_all()?,
    };

    if output.is_json() {
        output.data(&found);
    } else if found.is_empty() {
        match query {
            Some(query) => println!("No recipes matching '{}'", query),
            None => println!("No recipes"),
        }
    } else {
        print_recipes(&found);
    }
    Ok(())
}

pub(super) fn print_recipes(recipes: &[Recipe]) {
    println!("{:<6} {:<30} AUTHOR", "ID", "NAME");
    println!("{}", "-".repeat(50));
    for recipe in recipes {
        println!("{:<6} {:<30} {}", recipe.id, recipe.name, recipe.author);
    }
}

fn delete_recipe(output: &Output, id: &str) -> Result<()> {
    let project = Project::open_current()?;
    let id: RecipeId = id.parse()?;

    if !project.recipes().delete(id)? {
        anyhow::bail!("Recipe not found: {}", id);
    }
    output.success(&format!("Deleted recipe {}", id));
    Ok(())
}

fn suggest_recipes(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let ranked = SuggestionEngine::new(project.database()).ranked()?;

    if output.is_json() {
        output.data(&ranked);
    } else if ranked.is_empty() {
        println!("No recipes");
    } else {
        print_recipes(&ranked);
    }
    Ok(())
}

fn to_grocery_list(
    output: &Output,
    id: &str,
    list: Option<&str>,
    new: Option<&str>,
) -> Result<()> {
    let project = Project::open_current()?;
    let engine = SuggestionEngine::new(project.database());
    let id: RecipeId = id.parse()?;

    let list_id = match (list, new) {
        (Some(list), _) => {
            let list_id: GroceryListId = list.parse()?;
            let added = engine.add_ingredients_to_grocery_list(id, list_id)?;
            output.verbose_ctx("recipe", &format!("Added {} items", added.len()));
            list_id
        }
        (None, Some(name)) => engine.create_list_with_ingredients(id, name)?,
        (None, None) => anyhow::bail!("Pass --list or --new"),
    };

    if output.is_json() {
        output.data(&serde_json::json!({
            "recipe_id": id,
            "grocery_list_id": list_id,
        }));
    } else {
        output.success(&format!(
            "Added ingredients of recipe {} to grocery list {}",
            id, list_id
        ));
    }
    Ok(())
}
