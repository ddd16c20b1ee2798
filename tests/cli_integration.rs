//! CLI integration tests for Pantry
//!
//! These tests run the real binary against a fresh project directory and
//! check that commands work together: units feed kitchen items and recipes,
//! recipes feed suggestions and grocery lists.

use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

/// Get a command instance for the pantry binary, isolated from user config
fn pantry_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("pantry"));
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env_remove("RUST_LOG");
    cmd
}

/// Create a temporary directory and initialize a pantry project
fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    pantry_cmd(dir.path()).arg("init").assert().success();
    dir
}

fn json_output(dir: &Path, args: &[&str]) -> serde_json::Value {
    let output = pantry_cmd(dir)
        .args(["--format", "json"])
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "command failed: {:?}", args);
    serde_json::from_slice(&output.stdout).unwrap()
}

fn add_recipe(dir: &Path, name: &str, ingredients: &[&str], steps: &[&str]) {
    let mut cmd = pantry_cmd(dir);
    cmd.args(["recipe", "add", name]);
    for ingredient in ingredients {
        cmd.args(["-i", ingredient]);
    }
    for step in steps {
        cmd.args(["-s", step]);
    }
    cmd.assert().success();
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_structure() {
    let dir = TempDir::new().unwrap();

    pantry_cmd(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized pantry project"));

    assert!(dir.path().join(".pantry").is_dir());
    assert!(dir.path().join(".pantry/pantry.db").is_file());
    assert!(dir.path().join(".pantry/config.toml").is_file());
    assert!(dir.path().join(".pantry/.gitignore").is_file());
}

#[test]
fn test_init_is_idempotent() {
    let dir = TempDir::new().unwrap();

    pantry_cmd(dir.path()).arg("init").assert().success();
    pantry_cmd(dir.path()).arg("init").assert().success();

    let units = json_output(dir.path(), &["unit", "list"]);
    assert_eq!(units.as_array().unwrap().len(), 8);
}

#[test]
fn test_commands_require_project() {
    let dir = TempDir::new().unwrap();

    pantry_cmd(dir.path())
        .args(["kitchen", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not in a pantry project"));
}

// =============================================================================
// Unit Tests
// =============================================================================

#[test]
fn test_unit_list_groups_by_category() {
    let dir = setup_project();

    let output = pantry_cmd(dir.path()).args(["unit", "list"]).output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();

    let count = stdout.find("piece").unwrap();
    let volume = stdout.find("cup").unwrap();
    let weight = stdout.find("kilogram").unwrap();
    assert!(count < volume && volume < weight);
}

#[test]
fn test_unit_add_and_filter() {
    let dir = setup_project();

    pantry_cmd(dir.path())
        .args(["unit", "add", "minute", "min", "--category", "time"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created unit"));

    pantry_cmd(dir.path())
        .args(["unit", "list", "--category", "TIME"])
        .assert()
        .success()
        .stdout(predicate::str::contains("minute"))
        .stdout(predicate::str::contains("gram").not());
}

#[test]
fn test_unit_add_rejects_unknown_category() {
    let dir = setup_project();

    pantry_cmd(dir.path())
        .args(["unit", "add", "league", "lg", "--category", "distance"])
        .assert()
        .failure();
}

#[test]
fn test_unit_in_use_is_not_deleted() {
    let dir = setup_project();

    pantry_cmd(dir.path())
        .args(["kitchen", "add", "flour", "500", "g"])
        .assert()
        .success();

    pantry_cmd(dir.path())
        .args(["unit", "delete", "g"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("in use"));

    pantry_cmd(dir.path())
        .args(["kitchen", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("500 g"));

    pantry_cmd(dir.path())
        .args(["unit", "delete", "kg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted unit"));
}

#[test]
fn test_unit_show_reports_usage() {
    let dir = setup_project();

    pantry_cmd(dir.path())
        .args(["kitchen", "add", "eggs", "6", "pc"])
        .assert()
        .success();

    pantry_cmd(dir.path())
        .args(["unit", "show", "piece"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 kitchen item(s)"));
}

// =============================================================================
// Kitchen Tests
// =============================================================================

#[test]
fn test_kitchen_search_is_case_insensitive() {
    let dir = setup_project();

    pantry_cmd(dir.path())
        .args(["kitchen", "add", "Brown Sugar", "1", "kg"])
        .assert()
        .success();
    pantry_cmd(dir.path())
        .args(["kitchen", "add", "Flour", "2", "kg"])
        .assert()
        .success();

    pantry_cmd(dir.path())
        .args(["kitchen", "search", "SUGAR"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Brown Sugar"))
        .stdout(predicate::str::contains("Flour").not());
}

#[test]
fn test_kitchen_unparsable_quantity_becomes_zero() {
    let dir = setup_project();

    pantry_cmd(dir.path())
        .args(["kitchen", "add", "salt", "a pinch", "g"])
        .assert()
        .success();

    let items = json_output(dir.path(), &["kitchen", "list"]);
    assert_eq!(items[0]["quantity"], 0.0);
}

#[test]
fn test_kitchen_update_and_remove() {
    let dir = setup_project();

    pantry_cmd(dir.path())
        .args(["kitchen", "add", "milk", "1", "l"])
        .assert()
        .success();
    pantry_cmd(dir.path())
        .args(["kitchen", "update", "1", "--quantity", "0.5"])
        .assert()
        .success();

    pantry_cmd(dir.path())
        .args(["kitchen", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.5 l"));

    pantry_cmd(dir.path())
        .args(["kitchen", "remove", "1"])
        .assert()
        .success();
    pantry_cmd(dir.path())
        .args(["kitchen", "remove", "1"])
        .assert()
        .failure();
}

// =============================================================================
// Recipe Tests
// =============================================================================

#[test]
fn test_recipe_add_and_show() {
    let dir = setup_project();

    add_recipe(
        dir.path(),
        "Pancakes",
        &["flour,200,g", "milk,300,ml"],
        &["Whisk", "Fry"],
    );

    pantry_cmd(dir.path())
        .args(["recipe", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Name: Pancakes"))
        .stdout(predicate::str::contains("200 g flour"))
        .stdout(predicate::str::contains("1. Whisk"))
        .stdout(predicate::str::contains("2. Fry"));
}

#[test]
fn test_recipe_needs_ingredients_and_steps() {
    let dir = setup_project();

    pantry_cmd(dir.path())
        .args(["recipe", "add", "Air", "-s", "Breathe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one ingredient"));

    let recipes = json_output(dir.path(), &["recipe", "list"]);
    assert!(recipes.as_array().unwrap().is_empty());
}

#[test]
fn test_recipe_edit_renumbers_steps() {
    let dir = setup_project();

    add_recipe(
        dir.path(),
        "Bread",
        &["flour,500,g"],
        &["Mix", "Knead", "Rest", "Bake"],
    );

    pantry_cmd(dir.path())
        .args(["recipe", "edit", "1", "--remove-step", "2"])
        .assert()
        .success();

    let detail = json_output(dir.path(), &["recipe", "show", "1"]);
    let steps: Vec<(u64, String)> = detail["instructions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| {
            (
                s["step_number"].as_u64().unwrap(),
                s["instruction"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        steps,
        vec![
            (1, "Mix".to_string()),
            (2, "Rest".to_string()),
            (3, "Bake".to_string())
        ]
    );
}

#[test]
fn test_recipe_search_matches_name_or_author() {
    let dir = setup_project();

    add_recipe(dir.path(), "Chocolate cake", &["cocoa,50,g"], &["Bake"]);
    add_recipe(dir.path(), "Bread", &["flour,500,g"], &["Bake"]);
    pantry_cmd(dir.path())
        .args(["recipe", "add", "Brownies", "--author", "Choco Chef"])
        .args(["-i", "cocoa,80,g", "-s", "Bake"])
        .assert()
        .success();

    let found = json_output(dir.path(), &["recipe", "search", "choc"]);
    let names: Vec<&str> = found
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Chocolate cake", "Brownies"]);

    let all = json_output(dir.path(), &["recipe", "search"]);
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[test]
fn test_recipe_delete_cascades() {
    let dir = setup_project();

    add_recipe(dir.path(), "Soup", &["water,1,l"], &["Boil"]);

    pantry_cmd(dir.path())
        .args(["recipe", "delete", "1"])
        .assert()
        .success();
    pantry_cmd(dir.path())
        .args(["recipe", "show", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Recipe not found"));

    // The unit is free again once the ingredient is gone
    pantry_cmd(dir.path())
        .args(["unit", "delete", "l"])
        .assert()
        .success();
}

#[test]
fn test_recipe_suggest_ranks_by_kitchen() {
    let dir = setup_project();

    add_recipe(dir.path(), "Bread", &["flour,500,g", "yeast,7,g"], &["Bake"]);
    add_recipe(dir.path(), "Cookies", &["flour,200,g", "sugar,100,g"], &["Bake"]);
    pantry_cmd(dir.path())
        .args(["kitchen", "add", "Flour", "1", "kg"])
        .assert()
        .success();
    pantry_cmd(dir.path())
        .args(["kitchen", "add", "sugar", "1", "kg"])
        .assert()
        .success();

    let ranked = json_output(dir.path(), &["recipe", "suggest"]);
    let names: Vec<&str> = ranked
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Cookies", "Bread"]);
}

#[test]
fn test_recipe_to_new_list() {
    let dir = setup_project();

    add_recipe(dir.path(), "Pancakes", &["flour,200,g", "milk,300,ml"], &["Fry"]);

    pantry_cmd(dir.path())
        .args(["recipe", "to-list", "1", "--new", "Pancake run"])
        .assert()
        .success();

    let lists = json_output(dir.path(), &["grocery", "list"]);
    assert_eq!(lists[0]["name"], "Pancake run");
    assert_eq!(lists[0]["item_count"], 2);
}

#[test]
fn test_recipe_to_list_requires_target() {
    let dir = setup_project();

    add_recipe(dir.path(), "Pancakes", &["flour,200,g"], &["Fry"]);

    pantry_cmd(dir.path())
        .args(["recipe", "to-list", "1"])
        .assert()
        .failure();
}

// =============================================================================
// Grocery Tests
// =============================================================================

#[test]
fn test_grocery_items_keep_count() {
    let dir = setup_project();

    pantry_cmd(dir.path())
        .args(["grocery", "new", "Weekly"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created grocery list 1"));
    pantry_cmd(dir.path())
        .args(["grocery", "add", "1", "apples", "6", "pc"])
        .assert()
        .success();
    pantry_cmd(dir.path())
        .args(["grocery", "add", "1", "milk", "1", "l"])
        .assert()
        .success();

    let lists = json_output(dir.path(), &["grocery", "list"]);
    assert_eq!(lists[0]["item_count"], 2);

    pantry_cmd(dir.path())
        .args(["grocery", "remove", "1"])
        .assert()
        .success();

    let lists = json_output(dir.path(), &["grocery", "list"]);
    assert_eq!(lists[0]["item_count"], 1);
}

#[test]
fn test_grocery_check_and_show() {
    let dir = setup_project();

    pantry_cmd(dir.path())
        .args(["grocery", "new", "Weekly"])
        .assert()
        .success();
    pantry_cmd(dir.path())
        .args(["grocery", "add", "1", "bread", "1", "pc"])
        .assert()
        .success();
    pantry_cmd(dir.path())
        .args(["grocery", "check", "1"])
        .assert()
        .success();

    pantry_cmd(dir.path())
        .args(["grocery", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 checked"))
        .stdout(predicate::str::contains("[x]"));

    pantry_cmd(dir.path())
        .args(["grocery", "uncheck", "1"])
        .assert()
        .success();
    pantry_cmd(dir.path())
        .args(["grocery", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 checked"));
}

#[test]
fn test_grocery_move_and_delete() {
    let dir = setup_project();

    pantry_cmd(dir.path()).args(["grocery", "new", "A"]).assert().success();
    pantry_cmd(dir.path()).args(["grocery", "new", "B"]).assert().success();
    pantry_cmd(dir.path())
        .args(["grocery", "add", "1", "rice", "1", "kg"])
        .assert()
        .success();

    pantry_cmd(dir.path())
        .args(["grocery", "update", "1", "--list", "2"])
        .assert()
        .success();

    let lists = json_output(dir.path(), &["grocery", "list"]);
    assert_eq!(lists[0]["item_count"], 0);
    assert_eq!(lists[1]["item_count"], 1);

    pantry_cmd(dir.path())
        .args(["grocery", "delete", "2"])
        .assert()
        .success();
    pantry_cmd(dir.path())
        .args(["grocery", "check", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_grocery_rename_search_and_recount() {
    let dir = setup_project();

    pantry_cmd(dir.path()).args(["grocery", "new", "Weekly"]).assert().success();
    pantry_cmd(dir.path())
        .args(["grocery", "add", "1", "Green apples", "4", "pc"])
        .assert()
        .success();
    pantry_cmd(dir.path())
        .args(["grocery", "add", "1", "milk", "1", "l"])
        .assert()
        .success();

    pantry_cmd(dir.path())
        .args(["grocery", "rename", "1", "Saturday"])
        .assert()
        .success();

    pantry_cmd(dir.path())
        .args(["grocery", "search", "1", "APPLE"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Name: Saturday"))
        .stdout(predicate::str::contains("Green apples"))
        .stdout(predicate::str::contains("milk").not());

    pantry_cmd(dir.path())
        .args(["grocery", "recount"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Corrected 0"));
}

// =============================================================================
// Browse Tests
// =============================================================================

#[test]
fn test_browse_search_query() {
    let dir = setup_project();

    add_recipe(dir.path(), "Chocolate cake", &["cocoa,50,g"], &["Bake"]);
    add_recipe(dir.path(), "Bread", &["flour,500,g"], &["Bake"]);

    pantry_cmd(dir.path())
        .arg("browse")
        .write_stdin("c\nch\nchoc\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Recipes matching 'choc':"))
        .stdout(predicate::str::contains("Chocolate cake"));
}

#[test]
fn test_browse_suggest_mode() {
    let dir = setup_project();

    add_recipe(dir.path(), "Omelette", &["eggs,3,pc"], &["Fry"]);

    pantry_cmd(dir.path())
        .arg("browse")
        .write_stdin(":suggest\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Suggested recipes:"))
        .stdout(predicate::str::contains("Omelette"));
}

// =============================================================================
// Output Format Tests
// =============================================================================

#[test]
fn test_json_success_message() {
    let dir = setup_project();

    pantry_cmd(dir.path()).args(["grocery", "new", "Weekly"]).assert().success();

    let value = json_output(dir.path(), &["grocery", "rename", "1", "Saturday"]);
    assert_eq!(value["success"], true);
    assert_eq!(value["message"], "Renamed grocery list 1 to Saturday");
}
