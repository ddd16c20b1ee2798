//! Line-driven recipe browser
//!
//! Reads queries from stdin, one per line, and prints the recipe list each
//! time a fresh result arrives. Typed queries are debounced like a search
//! box; `:suggest` and `:clear` switch modes immediately.

use std::io::{self, BufRead};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::Result;

use super::output::Output;
use super::recipe::print_recipes;
use crate::domain::{QueryMode, Recipe, RecipeQuery};
use crate::engine::RecipeFeed;
use crate::storage::Project;

const POLL: Duration = Duration::from_millis(50);

/// Longest wait for the last query's result after input ends
const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

enum Input {
    Suggest,
    Clear,
    Query(String),
}

fn parse_line(line: &str) -> Input {
    match line.trim() {
        ":suggest" => Input::Suggest,
        ":clear" => Input::Clear,
        _ => Input::Query(line.to_string()),
    }
}

pub fn run(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let quiet = project.config().project.search_debounce();
    let mut feed = RecipeFeed::new(project.database(), quiet);

    let (tx, lines) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    loop {
        match lines.recv_timeout(POLL) {
            Ok(line) => {
                output.verbose_ctx("browse", &format!("Input: {}", line));
                match parse_line(&line) {
                    Input::Suggest => feed.suggest(),
                    Input::Clear => feed.clear_suggestions(),
                    Input::Query(text) => feed.set_query(&text),
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(result) = feed.latest_results() {
            print_results(output, feed.query(), &result?);
        }
    }

    if let Some(result) = feed.settled_results(SETTLE_TIMEOUT) {
        print_results(output, feed.query(), &result?);
    }
    Ok(())
}

fn print_results(output: &Output, query: &RecipeQuery, recipes: &[Recipe]) {
    if output.is_json() {
        output.data(&serde_json::json!({
            "mode": query.mode(),
            "query": query.text(),
            "recipes": recipes,
        }));
        return;
    }

    match query.mode() {
        QueryMode::Suggesting => println!("Suggested recipes:"),
        QueryMode::Search if query.text().trim().is_empty() => println!("All recipes:"),
        QueryMode::Search => println!("Recipes matching '{}':", query.text()),
    }

    if recipes.is_empty() {
        println!("  (none)");
    } else {
        print_recipes(recipes);
    }
    println!();
}
