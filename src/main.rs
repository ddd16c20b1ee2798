//! Pantry - recipes, kitchen inventory and grocery lists

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = pantry_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
