//! Live change feed
//!
//! Keeps live views of the kitchen, recipes and grocery lists open and
//! prints a line whenever one of them changes, whether the write came from
//! this process or another `pantry` command.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;

use super::output::Output;
use crate::storage::{ExternalChangeWatcher, LiveView, Project, Table};

/// Lets view refreshes that belong to one burst of writes land first
const SETTLE: Duration = Duration::from_millis(100);

pub fn run(output: &Output, seconds: Option<u64>) -> Result<()> {
    let project = Project::open_current()?;
    let hub = project.database().hub().clone();

    let kitchen = project.inventory().watch_all()?;
    let recipes = project.recipes().watch_all()?;
    let lists = project.grocery().watch_all()?;

    let (tx, changes) = mpsc::channel();
    let tx = Mutex::new(tx);
    let _subscription = hub.subscribe(&Table::ALL, move |tables| {
        let _ = tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .send(tables.to_vec());
    });

    let _watcher = ExternalChangeWatcher::start(
        &project.pantry_dir(),
        hub,
        project.config().project.watch_debounce(),
    )?;

    let deadline = seconds.map(|s| Instant::now() + Duration::from_secs(s));
    if !output.is_json() {
        println!("Watching {} (Ctrl-C to stop)", project.pantry_dir().display());
    }
    report(output, "kitchen", kitchen.current().len());
    report(output, "recipes", recipes.current().len());
    report(output, "grocery_lists", lists.current().len());

    loop {
        let wait = match deadline {
            Some(at) => match at.checked_duration_since(Instant::now()) {
                Some(left) => left,
                None => break,
            },
            None => Duration::from_secs(3600),
        };

        match changes.recv_timeout(wait) {
            Ok(tables) => {
                output.verbose_ctx("watch", &format!("Changed: {:?}", tables));
                std::thread::sleep(SETTLE);
                while changes.try_recv().is_ok() {}

                report_update(output, "kitchen", &kitchen);
                report_update(output, "recipes", &recipes);
                report_update(output, "grocery_lists", &lists);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    Ok(())
}

fn report_update<T>(output: &Output, name: &str, view: &LiveView<Vec<T>>)
where
    T: Clone + Send + 'static,
{
    if let Some(latest) = view.try_next() {
        report(output, name, latest.len());
    }
}

fn report(output: &Output, name: &str, count: usize) {
    if output.is_json() {
        output.data(&serde_json::json!({ "view": name, "count": count }));
    } else {
        println!("{:<14} {}", name, count);
    }
}
