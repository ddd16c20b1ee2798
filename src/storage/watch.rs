//! Picks up writes made by other processes
//!
//! Writes through this process's [`Database`](super::Database) notify the
//! [`ChangeHub`] directly. Another `pantry` process writing the same file
//! can't reach our hub, so this watches `.pantry/` and treats any change to
//! the database files as a change to every table.

use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, Debouncer};

use super::database::StoreResult;
use super::live::ChangeHub;
use super::project::DATABASE_FILE;

/// Forwards file system changes of the database to a [`ChangeHub`]
///
/// Stops watching when dropped.
pub struct ExternalChangeWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
}

impl ExternalChangeWatcher {
    pub fn start(pantry_dir: &Path, hub: ChangeHub, debounce: Duration) -> StoreResult<Self> {
        let (tx, rx) = mpsc::channel();
        let mut debouncer = new_debouncer(debounce, tx)?;

        debouncer
            .watcher()
            .watch(pantry_dir, RecursiveMode::NonRecursive)?;

        // Exits once the debouncer is dropped and the channel closes
        thread::spawn(move || {
            for result in rx {
                match result {
                    Ok(events) => {
                        let touched = events
                            .iter()
                            .filter(|e| is_database_path(&e.path))
                            .count();
                        if touched == 0 {
                            continue;
                        }
                        tracing::debug!(events = touched, "database changed externally");
                        hub.notify_all();
                    }
                    Err(error) => tracing::warn!(?error, "watch error"),
                }
            }
        });

        tracing::debug!(dir = %pantry_dir.display(), ?debounce, "watching for external changes");
        Ok(Self {
            _debouncer: debouncer,
        })
    }
}

/// The database file or one of its `-wal`/`-shm` companions
fn is_database_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(DATABASE_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Table;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn recognizes_database_files() {
        assert!(is_database_path(&PathBuf::from("/p/.pantry/pantry.db")));
        assert!(is_database_path(&PathBuf::from("/p/.pantry/pantry.db-wal")));
        assert!(!is_database_path(&PathBuf::from("/p/.pantry/config.toml")));
        assert!(!is_database_path(&PathBuf::from("/")));
    }

    #[test]
    fn database_write_notifies_hub() {
        let dir = TempDir::new().unwrap();
        let hub = ChangeHub::new();

        let (tx, rx) = mpsc::channel();
        let tx = std::sync::Mutex::new(tx);
        let _sub = hub.subscribe(&[Table::Recipes], move |_| {
            let _ = tx.lock().unwrap().send(());
        });

        let _watcher =
            ExternalChangeWatcher::start(dir.path(), hub.clone(), Duration::from_millis(50))
                .unwrap();

        fs::write(dir.path().join("config.toml"), "x").unwrap();
        fs::write(dir.path().join(DATABASE_FILE), "x").unwrap();

        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }
}
