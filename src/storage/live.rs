//! Change notifications and live views
//!
//! Every committed write tells the [`ChangeHub`] which tables it touched.
//! Observers registered for any of those tables are called after the
//! commit. A [`LiveView`] is an observer that re-runs its query and pushes
//! the fresh result to its reader, so the reader never has to poll.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use super::database::StoreError;

/// Logical tables a write can touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Units,
    KitchenItems,
    Recipes,
    Ingredients,
    Instructions,
    GroceryLists,
    GroceryItems,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::Units,
        Table::KitchenItems,
        Table::Recipes,
        Table::Ingredients,
        Table::Instructions,
        Table::GroceryLists,
        Table::GroceryItems,
    ];
}

/// Locks a mutex, recovering the data if a previous holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

type Callback = Arc<dyn Fn(&[Table]) + Send + Sync>;

struct Observer {
    id: u64,
    tables: Vec<Table>,
    callback: Callback,
}

#[derive(Default)]
struct HubInner {
    next_id: AtomicU64,
    observers: Mutex<Vec<Observer>>,
}

/// Fan-out point for table change notifications
#[derive(Clone, Default)]
pub struct ChangeHub {
    inner: Arc<HubInner>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for changes to any of `tables`
    ///
    /// The callback stays registered until the returned [`Subscription`]
    /// is dropped.
    pub fn subscribe<F>(&self, tables: &[Table], callback: F) -> Subscription
    where
        F: Fn(&[Table]) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.observers).push(Observer {
            id,
            tables: tables.to_vec(),
            callback: Arc::new(callback),
        });

        Subscription {
            hub: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Calls every observer interested in `changed`
    pub fn notify(&self, changed: &[Table]) {
        // Collect first so callbacks run without the observer lock held
        let targets: Vec<Callback> = lock(&self.inner.observers)
            .iter()
            .filter(|o| o.tables.iter().any(|t| changed.contains(t)))
            .map(|o| Arc::clone(&o.callback))
            .collect();

        for callback in targets {
            callback(changed);
        }
    }

    /// Treats every table as changed
    pub fn notify_all(&self) {
        self.notify(&Table::ALL);
    }

    pub fn observer_count(&self) -> usize {
        lock(&self.inner.observers).len()
    }
}

/// Keeps an observer registered; dropping it unregisters
pub struct Subscription {
    hub: Weak<HubInner>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            lock(&hub.observers).retain(|o| o.id != self.id);
        }
    }
}

/// A query result that follows the data
///
/// Holds the latest snapshot and receives a new one after every write to
/// the tables the query reads.
pub struct LiveView<T> {
    latest: Arc<Mutex<T>>,
    updates: Receiver<T>,
    _subscription: Subscription,
}

impl<T> LiveView<T>
where
    T: Clone + Send + 'static,
{
    /// Starts observing `tables`, beginning from `initial`
    ///
    /// Callers must make sure no write can commit between computing
    /// `initial` and this call; the database does so by holding its
    /// connection lock across both.
    pub(crate) fn start<F>(hub: &ChangeHub, tables: &[Table], initial: T, refresh: F) -> Self
    where
        F: Fn() -> Result<T, StoreError> + Send + Sync + 'static,
    {
        let latest = Arc::new(Mutex::new(initial));
        let (tx, updates) = mpsc::channel::<T>();

        let shared = Arc::clone(&latest);
        let tx = Mutex::new(tx);
        let subscription = hub.subscribe(tables, move |_| match refresh() {
            Ok(value) => {
                *lock(&shared) = value.clone();
                publish(&tx, value);
            }
            Err(e) => tracing::warn!(error = %e, "live view refresh failed"),
        });

        Self {
            latest,
            updates,
            _subscription: subscription,
        }
    }

    /// Latest snapshot
    pub fn current(&self) -> T {
        lock(&self.latest).clone()
    }

    /// Waits up to `timeout` for the next pushed snapshot
    pub fn next_update(&self, timeout: Duration) -> Option<T> {
        self.updates.recv_timeout(timeout).ok()
    }

    /// Returns the newest pushed snapshot, if any arrived since the last call
    pub fn try_next(&self) -> Option<T> {
        self.updates.try_iter().last()
    }
}

fn publish<T>(tx: &Mutex<Sender<T>>, value: T) {
    // The reader may already be gone; its subscription drops with it
    let _ = lock(tx).send(value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn notify_reaches_matching_observers_only() {
        let hub = ChangeHub::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let _sub = hub.subscribe(&[Table::Recipes], move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        hub.notify(&[Table::Units]);
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        hub.notify(&[Table::Units, Table::Recipes]);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        hub.notify_all();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let hub = ChangeHub::new();
        let sub = hub.subscribe(&[Table::Units], |_| {});
        assert_eq!(hub.observer_count(), 1);

        drop(sub);
        assert_eq!(hub.observer_count(), 0);
    }

    #[test]
    fn live_view_pushes_fresh_snapshots() {
        let hub = ChangeHub::new();
        let source = Arc::new(AtomicUsize::new(1));

        let reader = Arc::clone(&source);
        let view = LiveView::start(&hub, &[Table::KitchenItems], 1, move || {
            Ok(reader.load(Ordering::SeqCst))
        });
        assert_eq!(view.current(), 1);

        source.store(5, Ordering::SeqCst);
        hub.notify(&[Table::KitchenItems]);

        assert_eq!(view.next_update(Duration::from_secs(1)), Some(5));
        assert_eq!(view.current(), 5);
        assert_eq!(view.try_next(), None);
    }

    #[test]
    fn dropped_view_stops_observing() {
        let hub = ChangeHub::new();
        let view = LiveView::start(&hub, &[Table::Units], 0u8, || Ok(0u8));
        assert_eq!(hub.observer_count(), 1);

        drop(view);
        assert_eq!(hub.observer_count(), 0);
        hub.notify_all();
    }
}
