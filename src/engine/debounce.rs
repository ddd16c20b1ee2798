//! Debounced, superseding evaluation
//!
//! A [`Debouncer`] owns a worker thread that evaluates the latest query once
//! it has been stable for the quiet period. Every new query bumps a
//! generation counter; an evaluation whose generation is older than the
//! current one is dropped, both by the worker and by the reader, so only the
//! newest query's result is ever delivered.

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::storage::StoreResult;

/// Default quiet period for search input
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

enum Command<Q> {
    /// New query and its generation; wait for the quiet period
    Set(Q, u64),
    /// New query and its generation; evaluate right away
    SetNow(Q, u64),
    /// Data changed; re-run the current query
    Refresh,
    Shutdown,
}

/// One delivered result
#[derive(Debug)]
pub struct Evaluation<R> {
    pub generation: u64,
    pub outcome: StoreResult<R>,
}

/// Sends refresh requests from other threads, e.g. change observers
pub struct RefreshHandle<Q> {
    commands: Mutex<Sender<Command<Q>>>,
}

impl<Q> RefreshHandle<Q> {
    pub fn refresh(&self) {
        let commands = self.commands.lock().unwrap_or_else(PoisonError::into_inner);
        // Worker already gone means nobody is reading either
        let _ = commands.send(Command::Refresh);
    }
}

pub struct Debouncer<Q, R> {
    commands: Sender<Command<Q>>,
    results: Receiver<Evaluation<R>>,
    generation: Arc<AtomicU64>,
    delivered: Cell<u64>,
    worker: Option<JoinHandle<()>>,
}

impl<Q, R> Debouncer<Q, R>
where
    Q: Send + 'static,
    R: Send + 'static,
{
    /// Starts the worker with `initial` as the current query
    ///
    /// Nothing is evaluated until a query is set or a refresh is requested.
    pub fn new<F>(quiet: Duration, initial: Q, evaluate: F) -> Self
    where
        F: FnMut(&Q) -> StoreResult<R> + Send + 'static,
    {
        let (commands, inbox) = mpsc::channel();
        let (outbox, results) = mpsc::channel();
        let generation = Arc::new(AtomicU64::new(0));

        let worker = Worker {
            quiet,
            current: initial,
            current_generation: 0,
            evaluate,
            generation: Arc::clone(&generation),
            outbox,
        };
        let handle = thread::spawn(move || worker.run(inbox));

        Self {
            commands,
            results,
            generation,
            delivered: Cell::new(0),
            worker: Some(handle),
        }
    }

    /// Replaces the query; evaluated after the quiet period
    pub fn set(&self, query: Q) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.send(Command::Set(query, generation));
    }

    /// Replaces the query and evaluates it without waiting
    pub fn set_now(&self, query: Q) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.send(Command::SetNow(query, generation));
    }

    /// Re-evaluates the current query
    pub fn refresh(&self) {
        self.send(Command::Refresh);
    }

    pub fn refresh_handle(&self) -> RefreshHandle<Q> {
        RefreshHandle {
            commands: Mutex::new(self.commands.clone()),
        }
    }

    /// Generation of the most recently set query
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// True once the current query's result has been handed out
    pub fn is_settled(&self) -> bool {
        self.delivered.get() == self.generation()
    }

    /// Waits up to `timeout` for the next current result
    pub fn next(&self, timeout: Duration) -> Option<Evaluation<R>> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let evaluation = self.results.recv_timeout(remaining).ok()?;
            if let Some(evaluation) = self.accept(evaluation) {
                return Some(evaluation);
            }
        }
    }

    /// Newest current result already waiting, if any
    pub fn latest(&self) -> Option<Evaluation<R>> {
        let mut newest = None;
        while let Ok(evaluation) = self.results.try_recv() {
            if let Some(evaluation) = self.accept(evaluation) {
                newest = Some(evaluation);
            }
        }
        newest
    }

    /// Waits up to `timeout` for the result of the current query
    ///
    /// Returns `None` if it was already delivered or doesn't arrive in time.
    pub fn wait_settled(&self, timeout: Duration) -> Option<Evaluation<R>> {
        let deadline = Instant::now() + timeout;
        while !self.is_settled() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let evaluation = self.next(remaining)?;
            if evaluation.generation == self.generation() {
                return Some(evaluation);
            }
        }
        None
    }

    fn accept(&self, evaluation: Evaluation<R>) -> Option<Evaluation<R>> {
        if evaluation.generation < self.generation() {
            tracing::trace!(generation = evaluation.generation, "dropped stale result");
            return None;
        }
        self.delivered.set(evaluation.generation);
        Some(evaluation)
    }

    fn send(&self, command: Command<Q>) {
        if self.commands.send(command).is_err() {
            tracing::warn!("debounce worker stopped");
        }
    }
}

impl<Q, R> Drop for Debouncer<Q, R> {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

struct Worker<Q, R, F> {
    quiet: Duration,
    current: Q,
    /// Generation `current` was submitted with
    current_generation: u64,
    evaluate: F,
    generation: Arc<AtomicU64>,
    outbox: Sender<Evaluation<R>>,
}

impl<Q, R, F> Worker<Q, R, F>
where
    F: FnMut(&Q) -> StoreResult<R>,
{
    fn run(mut self, inbox: Receiver<Command<Q>>) {
        let mut deadline: Option<Instant> = None;

        loop {
            let command = match deadline {
                Some(at) => {
                    let wait = at.saturating_duration_since(Instant::now());
                    match inbox.recv_timeout(wait) {
                        Ok(command) => command,
                        Err(RecvTimeoutError::Timeout) => {
                            deadline = None;
                            self.evaluate_current();
                            continue;
                        }
                        Err(RecvTimeoutError::Disconnected) => return,
                    }
                }
                None => match inbox.recv() {
                    Ok(command) => command,
                    Err(_) => return,
                },
            };

            match command {
                Command::Set(query, generation) => {
                    self.current = query;
                    self.current_generation = generation;
                    deadline = Some(Instant::now() + self.quiet);
                }
                Command::SetNow(query, generation) => {
                    self.current = query;
                    self.current_generation = generation;
                    deadline = None;
                    self.evaluate_current();
                }
                // A pending query will read fresh data when it fires
                Command::Refresh if deadline.is_some() => {}
                Command::Refresh => self.evaluate_current(),
                Command::Shutdown => return,
            }
        }
    }

    fn evaluate_current(&mut self) {
        // Tagged with the generation `current` arrived with
        let generation = self.current_generation;
        let outcome = (self.evaluate)(&self.current);

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::trace!(generation, "superseded while evaluating");
            return;
        }
        let _ = self.outbox.send(Evaluation {
            generation,
            outcome,
        });
    }
}
