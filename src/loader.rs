//! Background preference loading
//!
//! Parsing and store I/O are blocking, so a load runs on a spawned thread
//! and delivers exactly one success-or-failure result over a channel. The
//! whole pipeline (parse, resolve resources, read store values) is one
//! serial unit of work per load.
//!
//! Overlapping loads are handled with a generation counter: the loader
//! stamps each spawn, and the consumer drops any result whose handle is no
//! longer current instead of letting a slow old load overwrite a newer one.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use thiserror::Error;
use tracing::{error, info};

use crate::group::PreferenceGroup;
use crate::resources::Resources;
use crate::schema::{self, ParseError};
use crate::store::PrefStore;

/// Why a load produced no usable collection
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The document parsed but produced no usable items; distinct from a
    /// populated collection so the caller can surface it instead of
    /// rendering nothing silently.
    #[error("loaded preferences are empty - check your definitions file")]
    EmptyDefinitions,
}

/// One in-flight (or finished) load
///
/// The store travels through the load so values can be read off-thread, and
/// comes back with the result for the caller's later saves.
pub struct LoadHandle<S> {
    generation: u64,
    rx: Receiver<Result<(PreferenceGroup, S), LoadError>>,
}

impl<S> LoadHandle<S> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Non-blocking poll; None while the load is still running
    pub fn try_result(&self) -> Option<Result<(PreferenceGroup, S), LoadError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(LoadError::EmptyDefinitions)),
        }
    }

    /// Block until the single result arrives
    pub fn wait(self) -> Result<(PreferenceGroup, S), LoadError> {
        self.rx.recv().unwrap_or(Err(LoadError::EmptyDefinitions))
    }
}

/// Spawns loads and tracks which one is current
#[derive(Debug, Default)]
pub struct PreferenceLoader {
    generation: u64,
}

impl PreferenceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `handle` belongs to the most recent spawn; stale results
    /// should be discarded without touching the displayed collection.
    pub fn is_current<S>(&self, handle: &LoadHandle<S>) -> bool {
        handle.generation == self.generation
    }

    /// Start a load on a background thread.
    ///
    /// `open_store` maps the parsed document's namespace to a store handle,
    /// so the store is opened with the name the document declares rather
    /// than one guessed up front.
    pub fn spawn<R, S, F>(&mut self, document: String, resources: R, open_store: F) -> LoadHandle<S>
    where
        R: Resources + Send + 'static,
        S: PrefStore + Send + 'static,
        F: FnOnce(&str) -> S + Send + 'static,
    {
        self.generation += 1;
        let generation = self.generation;
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = run_load(&document, &resources, open_store);
            if let Err(e) = &result {
                error!(generation = generation, error = %e, "Preference load failed");
            }
            // Receiver may already be gone if the caller dropped the handle
            let _ = tx.send(result);
        });

        LoadHandle { generation, rx }
    }
}

fn run_load<S, F>(
    document: &str,
    resources: &dyn Resources,
    open_store: F,
) -> Result<(PreferenceGroup, S), LoadError>
where
    S: PrefStore,
    F: FnOnce(&str) -> S,
{
    let mut group = schema::parse(document, resources)?;
    if group.is_empty() {
        return Err(LoadError::EmptyDefinitions);
    }

    let mut store = open_store(group.namespace());
    if group.preinit {
        group.pre_init(&mut store);
    }
    group.load(&store);
    info!(
        namespace = %group.namespace(),
        entries = group.len(),
        "Loaded preference collection"
    );
    Ok((group, store))
}
