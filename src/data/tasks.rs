//! Background Loading
//! Runs the three resource loads on independent threads and reports each
//! result over a channel, so one failure never blocks or blanks the others.

use crate::config::SourcesConfig;
use crate::data::{BoundaryCollection, DataLoader, DeathRecord, LoadedTable, LoaderError, UnemploymentRecord};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use tracing::error;

/// Result of one background load.
#[derive(Debug)]
pub enum LoadEvent {
    Deaths(Result<LoadedTable<DeathRecord>, LoaderError>),
    Unemployment(Result<LoadedTable<UnemploymentRecord>, LoaderError>),
    Boundaries(Result<BoundaryCollection, LoaderError>),
}

/// Load state of one dataset.
#[derive(Debug, Clone)]
pub enum Dataset<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Dataset<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Dataset::Loading)
    }
}

fn spawn_one<F>(name: &'static str, tx: Sender<LoadEvent>, load: F)
where
    F: FnOnce() -> LoadEvent + Send + 'static,
{
    thread::spawn(move || {
        let event = load();
        // The receiver is gone if the app closed mid-fetch; the result is dropped.
        if tx.send(event).is_err() {
            error!(dataset = name, "Load finished after the dashboard was closed");
        }
    });
}

/// Start all three loads. Exactly three events arrive on the receiver.
pub fn spawn_loads(loader: DataLoader, sources: &SourcesConfig) -> Receiver<LoadEvent> {
    let (tx, rx) = channel();

    let (l, location) = (loader.clone(), sources.deaths.clone());
    spawn_one("deaths", tx.clone(), move || {
        LoadEvent::Deaths(l.load_deaths(&location))
    });

    let (l, location) = (loader.clone(), sources.unemployment.clone());
    spawn_one("unemployment", tx.clone(), move || {
        LoadEvent::Unemployment(l.load_unemployment(&location))
    });

    let location = sources.boundaries.clone();
    spawn_one("boundaries", tx, move || {
        LoadEvent::Boundaries(loader.load_boundaries(&location))
    });

    rx
}
