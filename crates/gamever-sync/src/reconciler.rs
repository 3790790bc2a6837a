use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use gamever_core::{ConfigStore, GameverError, Result};
use gamever_installer::VersionStore;
use tracing::{debug, info, warn};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub selected: String,
    pub installed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionDecision {
    Keep,
    Select(String),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Unchanged,
    Selected { previous: String, selected: String },
    Cleared { previous: String },
}

/// Decides how the selection pointer must change for the given installed set.
///
/// A still-valid selection is never overridden. Otherwise the lexicographically last
/// installed name wins, or the pointer is cleared when nothing is installed.
pub fn resolve_selection(current: &str, installed: &[String]) -> SelectionDecision {
    if installed.iter().any(|name| name == current) {
        return SelectionDecision::Keep;
    }
    match installed.iter().max() {
        Some(last) => SelectionDecision::Select(last.clone()),
        None if current.is_empty() => SelectionDecision::Keep,
        None => SelectionDecision::Clear,
    }
}

/// One reconciliation tick: read config and store, persist a correction if needed.
///
/// The correction is conditional on the selection still holding the value this tick judged
/// invalid. A choice written concurrently by another caller wins and is reported unchanged.
pub fn reconcile_selection(config: &ConfigStore) -> Result<(TickOutcome, SelectionSnapshot)> {
    let current = config.load()?;
    let installed = VersionStore::new(&current.download_dir).installed_names()?;
    let previous = current.selected_version;

    let (outcome, selected) = match resolve_selection(&previous, &installed) {
        SelectionDecision::Keep => (TickOutcome::Unchanged, previous),
        SelectionDecision::Select(name) => {
            if config.replace_selected_version(&previous, &name)? {
                (
                    TickOutcome::Selected {
                        previous,
                        selected: name.clone(),
                    },
                    name,
                )
            } else {
                superseded(config, &previous)?
            }
        }
        SelectionDecision::Clear => {
            if config.replace_selected_version(&previous, "")? {
                (TickOutcome::Cleared { previous }, String::new())
            } else {
                superseded(config, &previous)?
            }
        }
    };

    Ok((
        outcome,
        SelectionSnapshot {
            selected,
            installed,
        },
    ))
}

fn superseded(config: &ConfigStore, stale: &str) -> Result<(TickOutcome, String)> {
    let selected = config.selected_version()?;
    debug!(%stale, %selected, "selection changed during tick; correction skipped");
    Ok((TickOutcome::Unchanged, selected))
}

/// Receives the resolved selection whenever it differs from the last one published.
pub trait SelectionObserver: Send {
    fn selection_changed(&mut self, snapshot: &SelectionSnapshot);
}

impl<F> SelectionObserver for F
where
    F: FnMut(&SelectionSnapshot) + Send,
{
    fn selection_changed(&mut self, snapshot: &SelectionSnapshot) {
        self(snapshot)
    }
}

#[derive(Debug, Clone)]
pub struct SelectionReconciler {
    config: ConfigStore,
    interval: Duration,
}

impl SelectionReconciler {
    pub fn new(config: ConfigStore) -> Self {
        Self {
            config,
            interval: DEFAULT_TICK_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Starts the background loop. The first tick runs immediately.
    pub fn spawn<O>(self, observer: O) -> Result<ReconcilerHandle>
    where
        O: SelectionObserver + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let thread = thread::Builder::new()
            .name("selection-reconciler".to_string())
            .spawn(move || self.run(observer, stop_rx))
            .map_err(|source| GameverError::Io {
                operation: "spawn selection reconciler",
                path: PathBuf::from("selection-reconciler"),
                source,
            })?;

        Ok(ReconcilerHandle {
            stop_tx: Some(stop_tx),
            thread: Some(thread),
        })
    }

    fn run<O: SelectionObserver>(self, mut observer: O, stop_rx: mpsc::Receiver<()>) {
        info!(interval = ?self.interval, "selection reconciler started");
        let mut last_published: Option<SelectionSnapshot> = None;

        loop {
            match reconcile_selection(&self.config) {
                Ok((outcome, snapshot)) => {
                    match &outcome {
                        TickOutcome::Unchanged => {}
                        TickOutcome::Selected { previous, selected } => info!(
                            %previous,
                            %selected,
                            "selected version not installed; switched"
                        ),
                        TickOutcome::Cleared { previous } => {
                            info!(%previous, "no versions installed; cleared selection");
                        }
                    }
                    if last_published.as_ref() != Some(&snapshot) {
                        observer.selection_changed(&snapshot);
                        last_published = Some(snapshot);
                    }
                }
                Err(err) => warn!(error = %err, "selection reconciliation tick failed"),
            }

            match stop_rx.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!("selection reconciler stopped");
    }
}

/// Owner of the running reconciler thread. Stopping joins the thread.
#[derive(Debug)]
pub struct ReconcilerHandle {
    stop_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl ReconcilerHandle {
    pub fn stop(mut self) {
        self.shutdown();
    }

    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("selection reconciler thread panicked");
            }
        }
    }
}

impl Drop for ReconcilerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
