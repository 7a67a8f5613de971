//! Bulk package loading on a background thread.

use std::thread::JoinHandle;

use crossbeam_channel::Receiver;
use tracing::{error, info};

use crate::manager::PackageManager;
use crate::{Error, Result};

/// Progress of a bulk load. The final message has an empty package name and
/// a fraction of 1.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadProgress {
    pub package: String,
    pub fraction: f64,
}

/// Outcome of a bulk load.
#[derive(Debug, Default)]
pub struct LoadSummary {
    /// Packages loaded by this run.
    pub loaded: Vec<String>,
    /// Packages that were already loaded.
    pub skipped: Vec<String>,
    /// Packages that failed, with the error that stopped them.
    pub failed: Vec<(String, Error)>,
}

impl LoadSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A running bulk load.
#[derive(Debug)]
pub struct LoadTask {
    progress: Receiver<LoadProgress>,
    worker: JoinHandle<LoadSummary>,
}

impl LoadTask {
    pub(crate) fn new(progress: Receiver<LoadProgress>, worker: JoinHandle<LoadSummary>) -> Self {
        Self { progress, worker }
    }

    /// Progress messages. The channel closes when the worker finishes.
    pub fn progress(&self) -> &Receiver<LoadProgress> {
        &self.progress
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Wait for the worker and return its summary.
    pub fn wait(self) -> Result<LoadSummary> {
        self.worker.join().map_err(|_| Error::WorkerPanicked)
    }
}

/// Load `names` in order, reporting progress through `report`.
///
/// Package `i` of `n` covers the fraction range `i/n .. (i+1)/n`.
pub(crate) fn load_all(
    manager: &PackageManager,
    names: &[String],
    report: &mut dyn FnMut(LoadProgress),
) -> LoadSummary {
    let mut summary = LoadSummary::default();
    let count = names.len().max(1) as f64;

    for (i, name) in names.iter().enumerate() {
        let from = i as f64 / count;
        let to = (i + 1) as f64 / count;
        report(LoadProgress {
            package: name.clone(),
            fraction: from,
        });

        if manager.is_loaded(name) {
            summary.skipped.push(name.clone());
            continue;
        }

        let result = manager.load_package_with_progress(name, |fraction| {
            report(LoadProgress {
                package: name.clone(),
                fraction: from + (to - from) * fraction,
            })
        });
        match result {
            Ok(_) => summary.loaded.push(name.clone()),
            Err(err) => {
                error!(package = %name, error = %err, "failed to load package");
                summary.failed.push((name.clone(), err));
            }
        }
    }

    report(LoadProgress {
        package: String::new(),
        fraction: 1.0,
    });
    info!(
        loaded = summary.loaded.len(),
        skipped = summary.skipped.len(),
        failed = summary.failed.len(),
        "bulk load finished"
    );
    summary
}
