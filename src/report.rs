//! Run diagnostics
//!
//! Every stage reports what it did and what went wrong through a [`Reporter`]
//! handed to it by the pipeline, instead of logging through process-wide
//! state. The binary uses [`TracingReporter`]; tests capture events with
//! `MemoryReporter` and assert on them.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::TransferError;
use crate::pipeline::RunSummary;

/// Severity of an [`Event`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

/// What a discovery walk was looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Form,
    Media,
}

impl FileKind {
    fn label(self) -> &'static str {
        match self {
            FileKind::Form => "form",
            FileKind::Media => "media",
        }
    }
}

/// Something worth telling the operator about
#[derive(Debug)]
pub enum Event {
    RootStarted {
        root: PathBuf,
    },
    FileDiscovered {
        kind: FileKind,
        path: PathBuf,
    },
    DiscoveryFinished {
        root: PathBuf,
        kind: FileKind,
        count: usize,
    },
    MediaResolved {
        name: String,
        path: PathBuf,
    },
    /// Resolved, but only to a file outside the form's own directory
    MediaOutsideFormDirectory {
        name: String,
        found: PathBuf,
        form_directory: PathBuf,
    },
    MediaNotFound {
        name: String,
        form_directory: PathBuf,
    },
    BundleAssembled {
        form: PathBuf,
        media: usize,
    },
    FileCopied {
        source: PathBuf,
        destination: PathBuf,
    },
    FileWritten {
        destination: PathBuf,
    },
    /// An unhashed media file would land on a name another reference in the
    /// same bundle already took; it is not copied
    DestinationNameTaken {
        name: String,
        destination: PathBuf,
    },
    /// Destination already present; left untouched
    AlreadyExists {
        destination: PathBuf,
    },
    Failed(TransferError),
    RootFinished {
        root: PathBuf,
        bundles: usize,
    },
    RunFinished(RunSummary),
}

impl Event {
    pub fn level(&self) -> Level {
        match self {
            Event::FileDiscovered { .. }
            | Event::MediaResolved { .. }
            | Event::AlreadyExists { .. } => Level::Debug,
            Event::MediaOutsideFormDirectory { .. }
            | Event::MediaNotFound { .. }
            | Event::DestinationNameTaken { .. } => Level::Warn,
            Event::Failed(_) => Level::Error,
            _ => Level::Info,
        }
    }
}

/// Sink for run diagnostics
pub trait Reporter: Send + Sync {
    fn report(&self, event: Event);

    fn fail(&self, error: TransferError) {
        self.report(Event::Failed(error));
    }
}

/// Reporter that emits structured `tracing` events
#[derive(Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    #[allow(clippy::too_many_lines)]
    fn report(&self, event: Event) {
        match event {
            Event::RootStarted { root } => {
                tracing::info!(root = %root.display(), "scanning root directory");
            }
            Event::FileDiscovered { kind, path } => {
                tracing::debug!(kind = kind.label(), path = %path.display(), "found file");
            }
            Event::DiscoveryFinished { root, kind, count } => {
                tracing::info!(root = %root.display(), kind = kind.label(), count, "discovery finished");
            }
            Event::MediaResolved { name, path } => {
                tracing::debug!(name = %name, path = %path.display(), "resolved media reference");
            }
            Event::MediaOutsideFormDirectory {
                name,
                found,
                form_directory,
            } => {
                tracing::warn!(
                    name = %name,
                    found = %found.display(),
                    form_directory = %form_directory.display(),
                    "media file was found outside of the directory where its form lives"
                );
            }
            Event::MediaNotFound {
                name,
                form_directory,
            } => {
                tracing::warn!(
                    name = %name,
                    form_directory = %form_directory.display(),
                    "media file not found"
                );
            }
            Event::BundleAssembled { form, media } => {
                tracing::info!(form = %form.display(), media, "bundled form");
            }
            Event::FileCopied {
                source,
                destination,
            } => {
                tracing::info!(
                    source = %source.display(),
                    destination = %destination.display(),
                    "copied file"
                );
            }
            Event::FileWritten { destination } => {
                tracing::info!(destination = %destination.display(), "wrote file");
            }
            Event::DestinationNameTaken { name, destination } => {
                tracing::warn!(
                    name = %name,
                    destination = %destination.display(),
                    "media file not copied, another reference in this bundle already uses its name"
                );
            }
            Event::AlreadyExists { destination } => {
                tracing::debug!(destination = %destination.display(), "destination exists, skipping");
            }
            Event::Failed(error) => {
                tracing::error!(error = %error, "{}", error_code(&error));
            }
            Event::RootFinished { root, bundles } => {
                tracing::info!(root = %root.display(), bundles, "finished root directory");
            }
            Event::RunFinished(summary) => {
                tracing::info!(
                    roots = summary.roots,
                    forms = summary.forms,
                    bundles = summary.bundles,
                    media = summary.media,
                    written = summary.files_written,
                    skipped = summary.files_skipped,
                    warnings = summary.warnings,
                    failures = summary.failures,
                    "done"
                );
            }
        }
    }
}

fn error_code(error: &TransferError) -> String {
    use miette::Diagnostic;

    error
        .code()
        .map(|code| code.to_string())
        .unwrap_or_else(|| "error".to_string())
}

/// Forwards events while counting warnings and failures for the run summary
pub struct Tally<'a> {
    inner: &'a dyn Reporter,
    warnings: AtomicUsize,
    failures: AtomicUsize,
}

impl<'a> Tally<'a> {
    pub fn new(inner: &'a dyn Reporter) -> Self {
        Self {
            inner,
            warnings: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        }
    }

    pub fn warnings(&self) -> usize {
        self.warnings.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }
}

impl Reporter for Tally<'_> {
    fn report(&self, event: Event) {
        match event.level() {
            Level::Warn => {
                self.warnings.fetch_add(1, Ordering::Relaxed);
            }
            Level::Error => {
                self.failures.fetch_add(1, Ordering::Relaxed);
            }
            Level::Debug | Level::Info => {}
        }
        self.inner.report(event);
    }
}

/// Reporter that keeps every event in memory
#[cfg(test)]
#[derive(Default)]
pub struct MemoryReporter {
    events: std::sync::Mutex<Vec<Event>>,
}

#[cfg(test)]
impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded events matching `predicate`
    pub fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.events
            .lock()
            .map(|events| events.iter().filter(|e| predicate(e)).count())
            .unwrap_or(0)
    }

    pub fn take(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

#[cfg(test)]
impl Reporter for MemoryReporter {
    fn report(&self, event: Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
