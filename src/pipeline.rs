//! Transfer pipeline for ODK collections
//!
//! This module handles:
//! - Orchestration of the stages (Discovery → Conversion → Bundling → Hashing → Materialization)
//! - Fan-out of independent per-file work onto a bounded worker pool
//! - Collecting counts for the end-of-run summary
//!
//! Roots run one after another in configuration order. Within a root every
//! stage finishes before the next begins, and bundles are written one at a
//! time.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::bundle::{self, Bundle};
use crate::config::Settings;
use crate::convert::{FormConverter, ParsedForm};
use crate::discovery::{self, Walker};
use crate::error::{Result, TransferError};
use crate::materialize;
use crate::report::{Event, FileKind, Reporter, Tally};

/// Counts for one complete run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub roots: usize,
    pub forms: usize,
    pub bundles: usize,
    pub media: usize,
    pub files_written: usize,
    pub files_skipped: usize,
    pub warnings: usize,
    pub failures: usize,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.failures > 0
    }
}

/// Runs discovery, bundling and materialization over the configured roots
pub struct Pipeline<'a> {
    roots: &'a [PathBuf],
    destination: &'a Path,
    threads: usize,
    walker: Walker,
    converter: &'a dyn FormConverter,
    reporter: &'a dyn Reporter,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        settings: &'a Settings,
        converter: &'a dyn FormConverter,
        reporter: &'a dyn Reporter,
    ) -> Result<Self> {
        Ok(Self {
            roots: &settings.roots,
            destination: &settings.destination,
            threads: settings.threads,
            walker: Walker::new(&settings.exclude)?,
            converter,
            reporter,
        })
    }

    /// Process every root and report the completion marker.
    ///
    /// Only a worker pool that cannot be started is an error; failures inside
    /// the run are reported and counted in the summary.
    pub fn run(&self) -> Result<RunSummary> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .map_err(|e| TransferError::ThreadPoolFailed {
                reason: e.to_string(),
            })?;

        let tally = Tally::new(self.reporter);
        let mut summary = RunSummary::default();

        pool.install(|| {
            for root in self.roots {
                self.run_root(root, &tally, &mut summary);
                summary.roots += 1;
            }
        });

        summary.warnings = tally.warnings();
        summary.failures = tally.failures();
        self.reporter.report(Event::RunFinished(summary));

        Ok(summary)
    }

    fn run_root(&self, root: &Path, reporter: &dyn Reporter, summary: &mut RunSummary) {
        reporter.report(Event::RootStarted {
            root: root.to_path_buf(),
        });

        let (media, forms) = rayon::join(
            || discovery::discover_media(&self.walker, root, reporter),
            || discovery::discover_forms(&self.walker, root, reporter),
        );
        reporter.report(Event::DiscoveryFinished {
            root: root.to_path_buf(),
            kind: FileKind::Media,
            count: media.len(),
        });
        reporter.report(Event::DiscoveryFinished {
            root: root.to_path_buf(),
            kind: FileKind::Form,
            count: forms.len(),
        });

        let parsed = self.convert_forms(&forms, reporter);
        summary.forms += parsed.len();

        let mut bundles: Vec<Bundle> = parsed
            .into_iter()
            .map(|form| bundle::bundle_form(form, &media, reporter))
            .collect();

        bundle::hash_media(&mut bundles, reporter);

        for bundle in &mut bundles {
            let stats = materialize::materialize(bundle, self.destination, reporter);
            summary.files_written += stats.written;
            summary.files_skipped += stats.skipped;
            summary.media += bundle.media.len();
        }
        summary.bundles += bundles.len();

        reporter.report(Event::RootFinished {
            root: root.to_path_buf(),
            bundles: bundles.len(),
        });
    }

    /// Convert each discovered form independently, keeping discovery order
    fn convert_forms(&self, forms: &[PathBuf], reporter: &dyn Reporter) -> Vec<ParsedForm> {
        forms
            .par_iter()
            .map(|path| ParsedForm::load(path, self.converter))
            .collect::<Vec<_>>()
            .into_iter()
            .filter_map(|result| result.map_err(|e| reporter.fail(e)).ok())
            .collect()
    }
}
