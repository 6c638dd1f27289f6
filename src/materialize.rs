//! Writing bundles to the destination tree
//!
//! Each bundle becomes `<destination>/<form-stem>/` holding the rewritten
//! form as `<form-stem>.json`, a copy of the original form file and every
//! resolved media file under its content-addressed name.
//!
//! The destination is append-only: nothing is ever overwritten, so an
//! existing file is skipped and a re-run over the same roots changes nothing.
//! A file left incomplete by a failed copy is removed again so the next run
//! can retry it.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::bundle::Bundle;
use crate::error::{TransferError, file_read_error, file_write_error};
use crate::path_utils::file_stem_lossy;
use crate::report::{Event, Reporter};

/// What happened to one destination file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Written,
    Skipped,
    Failed,
}

/// Per-bundle file counts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MaterializeStats {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl MaterializeStats {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Written => self.written += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed => self.failed += 1,
        }
    }
}

/// Create `path` only if nothing exists there yet
fn create_new(path: &Path) -> io::Result<Option<File>> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(e),
    }
}

/// Copy `source` to `destination` unless the destination already exists
pub fn copy_if_absent(source: &Path, destination: &Path, reporter: &dyn Reporter) -> Outcome {
    let copy_error = |reason: String| TransferError::CopyFailed {
        source_path: source.display().to_string(),
        destination: destination.display().to_string(),
        reason,
    };

    let mut input = match File::open(source) {
        Ok(file) => file,
        Err(e) => {
            reporter.fail(copy_error(file_read_error(source, e).to_string()));
            return Outcome::Failed;
        }
    };

    let mut output = match create_new(destination) {
        Ok(Some(file)) => file,
        Ok(None) => {
            reporter.report(Event::AlreadyExists {
                destination: destination.to_path_buf(),
            });
            return Outcome::Skipped;
        }
        Err(e) => {
            reporter.fail(copy_error(e.to_string()));
            return Outcome::Failed;
        }
    };

    if let Err(e) = io::copy(&mut input, &mut output).and_then(|_| output.flush()) {
        drop(output);
        let _ = fs::remove_file(destination);
        reporter.fail(copy_error(e.to_string()));
        return Outcome::Failed;
    }

    reporter.report(Event::FileCopied {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
    });
    Outcome::Written
}

/// Write `contents` to `destination` unless the destination already exists
pub fn write_if_absent(contents: &[u8], destination: &Path, reporter: &dyn Reporter) -> Outcome {
    let mut output = match create_new(destination) {
        Ok(Some(file)) => file,
        Ok(None) => {
            reporter.report(Event::AlreadyExists {
                destination: destination.to_path_buf(),
            });
            return Outcome::Skipped;
        }
        Err(e) => {
            reporter.fail(file_write_error(destination, e));
            return Outcome::Failed;
        }
    };

    if let Err(e) = output.write_all(contents).and_then(|()| output.flush()) {
        drop(output);
        let _ = fs::remove_file(destination);
        reporter.fail(file_write_error(destination, e));
        return Outcome::Failed;
    }

    reporter.report(Event::FileWritten {
        destination: destination.to_path_buf(),
    });
    Outcome::Written
}

/// Point the form's media references at their content-addressed names.
///
/// Only scalars exactly equal to a hashed entry's referenced name change.
/// Returns the number of scalars rewritten.
pub fn rewrite_references(bundle: &mut Bundle) -> usize {
    let renames: Vec<(String, String)> = bundle
        .media
        .iter()
        .filter_map(|media| Some((media.name.clone(), media.hashed_name()?)))
        .collect();

    if renames.is_empty() {
        return 0;
    }

    bundle.form.document_mut().rewrite_scalars(|value| {
        renames
            .iter()
            .find(|(name, _)| name == value)
            .map(|(_, hashed)| hashed.clone())
    })
}

/// Write one bundle under `destination`.
///
/// Steps run in order: rewrite, create the bundle directory, write the JSON,
/// copy the original form, copy the media. A failing file is reported and the
/// remaining files still run; only a missing bundle directory ends the bundle
/// early, since nothing after it could be written.
pub fn materialize(
    bundle: &mut Bundle,
    destination: &Path,
    reporter: &dyn Reporter,
) -> MaterializeStats {
    let mut stats = MaterializeStats::default();

    rewrite_references(bundle);

    let source = bundle.form.source().to_path_buf();
    let form_name = file_stem_lossy(&source);
    let bundle_dir = destination.join(&form_name);

    if let Err(e) = fs::create_dir_all(&bundle_dir) {
        reporter.fail(TransferError::DirectoryCreateFailed {
            path: bundle_dir.display().to_string(),
            reason: e.to_string(),
        });
        stats.record(Outcome::Failed);
        return stats;
    }

    let json_path = bundle_dir.join(format!("{form_name}.json"));
    match serde_json::to_vec_pretty(bundle.form.document()) {
        Ok(json) => stats.record(write_if_absent(&json, &json_path, reporter)),
        Err(e) => {
            reporter.fail(TransferError::JsonSerializeFailed {
                path: json_path.display().to_string(),
                reason: e.to_string(),
            });
            stats.record(Outcome::Failed);
        }
    }

    if let Some(file_name) = source.file_name() {
        stats.record(copy_if_absent(&source, &bundle_dir.join(file_name), reporter));
    }

    let mut taken = HashSet::new();
    for media in &bundle.media {
        let target = bundle_dir.join(media.destination_name());
        // Equal digests mean equal content
        if !taken.insert(target.clone()) && media.digest.is_none() {
            reporter.report(Event::DestinationNameTaken {
                name: media.name.clone(),
                destination: target,
            });
            stats.record(Outcome::Skipped);
            continue;
        }
        stats.record(copy_if_absent(&media.path, &target, reporter));
    }

    stats
}
