//! Resolution of referenced filenames to discovered media paths
//!
//! A form stores media by bare filename, and the same name can exist in many
//! directories of a collection. Resolution is best-effort and never an error:
//!
//! 1. candidates are the discovered paths whose basename ends with the
//!    reference (case-insensitive)
//! 2. a candidate in the form's own directory wins
//! 3. otherwise the first candidate in discovery order is used, with a
//!    warning. Discovery order is file-name order per directory, so the pick
//!    is reproducible but not necessarily the right file.
//! 4. no candidate: warning, and the reference is dropped

use std::path::{Path, PathBuf};

use super::MediaFile;
use crate::path_utils::{is_in_directory, matches_suffix};
use crate::report::{Event, Reporter};

/// Resolve one referenced filename against the media discovered for a root
pub fn resolve(
    name: &str,
    media: &[PathBuf],
    form_directory: &Path,
    reporter: &dyn Reporter,
) -> Option<MediaFile> {
    let (in_directory, elsewhere): (Vec<&PathBuf>, Vec<&PathBuf>) = media
        .iter()
        .filter(|candidate| matches_suffix(candidate, name))
        .partition(|candidate| is_in_directory(candidate, form_directory));

    let path = match (in_directory.first(), elsewhere.first()) {
        (Some(path), _) => *path,
        (None, Some(path)) => {
            reporter.report(Event::MediaOutsideFormDirectory {
                name: name.to_string(),
                found: (*path).clone(),
                form_directory: form_directory.to_path_buf(),
            });
            *path
        }
        (None, None) => {
            reporter.report(Event::MediaNotFound {
                name: name.to_string(),
                form_directory: form_directory.to_path_buf(),
            });
            return None;
        }
    };

    reporter.report(Event::MediaResolved {
        name: name.to_string(),
        path: path.clone(),
    });

    Some(MediaFile::new(name, path.clone()))
}
