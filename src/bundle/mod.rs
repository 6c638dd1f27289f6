//! Bundling forms with the media they reference
//!
//! This module handles:
//! - Extracting media references from a converted form ([`references`])
//! - Resolving each reference to a discovered file ([`resolve`])
//! - Hashing resolved media for content-addressed names

pub mod references;
pub mod resolve;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::convert::ParsedForm;
use crate::hash;
use crate::path_utils::dotted_extension;
use crate::report::{Event, Reporter};

pub use references::extract_references;
pub use resolve::resolve;

/// A media file referenced by a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Filename as referenced inside the form
    pub name: String,

    /// Discovered absolute path
    pub path: PathBuf,

    /// MD5 of the file contents, set by [`hash_media`]
    pub digest: Option<String>,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            path,
            digest: None,
        }
    }

    /// Content-addressed filename (`<digest><extension>`), once hashed
    pub fn hashed_name(&self) -> Option<String> {
        self.digest
            .as_ref()
            .map(|digest| format!("{digest}{}", dotted_extension(&self.name)))
    }

    /// Filename to copy this media to inside a bundle directory.
    ///
    /// Undigested media keep the referenced name, reduced to its final
    /// component so a reference can never point outside the bundle.
    pub fn destination_name(&self) -> String {
        self.hashed_name().unwrap_or_else(|| {
            Path::new(&self.name.replace('\\', "/"))
                .file_name()
                .map_or_else(|| self.name.clone(), |n| n.to_string_lossy().into_owned())
        })
    }
}

/// A converted form and its resolved media
#[derive(Debug, Clone)]
pub struct Bundle {
    pub form: ParsedForm,
    pub media: Vec<MediaFile>,
}

/// Pair a form with the media it references.
///
/// Each distinct referenced name is resolved once, in first-seen order; a
/// name referenced twice yields a single entry. Unresolvable names are
/// dropped.
pub fn bundle_form(form: ParsedForm, media: &[PathBuf], reporter: &dyn Reporter) -> Bundle {
    let mut seen = HashSet::new();
    let resolved: Vec<MediaFile> = extract_references(form.document())
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .filter_map(|name| resolve(&name, media, form.directory(), reporter))
        .collect();

    reporter.report(Event::BundleAssembled {
        form: form.source().to_path_buf(),
        media: resolved.len(),
    });

    Bundle {
        form,
        media: resolved,
    }
}

/// Fill in the digest of every media entry.
///
/// Entries are hashed independently on the worker pool. An entry whose file
/// cannot be read is reported and keeps `digest: None`.
pub fn hash_media(bundles: &mut [Bundle], reporter: &dyn Reporter) {
    bundles
        .par_iter_mut()
        .flat_map(|bundle| bundle.media.par_iter_mut())
        .filter(|media| media.digest.is_none())
        .for_each(|media| match hash::hash_file(&media.path) {
            Ok(digest) => media.digest = Some(digest),
            Err(e) => reporter.fail(e),
        });
}
