//! Tree walking for form and media discovery
//!
//! Directory entries are visited in file-name order so that "first found"
//! means the same file on every run over an unchanged tree.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use wax::{CandidatePath, Glob, Pattern};

use crate::error::{Result, TransferError};
use crate::path_utils;
use crate::report::{Event, FileKind, Reporter};

/// Extensions treated as media, matched case-insensitively
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "gif", "jpg", "jpeg", "png", "bmp", "m4a", "mp3", "wav", "mpeg", "mp4", "avi", "zip", "docx",
    "doc", "xlsx", "xls", "txt",
];

const XML_EXTENSIONS: &[&str] = &["xml"];

/// Which files a walk collects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilePattern {
    /// `*.xml` at any depth
    Xml,
    /// Any file whose extension is in [`MEDIA_EXTENSIONS`]
    Media,
}

impl FilePattern {
    fn extensions(self) -> &'static [&'static str] {
        match self {
            FilePattern::Xml => XML_EXTENSIONS,
            FilePattern::Media => MEDIA_EXTENSIONS,
        }
    }

    fn kind(self) -> FileKind {
        match self {
            FilePattern::Xml => FileKind::Form,
            FilePattern::Media => FileKind::Media,
        }
    }

    /// Check a path's extension against this pattern
    pub fn matches(self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions()
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }
}

/// Walks roots, skipping anything matched by the exclusion globs
#[derive(Debug, Default)]
pub struct Walker {
    exclude: Vec<Glob<'static>>,
}

impl Walker {
    /// Build a walker from glob patterns matched against root-relative paths
    pub fn new(exclude: &[String]) -> Result<Self> {
        let exclude = exclude
            .iter()
            .map(|pattern| {
                Glob::new(pattern)
                    .map(Glob::into_owned)
                    .map_err(|e| TransferError::InvalidGlob {
                        pattern: pattern.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { exclude })
    }

    fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(root) else {
            return false;
        };
        if relative.as_os_str().is_empty() {
            return false;
        }

        let relative = path_utils::to_forward_slashes(relative);
        self.exclude
            .iter()
            .any(|glob| glob.is_match(CandidatePath::from(relative.as_str())))
    }

    /// Collect every file under `root` matching `pattern`.
    ///
    /// An unreadable root yields nothing; an unreadable entry below it is
    /// skipped. Both are reported, neither is returned as an error.
    pub fn walk(&self, root: &Path, pattern: FilePattern, reporter: &dyn Reporter) -> Vec<PathBuf> {
        if !root.is_dir() {
            reporter.fail(TransferError::WalkFailed {
                root: root.display().to_string(),
                reason: "not a readable directory".to_string(),
            });
            return Vec::new();
        }

        let mut files = Vec::new();
        let entries = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(root, entry.path()));

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let at = e
                        .path()
                        .map_or_else(|| root.display().to_string(), |p| p.display().to_string());
                    reporter.fail(TransferError::WalkFailed {
                        root: at,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if entry.file_type().is_file() && pattern.matches(entry.path()) {
                reporter.report(Event::FileDiscovered {
                    kind: pattern.kind(),
                    path: entry.path().to_path_buf(),
                });
                files.push(entry.into_path());
            }
        }

        files
    }
}
