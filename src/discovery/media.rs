//! Media discovery

use std::path::{Path, PathBuf};

use super::walker::{FilePattern, Walker};
use crate::report::Reporter;

/// Find every file under `root` with a known media extension.
///
/// Extension membership only; file contents are never sniffed.
pub fn discover_media(walker: &Walker, root: &Path, reporter: &dyn Reporter) -> Vec<PathBuf> {
    walker.walk(root, FilePattern::Media, reporter)
}
