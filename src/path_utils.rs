//! Cross-platform path utilities
//!
//! Comparisons here are case-insensitive because ODK collections are copied
//! between Windows, macOS and Android devices, and the case of a referenced
//! filename rarely survives the trip.

use std::path::Path;

/// Convert a path to a string with forward slashes.
///
/// ```ignore
/// let forward = to_forward_slashes(Path::new("C:\\Users\\file.txt"));
/// assert_eq!(forward, "C:/Users/file.txt");
/// ```
pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Case-insensitive `ends_with` of a candidate path against a referenced filename.
///
/// A plain filename is matched against the candidate's basename. A reference
/// that carries its own directory part (`media/photo.jpg`) is matched against
/// the whole candidate path instead, since no basename can contain a separator.
pub fn matches_suffix(candidate: &Path, suffix: &str) -> bool {
    let suffix = suffix.replace('\\', "/").to_lowercase();

    if suffix.contains('/') {
        return to_forward_slashes(candidate)
            .to_lowercase()
            .ends_with(&suffix);
    }

    candidate
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase().ends_with(&suffix))
        .unwrap_or(false)
}

/// Whether `path` sits directly inside `directory` (case-insensitive)
pub fn is_in_directory(path: &Path, directory: &Path) -> bool {
    let Some(parent) = path.parent() else {
        return false;
    };

    let normalize = |p: &Path| {
        to_forward_slashes(p)
            .trim_end_matches('/')
            .to_lowercase()
    };

    normalize(parent) == normalize(directory)
}

/// File name without its final extension, lossily converted
pub fn file_stem_lossy(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Extension of a referenced name including the leading dot, or empty
pub fn dotted_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
