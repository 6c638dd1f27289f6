//! Test fixtures for building scan roots.
//!
//! Most pipeline tests need the same three things: a temp directory, a few
//! files written into it at nested paths, and ODK instance documents that the
//! classifier accepts. This module provides each as a single call.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::{create_temp_dir, create_test_files, instance_xml};
//!
//! #[test]
//! fn my_test() {
//!     let temp = create_temp_dir();
//!     create_test_files(&temp, &[
//!         ("forms/survey.xml", &instance_xml("survey", &[("photo", "img1.png")])),
//!         ("forms/img1.png", "png bytes"),
//!     ]);
//! }
//! ```

use std::path::PathBuf;

use tempfile::TempDir;

/// Absolute base for fixture trees.
///
/// A relative `TMPDIR` would put scan roots under the working directory,
/// where an interrupted test leaves forms for the next run to pick up.
fn fixture_base() -> PathBuf {
    let base = std::env::temp_dir();
    if base.is_absolute() {
        base
    } else if cfg!(windows) {
        PathBuf::from("C:\\Windows\\Temp")
    } else {
        PathBuf::from("/tmp")
    }
}

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new_in(fixture_base()).expect("Failed to create temp directory")
}

/// Create test files in a directory.
///
/// Takes a list of (path, content) tuples and creates those files.
/// Paths are relative to the temp directory.
///
/// # Panics
///
/// Panics if any file cannot be created.
pub fn create_test_files(temp: &TempDir, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full_path = temp.path().join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&full_path, content).expect("Failed to write test file");
    }
}

/// Create a nested directory inside the temp directory.
///
/// # Panics
///
/// Panics if the directory cannot be created.
#[must_use]
pub fn create_nested_dir(temp: &TempDir, path: &str) -> PathBuf {
    let nested = temp.path().join(path);
    std::fs::create_dir_all(&nested).expect("Failed to create nested directory");
    nested
}

/// Build an ODK instance document with a complete `<meta>` block.
///
/// Each `(element, text)` pair becomes a child of the `<data>` root.
#[must_use]
pub fn instance_xml(form_id: &str, fields: &[(&str, &str)]) -> String {
    let body: String = fields
        .iter()
        .map(|(name, text)| format!("  <{name}>{text}</{name}>\n"))
        .collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <data id=\"{form_id}\">\n\
         {body}  <meta>\n    \
         <instanceID>uuid:{form_id}-0001</instanceID>\n    \
         <instanceName>{form_id} entry</instanceName>\n  \
         </meta>\n\
         </data>\n"
    )
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_temp_dir() {
        let temp = create_temp_dir();
        assert!(temp.path().exists());
        assert!(temp.path().is_absolute());
    }

    #[test]
    fn test_create_test_files_nested() {
        let temp = create_temp_dir();
        create_test_files(&temp, &[("a/b/c.txt", "hello")]);
        assert_eq!(
            std::fs::read_to_string(temp.path().join("a/b/c.txt")).unwrap(),
            "hello"
        );
    }

    #[test]
    fn test_instance_xml_contains_meta() {
        let xml = instance_xml("survey", &[("photo", "img1.png")]);
        assert!(xml.contains("<photo>img1.png</photo>"));
        assert!(xml.contains("<instanceID>uuid:survey-0001</instanceID>"));
        assert!(xml.contains("<instanceName>survey entry</instanceName>"));
    }
}
