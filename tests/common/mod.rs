//! Common test utilities for odk-transfer integration tests

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch area holding scan roots and a destination
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

impl TestWorkspace {
    /// Create a new test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = dunce::canonicalize(temp.path()).expect("Failed to canonicalize temp path");
        Self { temp, path }
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: impl AsRef<[u8]>) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Names of the entries directly inside a workspace directory, sorted
    #[allow(dead_code)]
    pub fn list_dir(&self, path: &str) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.path.join(path))
            .expect("Failed to read directory")
            .map(|entry| {
                entry
                    .expect("Failed to read directory entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }

    /// Modification time of a workspace file
    #[allow(dead_code)]
    pub fn modified(&self, path: &str) -> std::time::SystemTime {
        std::fs::metadata(self.path.join(path))
            .and_then(|m| m.modified())
            .expect("Failed to read file metadata")
    }

    /// Write an ODK instance with a complete `<meta>` block
    pub fn write_form(&self, path: &str, form_id: &str, fields: &[(&str, &str)]) {
        self.write_file(path, instance_xml(form_id, fields));
    }

    /// Get path to odk-transfer binary
    #[allow(dead_code)]
    pub fn odk_transfer_bin() -> PathBuf {
        PathBuf::from(env!("CARGO_BIN_EXE_odk-transfer"))
    }

    #[allow(dead_code)]
    pub fn join(&self, path: &str) -> PathBuf {
        self.path.join(path)
    }
}

/// Build an ODK instance document
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

/// MD5 of `data` as lower-case hex, computed independently of the binary
#[allow(dead_code)]
pub fn md5_hex(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

#[allow(dead_code)]
pub fn path_str(path: &Path) -> String {
    path.display().to_string()
}
