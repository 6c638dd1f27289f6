//! Error types and handling for odk-transfer
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Pipeline stages never propagate these past the unit of work they belong to
//! (one file, one reference, one bundle). They are handed to the run's
//! [`Reporter`](crate::report::Reporter) instead. Only configuration and
//! start-up errors reach `main`.

use std::path::Path;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for odk-transfer operations
#[derive(Error, Diagnostic, Debug)]
pub enum TransferError {
    // Discovery errors
    #[error("Failed to walk '{root}': {reason}")]
    #[diagnostic(
        code(odk_transfer::discovery::walk_failed),
        help("Check that the root exists and is readable")
    )]
    WalkFailed { root: String, reason: String },

    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(odk_transfer::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to parse XML file '{path}': {reason}")]
    #[diagnostic(code(odk_transfer::form::xml_parse_failed))]
    XmlParseFailed { path: String, reason: String },

    #[error("Failed to convert form '{path}': {reason}")]
    #[diagnostic(
        code(odk_transfer::form::conversion_failed),
        help("ODK instances need a <meta> element under the document root")
    )]
    ConversionFailed { path: String, reason: String },

    // Materialization errors
    #[error("Failed to create directory: {path}: {reason}")]
    #[diagnostic(code(odk_transfer::fs::create_dir_failed))]
    DirectoryCreateFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(odk_transfer::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("Failed to copy '{source_path}' to '{destination}': {reason}")]
    #[diagnostic(code(odk_transfer::fs::copy_failed))]
    CopyFailed {
        source_path: String,
        destination: String,
        reason: String,
    },

    #[error("Failed to serialize form '{path}' as JSON: {reason}")]
    #[diagnostic(code(odk_transfer::form::json_failed))]
    JsonSerializeFailed { path: String, reason: String },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(odk_transfer::config::not_found),
        help("Pass --config with an existing file or omit it")
    )]
    ConfigNotFound { path: String },

    #[error("Failed to parse configuration file '{path}': {reason}")]
    #[diagnostic(code(odk_transfer::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("No root directories to scan")]
    #[diagnostic(
        code(odk_transfer::config::no_roots),
        help("Pass one or more ROOT arguments or list them under 'roots:' in the config file")
    )]
    NoRoots,

    #[error("No destination directory configured")]
    #[diagnostic(
        code(odk_transfer::config::no_destination),
        help("Pass --destination or set 'destination:' in the config file")
    )]
    NoDestination,

    #[error("Invalid exclude pattern '{pattern}': {reason}")]
    #[diagnostic(code(odk_transfer::config::invalid_glob))]
    InvalidGlob { pattern: String, reason: String },

    #[error("Failed to start worker pool: {reason}")]
    #[diagnostic(code(odk_transfer::runtime::thread_pool))]
    ThreadPoolFailed { reason: String },

    // Generic wrappers
    #[error("IO error: {0}")]
    #[diagnostic(code(odk_transfer::io))]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    #[diagnostic(code(odk_transfer::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias using `TransferError`
pub type Result<T> = std::result::Result<T, TransferError>;

pub(crate) fn file_read_error(path: &Path, e: impl std::fmt::Display) -> TransferError {
    TransferError::FileReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

pub(crate) fn file_write_error(path: &Path, e: impl std::fmt::Display) -> TransferError {
    TransferError::FileWriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}
