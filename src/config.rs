//! Run configuration (odk-transfer.yaml) and its merge with command-line flags

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::{Result, TransferError};

/// Config file picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "odk-transfer.yaml";

/// Contents of a configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Root directories to scan, in order
    pub roots: Vec<PathBuf>,

    /// Directory bundles are written to
    pub destination: Option<PathBuf>,

    /// Worker threads for fan-out stages (0 = one per CPU)
    pub threads: Option<usize>,

    /// Globs (relative to each root) excluded from discovery
    pub exclude: Vec<String>,
}

impl ConfigFile {
    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load a configuration file; relative paths inside it are resolved
    /// against the file's own directory
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TransferError::ConfigNotFound {
                    path: path.display().to_string(),
                }
            } else {
                TransferError::ConfigParseFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let mut config =
            Self::from_yaml(&text).map_err(|e| TransferError::ConfigParseFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let base = path.parent().unwrap_or(Path::new(""));
        config.roots = config.roots.iter().map(|r| absolutize(base, r)).collect();
        config.destination = config.destination.map(|d| absolutize(base, &d));

        Ok(config)
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub roots: Vec<PathBuf>,
    pub destination: PathBuf,
    pub threads: usize,
    pub exclude: Vec<String>,
    pub strict: bool,
}

impl Settings {
    /// Merge the command line over the config file.
    ///
    /// Roots given on the command line replace configured roots; other flags
    /// override single values and `--exclude` adds to configured globs.
    pub fn resolve(cli: &Cli, cwd: &Path) -> Result<Self> {
        let config = match &cli.config {
            Some(path) => ConfigFile::load(&absolutize(cwd, path))?,
            None => {
                let default = cwd.join(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    ConfigFile::load(&default)?
                } else {
                    ConfigFile::default()
                }
            }
        };

        let roots: Vec<PathBuf> = if cli.roots.is_empty() {
            config.roots
        } else {
            cli.roots.iter().map(|r| absolutize(cwd, r)).collect()
        };
        if roots.is_empty() {
            return Err(TransferError::NoRoots);
        }

        let destination = cli
            .destination
            .as_ref()
            .map(|d| absolutize(cwd, d))
            .or(config.destination)
            .ok_or(TransferError::NoDestination)?;

        let mut exclude = config.exclude;
        exclude.extend(cli.exclude.iter().cloned());

        Ok(Self {
            roots,
            destination,
            threads: cli.threads.or(config.threads).unwrap_or(0),
            exclude,
            strict: cli.strict,
        })
    }
}

/// Make `path` absolute against `base`, simplifying it when it exists
fn absolutize(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    dunce::canonicalize(&joined).unwrap_or(joined)
}
