//! CLI definitions using clap derive API

use clap::Parser;
use clap::builder::{Styles, styling::AnsiColor};
use std::path::PathBuf;

/// odk-transfer - bundle ODK form instances with their media
///
/// Finds ODK form instances under each root, resolves the media files they
/// reference and writes one self-contained bundle per form.
#[derive(Parser, Debug)]
#[command(
    name = "odk-transfer",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Bundle ODK form instances with the media they reference",
    long_about = "odk-transfer walks each ROOT for ODK form instances (*.xml) and media files, \
                  resolves every media filename a form references, and writes one bundle per form \
                  to the destination: the form as JSON, the original XML and each media file \
                  renamed to its MD5 digest. Existing destination files are never overwritten.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  odk-transfer ../ODK-2014 -d ../destination-a\n    \
                  odk-transfer /media/sdcard/odk /media/usb/odk -d bundles --exclude '**/backup/**'\n    \
                  odk-transfer --config transfer.yaml --strict\n\n\
                  \x1b[1m\x1b[32mConfiguration:\x1b[0m\n    \
                  odk-transfer.yaml in the working directory is read when --config is not given"
)]
pub struct Cli {
    /// Root directories to scan, in order (replaces roots from the config file)
    #[arg(value_name = "ROOT")]
    pub roots: Vec<PathBuf>,

    /// Directory bundles are written to
    #[arg(long, short = 'd', env = "ODK_TRANSFER_DESTINATION", value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// Configuration file (YAML)
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Worker threads for reading, parsing and hashing (0 = one per CPU)
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Glob of root-relative paths to skip (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Exit with status 2 if anything failed during the run
    #[arg(long)]
    pub strict: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(long, short = 'q')]
    pub quiet: bool,
}
