//! odk-transfer - ODK form and media bundler
//!
//! A command line tool that collects ODK form instances scattered across
//! directory trees (SD card dumps, device backups) together with the photos,
//! recordings and documents they reference, and writes each form as a
//! self-contained bundle with content-addressed media names.

use clap::Parser;

mod bundle;
mod cli;
mod config;
mod convert;
mod discovery;
mod error;
mod hash;
mod logging;
mod materialize;
mod node;
mod path_utils;
mod pipeline;
mod report;
#[cfg(test)]
mod test_fixtures;
mod xml;

use cli::Cli;
use config::Settings;
use convert::InstanceConverter;
use error::Result;
use logging::Verbosity;
use pipeline::{Pipeline, RunSummary};
use report::TracingReporter;

/// Exit status when `--strict` is set and the run reported failures
const EXIT_FAILURES: i32 = 2;

fn run(cli: &Cli) -> Result<(Settings, RunSummary)> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::resolve(cli, &cwd)?;

    let reporter = TracingReporter;
    let summary = Pipeline::new(&settings, &InstanceConverter, &reporter)?.run()?;

    Ok((settings, summary))
}

fn main() {
    let cli = Cli::parse();

    logging::init_logging(Verbosity::from_flags(cli.verbose, cli.quiet));

    match run(&cli) {
        Ok((settings, summary)) => {
            if settings.strict && summary.has_failures() {
                std::process::exit(EXIT_FAILURES);
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
