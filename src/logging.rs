//! Logging setup for the odk-transfer binary

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "odk_transfer=info";
const VERBOSE_LOG_FILTER: &str = "odk_transfer=debug";
const QUIET_LOG_FILTER: &str = "odk_transfer=warn";

/// How chatty the console should be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (verbose, quiet) {
            (true, _) => Verbosity::Verbose,
            (false, true) => Verbosity::Quiet,
            (false, false) => Verbosity::Normal,
        }
    }

    fn filter(self) -> &'static str {
        match self {
            Verbosity::Quiet => QUIET_LOG_FILTER,
            Verbosity::Normal => DEFAULT_LOG_FILTER,
            Verbosity::Verbose => VERBOSE_LOG_FILTER,
        }
    }
}

/// Initialize tracing with stderr output.
///
/// `RUST_LOG` takes precedence over the verbosity flags.
pub fn init_logging(verbosity: Verbosity) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.filter()));

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .try_init();
}
