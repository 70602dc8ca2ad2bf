use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::SubscriberBuilder;

use crate::errors::{ParityError, Result};

/// Builds the filter for the subscriber. `RUST_LOG` wins over `level`.
pub fn build_filter(level: Option<&str>) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directive = level.unwrap_or("info");
    EnvFilter::try_new(directive).map_err(|err| {
        ParityError::ConfigError(format!("invalid log directive '{}': {}", directive, err))
    })
}

/// Installs the fmt subscriber used by the binaries.
///
/// Output goes to stderr so that JSON reports on stdout stay parseable.
pub fn init_tracing(level: Option<&str>) -> Result<()> {
    SubscriberBuilder::default()
        .with_env_filter(build_filter(level)?)
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .try_init()
        .map_err(|err| ParityError::GeneralError(err.to_string()))
}
