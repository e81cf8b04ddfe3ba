//! Global tracing subscriber bootstrap.

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

/// Failure to build the tracing filter.
#[derive(Debug, Error)]
#[error("invalid tracing directives '{directives}': {source}")]
pub struct TracingInitError {
    directives: String,
    #[source]
    source: tracing_subscriber::filter::ParseError,
}

/// Installs a formatting subscriber filtered by `directives`.
///
/// `directives` uses the `EnvFilter` syntax, for example
/// `"export=info,export::scp=debug"`. The filter is built from the string
/// alone; no environment variables are consulted.
///
/// Returns `Ok(true)` when the subscriber was installed and `Ok(false)` when
/// a global subscriber already existed.
///
/// # Errors
///
/// Returns [`TracingInitError`] when `directives` does not parse.
pub fn init_tracing(directives: &str) -> Result<bool, TracingInitError> {
    let filter = EnvFilter::try_new(directives).map_err(|source| TracingInitError {
        directives: directives.to_owned(),
        source,
    })?;

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish()
        .try_init()
        .is_ok();
    Ok(installed)
}
