//! Logging initialisation for the mlbench binaries.
//!
//! Installs a global `tracing` subscriber with optional JSON formatting and
//! bridges the `log` facade so crates using either API emit structured events.

use std::{env, sync::OnceLock};

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{MakeWriter, format::FmtSpan},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

const LOG_FORMAT_ENV: &str = "MLBENCH_LOG_FORMAT";

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Output format of the installed subscriber.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogFormat {
    /// Human-readable lines.
    Human,
    /// One JSON object per line, including the active span list.
    Json,
}

/// Errors raised while initialising structured logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Environment variable contained invalid UTF-8 data.
    #[error("environment variable `{name}` contained invalid UTF-8: {source}")]
    InvalidUnicode {
        /// Name of the offending environment variable.
        name: &'static str,
        /// Underlying parse failure.
        #[source]
        source: env::VarError,
    },
    /// Unsupported log format requested via `MLBENCH_LOG_FORMAT`.
    #[error("unsupported log format `{provided}`; expected `human` or `json`")]
    UnsupportedFormat {
        /// Raw value supplied by the user.
        provided: String,
    },
    /// Failed to install the global tracing subscriber.
    #[error("failed to install tracing subscriber: {source}")]
    InstallFailed {
        /// Error raised by `tracing_subscriber`.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
}

/// Install global structured logging if it has not already been configured.
///
/// The format defaults to human-readable output and switches to JSON when
/// `MLBENCH_LOG_FORMAT=json`. Diagnostics go to `stderr` so the reports on
/// `stdout` stay clean. The level is controlled via `RUST_LOG` and defaults to
/// `info`.
///
/// # Errors
/// Returns [`LoggingError`] if the environment variable contains invalid
/// Unicode, the requested format is unsupported, or the subscriber cannot be
/// installed.
pub fn init_logging() -> Result<(), LoggingError> {
    if INITIALISED.get().is_some() {
        return Ok(());
    }

    match install_subscriber() {
        Ok(()) => {}
        Err(LoggingError::InstallFailed { source }) => report_existing_subscriber(&source),
        Err(err) => return Err(err),
    }
    let _ = INITIALISED.set(());
    Ok(())
}

#[expect(
    clippy::print_stderr,
    reason = "No subscriber of ours is installed to carry this diagnostic"
)]
fn report_existing_subscriber(source: &tracing_subscriber::util::TryInitError) {
    eprintln!("structured logging already configured elsewhere: {source}");
}

fn install_subscriber() -> Result<(), LoggingError> {
    let format = match env::var(LOG_FORMAT_ENV) {
        Ok(raw) => parse_log_format(&raw)?,
        Err(env::VarError::NotPresent) => LogFormat::Human,
        Err(err @ env::VarError::NotUnicode(_)) => Err(LoggingError::InvalidUnicode {
            name: LOG_FORMAT_ENV,
            source: err,
        })?,
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(report_layer(format, std::io::stderr))
        .try_init()
        .map_err(|source| LoggingError::InstallFailed { source })?;

    // Another logger may already own the `log` slot; keep it if so.
    let _ = LogTracer::init();
    Ok(())
}

/// Builds the stderr formatter. Span closes are logged so each
/// `benchmark.run`, `*.fit` and root span reports its own duration. JSON lines
/// lift event fields such as `training_seconds` and `quality` to the top level
/// and list the enclosing spans, so the `benchmark` field of the root span
/// (`mlbench.standalone` or `cli.execute`) tags every line of a run.
fn report_layer<S, W>(format: LogFormat, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'span> LookupSpan<'span>,
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(writer);
    match format {
        LogFormat::Json => layer
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(true)
            .boxed(),
        LogFormat::Human => layer.with_target(false).boxed(),
    }
}

fn parse_log_format(raw: &str) -> Result<LogFormat, LoggingError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "human" => Ok(LogFormat::Human),
        "json" => Ok(LogFormat::Json),
        other => Err(LoggingError::UnsupportedFormat {
            provided: other.to_owned(),
        }),
    }
}
