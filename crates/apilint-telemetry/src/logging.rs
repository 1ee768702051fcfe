//! Structured logging with JSON output.
//!
//! Hosted runs log to stdout, where the Functions host collects them. CLI
//! commands that print results log to stderr instead.

use crate::{LogFormat, LogOutput, TelemetryConfig, TelemetryError};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the logging subsystem.
///
/// Sets up tracing-subscriber with either JSON or pretty format,
/// respecting the configured log level.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let writer = make_writer(config.log_output);

    match config.log_format {
        LogFormat::Json => init_json_logging(filter, writer),
        LogFormat::Pretty => init_pretty_logging(filter, writer),
    }
}

fn make_writer(output: LogOutput) -> BoxMakeWriter {
    match output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
    }
}

fn init_json_logging(filter: EnvFilter, writer: BoxMakeWriter) -> Result<(), TelemetryError> {
    let json_layer = fmt::layer()
        .json()
        .with_writer(writer)
        .with_target(true)
        .with_current_span(true)
        .with_span_list(false)
        .with_file(false)
        .with_line_number(false)
        .flatten_event(true)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(json_layer)
        .try_init()
        .map_err(|e: tracing_subscriber::util::TryInitError| {
            TelemetryError::LoggingInit(e.to_string())
        })
}

fn init_pretty_logging(filter: EnvFilter, writer: BoxMakeWriter) -> Result<(), TelemetryError> {
    let pretty_layer = fmt::layer()
        .pretty()
        .with_writer(writer)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(pretty_layer)
        .try_init()
        .map_err(|e: tracing_subscriber::util::TryInitError| {
            TelemetryError::LoggingInit(e.to_string())
        })
}

/// Standard log event names.
pub mod events {
    /// Process is starting up.
    pub const STARTUP: &str = "startup";

    /// Custom handler is listening on a port.
    pub const LISTENING: &str = "listening";

    /// A trigger was received and an invocation started.
    pub const INVOCATION_STARTED: &str = "invocation_started";

    /// One pipeline stage finished.
    pub const STAGE_COMPLETED: &str = "stage_completed";

    /// The definition document was retrieved.
    pub const DOCUMENT_FETCHED: &str = "document_fetched";

    /// The linting engine returned diagnostics.
    pub const LINT_COMPLETED: &str = "lint_completed";

    /// The analysis report was accepted.
    pub const REPORT_UPLOADED: &str = "report_uploaded";

    /// The invocation failed and was abandoned.
    pub const INVOCATION_FAILED: &str = "invocation_failed";
}

/// Helper macros for structured logging with standard fields.
///
/// These wrap the tracing macros to ensure consistent field naming.
#[macro_export]
macro_rules! log_startup {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::STARTUP,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_listening {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::LISTENING,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_invocation_started {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::INVOCATION_STARTED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_stage_completed {
    ($($field:tt)*) => {
        tracing::debug!(
            event = $crate::logging::events::STAGE_COMPLETED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_document_fetched {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::DOCUMENT_FETCHED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_lint_completed {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::LINT_COMPLETED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_report_uploaded {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::REPORT_UPLOADED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_invocation_failed {
    ($($field:tt)*) => {
        tracing::error!(
            event = $crate::logging::events::INVOCATION_FAILED,
            $($field)*
        )
    };
}
