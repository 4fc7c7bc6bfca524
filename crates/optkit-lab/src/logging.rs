//! Structured logging setup for the lab binary.
//!
//! `OPTKIT_TRACE` holds an `EnvFilter` directive (default `off`),
//! `OPTKIT_LOG_FORMAT` picks `pretty` or `json`, and `OPTKIT_LOG_FILE`
//! mirrors every event to a file in the same format.

use std::env;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug)]
pub enum LoggingError {
    InvalidFilter(String),
    InvalidFormat(String),
    LogFile(io::Error),
    Init(String),
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggingError::InvalidFilter(msg) => write!(f, "Invalid OPTKIT_TRACE filter: {msg}"),
            LoggingError::InvalidFormat(format) => write!(
                f,
                "Invalid OPTKIT_LOG_FORMAT '{format}' (expected 'json' or 'pretty')"
            ),
            LoggingError::LogFile(err) => write!(f, "Failed to open log file: {err}"),
            LoggingError::Init(msg) => write!(f, "Failed to initialize logging: {msg}"),
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoggingError::LogFile(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

fn parse_format(value: &str) -> Result<LogFormat, LoggingError> {
    if value.eq_ignore_ascii_case("json") {
        Ok(LogFormat::Json)
    } else if value.eq_ignore_ascii_case("pretty") {
        Ok(LogFormat::Pretty)
    } else {
        Err(LoggingError::InvalidFormat(value.to_string()))
    }
}

fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if level.eq_ignore_ascii_case("off") {
        Ok(EnvFilter::default().add_directive(LevelFilter::OFF.into()))
    } else {
        EnvFilter::try_new(level).map_err(|err| LoggingError::InvalidFilter(err.to_string()))
    }
}

fn open_log_file(path: &str) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(LoggingError::LogFile)
}

fn map_init_err<E: fmt::Display>(err: E) -> LoggingError {
    LoggingError::Init(err.to_string())
}

/// Install the global subscriber from the environment.
///
/// Returns `false` without touching anything if a subscriber is already set.
pub fn init_from_env() -> Result<bool, LoggingError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }

    let level = env::var("OPTKIT_TRACE").unwrap_or_else(|_| "off".to_string());
    let filter = build_filter(&level)?;
    let format = parse_format(
        &env::var("OPTKIT_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
    )?;
    let log_file = env::var("OPTKIT_LOG_FILE")
        .ok()
        .map(|path| open_log_file(&path))
        .transpose()?;

    match format {
        LogFormat::Json => {
            let stderr_layer = tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .json();
            let base = tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer);
            if let Some(file) = log_file {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .json();
                base.with(file_layer).try_init().map_err(map_init_err)?;
            } else {
                base.try_init().map_err(map_init_err)?;
            }
        }
        LogFormat::Pretty => {
            let stderr_layer = tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .pretty();
            let base = tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer);
            if let Some(file) = log_file {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .pretty();
                base.with(file_layer).try_init().map_err(map_init_err)?;
            } else {
                base.try_init().map_err(map_init_err)?;
            }
        }
    }

    tracing::debug!(
        component = "lab",
        operation = "init_logging",
        status = "success",
        level = %level,
        ?format,
        "Logging initialized"
    );
    Ok(true)
}
