//! Structured logging setup.
//!
//! Every stage of request handling emits `tracing` events with structured
//! fields (`request_id`, `method`, `path`, `route_pattern`, `status`, ...).
//! [`init_logging`] installs a subscriber for them: an [`EnvFilter`], then a
//! JSON or pretty `fmt` layer writing to stdout, optionally through a
//! non-blocking writer.
//!
//! Configuration comes from the environment:
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `NSR_LOG_LEVEL` | `info` | base level (overridden by `RUST_LOG`) |
//! | `NSR_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `NSR_LOG_ASYNC` | `true` | buffer through `tracing-appender` |
//! | `NSR_LOG_TARGET_FILTER` | unset | extra comma-separated directives |
//! | `NSR_LOG_INCLUDE_LOCATION` | `false` | add file and line |

use anyhow::{Context, Result};
use std::env;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Enable async buffered logging
    pub async_logging: bool,
    /// Extra filter directives (comma-separated)
    pub target_filter: Option<String>,
    /// Include file:line location
    pub include_location: bool,
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl LogConfig {
    /// Read configuration from `NSR_LOG_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("NSR_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: LogFormat::parse(
                &env::var("NSR_LOG_FORMAT").unwrap_or_else(|_| "json".to_string()),
            ),
            async_logging: env_flag("NSR_LOG_ASYNC", true),
            target_filter: env::var("NSR_LOG_TARGET_FILTER").ok(),
            include_location: env_flag("NSR_LOG_INCLUDE_LOCATION", false),
        }
    }

    /// Pretty, synchronous, debug-level logging for local runs.
    #[must_use]
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            async_logging: false,
            target_filter: None,
            include_location: true,
        }
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_level.to_lowercase()));

        // connection-level noise from the HTTP server
        filter = filter.add_directive(
            "may_minihttp=warn"
                .parse::<Directive>()
                .context("invalid built-in log directive")?,
        );

        if let Some(targets) = &self.target_filter {
            for directive in targets.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                let directive = directive
                    .parse::<Directive>()
                    .with_context(|| format!("invalid log filter directive '{directive}'"))?;
                filter = filter.add_directive(directive);
            }
        }
        Ok(filter)
    }
}

/// Keeps the non-blocking writer flushing; drop it at process exit.
#[must_use = "dropping the guard stops the background log writer"]
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

/// Install the global `tracing` subscriber.
///
/// # Errors
///
/// Fails on an invalid filter directive, or if a global subscriber is
/// already installed.
pub fn init_logging(config: &LogConfig) -> Result<LogGuard> {
    let env_filter = config.env_filter()?;

    let (writer, worker) = if config.async_logging {
        let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
        (BoxMakeWriter::new(non_blocking), Some(guard))
    } else {
        (BoxMakeWriter::new(std::io::stdout), None)
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(LogGuard { _worker: worker })
}
