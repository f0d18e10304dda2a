// src/logging.rs

//! Logging setup for `batchroute` using `tracing` + `tracing-subscriber`.
//!
//! Filter selection, first match wins:
//! 1. `--log-level` CLI flag; at `debug` the HTTP stack stays at `info` so
//!    the output shows polling rather than connection chatter
//! 2. `BATCHROUTE_LOG`, a full `EnvFilter` directive
//!    (e.g. `batchroute::tracker=debug,reqwest=warn`)
//! 3. `info`
//!
//! Logs are sent to STDERR so that stdout carries only command output
//! (batch ids, events, render models).

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "BATCHROUTE_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Transport crates that are only interesting at `trace`.
const QUIET_DEPENDENCIES: &[&str] = &["hyper", "h2", "rustls", "reqwest"];

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let filter = build_filter(cli_level, env.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(cli_directive(level));
    }

    match env.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directive) => EnvFilter::try_new(directive).unwrap_or_else(|e| {
            // No subscriber yet, so this can only go to stderr directly.
            eprintln!("ignoring invalid {LOG_ENV}={directive:?}: {e}");
            EnvFilter::new(DEFAULT_DIRECTIVE)
        }),
        None => EnvFilter::new(DEFAULT_DIRECTIVE),
    }
}

fn cli_directive(level: LogLevel) -> String {
    match level {
        LogLevel::Error => "error".to_string(),
        LogLevel::Warn => "warn".to_string(),
        LogLevel::Info => "info".to_string(),
        LogLevel::Debug => QUIET_DEPENDENCIES
            .iter()
            .fold("debug".to_string(), |acc, dep| format!("{acc},{dep}=info")),
        LogLevel::Trace => "trace".to_string(),
    }
}
