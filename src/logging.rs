// src/logging.rs

//! Logging setup for `taskpilot` using `tracing` + `tracing-subscriber`.
//!
//! Only the binary installs a subscriber; the library just emits events
//! under the executor's span.
//!
//! The filter is picked from, in order:
//! 1. `--log-level`: that level for `taskpilot`, `warn` for everything else
//! 2. `TASKPILOT_LOG`: either a bare level (`debug`) applied the same way, or
//!    full `RUST_LOG`-style directives (`taskpilot::engine=trace,info`)
//! 3. `RUST_LOG`, taken as-is
//! 4. `taskpilot=info,warn`
//!
//! Logs are sent to STDERR so that stdout carries only the final state.

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

const DEFAULT_DIRECTIVES: &str = "taskpilot=info,warn";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = env_filter(cli_level)?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Build the filter from the CLI flag and the environment.
pub fn env_filter(cli_level: Option<LogLevel>) -> Result<EnvFilter> {
    let directives = directives(
        cli_level,
        std::env::var("TASKPILOT_LOG").ok().as_deref(),
        std::env::var("RUST_LOG").ok().as_deref(),
    );
    EnvFilter::try_new(&directives).with_context(|| format!("invalid log filter {directives:?}"))
}

fn directives(
    cli_level: Option<LogLevel>,
    taskpilot_log: Option<&str>,
    rust_log: Option<&str>,
) -> String {
    if let Some(lvl) = cli_level {
        return crate_level(level_name(lvl));
    }
    if let Some(value) = taskpilot_log.map(str::trim).filter(|s| !s.is_empty()) {
        return match parse_level_str(value) {
            Some(level) => crate_level(level),
            None => value.to_string(),
        };
    }
    match rust_log.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => value.to_string(),
        None => DEFAULT_DIRECTIVES.to_string(),
    }
}

fn crate_level(level: &str) -> String {
    format!("taskpilot={level},warn")
}

fn level_name(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

fn parse_level_str(s: &str) -> Option<&'static str> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some("error"),
        "warn" | "warning" => Some("warn"),
        "info" => Some("info"),
        "debug" => Some("debug"),
        "trace" => Some("trace"),
        _ => None,
    }
}
