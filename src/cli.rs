// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;
use crate::types::OrderPolicy;

/// Command-line arguments for `taskpilot`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskpilot",
    version,
    about = "Plan a goal into dependent tasks and execute them in priority order.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Goal description; overrides `[goal].description` from the config.
    #[arg(long, value_name = "TEXT")]
    pub goal: Option<String>,

    /// Goal priority used together with `--goal`.
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub priority: i32,

    /// Requeue a failed task at most this many times.
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Stop after this many task executions.
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<u64>,

    /// How priorities refine the dependency order.
    #[arg(long, value_enum, value_name = "POLICY")]
    pub ordering: Option<Ordering>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKPILOT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the planned order, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Ordering policy as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum Ordering {
    Priority,
    Strict,
}

impl From<Ordering> for OrderPolicy {
    fn from(o: Ordering) -> Self {
        match o {
            Ordering::Priority => OrderPolicy::PriorityResort,
            Ordering::Strict => OrderPolicy::Strict,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
