// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod model;
pub mod planner;
pub mod types;

use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use tracing::{debug, info, info_span, warn};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, RawConfigFile, load_from_path};
use crate::dag::Scheduler;
use crate::engine::{Executor, StopReason};
use crate::exec::SimulatedEffect;
use crate::model::{Goal, Task};
use crate::planner::{GoalBreakdown, SubGoalBreakdown};
use crate::types::OrderPolicy;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (plus CLI overrides)
/// - goal breakdown, when the config lists no tasks
/// - scheduler + executor with the simulated effect
/// - printing the final state snapshot as JSON
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_config(&args)?;

    let mut options = cfg.config.executor_options();
    if let Some(n) = args.max_retries {
        options.retry.max_retries = Some(n);
    }
    if let Some(n) = args.max_iterations {
        options.max_iterations = Some(n);
    }
    let policy = args
        .ordering
        .map(OrderPolicy::from)
        .unwrap_or(cfg.config.ordering);

    let tasks = initial_tasks(&cfg);

    if args.dry_run {
        return write_dry_run(&mut io::stdout().lock(), &cfg, &tasks, policy);
    }

    let effect = SimulatedEffect::with_failures(cfg.fail_attempts());
    let span = info_span!("executor", config = %args.config.display());
    let mut executor = Executor::new(Scheduler::new(policy), effect, options).with_span(span);

    if let Some(goal) = cfg.goal.clone() {
        executor.set_goal_record(goal);
    }
    for task in tasks {
        executor.add_task(task)?;
    }

    let summary = executor.run().await?;
    info!(?summary, "run summary");

    println!("{}", serde_json::to_string_pretty(&executor.state())?);

    match summary.stop {
        StopReason::NoGoal => bail!("no goal set; nothing was run"),
        StopReason::IterationCap => {
            warn!(pending = summary.pending, "stopped at iteration cap with tasks pending");
        }
        StopReason::Drained => {}
    }

    Ok(())
}

/// Load the config file, applying `--goal` / `--priority`.
///
/// A missing config file is fine when `--goal` is given: the goal is then
/// broken down into tasks on its own.
fn load_config(args: &CliArgs) -> Result<ConfigFile> {
    let path = &args.config;

    let mut raw = if args.goal.is_some() && !path.exists() {
        debug!(path = %path.display(), "config file not found; using --goal only");
        RawConfigFile::default()
    } else {
        load_from_path(path).with_context(|| format!("loading config {}", path.display()))?
    };

    if let Some(description) = &args.goal {
        let sub_goals = raw.goal.take().map(|g| g.sub_goals).unwrap_or_default();
        let mut goal = Goal::new(description.clone(), args.priority);
        goal.sub_goals = sub_goals;
        raw.goal = Some(goal);
    }

    let cfg = ConfigFile::try_from(raw)
        .with_context(|| format!("validating config {}", path.display()))?;
    Ok(cfg)
}

/// Tasks from `[task.*]`, or the goal breakdown when there are none.
fn initial_tasks(cfg: &ConfigFile) -> Vec<Task> {
    if !cfg.task.is_empty() {
        return cfg.tasks();
    }
    match &cfg.goal {
        Some(goal) => SubGoalBreakdown.breakdown(goal),
        None => Vec::new(),
    }
}

/// Dry-run output: the goal and the planned order with effort estimates.
fn write_dry_run(
    out: &mut impl Write,
    cfg: &ConfigFile,
    tasks: &[Task],
    policy: OrderPolicy,
) -> Result<()> {
    writeln!(out, "taskpilot dry-run")?;
    match &cfg.goal {
        Some(goal) => writeln!(
            out,
            "  goal = {:?} (priority {})",
            goal.description, goal.priority
        )?,
        None => writeln!(out, "  goal = <none>")?,
    }
    writeln!(out, "  ordering = {:?}", policy)?;
    writeln!(out, "  max_retries = {:?}", cfg.config.max_retries)?;
    writeln!(out, "  max_iterations = {:?}", cfg.config.max_iterations)?;
    writeln!(out)?;

    let mut scheduler = Scheduler::new(policy);
    let ordered = scheduler.optimize_order(tasks)?;

    writeln!(out, "planned order ({}):", ordered.len())?;
    for (i, task) in ordered.iter().enumerate() {
        let effort = Scheduler::estimate_effort(task)
            .map(|e| format!("{e:.2}"))
            .unwrap_or_else(|| "n/a".to_string());
        writeln!(
            out,
            "  {}. {} (priority {}, effort {})",
            i + 1,
            task.name,
            task.priority,
            effort
        )?;
        if !task.dependencies.is_empty() {
            writeln!(out, "      after: {:?}", task.dependencies)?;
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
