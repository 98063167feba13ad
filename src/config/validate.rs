// src/config/validate.rs

use tracing::warn;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::dag::DependencyGraph;
use crate::errors::{Result, TaskpilotError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TaskpilotError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.goal, raw.task))
    }
}

pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_work(cfg)?;
    validate_global_config(cfg)?;
    validate_goal(cfg)?;
    validate_task_dependencies(cfg)?;
    validate_dag(cfg)?;
    Ok(())
}

fn ensure_has_work(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() && cfg.goal.is_none() {
        return Err(TaskpilotError::ConfigError(
            "config must contain a [goal] or at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.max_iterations == Some(0) {
        return Err(TaskpilotError::ConfigError(
            "[config].max_iterations must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_goal(cfg: &RawConfigFile) -> Result<()> {
    if let Some(goal) = &cfg.goal {
        if goal.description.trim().is_empty() {
            return Err(TaskpilotError::ConfigError(
                "[goal].description must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_task_dependencies(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        if name.trim().is_empty() {
            return Err(TaskpilotError::ConfigError(
                "task names must not be empty".to_string(),
            ));
        }
        for dep in task.after.iter() {
            if dep == name {
                return Err(TaskpilotError::ConfigError(format!(
                    "task '{}' cannot depend on itself in `after`",
                    name
                )));
            }
            if !cfg.task.contains_key(dep) {
                // Inert until such a task is added; allowed but suspicious.
                warn!(task = %name, dep = %dep, "dependency names a task that is not configured");
            }
        }
    }
    Ok(())
}

fn validate_dag(cfg: &RawConfigFile) -> Result<()> {
    let tasks: Vec<_> = cfg
        .task
        .iter()
        .map(|(name, tc)| tc.to_task(name))
        .collect();

    let graph = DependencyGraph::from_tasks(&tasks);
    match graph.find_cycle() {
        None => Ok(()),
        Some(cycle) => Err(crate::dag::CycleError { cycle }.into()),
    }
}
