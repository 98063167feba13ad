// src/config/model.rs

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Deserialize;

use crate::engine::{ExecutorOptions, RetryPolicy};
use crate::model::{Goal, Task, TaskName};
use crate::model::task::default_priority;
use crate::types::OrderPolicy;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// max_retries = 3
/// max_iterations = 1000
/// ordering = "priority"
///
/// [goal]
/// description = "Complete project documentation"
/// priority = 1
///
/// [[goal.sub_goals]]
/// description = "Write README"
/// priority = 2
///
/// [task.outline]
/// priority = 2
///
/// [task.write_readme]
/// after = ["outline"]
/// fail_attempts = 1
/// ```
///
/// All sections are optional and have reasonable defaults. This is the
/// unvalidated form; convert it with `ConfigFile::try_from`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Executor behaviour from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// The goal from `[goal]`.
    #[serde(default)]
    pub goal: Option<Goal>,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub goal: Option<Goal>,
    pub task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    /// Assemble a config without running validation. Used by `TryFrom`.
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        goal: Option<Goal>,
        task: BTreeMap<String, TaskConfig>,
    ) -> Self {
        Self { config, goal, task }
    }

    /// Task records for every `[task.<name>]` section.
    pub fn tasks(&self) -> Vec<Task> {
        self.task
            .iter()
            .map(|(name, tc)| tc.to_task(name))
            .collect()
    }

    /// Simulated failure budgets (`fail_attempts`) by task name.
    pub fn fail_attempts(&self) -> HashMap<TaskName, u32> {
        self.task
            .iter()
            .filter(|(_, tc)| tc.fail_attempts > 0)
            .map(|(name, tc)| (name.clone(), tc.fail_attempts))
            .collect()
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigSection {
    /// How many times a failed task is requeued. Omit to retry forever.
    #[serde(default)]
    pub max_retries: Option<u32>,

    /// Upper bound on task executions per run. Omit for no bound.
    #[serde(default)]
    pub max_iterations: Option<u64>,

    /// `"priority"` (default) or `"strict"`.
    #[serde(default)]
    pub ordering: OrderPolicy,
}

impl ConfigSection {
    pub fn executor_options(&self) -> ExecutorOptions {
        ExecutorOptions {
            retry: RetryPolicy {
                max_retries: self.max_retries,
            },
            max_iterations: self.max_iterations,
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    #[serde(default)]
    pub description: String,

    #[serde(default = "default_priority")]
    pub priority: i32,

    /// Dependency list: this task waits for all tasks listed here.
    #[serde(default)]
    pub after: Vec<String>,

    /// Number of simulated failures before the task succeeds.
    #[serde(default)]
    pub fail_attempts: u32,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            description: String::new(),
            priority: default_priority(),
            after: Vec::new(),
            fail_attempts: 0,
        }
    }
}

impl TaskConfig {
    pub fn to_task(&self, name: &str) -> Task {
        let mut task = Task::new(name)
            .with_description(self.description.clone())
            .with_priority(self.priority);
        task.dependencies = self.after.iter().cloned().collect::<BTreeSet<_>>();
        task
    }
}
