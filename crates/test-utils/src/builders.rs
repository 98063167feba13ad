#![allow(dead_code)]

use std::collections::BTreeMap;

use taskpilot::config::{ConfigFile, ConfigSection, RawConfigFile, TaskConfig};
use taskpilot::model::{Goal, Task};
use taskpilot::types::OrderPolicy;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                goal: None,
                task: BTreeMap::new(),
            },
        }
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.config.goal = Some(goal);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.config.max_retries = Some(n);
        self
    }

    pub fn max_iterations(mut self, n: u64) -> Self {
        self.config.config.max_iterations = Some(n);
        self
    }

    pub fn ordering(mut self, policy: OrderPolicy) -> Self {
        self.config.config.ordering = policy;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new() -> Self {
        Self {
            task: TaskConfig::default(),
        }
    }

    pub fn description(mut self, text: &str) -> Self {
        self.task.description = text.to_string();
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.task.priority = priority;
        self
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.after.push(dep.to_string());
        self
    }

    pub fn fail_attempts(mut self, n: u32) -> Self {
        self.task.fail_attempts = n;
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}

impl Default for TaskConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for a task with a priority and dependencies.
pub fn task(name: &str, priority: i32, deps: &[&str]) -> Task {
    deps.iter()
        .fold(Task::new(name).with_priority(priority), |t, d| t.after(*d))
}
