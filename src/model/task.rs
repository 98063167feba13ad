// src/model/task.rs

//! Task record and its lifecycle status.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Lifecycle status of a task. Only the executor mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A named unit of work with a priority and a set of dependencies.
///
/// `dependencies` may name tasks that are not (yet) part of the working set;
/// those edges stay inert until the referenced task is added.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub name: TaskName,
    #[serde(default)]
    pub description: String,
    /// Higher = more urgent.
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub dependencies: BTreeSet<TaskName>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Stamped exactly once, on the transition to `Completed`.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// How many times the executor has tried this task.
    #[serde(default)]
    pub attempts: u32,
}

pub(crate) fn default_priority() -> i32 {
    1
}

impl Task {
    /// Create a pending task with priority 1 and no dependencies.
    pub fn new(name: impl Into<TaskName>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            priority: default_priority(),
            dependencies: BTreeSet::new(),
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
            attempts: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Add a dependency on the task called `dep`.
    pub fn after(mut self, dep: impl Into<TaskName>) -> Self {
        self.dependencies.insert(dep.into());
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Transition to `Completed` and stamp the completion time.
    ///
    /// Calling this on an already completed task keeps the first stamp.
    pub fn mark_completed(&mut self) {
        if self.completed_at.is_none() {
            self.completed_at = Some(Utc::now());
        }
        self.status = TaskStatus::Completed;
    }

    pub fn mark_failed(&mut self) {
        self.status = TaskStatus::Failed;
    }

    /// Put a failed task back into the pending state for another attempt.
    pub fn mark_pending(&mut self) {
        self.status = TaskStatus::Pending;
    }
}
