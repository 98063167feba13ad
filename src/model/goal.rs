// src/model/goal.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::task::default_priority;

/// A desired outcome. Only used as input to task breakdown; never scheduled
/// directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub sub_goals: Vec<Goal>,
}

impl Goal {
    pub fn new(description: impl Into<String>, priority: i32) -> Self {
        Self {
            description: description.into(),
            priority,
            created_at: Utc::now(),
            completed: false,
            sub_goals: Vec::new(),
        }
    }

    pub fn with_sub_goal(mut self, sub_goal: Goal) -> Self {
        self.sub_goals.push(sub_goal);
        self
    }
}
