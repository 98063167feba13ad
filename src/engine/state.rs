// src/engine/state.rs

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::model::Goal;

/// Read-only, owned view of the executor state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub current_goal: Option<Goal>,
    pub pending_tasks: usize,
    pub completed_tasks: usize,
    pub abandoned_tasks: usize,
    /// Auxiliary key-value state.
    pub state: BTreeMap<String, Value>,
}
