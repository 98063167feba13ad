// src/engine/core.rs

//! Pure executor state.
//!
//! This module contains a synchronous, deterministic core that owns:
//! - the current goal
//! - the pending queue, replanned through the [`Scheduler`]
//! - the completed and abandoned sets
//! - the auxiliary key-value state
//!
//! The async shell (`engine::runtime::Executor`) is responsible for calling
//! the `TaskEffect` and deciding what to do with each attempt. The core has
//! no futures and performs no IO, so it is unit tested directly.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::dag::Scheduler;
use crate::engine::{ExecutorOptions, Requeue};
use crate::engine::state::StateSnapshot;
use crate::errors::{Result, TaskpilotError};
use crate::model::{Goal, Task, TaskName};

#[derive(Debug)]
pub struct ExecutorCore {
    scheduler: Scheduler,
    options: ExecutorOptions,
    goal: Option<Goal>,
    pending: VecDeque<Task>,
    completed: Vec<Task>,
    abandoned: Vec<Task>,
    /// Every name ever accepted by `add_task`.
    known: HashSet<TaskName>,
    state: BTreeMap<String, Value>,
}

impl ExecutorCore {
    pub fn new(scheduler: Scheduler, options: ExecutorOptions) -> Self {
        Self {
            scheduler,
            options,
            goal: None,
            pending: VecDeque::new(),
            completed: Vec::new(),
            abandoned: Vec::new(),
            known: HashSet::new(),
            state: BTreeMap::new(),
        }
    }

    pub fn options(&self) -> &ExecutorOptions {
        &self.options
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn goal(&self) -> Option<&Goal> {
        self.goal.as_ref()
    }

    /// Replace the current goal. The task queue is left alone.
    pub fn set_goal(&mut self, goal: Goal) {
        info!(goal = %goal.description, priority = goal.priority, "new goal set");
        self.goal = Some(goal);
    }

    /// Append a task to the pending queue.
    ///
    /// A goal is not required. Fails with `DuplicateTask` if a task with the
    /// same name was already added.
    pub fn add_task(&mut self, task: Task) -> Result<()> {
        if !self.known.insert(task.name.clone()) {
            return Err(TaskpilotError::DuplicateTask(task.name));
        }
        info!(task = %task.name, priority = task.priority, "new task added");
        self.pending.push_back(task);
        Ok(())
    }

    /// Reorder the pending queue into the scheduler's execution order.
    ///
    /// On a cycle the queue is left exactly as it was.
    pub fn plan_next(&mut self) -> Result<()> {
        self.abandon_blocked();
        self.scheduler.build_graph(self.pending.iter());
        let order = self.scheduler.compute_order()?;

        let mut by_name: HashMap<TaskName, Task> = self
            .pending
            .drain(..)
            .map(|task| (task.name.clone(), task))
            .collect();

        self.pending = order
            .iter()
            .filter_map(|name| by_name.remove(name))
            .collect();

        debug!(order = ?order, "pending queue replanned");
        Ok(())
    }

    /// Remove and return the head of the pending queue.
    pub fn pop_next(&mut self) -> Option<Task> {
        self.pending.pop_front()
    }

    /// Move a completed task into the completed set.
    pub fn complete(&mut self, task: Task) {
        debug!(task = %task.name, "task moved to completed set");
        self.known.insert(task.name.clone());
        self.completed.push(task);
    }

    /// Hand a failed task back: requeue it at the tail, or abandon it once
    /// its retry budget is spent.
    ///
    /// Abandoning a task also abandons every pending task that depends on
    /// it, directly or transitively.
    pub fn requeue(&mut self, mut task: Task) -> Requeue {
        let attempts = task.attempts;

        if self.options.retry.allows_retry(attempts) {
            warn!(task = %task.name, attempts, "task failed; requeuing");
            task.mark_pending();
            self.pending.push_back(task);
            Requeue::Requeued { attempts }
        } else {
            warn!(
                task = %task.name,
                attempts,
                max_retries = ?self.options.retry.max_retries,
                "task failed; retry budget exhausted, abandoning"
            );
            self.abandoned.push(task);
            let dependents = self.abandon_blocked();
            Requeue::Abandoned {
                attempts,
                dependents,
            }
        }
    }

    /// Move every pending task that waits on an abandoned task into the
    /// abandoned set. Returns how many were moved.
    fn abandon_blocked(&mut self) -> usize {
        if self.abandoned.is_empty() {
            return 0;
        }
        let mut blocked: HashSet<TaskName> =
            self.abandoned.iter().map(|t| t.name.clone()).collect();
        let mut moved = 0;

        loop {
            let (stuck, rest): (VecDeque<Task>, VecDeque<Task>) = self
                .pending
                .drain(..)
                .partition(|t| t.dependencies.iter().any(|d| blocked.contains(d)));
            self.pending = rest;

            if stuck.is_empty() {
                return moved;
            }
            for task in stuck {
                warn!(task = %task.name, "dependency abandoned; abandoning dependent task");
                blocked.insert(task.name.clone());
                self.abandoned.push(task);
                moved += 1;
            }
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Names of pending tasks, in queue order.
    pub fn pending_names(&self) -> Vec<&str> {
        self.pending.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn completed_tasks(&self) -> &[Task] {
        &self.completed
    }

    pub fn abandoned_tasks(&self) -> &[Task] {
        &self.abandoned
    }

    pub fn set_state(&mut self, key: impl Into<String>, value: Value) {
        self.state.insert(key.into(), value);
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            current_goal: self.goal.clone(),
            pending_tasks: self.pending.len(),
            completed_tasks: self.completed.len(),
            abandoned_tasks: self.abandoned.len(),
            state: self.state.clone(),
        }
    }
}
