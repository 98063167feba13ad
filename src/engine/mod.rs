// src/engine/mod.rs

//! Execution engine for taskpilot.
//!
//! This module ties together:
//! - the scheduler (replanned before every pop)
//! - the pending queue and the completed/abandoned sets
//! - the retry policy applied to failed tasks
//! - the run loop that drives a `TaskEffect`
//!
//! The pure, synchronous queue state lives in [`core`]; the async shell that
//! calls the effect is implemented in [`runtime`].

use crate::model::Task;

/// How failed tasks are retried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    /// How many times a failed task may be requeued. `None` retries forever.
    pub max_retries: Option<u32>,
}

impl RetryPolicy {
    pub fn unbounded() -> Self {
        Self { max_retries: None }
    }

    pub fn bounded(max_retries: u32) -> Self {
        Self {
            max_retries: Some(max_retries),
        }
    }

    /// Whether a task that has failed `attempts` times may run again.
    pub fn allows_retry(&self, attempts: u32) -> bool {
        match self.max_retries {
            Some(max) => attempts <= max,
            None => true,
        }
    }
}

/// Options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutorOptions {
    pub retry: RetryPolicy,
    /// Stop `run` after this many executions, even if tasks are pending.
    pub max_iterations: Option<u64>,
}

/// Result of a single `execute_one` call.
#[derive(Debug)]
pub enum Attempt {
    /// The task succeeded and now lives in the completed set.
    Completed,
    /// The task failed; ownership goes back to the caller.
    Failed(Task),
}

impl Attempt {
    pub fn is_success(&self) -> bool {
        matches!(self, Attempt::Completed)
    }
}

/// What happened to a failed task handed back to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requeue {
    /// Appended to the tail of the pending queue.
    Requeued { attempts: u32 },
    /// Retry budget exhausted; moved to the abandoned set together with
    /// `dependents` pending tasks that could no longer run.
    Abandoned { attempts: u32, dependents: usize },
}

/// Why `run` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The pending queue is empty.
    Drained,
    /// No goal was set; nothing ran.
    NoGoal,
    /// `max_iterations` was reached with tasks still pending.
    IterationCap,
}

/// Summary returned by `Executor::run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub stop: StopReason,
    /// Number of `execute_one` calls made by this run.
    pub iterations: u64,
    pub completed: usize,
    pub failed_attempts: u64,
    /// Tasks abandoned by this run, dependents of abandoned tasks included.
    pub abandoned: usize,
    pub pending: usize,
}

pub mod core;
pub mod runtime;
pub mod state;

pub use self::core::ExecutorCore;
pub use runtime::Executor;
pub use state::StateSnapshot;
