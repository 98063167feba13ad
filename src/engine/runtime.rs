// src/engine/runtime.rs

use std::fmt;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde_json::Value;
use tracing::{Instrument, Span, debug, error, info, info_span, warn};

use crate::dag::Scheduler;
use crate::errors::Result;
use crate::exec::TaskEffect;
use crate::model::{Goal, Task};

use super::core::ExecutorCore;
use super::state::StateSnapshot;
use super::{Attempt, ExecutorOptions, Requeue, RunSummary, StopReason};

/// Drives tasks from the pending queue to completion, replanning before every
/// pop and retrying failed tasks.
///
/// This is the async shell around `ExecutorCore`, which owns all queue
/// state. The shell calls the `TaskEffect` and records what happened.
///
/// Log output goes through `span`, which is injected at construction
/// (`with_span`) and attached to every future the executor runs.
pub struct Executor<E: TaskEffect> {
    core: ExecutorCore,
    effect: E,
    span: Span,
}

impl<E: TaskEffect> fmt::Debug for Executor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: TaskEffect> Executor<E> {
    pub fn new(scheduler: Scheduler, effect: E, options: ExecutorOptions) -> Self {
        Self {
            core: ExecutorCore::new(scheduler, options),
            effect,
            span: info_span!("executor"),
        }
    }

    /// Replace the span all executor logging is recorded under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn core(&self) -> &ExecutorCore {
        &self.core
    }

    pub fn effect(&self) -> &E {
        &self.effect
    }

    /// Replace the current goal. The task queue is left alone.
    pub fn set_goal(&mut self, description: impl Into<String>, priority: i32) {
        self.set_goal_record(Goal::new(description, priority));
    }

    pub fn set_goal_record(&mut self, goal: Goal) {
        let _guard = self.span.enter();
        self.core.set_goal(goal);
    }

    pub fn add_task(&mut self, task: Task) -> Result<()> {
        let _guard = self.span.enter();
        self.core.add_task(task)
    }

    pub fn plan_next(&mut self) -> Result<()> {
        let _guard = self.span.enter();
        self.core.plan_next()
    }

    pub fn set_state(&mut self, key: impl Into<String>, value: Value) {
        self.core.set_state(key, value);
    }

    pub fn state(&self) -> StateSnapshot {
        self.core.snapshot()
    }

    /// Run one attempt of `task`.
    ///
    /// On success the task is marked completed, stamped and moved into the
    /// completed set. Any error or panic raised by the effect marks the task
    /// failed and hands it back in [`Attempt::Failed`]; nothing propagates.
    pub async fn execute_one(&mut self, task: Task) -> Attempt {
        let span = self.span.clone();
        self.execute_one_inner(task).instrument(span).await
    }

    async fn execute_one_inner(&mut self, mut task: Task) -> Attempt {
        task.attempts += 1;
        info!(task = %task.name, attempt = task.attempts, "executing task");

        let outcome = AssertUnwindSafe(self.effect.execute(&task))
            .catch_unwind()
            .await;

        let fault = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(format!("{err:#}")),
            Err(panic) => Some(panic_message(panic.as_ref())),
        };

        match fault {
            None => {
                task.mark_completed();
                info!(task = %task.name, attempt = task.attempts, "task completed");
                self.core.complete(task);
                Attempt::Completed
            }
            Some(reason) => {
                task.mark_failed();
                error!(task = %task.name, attempt = task.attempts, error = %reason, "error executing task");
                Attempt::Failed(task)
            }
        }
    }

    /// Main execution loop.
    ///
    /// - Without a goal, logs an error and returns `StopReason::NoGoal`
    ///   with the queue untouched.
    /// - Otherwise replans, pops the head and executes it until the queue is
    ///   empty. Failed tasks go back to the tail (or are abandoned once the
    ///   retry policy says so, taking their pending dependents with them).
    /// - `max_iterations` bounds the number of executions.
    ///
    /// A cycle among pending tasks aborts the run with `DagCycle`.
    ///
    /// With no retry bound and no iteration cap, a task that never succeeds
    /// keeps this loop running forever.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let span = self.span.clone();
        self.run_inner().instrument(span).await
    }

    async fn run_inner(&mut self) -> Result<RunSummary> {
        let mut summary = RunSummary {
            stop: StopReason::Drained,
            iterations: 0,
            completed: 0,
            failed_attempts: 0,
            abandoned: 0,
            pending: self.core.pending_len(),
        };

        if self.core.goal().is_none() {
            error!("no goal set; cannot run");
            summary.stop = StopReason::NoGoal;
            return Ok(summary);
        }

        let max_iterations = self.core.options().max_iterations;
        let abandoned_before = self.core.abandoned_tasks().len();

        while self.core.has_pending() {
            if let Some(cap) = max_iterations {
                if summary.iterations >= cap {
                    warn!(cap, pending = self.core.pending_len(), "iteration cap reached; stopping run");
                    summary.stop = StopReason::IterationCap;
                    break;
                }
            }

            self.core.plan_next()?;

            let Some(task) = self.core.pop_next() else {
                break;
            };
            summary.iterations += 1;

            match self.execute_one_inner(task).await {
                Attempt::Completed => summary.completed += 1,
                Attempt::Failed(task) => {
                    summary.failed_attempts += 1;
                    if let Requeue::Abandoned { dependents, .. } = self.core.requeue(task) {
                        if dependents > 0 {
                            debug!(dependents, "dependents abandoned with failed task");
                        }
                    }
                }
            }
        }

        summary.pending = self.core.pending_len();
        summary.abandoned = self.core.abandoned_tasks().len() - abandoned_before;
        if summary.stop == StopReason::Drained {
            info!(
                iterations = summary.iterations,
                abandoned = summary.abandoned,
                "all tasks completed"
            );
        }
        debug!(?summary, "run finished");

        Ok(summary)
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic in task effect".to_string()
    }
}
