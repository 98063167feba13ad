// src/exec/backend.rs

//! Pluggable execution-effect abstraction.
//!
//! The executor talks to a `TaskEffect` instead of doing any work itself.
//! Task payloads are opaque to this crate, so the effect is whatever the
//! caller plugs in:
//!
//! - `SimulatedEffect` is the implementation used by the `taskpilot` binary.
//!   It succeeds unless told to fail a task a number of times first.
//! - Tests can provide their own `TaskEffect` that records calls, fails on
//!   demand, or panics.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use anyhow::anyhow;
use tracing::debug;

use crate::model::{Task, TaskName};

/// Future returned by [`TaskEffect::execute`].
pub type EffectFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

/// Trait abstracting how a task's work is performed.
///
/// An `Err` (or a panic) means the attempt failed; the executor captures
/// both and never lets them escape.
pub trait TaskEffect: Send {
    fn execute<'a>(&'a mut self, task: &'a Task) -> EffectFuture<'a>;
}

/// Effect that performs no work.
///
/// Each task listed in `fail_attempts` fails that many times before it
/// succeeds; every other task succeeds on the first attempt.
#[derive(Debug, Clone, Default)]
pub struct SimulatedEffect {
    fail_attempts: HashMap<TaskName, u32>,
    failures: HashMap<TaskName, u32>,
}

impl SimulatedEffect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failures(fail_attempts: HashMap<TaskName, u32>) -> Self {
        Self {
            fail_attempts,
            failures: HashMap::new(),
        }
    }

    /// Number of simulated failures produced so far for `task`.
    pub fn failures_of(&self, task: &str) -> u32 {
        self.failures.get(task).copied().unwrap_or(0)
    }
}

impl TaskEffect for SimulatedEffect {
    fn execute<'a>(&'a mut self, task: &'a Task) -> EffectFuture<'a> {
        Box::pin(async move {
            let budget = self.fail_attempts.get(&task.name).copied().unwrap_or(0);
            let failed = self.failures.entry(task.name.clone()).or_insert(0);

            if *failed < budget {
                *failed += 1;
                debug!(task = %task.name, failure = *failed, budget, "simulated failure");
                return Err(anyhow!("simulated failure {} of {}", failed, budget));
            }

            Ok(())
        })
    }
}
