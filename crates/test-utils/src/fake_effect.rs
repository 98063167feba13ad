use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use taskpilot::exec::{EffectFuture, TaskEffect};
use taskpilot::model::Task;

/// A fake effect that:
/// - records every task name it is asked to run, in order
/// - fails tasks listed in `always_fail` on every attempt
/// - fails tasks listed in `fail_times` that many times, then succeeds
/// - panics on tasks listed in `panic_on`
/// - succeeds otherwise.
#[derive(Debug, Default)]
pub struct ScriptedEffect {
    executed: Arc<Mutex<Vec<String>>>,
    always_fail: HashSet<String>,
    fail_times: HashMap<String, u32>,
    panic_on: HashSet<String>,
}

impl ScriptedEffect {
    pub fn new(executed: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            executed,
            ..Self::default()
        }
    }

    pub fn always_fail(mut self, task: &str) -> Self {
        self.always_fail.insert(task.to_string());
        self
    }

    pub fn fail_times(mut self, task: &str, n: u32) -> Self {
        self.fail_times.insert(task.to_string(), n);
        self
    }

    pub fn panic_on(mut self, task: &str) -> Self {
        self.panic_on.insert(task.to_string());
        self
    }
}

impl TaskEffect for ScriptedEffect {
    fn execute<'a>(&'a mut self, task: &'a Task) -> EffectFuture<'a> {
        Box::pin(async move {
            self.executed.lock().unwrap().push(task.name.clone());

            if self.panic_on.contains(&task.name) {
                panic!("scripted panic in {}", task.name);
            }
            if self.always_fail.contains(&task.name) {
                return Err(anyhow!("scripted failure for {}", task.name));
            }
            if let Some(left) = self.fail_times.get_mut(&task.name) {
                if *left > 0 {
                    *left -= 1;
                    return Err(anyhow!("scripted failure for {}", task.name));
                }
            }
            Ok(())
        })
    }
}
