// src/planner/breakdown.rs

//! Goal -> task breakdown.

use std::collections::HashSet;

use tracing::debug;

use crate::model::{Goal, Task, TaskName};

/// Turns a goal into a set of tasks.
///
/// Implementations must produce unique task names, and any dependency must
/// use the exact name of the task it refers to.
pub trait GoalBreakdown {
    fn breakdown(&self, goal: &Goal) -> Vec<Task>;
}

/// Default breakdown: one `main_<slug>` task for the goal, plus one task per
/// sub-goal that depends on its parent's task.
///
/// Top-level sub-goals become `sub_<i>_<slug>`; nested ones extend the index
/// path (`sub_<i>_<j>_<slug>`). Names are unique within one breakdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubGoalBreakdown;

impl GoalBreakdown for SubGoalBreakdown {
    fn breakdown(&self, goal: &Goal) -> Vec<Task> {
        let mut names = Names::default();
        let main = Task::new(names.claim(format!("main_{}", slug(&goal.description))))
            .with_description(goal.description.clone())
            .with_priority(goal.priority);
        let main_name = main.name.clone();

        let mut tasks = vec![main];
        push_sub_goals(&goal.sub_goals, &main_name, "sub", &mut names, &mut tasks);

        debug!(goal = %goal.description, tasks = tasks.len(), "goal broken down into tasks");
        tasks
    }
}

fn push_sub_goals(
    sub_goals: &[Goal],
    parent: &TaskName,
    prefix: &str,
    names: &mut Names,
    out: &mut Vec<Task>,
) {
    for (i, sub_goal) in sub_goals.iter().enumerate() {
        let path = format!("{prefix}_{i}");
        let task = Task::new(names.claim(format!("{path}_{}", slug(&sub_goal.description))))
            .with_description(sub_goal.description.clone())
            .with_priority(sub_goal.priority)
            .after(parent.clone());
        let name = task.name.clone();
        out.push(task);

        push_sub_goals(&sub_goal.sub_goals, &name, &path, names, out);
    }
}

/// Task names handed out so far. A name that is already taken gets a `_<n>`
/// suffix, starting at 2.
#[derive(Default)]
struct Names(HashSet<TaskName>);

impl Names {
    fn claim(&mut self, base: TaskName) -> TaskName {
        if self.0.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}_{n}");
            if self.0.insert(candidate.clone()) {
                debug!(name = %candidate, "task name taken; suffix added");
                return candidate;
            }
            n += 1;
        }
    }
}

fn slug(description: &str) -> String {
    description.to_lowercase().replace(' ', "_")
}
