// src/dag/scheduler.rs

use std::cmp::Reverse;
use std::collections::HashMap;

use tracing::debug;

use crate::dag::graph::{CycleError, DependencyGraph};
use crate::model::{Task, TaskName};
use crate::types::OrderPolicy;

/// Scheduler holds the dependency graph of the current task set and turns it
/// into a single linear execution order.
///
/// It is responsible for:
/// - rebuilding the graph from a task set (`build_graph`)
/// - rejecting cyclic task sets (`is_acyclic`, `compute_order`)
/// - ordering tasks so dependencies run first and higher priorities are
///   preferred
///
/// The scheduler performs no IO and keeps no state besides the last graph.
#[derive(Debug, Default)]
pub struct Scheduler {
    graph: DependencyGraph,
    policy: OrderPolicy,
}

impl Scheduler {
    pub fn new(policy: OrderPolicy) -> Self {
        Self {
            graph: DependencyGraph::new(),
            policy,
        }
    }

    pub fn policy(&self) -> OrderPolicy {
        self.policy
    }

    /// The graph built by the last `build_graph` call.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Discard the current graph and rebuild it from `tasks`.
    pub fn build_graph<'a>(&mut self, tasks: impl IntoIterator<Item = &'a Task>) {
        self.graph = DependencyGraph::from_tasks(tasks);
        debug!(
            nodes = self.graph.len(),
            edges = self.graph.edge_count(),
            "scheduler: dependency graph rebuilt"
        );
    }

    pub fn is_acyclic(&self) -> bool {
        self.graph.is_acyclic()
    }

    /// Compute the execution order of the current graph.
    ///
    /// Fails with [`CycleError`] if the graph is cyclic; no partial order is
    /// ever returned.
    pub fn compute_order(&self) -> Result<Vec<TaskName>, CycleError> {
        if self.graph.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(cycle) = self.graph.find_cycle() {
            return Err(CycleError { cycle });
        }

        match self.policy {
            OrderPolicy::PriorityResort => {
                let base = self.graph.topological_order()?;
                let mut keyed: Vec<(Reverse<i32>, usize, TaskName)> = base
                    .into_iter()
                    .enumerate()
                    .map(|(idx, name)| {
                        let priority = self.graph.priority_of(&name).unwrap_or_default();
                        (Reverse(priority), idx, name)
                    })
                    .collect();
                keyed.sort_by_key(|(priority, idx, _)| (*priority, *idx));
                Ok(keyed.into_iter().map(|(_, _, name)| name).collect())
            }
            OrderPolicy::Strict => self.graph.priority_topological_order(),
        }
    }

    /// Rough effort estimate: `1/priority + 0.2 * |dependencies|`.
    ///
    /// Returns `None` for a zero priority.
    pub fn estimate_effort(task: &Task) -> Option<f64> {
        if task.priority == 0 {
            return None;
        }
        let base_time = 1.0 / f64::from(task.priority);
        let dependency_factor = task.dependencies.len() as f64 * 0.2;
        Some(base_time + dependency_factor)
    }

    /// `build_graph` + `compute_order`, mapped back onto the input tasks.
    pub fn optimize_order<'a>(&mut self, tasks: &'a [Task]) -> Result<Vec<&'a Task>, CycleError> {
        self.build_graph(tasks);
        let order = self.compute_order()?;

        let by_name: HashMap<&str, &Task> = tasks.iter().map(|t| (t.name.as_str(), t)).collect();
        Ok(order
            .iter()
            .filter_map(|name| by_name.get(name.as_str()).copied())
            .collect())
    }
}
