// src/dag/graph.rs

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{Task, TaskName};

/// The dependency graph contains at least one cycle.
///
/// `cycle` lists the nodes along one offending cycle, with the first node
/// repeated at the end (e.g. `["A", "B", "A"]`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("task dependencies contain a cycle: {}", .cycle.join(" -> "))]
pub struct CycleError {
    pub cycle: Vec<TaskName>,
}

/// Internal node structure: stores immediate deps and dependents as indices
/// into `DependencyGraph::nodes`.
#[derive(Debug, Clone)]
struct DagNode {
    name: TaskName,
    priority: i32,
    /// Direct dependencies: nodes that must complete before this one.
    deps: Vec<usize>,
    /// Direct dependents: nodes that depend on this one.
    dependents: Vec<usize>,
}

/// In-memory DAG keyed by task name.
///
/// Nodes keep the order in which tasks were first seen; every traversal that
/// has to break a tie does so by that insertion index, which keeps the
/// resulting orders deterministic.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<DagNode>,
    index: HashMap<TaskName, usize>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a task set.
    ///
    /// Edges whose dependency is not itself in `tasks` are dropped. A task
    /// name seen twice updates the node's priority and merges its edges.
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let tasks: Vec<&Task> = tasks.into_iter().collect();
        let mut graph = Self::new();

        // First pass: nodes.
        for task in &tasks {
            match graph.index.get(&task.name) {
                Some(&idx) => {
                    warn!(task = %task.name, "duplicate task name in graph input; last one wins");
                    graph.nodes[idx].priority = task.priority;
                }
                None => {
                    graph.index.insert(task.name.clone(), graph.nodes.len());
                    graph.nodes.push(DagNode {
                        name: task.name.clone(),
                        priority: task.priority,
                        deps: Vec::new(),
                        dependents: Vec::new(),
                    });
                }
            }
        }

        // Second pass: edges dep -> task, known nodes only.
        for task in &tasks {
            let to = graph.index[&task.name];
            for dep in &task.dependencies {
                match graph.index.get(dep) {
                    Some(&from) => graph.add_edge(from, to),
                    None => debug!(
                        task = %task.name,
                        dep = %dep,
                        "dependency not in working set; edge dropped"
                    ),
                }
            }
        }

        graph
    }

    fn add_edge(&mut self, from: usize, to: usize) {
        if self.nodes[from].dependents.contains(&to) {
            return;
        }
        self.nodes[from].dependents.push(to);
        self.nodes[to].deps.push(from);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.dependents.len()).sum()
    }

    pub fn priority_of(&self, name: &str) -> Option<i32> {
        self.index.get(name).map(|&i| self.nodes[i].priority)
    }

    /// Immediate dependencies of a task that are present in the graph.
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        self.neighbours(name, |n| &n.deps)
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        self.neighbours(name, |n| &n.dependents)
    }

    fn neighbours<'a>(&'a self, name: &str, pick: impl Fn(&'a DagNode) -> &'a Vec<usize>) -> Vec<&'a str> {
        match self.index.get(name) {
            Some(&i) => pick(&self.nodes[i])
                .iter()
                .map(|&j| self.nodes[j].name.as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn is_acyclic(&self) -> bool {
        self.find_cycle().is_none()
    }

    /// Iterative three-colour DFS. Returns one cycle, if any.
    pub fn find_cycle(&self) -> Option<Vec<TaskName>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            OnStack,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.nodes.len()];

        for root in 0..self.nodes.len() {
            if marks[root] != Mark::Unvisited {
                continue;
            }

            // (node, next dependent to look at)
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
            marks[root] = Mark::OnStack;

            while let Some(top) = stack.last_mut() {
                let node = top.0;
                let dependents = &self.nodes[node].dependents;
                if top.1 < dependents.len() {
                    let child = dependents[top.1];
                    top.1 += 1;
                    match marks[child] {
                        Mark::Unvisited => {
                            marks[child] = Mark::OnStack;
                            stack.push((child, 0));
                        }
                        Mark::OnStack => {
                            let start = stack
                                .iter()
                                .position(|&(n, _)| n == child)
                                .unwrap_or(0);
                            let mut cycle: Vec<TaskName> = stack[start..]
                                .iter()
                                .map(|&(n, _)| self.nodes[n].name.clone())
                                .collect();
                            cycle.push(self.nodes[child].name.clone());
                            return Some(cycle);
                        }
                        Mark::Done => {}
                    }
                } else {
                    marks[node] = Mark::Done;
                    stack.pop();
                }
            }
        }

        None
    }

    /// Kahn's algorithm; among ready nodes the earliest inserted goes first.
    pub fn topological_order(&self) -> Result<Vec<TaskName>, CycleError> {
        self.kahn(|_| ())
    }

    /// Kahn's algorithm where the ready set is ordered by descending priority,
    /// then insertion order. Never emits a node before any of its ancestors.
    pub fn priority_topological_order(&self) -> Result<Vec<TaskName>, CycleError> {
        self.kahn(|i| Reverse(self.nodes[i].priority))
    }

    fn kahn<K: Ord>(&self, key: impl Fn(usize) -> K) -> Result<Vec<TaskName>, CycleError> {
        let mut in_degree: Vec<usize> = self.nodes.iter().map(|n| n.deps.len()).collect();
        let mut ready: BinaryHeap<Reverse<(K, usize)>> = in_degree
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d == 0)
            .map(|(i, _)| Reverse((key(i), i)))
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(Reverse((_, node))) = ready.pop() {
            order.push(self.nodes[node].name.clone());
            for &child in &self.nodes[node].dependents {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    ready.push(Reverse((key(child), child)));
                }
            }
        }

        if order.len() != self.nodes.len() {
            let cycle = self.find_cycle().unwrap_or_default();
            return Err(CycleError { cycle });
        }

        Ok(order)
    }
}
