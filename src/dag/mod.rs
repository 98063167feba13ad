// src/dag/mod.rs

//! Dependency graph and scheduling.
//!
//! - [`graph`] holds the adjacency-list graph of task names, with cycle
//!   detection and topological sorting.
//! - [`scheduler`] turns the graph into a linear, priority-refined execution
//!   order.

pub mod graph;
pub mod scheduler;

pub use graph::{CycleError, DependencyGraph};
pub use scheduler::Scheduler;
