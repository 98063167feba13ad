// src/model/mod.rs

//! Plain data records shared by the scheduler, planner and executor.

pub mod goal;
pub mod task;

pub use goal::Goal;
pub use task::{Task, TaskName, TaskStatus};
