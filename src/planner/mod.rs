// src/planner/mod.rs

//! Planning collaborators that sit in front of the scheduler.

pub mod breakdown;

pub use breakdown::{GoalBreakdown, SubGoalBreakdown};
