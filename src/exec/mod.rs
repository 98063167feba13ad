// src/exec/mod.rs

//! Execution layer.
//!
//! - [`backend`] provides the `TaskEffect` trait the executor calls for each
//!   attempt, and `SimulatedEffect`, the no-op implementation used by the
//!   binary.

pub mod backend;

pub use backend::{EffectFuture, SimulatedEffect, TaskEffect};
