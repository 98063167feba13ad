// src/types.rs

use std::str::FromStr;
use serde::Deserialize;

/// How the scheduler refines the base topological order with priorities.
///
/// - `PriorityResort`: stable re-sort of the base order by
///   `(-priority, base index)`. A high-priority task may float ahead of a
///   lower-priority ancestor; equal-priority tasks keep their dependency
///   order (default).
/// - `Strict`: priority only picks among tasks whose dependencies are
///   already placed, so no task ever precedes one of its ancestors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderPolicy {
    #[default]
    #[serde(rename = "priority", alias = "priority_resort")]
    PriorityResort,
    Strict,
}

impl FromStr for OrderPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "priority" | "priority_resort" => Ok(OrderPolicy::PriorityResort),
            "strict" => Ok(OrderPolicy::Strict),
            other => Err(format!(
                "invalid ordering: {other} (expected \"priority\" or \"strict\")"
            )),
        }
    }
}
