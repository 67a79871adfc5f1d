//! Route planners for the UAV surveillance task.
//!
//! This module exports the colony optimizer, the greedy baseline and the
//! registry that enumerates them.

pub mod aco;
pub mod greedy;
pub mod registry;

pub use aco::*;
pub use greedy::*;
pub use registry::*;

use crate::solution::Solution;

/// A solver bound to one task
pub trait RoutePlanner {
    fn solve_route(&mut self) -> Solution;
    fn name(&self) -> &str;
}
