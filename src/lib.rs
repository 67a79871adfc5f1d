//! UAV Route Planner Library
//!
//! Plans a route for a surveillance UAV that flies from a start point A to an
//! end point B and inspects as many objects of interest as possible within a
//! flight-time budget. Each object has a mandatory dwell time; flying costs
//! Euclidean distance over speed.
//!
//! # Features
//!
//! - Ant Colony Optimization with sequential or `rayon`-parallel ants
//! - Greedy nearest-feasible-next baseline
//! - Algorithm registry for enumerating planners
//! - JSON task persistence and seeded task generation
//! - Benchmarking with CSV export
//!
//! # Example
//!
//! ```no_run
//! use uav_route_planner::task::Task;
//! use uav_route_planner::heuristics::{AntColonyOptimization, ColonyConfig, RoutePlanner};
//!
//! // Load task
//! let task = Task::from_file("task.json").unwrap();
//!
//! // Plan a route
//! let mut aco = AntColonyOptimization::new(task, ColonyConfig::default());
//! let solution = aco.solve_route();
//!
//! println!("Inspected {} objects in {:.2}", solution.num_inspected(), solution.total_time);
//! ```

pub mod error;
pub mod task;
pub mod solution;
pub mod heuristics;
pub mod generator;
pub mod benchmark;

pub use error::TaskError;
pub use task::Task;
pub use solution::Solution;
