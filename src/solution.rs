//! Solution representation for route planning.
//!
//! A solution is the record a solver hands back to its caller: the traversed
//! route, the set of inspected objects, the total mission time and per-leg
//! distances and flight times.

use crate::task::{Point, TravelTimes, Waypoint};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BTreeSet;

/// Result of a single solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Points actually traversed, starting at A and ending at B
    pub route: Vec<Point>,
    /// Locations of the inspected objects (A and B excluded)
    pub inspected: BTreeSet<Point>,
    /// Flight time plus dwell time over the whole route
    pub total_time: f64,
    /// Physical length of each leg
    pub distances: Vec<f64>,
    /// Flight time of each leg
    pub flight_times: Vec<f64>,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Number of iterations (if applicable)
    pub iterations: Option<usize>,
}

impl Solution {
    /// Create an empty solution: no route, nothing inspected, zero time
    pub fn new() -> Self {
        Solution {
            route: Vec::new(),
            inspected: BTreeSet::new(),
            total_time: 0.0,
            distances: Vec::new(),
            flight_times: Vec::new(),
            algorithm: String::new(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Build a solution from a waypoint-index path `[0, .., k-1]`.
    ///
    /// Leg flight times are read from `times`; leg distances are
    /// `flight_time * speed`.
    pub fn from_path(
        waypoints: &[Waypoint],
        times: &TravelTimes,
        speed: f64,
        path: &[usize],
        total_time: f64,
        algorithm: &str,
    ) -> Self {
        let last = waypoints.len().saturating_sub(1);
        let route = path.iter().map(|&i| waypoints[i].location).collect();
        let inspected = path
            .iter()
            .filter(|&&i| i != 0 && i != last)
            .map(|&i| waypoints[i].location)
            .collect();
        let flight_times: Vec<f64> = path.windows(2).map(|leg| times.get(leg[0], leg[1])).collect();
        let distances = flight_times.iter().map(|t| t * speed).collect();

        Solution {
            route,
            inspected,
            total_time,
            distances,
            flight_times,
            algorithm: algorithm.to_string(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Whether the solver found no route at all
    pub fn is_empty(&self) -> bool {
        self.route.is_empty()
    }

    /// Number of inspected objects
    pub fn num_inspected(&self) -> usize {
        self.inspected.len()
    }

    /// Total physical route length
    pub fn total_distance(&self) -> f64 {
        self.distances.iter().sum()
    }

    pub fn quality(&self) -> TourQuality {
        TourQuality::new(self.num_inspected(), self.total_time)
    }
}

impl Default for Solution {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Inspected: {}", self.num_inspected())?;
        writeln!(f, "  Total time: {:.2}", self.total_time)?;
        writeln!(f, "  Total distance: {:.2}", self.total_distance())?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        if let Some(iter) = self.iterations {
            writeln!(f, "  Iterations: {}", iter)?;
        }
        let route: Vec<String> = self.route.iter().map(|p| p.to_string()).collect();
        writeln!(f, "  Route: {}", route.join(" -> "))
    }
}

/// Ranking of tours: more inspected objects first, then lower total time.
///
/// `Ord` is "better is greater", so `a > b` means `a` beats `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TourQuality {
    pub inspected: usize,
    pub total_time: OrderedFloat<f64>,
}

impl TourQuality {
    pub fn new(inspected: usize, total_time: f64) -> Self {
        TourQuality { inspected, total_time: OrderedFloat(total_time) }
    }

    /// Quality of "no tour yet": beaten by any finite tour
    pub fn worst() -> Self {
        Self::new(0, f64::INFINITY)
    }

    fn key(&self) -> (usize, Reverse<OrderedFloat<f64>>) {
        (self.inspected, Reverse(self.total_time))
    }
}

impl PartialOrd for TourQuality {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TourQuality {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}
