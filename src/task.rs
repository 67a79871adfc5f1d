//! Module for describing UAV surveillance tasks.
//!
//! A task fixes a start point A, an end point B, a list of objects to inspect
//! (each with a mandatory dwell time), the vehicle speed and the flight-time
//! budget. Solvers derive a waypoint sequence `[A, J.., B]` and a travel-time
//! matrix from it.

use crate::error::TaskError;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// A location on the plane.
///
/// Points compare by IEEE total order so they can be kept in ordered sets.
/// Serialized as a `[x, y]` pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    fn key(&self) -> (OrderedFloat<f64>, OrderedFloat<f64>) {
        (OrderedFloat(self.x), OrderedFloat(self.y))
    }

    fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x >= 0.0 && self.y >= 0.0
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Point { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Point {}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An object of interest: a location plus its inspection dwell time.
/// Serialized as a `[x, y, dwell]` triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct InspectionObject {
    pub location: Point,
    pub dwell: f64,
}

impl InspectionObject {
    pub fn new(x: f64, y: f64, dwell: f64) -> Self {
        InspectionObject { location: Point::new(x, y), dwell }
    }
}

impl From<[f64; 3]> for InspectionObject {
    fn from([x, y, dwell]: [f64; 3]) -> Self {
        InspectionObject::new(x, y, dwell)
    }
}

impl From<InspectionObject> for [f64; 3] {
    fn from(o: InspectionObject) -> Self {
        [o.location.x, o.location.y, o.dwell]
    }
}

/// A point the vehicle may pass through: start, end, or an inspected object.
/// Start and end carry zero dwell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub location: Point,
    pub dwell: f64,
}

/// A complete route-planning task.
///
/// The persisted form is the flat record `{n, A, B, J, v, T}`. Fields are
/// read-only once the task is built; use [`Task::new`] or one of the loaders,
/// which validate the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Number of objects
    n: usize,
    /// Start point
    #[serde(rename = "A")]
    start: Point,
    /// End point
    #[serde(rename = "B")]
    end: Point,
    /// Objects of interest, in input order
    #[serde(rename = "J")]
    objects: Vec<InspectionObject>,
    /// Vehicle speed
    #[serde(rename = "v")]
    speed: f64,
    /// Flight-time budget
    #[serde(rename = "T")]
    time_budget: f64,
}

impl Task {
    /// Build and validate a task. `n` is taken from the object list.
    pub fn new(
        start: Point,
        end: Point,
        objects: Vec<InspectionObject>,
        speed: f64,
        time_budget: f64,
    ) -> Result<Self, TaskError> {
        let task = Task {
            n: objects.len(),
            start,
            end,
            objects,
            speed,
            time_budget,
        };
        task.validate()?;
        Ok(task)
    }

    /// Parse a task from its JSON record
    pub fn from_json_str(json: &str) -> Result<Self, TaskError> {
        let task: Task = serde_json::from_str(json)?;
        task.validate()?;
        Ok(task)
    }

    /// Load a task from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TaskError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| TaskError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Serialize the task to its JSON record
    pub fn to_json_string(&self) -> Result<String, TaskError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the task to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TaskError> {
        let path = path.as_ref();
        let json = self.to_json_string()?;
        fs::write(path, json).map_err(|source| TaskError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn validate(&self) -> Result<(), TaskError> {
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(TaskError::InvalidSpeed(self.speed));
        }
        if !(self.time_budget.is_finite() && self.time_budget > 0.0) {
            return Err(TaskError::InvalidTimeBudget(self.time_budget));
        }
        if self.n != self.objects.len() {
            return Err(TaskError::ObjectCountMismatch {
                declared: self.n,
                actual: self.objects.len(),
            });
        }

        let labelled = [("start point A", self.start), ("end point B", self.end)];
        for (what, p) in labelled {
            if !p.is_valid() {
                return Err(TaskError::InvalidCoordinate { what: what.to_string(), x: p.x, y: p.y });
            }
        }
        for (index, obj) in self.objects.iter().enumerate() {
            let p = obj.location;
            if !p.is_valid() {
                return Err(TaskError::InvalidCoordinate {
                    what: format!("object {}", index),
                    x: p.x,
                    y: p.y,
                });
            }
            if !(obj.dwell.is_finite() && obj.dwell >= 0.0) {
                return Err(TaskError::InvalidDwell { index, dwell: obj.dwell });
            }
        }
        Ok(())
    }

    pub fn num_objects(&self) -> usize {
        self.n
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn objects(&self) -> &[InspectionObject] {
        &self.objects
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn time_budget(&self) -> f64 {
        self.time_budget
    }

    /// Waypoint sequence `[A, J[0], .., J[n-1], B]`.
    /// Index 0 is the start and index `n + 1` is the end.
    pub fn waypoints(&self) -> Vec<Waypoint> {
        let mut waypoints = Vec::with_capacity(self.n + 2);
        waypoints.push(Waypoint { location: self.start, dwell: 0.0 });
        waypoints.extend(self.objects.iter().map(|o| Waypoint {
            location: o.location,
            dwell: o.dwell,
        }));
        waypoints.push(Waypoint { location: self.end, dwell: 0.0 });
        waypoints
    }

    /// Flight time of the direct A -> B leg (unrounded)
    pub fn direct_time(&self) -> f64 {
        self.start.distance(&self.end) / self.speed
    }

    /// Get statistics about the task
    pub fn statistics(&self) -> TaskStatistics {
        let points: Vec<Point> = self.waypoints().iter().map(|w| w.location).collect();

        let mut distances: Vec<f64> = Vec::new();
        for i in 0..points.len() {
            for j in i + 1..points.len() {
                distances.push(points[i].distance(&points[j]));
            }
        }
        let avg_distance = if distances.is_empty() {
            0.0
        } else {
            distances.iter().sum::<f64>() / distances.len() as f64
        };
        let max_distance = distances.iter().cloned().fold(0.0, f64::max);

        TaskStatistics {
            num_objects: self.n,
            speed: self.speed,
            time_budget: self.time_budget,
            total_dwell: self.objects.iter().map(|o| o.dwell).sum(),
            direct_time: self.direct_time(),
            avg_distance,
            max_distance,
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Task(n={}, A={}, B={}, v={}, T={})",
            self.n, self.start, self.end, self.speed, self.time_budget
        )
    }
}

/// Statistics about a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatistics {
    pub num_objects: usize,
    pub speed: f64,
    pub time_budget: f64,
    pub total_dwell: f64,
    pub direct_time: f64,
    pub avg_distance: f64,
    pub max_distance: f64,
}

impl std::fmt::Display for TaskStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  Objects: {}", self.num_objects)?;
        writeln!(f, "  Speed: {}", self.speed)?;
        writeln!(f, "  Time budget: {}", self.time_budget)?;
        writeln!(f, "  Total dwell: {:.2}", self.total_dwell)?;
        writeln!(f, "  Direct A-B time: {:.2}", self.direct_time)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)
    }
}

/// Pairwise flight times between waypoints, `distance / speed`.
///
/// Built once per solver and never mutated.
#[derive(Debug, Clone)]
pub struct TravelTimes {
    matrix: Vec<Vec<f64>>,
}

impl TravelTimes {
    /// Compute the matrix, optionally rounding each entry to `decimals` places.
    pub fn new(waypoints: &[Waypoint], speed: f64, decimals: Option<i32>) -> Self {
        let k = waypoints.len();
        let mut matrix = vec![vec![0.0; k]; k];

        for i in 0..k {
            for j in 0..k {
                if i != j {
                    let time = waypoints[i].location.distance(&waypoints[j].location) / speed;
                    matrix[i][j] = match decimals {
                        Some(d) => round_to(time, d),
                        None => time,
                    };
                }
            }
        }

        TravelTimes { matrix }
    }

    /// Flight time from waypoint `i` to waypoint `j`
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.matrix[i][j]
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
