//! Random task generation.
//!
//! Places A on the left edge and B on the right edge of a square field of
//! side `field`, then scatters objects with unique integer coordinates and
//! dwell times between 4 and 12.

use crate::error::TaskError;
use crate::task::{InspectionObject, Point, Task};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

const MIN_DWELL: u32 = 4;
const MAX_DWELL: u32 = 12;

/// Seeded generator of random tasks
pub struct TaskGenerator {
    rng: ChaCha8Rng,
}

impl TaskGenerator {
    pub fn new(seed: u64) -> Self {
        TaskGenerator { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Generate a task with `n` objects on a `field x field` grid.
    pub fn generate(&mut self, n: usize, speed: f64, time_budget: f64, field: u32) -> Result<Task, TaskError> {
        let side = field as u64 + 1;
        if side * side < n as u64 + 2 {
            return Err(TaskError::FieldTooSmall { field, requested: n });
        }

        let start = Point::new(0.0, self.rng.gen_range(0..=field) as f64);
        let end = Point::new(field as f64, self.rng.gen_range(0..=field) as f64);

        let mut taken: HashSet<Point> = HashSet::new();
        taken.insert(start);
        taken.insert(end);

        let mut objects = Vec::with_capacity(n);
        while objects.len() < n {
            let location = Point::new(
                self.rng.gen_range(0..=field) as f64,
                self.rng.gen_range(0..=field) as f64,
            );
            if !taken.insert(location) {
                continue;
            }
            let dwell = self.rng.gen_range(MIN_DWELL..=MAX_DWELL) as f64;
            objects.push(InspectionObject { location, dwell });
        }

        log::debug!("Generated task with {} objects on a {}x{} field", n, field, field);
        Task::new(start, end, objects, speed, time_budget)
    }
}
