//! Greedy baseline: nearest feasible object next.

use crate::heuristics::RoutePlanner;
use crate::solution::Solution;
use crate::task::{Task, TravelTimes, Waypoint};
use ordered_float::OrderedFloat;

/// Nearest-feasible-next heuristic
///
/// From the current position, flies to the unvisited object with the smallest
/// `flight + dwell` time among those that still leave room to reach B. Ties go
/// to the object listed first. The route is all-or-nothing: if B cannot be
/// reached at the end, an empty solution is returned.
pub struct GreedyPlanner {
    task: Task,
    waypoints: Vec<Waypoint>,
    times: TravelTimes,
}

impl GreedyPlanner {
    pub fn new(task: Task) -> Self {
        let waypoints = task.waypoints();
        let times = TravelTimes::new(&waypoints, task.speed(), None);
        GreedyPlanner { task, waypoints, times }
    }

    fn find_nearest(&self, current: usize, visited: &[bool], elapsed: f64) -> Option<usize> {
        let end = self.waypoints.len() - 1;
        let budget = self.task.time_budget();

        (1..end)
            .filter(|&j| !visited[j])
            .filter(|&j| {
                elapsed + self.times.get(current, j) + self.waypoints[j].dwell + self.times.get(j, end)
                    <= budget
            })
            .min_by_key(|&j| OrderedFloat(self.times.get(current, j) + self.waypoints[j].dwell))
    }

    pub fn construct(&self) -> Solution {
        let start = std::time::Instant::now();
        let end = self.waypoints.len() - 1;
        let budget = self.task.time_budget();

        let mut path = vec![0];
        let mut visited = vec![false; self.waypoints.len()];
        visited[0] = true;
        let mut current = 0;
        let mut elapsed = 0.0;

        while elapsed < budget {
            match self.find_nearest(current, &visited, elapsed) {
                Some(next) => {
                    elapsed += self.times.get(current, next) + self.waypoints[next].dwell;
                    visited[next] = true;
                    path.push(next);
                    current = next;
                }
                None => break,
            }
        }

        let to_end = self.times.get(current, end);
        let mut solution = if elapsed + to_end <= budget {
            path.push(end);
            Solution::from_path(
                &self.waypoints,
                &self.times,
                self.task.speed(),
                &path,
                elapsed + to_end,
                self.name(),
            )
        } else {
            log::info!("Greedy: end point unreachable within budget, discarding route");
            let mut empty = Solution::new();
            empty.algorithm = self.name().to_string();
            empty
        };

        solution.computation_time = start.elapsed().as_secs_f64();
        solution
    }
}

impl RoutePlanner for GreedyPlanner {
    fn solve_route(&mut self) -> Solution {
        self.construct()
    }

    fn name(&self) -> &str {
        "Greedy"
    }
}
