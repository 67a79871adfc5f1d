//! Ant Colony Optimization for UAV route planning.
//!
//! Each ant starts at A and keeps flying to an unvisited object while the
//! object can still be inspected and B reached within the time budget. The
//! next object is drawn by roulette wheel from `tau^alpha * eta^beta`, where
//! `eta` is the inverse of flight time plus dwell time. Every tour deposits
//! `visited / normalization` on its edges; the whole matrix evaporates once
//! per iteration.
//!
//! Ants either run one after another, each deposit landing before the next
//! ant starts, or in parallel with `rayon`, deposits applied once every ant of
//! the iteration has returned.

use crate::heuristics::RoutePlanner;
use crate::solution::{Solution, TourQuality};
use crate::task::{Task, TravelTimes, Waypoint};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::BTreeSet;

/// Travel times are rounded to this many decimals before the search
pub const TRAVEL_TIME_DECIMALS: i32 = 2;

/// ACO configuration parameters
#[derive(Debug, Clone)]
pub struct ColonyConfig {
    /// Pheromone importance (a)
    pub alpha: f64,
    /// Heuristic importance (b)
    pub beta: f64,
    /// Evaporation rate (p), in [0, 1]
    pub evaporation_rate: f64,
    /// Number of ants per iteration (m)
    pub num_ants: usize,
    /// Deposit normalization constant; `None` means `objects + 2`
    pub normalization: Option<f64>,
    /// Initial pheromone level (t0)
    pub initial_pheromone: f64,
    /// Number of iterations
    pub max_iterations: usize,
    /// Maximum consecutive iterations without improvement
    pub max_no_improve: usize,
    /// Random seed
    pub seed: u64,
    /// Build the tours of one iteration in parallel
    pub parallel: bool,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        ColonyConfig {
            alpha: 0.05,
            beta: 2.5,
            evaporation_rate: 0.01,
            num_ants: 10,
            normalization: None,
            initial_pheromone: 0.01,
            max_iterations: 100,
            max_no_improve: 10,
            seed: 42,
            parallel: false,
        }
    }
}

/// One ant's tour as waypoint indices, `0` (A) first and B last
#[derive(Debug, Clone)]
struct Tour {
    path: Vec<usize>,
    total_time: f64,
}

impl Tour {
    fn visited(&self) -> usize {
        self.path.len().saturating_sub(2)
    }

    fn quality(&self) -> TourQuality {
        TourQuality::new(self.visited(), self.total_time)
    }

    fn visited_set(&self) -> BTreeSet<usize> {
        let inner = self.path.len().saturating_sub(1);
        self.path[1..inner].iter().copied().collect()
    }
}

/// How an iteration's best tour compares with the best tour so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    /// Strictly better, or no incumbent yet
    Improved,
    /// Not better and visiting the same objects
    Repeated,
    /// Not better but visiting a different object set
    Diverged,
}

impl Progress {
    fn of(candidate: &Tour, incumbent: Option<&Tour>) -> Self {
        match incumbent {
            Some(incumbent) if candidate.quality() <= incumbent.quality() => {
                if candidate.visited_set() == incumbent.visited_set() {
                    Progress::Repeated
                } else {
                    Progress::Diverged
                }
            }
            _ => Progress::Improved,
        }
    }

    /// Stagnation counter after this iteration
    fn next_count(self, count: usize) -> usize {
        match self {
            Progress::Repeated => count + 1,
            Progress::Improved | Progress::Diverged => 0,
        }
    }
}

/// Ant Colony Optimization solver
pub struct AntColonyOptimization {
    config: ColonyConfig,
    task: Task,
    waypoints: Vec<Waypoint>,
    times: TravelTimes,
    /// `(1 / (flight + dwell))^beta` per edge
    heuristic: Vec<Vec<f64>>,
    pheromone: Vec<Vec<f64>>,
    convergence: Vec<TourQuality>,
}

impl AntColonyOptimization {
    pub fn new(task: Task, config: ColonyConfig) -> Self {
        let waypoints = task.waypoints();
        let k = waypoints.len();
        let times = TravelTimes::new(&waypoints, task.speed(), Some(TRAVEL_TIME_DECIMALS));

        let mut heuristic = vec![vec![0.0; k]; k];
        for i in 0..k {
            for j in 0..k {
                if i != j {
                    let cost = times.get(i, j) + waypoints[j].dwell;
                    let eta = if cost > 0.0 { 1.0 / cost } else { 1e6 };
                    heuristic[i][j] = eta.powf(config.beta);
                }
            }
        }

        let pheromone = vec![vec![config.initial_pheromone; k]; k];

        AntColonyOptimization {
            config,
            task,
            waypoints,
            times,
            heuristic,
            pheromone,
            convergence: Vec::new(),
        }
    }

    pub fn with_defaults(task: Task) -> Self {
        Self::new(task, ColonyConfig::default())
    }

    /// Change the iteration cap used by subsequent runs
    pub fn set_max_iterations(&mut self, value: usize) {
        self.config.max_iterations = value;
    }

    pub fn config(&self) -> &ColonyConfig {
        &self.config
    }

    /// Pheromone matrix as left by the last run
    pub fn pheromones(&self) -> &[Vec<f64>] {
        &self.pheromone
    }

    /// Best-so-far quality after each iteration of the last run
    pub fn convergence(&self) -> &[TourQuality] {
        &self.convergence
    }

    fn end(&self) -> usize {
        self.waypoints.len() - 1
    }

    fn normalization(&self) -> f64 {
        self.config
            .normalization
            .unwrap_or((self.task.num_objects() + 2) as f64)
    }

    fn reset(&mut self) {
        let t0 = self.config.initial_pheromone;
        for row in &mut self.pheromone {
            row.iter_mut().for_each(|tau| *tau = t0);
        }
        self.convergence.clear();
    }

    /// Construct a tour for one ant
    fn construct_tour(&self, rng: &mut ChaCha8Rng) -> Tour {
        let end = self.end();
        let mut path = vec![0];
        let mut visited = vec![false; self.waypoints.len()];
        visited[0] = true;

        let mut current = 0;
        let mut elapsed = 0.0;

        while let Some(next) = self.select_next(current, &visited, elapsed, rng) {
            elapsed += self.times.get(current, next) + self.waypoints[next].dwell;
            visited[next] = true;
            path.push(next);
            current = next;
        }

        elapsed += self.times.get(current, end);
        path.push(end);

        Tour { path, total_time: elapsed }
    }

    /// Select the next object by roulette wheel.
    /// Returns None if no object fits the remaining budget.
    fn select_next(
        &self,
        current: usize,
        visited: &[bool],
        elapsed: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<usize> {
        let end = self.end();
        let budget = self.task.time_budget();

        // B is never a candidate; it closes the tour once nothing else fits.
        let candidates: Vec<(usize, f64)> = (1..end)
            .filter(|&j| !visited[j])
            .filter(|&j| {
                elapsed + self.waypoints[j].dwell + self.times.get(current, j) + self.times.get(j, end)
                    <= budget
            })
            .map(|j| {
                let tau = self.pheromone[current][j].powf(self.config.alpha);
                (j, tau * self.heuristic[current][j])
            })
            .collect();

        roulette(&candidates, rng.gen::<f64>())
    }

    fn reinforce(&mut self, tour: &Tour) {
        let deposit = tour.visited() as f64 / self.normalization();
        for leg in tour.path.windows(2) {
            self.pheromone[leg[0]][leg[1]] += deposit;
        }
    }

    fn evaporate(&mut self) {
        let keep = 1.0 - self.config.evaporation_rate;
        for row in &mut self.pheromone {
            row.iter_mut().for_each(|tau| *tau *= keep);
        }
    }

    fn construct_sequential(&mut self, seeds: &[u64]) -> Vec<Tour> {
        let mut tours = Vec::with_capacity(seeds.len());
        for &seed in seeds {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let tour = self.construct_tour(&mut rng);
            self.reinforce(&tour);
            tours.push(tour);
        }
        tours
    }

    fn construct_parallel(&mut self, seeds: &[u64]) -> Vec<Tour> {
        let colony = &*self;
        let tours: Vec<Tour> = seeds
            .par_iter()
            .map(|&seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                colony.construct_tour(&mut rng)
            })
            .collect();

        for tour in &tours {
            self.reinforce(tour);
        }
        tours
    }

    fn direct_tour(&self) -> Tour {
        let end = self.end();
        Tour {
            path: vec![0, end],
            total_time: self.times.get(0, end),
        }
    }

    /// Run ACO algorithm
    pub fn run(&mut self) -> Solution {
        let start = std::time::Instant::now();
        self.reset();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);

        let mut best: Option<Tour> = None;
        let mut no_improve = 0;
        let mut iteration = 0;

        while iteration < self.config.max_iterations && no_improve < self.config.max_no_improve {
            // Per-ant seeds keep sequential and parallel runs reproducible
            let seeds: Vec<u64> = (0..self.config.num_ants).map(|_| rng.gen()).collect();
            let tours = if self.config.parallel {
                self.construct_parallel(&seeds)
            } else {
                self.construct_sequential(&seeds)
            };

            let iteration_best = tours
                .into_iter()
                .reduce(|kept, tour| if tour.quality() > kept.quality() { tour } else { kept });

            if let Some(candidate) = iteration_best {
                let progress = Progress::of(&candidate, best.as_ref());
                no_improve = progress.next_count(no_improve);
                if progress == Progress::Improved {
                    best = Some(candidate);
                }
            }

            self.evaporate();

            let quality = best.as_ref().map_or(TourQuality::worst(), Tour::quality);
            self.convergence.push(quality);
            log::debug!(
                "ACO iteration {}: best {} objects in {:.2}, stagnation {}",
                iteration,
                quality.inspected,
                quality.total_time.0,
                no_improve
            );

            iteration += 1;
        }

        let best = best.unwrap_or_else(|| self.direct_tour());

        let mut solution = if best.total_time <= self.task.time_budget() {
            Solution::from_path(
                &self.waypoints,
                &self.times,
                self.task.speed(),
                &best.path,
                best.total_time,
                "ACO",
            )
        } else {
            log::info!("ACO: direct A-B flight exceeds the time budget, no route");
            let mut empty = Solution::new();
            empty.algorithm = "ACO".to_string();
            empty
        };

        solution.computation_time = start.elapsed().as_secs_f64();
        solution.iterations = Some(iteration);

        let quality = solution.quality();
        log::info!(
            "ACO finished after {} iterations: {} objects, total time {:.2}",
            iteration,
            quality.inspected,
            quality.total_time.0
        );

        solution
    }
}

impl RoutePlanner for AntColonyOptimization {
    fn solve_route(&mut self) -> Solution {
        self.run()
    }

    fn name(&self) -> &str {
        "ACO"
    }
}

/// Roulette-wheel pick: the first candidate whose cumulative probability
/// reaches `draw`. Falls back to the last candidate when rounding keeps the
/// cumulative sum below the draw.
fn roulette(candidates: &[(usize, f64)], draw: f64) -> Option<usize> {
    let total: f64 = candidates.iter().map(|&(_, weight)| weight).sum();

    let mut cumulative = 0.0;
    for &(j, weight) in candidates {
        cumulative += weight / total;
        if cumulative >= draw {
            return Some(j);
        }
    }

    candidates.last().map(|&(j, _)| j)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::greedy::GreedyPlanner;
    use crate::task::tests::demo_task;
    use crate::task::{InspectionObject, Point};
    use proptest::prelude::*;

    fn same_outcome(a: &Solution, b: &Solution) -> bool {
        a.route == b.route
            && a.inspected == b.inspected
            && a.total_time == b.total_time
            && a.distances == b.distances
            && a.flight_times == b.flight_times
            && a.iterations == b.iterations
    }

    #[test]
    fn test_aco() {
        let task = demo_task();
        let config = ColonyConfig {
            num_ants: 5,
            max_iterations: 10,
            ..Default::default()
        };

        let mut aco = AntColonyOptimization::new(task.clone(), config);
        let solution = aco.solve_route();

        assert!(!solution.is_empty());
        assert!(solution.total_time <= task.time_budget());
        assert_eq!(solution.route.first(), Some(&task.start()));
        assert_eq!(solution.route.last(), Some(&task.end()));
        assert_eq!(solution.distances.len(), solution.route.len() - 1);
        assert_eq!(solution.flight_times.len(), solution.route.len() - 1);
    }

    #[test]
    fn test_matches_greedy_on_demo_task() {
        let task = demo_task();
        let greedy = GreedyPlanner::new(task.clone()).solve_route();

        let runs = 10;
        let mut total_inspected = 0;
        for seed in 0..runs {
            let config = ColonyConfig { seed, ..Default::default() };
            let solution = AntColonyOptimization::new(task.clone(), config).solve_route();

            assert!(solution.total_time <= task.time_budget());
            total_inspected += solution.num_inspected();
        }

        let mean = total_inspected as f64 / runs as f64;
        assert!(mean >= greedy.num_inspected() as f64, "mean {} < greedy", mean);
    }

    #[test]
    fn test_no_objects() {
        let task = Task::new(Point::new(0.0, 8.0), Point::new(16.0, 8.0), vec![], 6.0, 30.0).unwrap();
        let solution = AntColonyOptimization::with_defaults(task.clone()).solve_route();

        assert!(solution.inspected.is_empty());
        assert_eq!(solution.route, vec![task.start(), task.end()]);
        assert_eq!(solution.total_time, 2.67);
        assert_eq!(solution.flight_times, vec![2.67]);
        assert!((solution.distances[0] - 2.67 * 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_budget_too_small_for_any_object() {
        let task = Task::new(
            Point::new(0.0, 8.0),
            Point::new(16.0, 8.0),
            vec![InspectionObject::new(8.0, 8.0, 5.0)],
            6.0,
            4.0,
        )
        .unwrap();
        let solution = AntColonyOptimization::with_defaults(task.clone()).solve_route();

        assert_eq!(solution.route, vec![task.start(), task.end()]);
        assert!(solution.inspected.is_empty());
        assert_eq!(solution.total_time, 2.67);
    }

    #[test]
    fn test_budget_below_direct_flight() {
        let base = demo_task();
        let task = Task::new(base.start(), base.end(), base.objects().to_vec(), base.speed(), 1.0).unwrap();
        let solution = AntColonyOptimization::with_defaults(task).solve_route();

        assert!(solution.is_empty());
        assert!(solution.inspected.is_empty());
        assert_eq!(solution.total_time, 0.0);
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let mut aco = AntColonyOptimization::with_defaults(demo_task());
        let first = aco.solve_route();
        let second = aco.solve_route();

        assert!(same_outcome(&first, &second));
    }

    #[test]
    fn test_parallel_runs_are_identical() {
        let config = ColonyConfig { parallel: true, ..Default::default() };
        let mut aco = AntColonyOptimization::new(demo_task(), config);
        let first = aco.solve_route();
        let second = aco.solve_route();

        assert!(same_outcome(&first, &second));
        assert!(first.total_time <= 30.0);
    }

    #[test]
    fn test_single_ant_parallel_matches_sequential() {
        let sequential = ColonyConfig { num_ants: 1, seed: 7, ..Default::default() };
        let parallel = ColonyConfig { parallel: true, ..sequential.clone() };

        let a = AntColonyOptimization::new(demo_task(), sequential).solve_route();
        let b = AntColonyOptimization::new(demo_task(), parallel).solve_route();

        assert!(same_outcome(&a, &b));
    }

    #[test]
    fn test_convergence_never_regresses() {
        let config = ColonyConfig { max_no_improve: usize::MAX, seed: 3, ..Default::default() };
        let mut aco = AntColonyOptimization::new(demo_task(), config);
        aco.solve_route();

        let trace = aco.convergence();
        assert_eq!(trace.len(), 100);
        assert!(trace.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_pheromones_stay_bounded() {
        let task = demo_task();
        let config = ColonyConfig {
            max_iterations: 300,
            max_no_improve: usize::MAX,
            ..Default::default()
        };
        let mut aco = AntColonyOptimization::new(task.clone(), config.clone());
        aco.solve_route();

        let per_iteration = config.num_ants as f64 * task.num_objects() as f64 / 8.0;
        let ceiling = config.initial_pheromone + per_iteration / config.evaporation_rate;
        for row in aco.pheromones() {
            for &tau in row {
                assert!(tau.is_finite());
                assert!(tau > 0.0);
                assert!(tau <= ceiling);
            }
        }
    }

    #[test]
    fn test_final_solution_matches_convergence() {
        let mut aco = AntColonyOptimization::with_defaults(demo_task());
        let solution = aco.solve_route();

        assert_eq!(aco.convergence().last(), Some(&solution.quality()));
    }

    /// A -- object -- B on a line, budget large enough for the single object
    fn single_object_task() -> Task {
        Task::new(
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            vec![InspectionObject::new(1.0, 0.0, 1.0)],
            1.0,
            100.0,
        )
        .unwrap()
    }

    #[test]
    fn test_deposit_and_evaporation() {
        let config = ColonyConfig { num_ants: 1, max_iterations: 1, ..Default::default() };
        let t0 = config.initial_pheromone;
        let mut aco = AntColonyOptimization::new(single_object_task(), config);
        let solution = aco.solve_route();
        assert_eq!(solution.num_inspected(), 1);

        // Both legs, closing edge to B included, get 1 / (n + 2)
        let tau = aco.pheromones();
        let reinforced = (t0 + 1.0 / 3.0) * 0.99;
        assert!((tau[0][1] - reinforced).abs() < 1e-12);
        assert!((tau[1][2] - reinforced).abs() < 1e-12);
        assert!((tau[0][2] - t0 * 0.99).abs() < 1e-12);
        assert!((tau[1][0] - t0 * 0.99).abs() < 1e-12);
    }

    #[test]
    fn test_deposit_uses_normalization_override() {
        let config = ColonyConfig {
            num_ants: 1,
            max_iterations: 1,
            normalization: Some(2.0),
            ..Default::default()
        };
        let t0 = config.initial_pheromone;
        let mut aco = AntColonyOptimization::new(single_object_task(), config);
        aco.solve_route();

        let tau = aco.pheromones();
        let reinforced = (t0 + 0.5) * 0.99;
        assert!((tau[0][1] - reinforced).abs() < 1e-12);
        assert!((tau[1][2] - reinforced).abs() < 1e-12);
        assert!((tau[0][2] - t0 * 0.99).abs() < 1e-12);
    }

    fn tour(path: &[usize], total_time: f64) -> Tour {
        Tour { path: path.to_vec(), total_time }
    }

    #[test]
    fn test_progress_improved_resets_counter() {
        let incumbent = tour(&[0, 1, 4], 20.0);

        assert_eq!(Progress::of(&incumbent, None), Progress::Improved);
        let more_objects = tour(&[0, 2, 3, 4], 28.0);
        assert_eq!(Progress::of(&more_objects, Some(&incumbent)), Progress::Improved);
        let faster = tour(&[0, 2, 4], 15.0);
        assert_eq!(Progress::of(&faster, Some(&incumbent)), Progress::Improved);

        assert_eq!(Progress::Improved.next_count(7), 0);
    }

    #[test]
    fn test_progress_same_set_counts_up() {
        let incumbent = tour(&[0, 1, 2, 4], 20.0);

        // Same objects in another order, not faster
        let reordered = tour(&[0, 2, 1, 4], 22.0);
        assert_eq!(Progress::of(&reordered, Some(&incumbent)), Progress::Repeated);
        let identical = tour(&[0, 1, 2, 4], 20.0);
        assert_eq!(Progress::of(&identical, Some(&incumbent)), Progress::Repeated);

        assert_eq!(Progress::Repeated.next_count(3), 4);
    }

    #[test]
    fn test_progress_different_set_resets_counter() {
        let incumbent = tour(&[0, 1, 2, 4], 20.0);

        let other_objects = tour(&[0, 2, 3, 4], 25.0);
        assert_eq!(Progress::of(&other_objects, Some(&incumbent)), Progress::Diverged);
        let fewer_objects = tour(&[0, 3, 4], 5.0);
        assert_eq!(Progress::of(&fewer_objects, Some(&incumbent)), Progress::Diverged);

        assert_eq!(Progress::Diverged.next_count(9), 0);
    }

    #[test]
    fn test_set_max_iterations() {
        let config = ColonyConfig { max_no_improve: usize::MAX, ..Default::default() };
        let mut aco = AntColonyOptimization::new(demo_task(), config);

        aco.set_max_iterations(1);
        assert_eq!(aco.solve_route().iterations, Some(1));

        aco.set_max_iterations(5);
        assert_eq!(aco.solve_route().iterations, Some(5));
        assert_eq!(aco.convergence().len(), 5);
    }

    #[test]
    fn test_stagnation_stops_early() {
        // Every ant flies A -> B, so each iteration after the first repeats the best tour
        let task = Task::new(Point::new(0.0, 8.0), Point::new(16.0, 8.0), vec![], 6.0, 30.0).unwrap();
        let mut aco = AntColonyOptimization::with_defaults(task);

        assert_eq!(aco.solve_route().iterations, Some(11));
    }

    #[test]
    fn test_roulette_selection() {
        let candidates = vec![(1, 1.0), (2, 1.0), (3, 2.0)];

        assert_eq!(roulette(&candidates, 0.0), Some(1));
        assert_eq!(roulette(&candidates, 0.25), Some(1));
        assert_eq!(roulette(&candidates, 0.3), Some(2));
        assert_eq!(roulette(&candidates, 0.9), Some(3));
        assert_eq!(roulette(&[], 0.5), None);
    }

    #[test]
    fn test_roulette_clamps_to_last_candidate() {
        // Cumulative sum tops out below the draw
        let candidates = vec![(4, 0.1), (5, 0.2), (6, 0.3)];
        assert_eq!(roulette(&candidates, 1.5), Some(6));

        let degenerate = vec![(7, 0.0), (8, 0.0)];
        assert_eq!(roulette(&degenerate, 0.5), Some(8));
    }

    fn task_strategy() -> impl Strategy<Value = Task> {
        (
            (0u32..20, 0u32..20),
            (0u32..20, 0u32..20),
            prop::collection::vec((0u32..20, 0u32..20, 0u32..10), 0..8),
            1u32..8,
            1u32..60,
        )
            .prop_map(|((ax, ay), (bx, by), objects, v, t)| {
                let objects = objects
                    .into_iter()
                    .map(|(x, y, d)| InspectionObject::new(x as f64, y as f64, d as f64))
                    .collect();
                Task::new(
                    Point::new(ax as f64, ay as f64),
                    Point::new(bx as f64, by as f64),
                    objects,
                    v as f64,
                    t as f64,
                )
                .unwrap()
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_route_respects_budget(task in task_strategy(), seed in 0u64..1000) {
            let config = ColonyConfig { seed, max_iterations: 20, ..Default::default() };
            let solution = AntColonyOptimization::new(task.clone(), config).solve_route();

            prop_assert!(solution.total_time <= task.time_budget());
            if !solution.is_empty() {
                prop_assert_eq!(solution.route.first(), Some(&task.start()));
                prop_assert_eq!(solution.route.last(), Some(&task.end()));
                prop_assert_eq!(solution.flight_times.len(), solution.route.len() - 1);
            }
        }

        #[test]
        fn prop_inspected_subset_of_objects(task in task_strategy(), seed in 0u64..1000) {
            let config = ColonyConfig { seed, max_iterations: 20, ..Default::default() };
            let solution = AntColonyOptimization::new(task.clone(), config).solve_route();

            let locations: BTreeSet<Point> = task.objects().iter().map(|o| o.location).collect();
            prop_assert!(solution.inspected.is_subset(&locations));
            prop_assert!(solution.num_inspected() <= task.num_objects());
        }
    }
}
