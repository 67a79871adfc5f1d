//! Benchmarking and experimentation module.
//!
//! Runs every registered planner repeatedly over generated tasks, collects
//! per-run results and aggregates them per algorithm.

use crate::error::TaskError;
use crate::generator::TaskGenerator;
use crate::heuristics::AlgorithmRegistry;
use crate::solution::Solution;
use crate::task::Task;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Result of running a single algorithm once on a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmResult {
    /// Algorithm name
    pub algorithm: String,
    /// Index of the task within the benchmark
    pub task: usize,
    /// Run index, also the planner seed
    pub run: u64,
    /// Number of objects in the task
    pub num_objects: usize,
    /// Number of inspected objects
    pub inspected: usize,
    /// Mission time of the returned route
    pub total_time: f64,
    /// Physical length of the returned route
    pub distance: f64,
    /// Whether a route was found at all
    pub found_route: bool,
    /// Computation time in seconds
    pub time: f64,
    /// Number of iterations (if applicable)
    pub iterations: Option<usize>,
}

impl AlgorithmResult {
    fn from_solution(task_id: usize, run: u64, task: &Task, solution: &Solution) -> Self {
        AlgorithmResult {
            algorithm: solution.algorithm.clone(),
            task: task_id,
            run,
            num_objects: task.num_objects(),
            inspected: solution.num_inspected(),
            total_time: solution.total_time,
            distance: solution.total_distance(),
            found_route: !solution.is_empty(),
            time: solution.computation_time,
            iterations: solution.iterations,
        }
    }
}

/// Aggregated statistics for an algorithm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmStatistics {
    /// Algorithm name
    pub algorithm: String,
    /// Number of runs
    pub num_runs: usize,
    /// Number of runs that found a route
    pub num_routes: usize,
    /// Average inspected objects
    pub avg_inspected: f64,
    /// Standard deviation of inspected objects
    pub std_inspected: f64,
    /// Best inspected count
    pub best_inspected: usize,
    /// Average mission time over runs that found a route
    pub avg_total_time: f64,
    /// Average computation time
    pub avg_time: f64,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of generated tasks
    pub num_tasks: usize,
    /// Number of runs per algorithm and task (for stochastic methods)
    pub num_runs: usize,
    /// Objects per generated task
    pub num_objects: usize,
    /// Vehicle speed
    pub speed: f64,
    /// Flight-time budget
    pub time_budget: f64,
    /// Side of the square field
    pub field: u32,
    /// Base generator seed; task `i` uses `seed + i`
    pub seed: u64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_tasks: 10,
            num_runs: 5,
            num_objects: 20,
            speed: 6.0,
            time_budget: 60.0,
            field: 30,
            seed: 0,
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    registry: AlgorithmRegistry,
    results: Vec<AlgorithmResult>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Self::with_registry(config, AlgorithmRegistry::with_default_algorithms())
    }

    pub fn with_registry(config: BenchmarkConfig, registry: AlgorithmRegistry) -> Self {
        Benchmark {
            config,
            registry,
            results: Vec::new(),
        }
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Generate the `index`-th task of this benchmark
    pub fn generate_task(&self, index: usize) -> Result<Task, TaskError> {
        let mut generator = TaskGenerator::new(self.config.seed.wrapping_add(index as u64));
        generator.generate(
            self.config.num_objects,
            self.config.speed,
            self.config.time_budget,
            self.config.field,
        )
    }

    /// Run every registered algorithm `num_runs` times on one task
    pub fn run_on_task(&mut self, task_id: usize, task: &Task) {
        log::info!("Running benchmark on task {}: {}", task_id, task);

        for factory in self.registry.algorithms().values() {
            for run in 0..self.config.num_runs as u64 {
                let mut planner = factory(task, run);
                let solution = planner.solve_route();
                self.results
                    .push(AlgorithmResult::from_solution(task_id, run, task, &solution));
            }
        }
    }

    /// Generate and run all tasks
    pub fn run(&mut self) -> Result<(), TaskError> {
        for index in 0..self.config.num_tasks {
            let task = self.generate_task(index)?;
            self.run_on_task(index, &task);
        }
        Ok(())
    }

    /// Compute statistics for each algorithm
    pub fn compute_statistics(&self) -> Vec<AlgorithmStatistics> {
        let mut grouped: BTreeMap<&str, Vec<&AlgorithmResult>> = BTreeMap::new();
        for result in &self.results {
            grouped.entry(result.algorithm.as_str()).or_default().push(result);
        }

        grouped
            .into_iter()
            .map(|(algorithm, results)| {
                let inspected: Vec<f64> = results.iter().map(|r| r.inspected as f64).collect();
                let times: Vec<f64> = results.iter().map(|r| r.time).collect();
                let route_times: Vec<f64> = results
                    .iter()
                    .filter(|r| r.found_route)
                    .map(|r| r.total_time)
                    .collect();

                AlgorithmStatistics {
                    algorithm: algorithm.to_string(),
                    num_runs: results.len(),
                    num_routes: route_times.len(),
                    avg_inspected: inspected.iter().mean(),
                    std_inspected: if inspected.len() > 1 { inspected.iter().std_dev() } else { 0.0 },
                    best_inspected: results.iter().map(|r| r.inspected).fold(0, usize::max),
                    avg_total_time: if route_times.is_empty() { 0.0 } else { route_times.iter().mean() },
                    avg_time: times.iter().mean(),
                }
            })
            .collect()
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> csv::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> csv::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("     UAV Route Planner Benchmark\n");
        report.push_str("========================================\n");
        report.push_str(&format!("Generated: {}\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));
        report.push_str(&format!(
            "Tasks: {}, runs: {}, objects: {}, v = {}, T = {}\n\n",
            self.config.num_tasks,
            self.config.num_runs,
            self.config.num_objects,
            self.config.speed,
            self.config.time_budget
        ));

        report.push_str(&format_statistics_table(&self.compute_statistics()));
        report
    }

    /// Get all results
    pub fn results(&self) -> &[AlgorithmResult] {
        &self.results
    }
}

/// Run every registered algorithm `runs` times on a single task
pub fn compare_algorithms(task: &Task, runs: usize) -> Benchmark {
    let config = BenchmarkConfig {
        num_tasks: 1,
        num_runs: runs,
        num_objects: task.num_objects(),
        speed: task.speed(),
        time_budget: task.time_budget(),
        ..Default::default()
    };
    let mut benchmark = Benchmark::new(config);
    benchmark.run_on_task(0, task);
    benchmark
}

/// Render per-algorithm statistics as a text table
pub fn format_statistics_table(stats: &[AlgorithmStatistics]) -> String {
    let mut table = String::new();
    table.push_str(&format!(
        "{:<12} {:>8} {:>10} {:>8} {:>6} {:>12} {:>10}\n",
        "Algorithm", "Routes", "Avg Insp", "Std", "Best", "Avg T", "Avg Time"
    ));
    table.push_str(&"-".repeat(72));
    table.push('\n');

    for stat in stats {
        table.push_str(&format!(
            "{:<12} {:>8} {:>10.2} {:>8.2} {:>6} {:>12.2} {:>10.4}\n",
            stat.algorithm,
            format!("{}/{}", stat.num_routes, stat.num_runs),
            stat.avg_inspected,
            stat.std_inspected,
            stat.best_inspected,
            stat.avg_total_time,
            stat.avg_time
        ));
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::tests::demo_task;

    fn small_config() -> BenchmarkConfig {
        BenchmarkConfig {
            num_tasks: 2,
            num_runs: 2,
            num_objects: 6,
            field: 16,
            time_budget: 30.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_benchmark_config() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.num_runs, 5);
        assert_eq!(config.num_tasks, 10);
    }

    #[test]
    fn test_run_records_every_algorithm() {
        let mut benchmark = Benchmark::new(small_config());
        benchmark.run().unwrap();

        // 2 tasks x 2 algorithms x 2 runs
        assert_eq!(benchmark.results().len(), 8);

        let stats = benchmark.compute_statistics();
        assert_eq!(stats.len(), 2);
        for stat in &stats {
            assert_eq!(stat.num_runs, 4);
            assert!(stat.avg_inspected <= 6.0);
            assert!(stat.avg_total_time <= 30.0);
        }
    }

    #[test]
    fn test_compare_on_demo_task() {
        let benchmark = compare_algorithms(&demo_task(), 3);
        let stats = benchmark.compute_statistics();

        let greedy = stats.iter().find(|s| s.algorithm == "Greedy").unwrap();
        let aco = stats.iter().find(|s| s.algorithm == "ACO").unwrap();
        assert_eq!(greedy.avg_inspected, 3.0);
        assert_eq!(greedy.std_inspected, 0.0);
        assert!(aco.avg_inspected >= greedy.avg_inspected);
    }

    #[test]
    fn test_csv_export() {
        let benchmark = compare_algorithms(&demo_task(), 1);
        let path = std::env::temp_dir().join(format!("uav-results-{}.csv", std::process::id()));
        benchmark.export_to_csv(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        let mut lines = contents.lines();
        assert!(lines.next().unwrap().starts_with("algorithm,task,run,"));
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn test_report_lists_algorithms() {
        let benchmark = compare_algorithms(&demo_task(), 1);
        let report = benchmark.generate_report();

        assert!(report.contains("Greedy"));
        assert!(report.contains("ACO"));
    }
}
