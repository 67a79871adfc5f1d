//! UAV Route Planner - Command Line Interface
//!
//! Plans surveillance routes, generates tasks and compares planners.

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use uav_route_planner::benchmark::{compare_algorithms, format_statistics_table, Benchmark, BenchmarkConfig};
use uav_route_planner::generator::TaskGenerator;
use uav_route_planner::heuristics::{self, ColonyConfig};
use uav_route_planner::task::{InspectionObject, Point, Task};
use uav_route_planner::TaskError;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "uav-route-planner")]
#[command(version = "1.0")]
#[command(about = "Plans UAV surveillance routes under a flight-time budget")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a single task
    Solve {
        /// Task JSON file (defaults to the built-in demonstration task)
        #[arg(short, long)]
        task: Option<PathBuf>,

        /// Algorithm to use
        #[arg(short, long, value_enum, default_value = "aco")]
        algorithm: Algorithm,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Iteration cap for ACO
        #[arg(long, default_value = "100")]
        max_iterations: usize,

        /// Ants per iteration
        #[arg(long, default_value = "10")]
        ants: usize,

        /// Build the ants of one iteration in parallel
        #[arg(long)]
        parallel: bool,

        /// Output solution to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Generate a random task
    Generate {
        /// Number of objects
        #[arg(short = 'n', long)]
        objects: usize,

        /// Vehicle speed
        #[arg(short = 'v', long)]
        speed: f64,

        /// Flight-time budget
        #[arg(short = 'T', long)]
        budget: f64,

        /// Side of the square field
        #[arg(short, long, default_value = "30")]
        field: u32,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Output task file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Compare algorithms on a task
    Compare {
        /// Task JSON file (defaults to the built-in demonstration task)
        #[arg(short, long)]
        task: Option<PathBuf>,

        /// Number of runs
        #[arg(short, long, default_value = "10")]
        runs: usize,

        /// Output CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run benchmarks on generated tasks
    Benchmark {
        /// Number of generated tasks
        #[arg(long, default_value = "10")]
        tasks: usize,

        /// Number of runs per algorithm
        #[arg(short, long, default_value = "5")]
        runs: usize,

        /// Objects per task
        #[arg(short = 'n', long, default_value = "20")]
        objects: usize,

        /// Vehicle speed
        #[arg(short = 'v', long, default_value = "6")]
        speed: f64,

        /// Flight-time budget
        #[arg(short = 'T', long, default_value = "60")]
        budget: f64,

        /// Side of the square field
        #[arg(short, long, default_value = "30")]
        field: u32,

        /// Base random seed
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Algorithm {
    /// Nearest feasible object next
    Greedy,
    /// Ant Colony Optimization
    Aco,
}

impl From<Algorithm> for heuristics::Algorithm {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Greedy => heuristics::Algorithm::Greedy,
            Algorithm::Aco => heuristics::Algorithm::Colony,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Solve { task, algorithm, seed, max_iterations, ants, parallel, output, verbose } => {
            let config = ColonyConfig {
                seed,
                max_iterations,
                num_ants: ants,
                parallel,
                ..Default::default()
            };
            solve_task(task.as_deref(), algorithm, config, output.as_deref(), verbose)
        }

        Commands::Generate { objects, speed, budget, field, seed, output } => {
            generate_task(objects, speed, budget, field, seed, &output)
        }

        Commands::Compare { task, runs, output } => compare(task.as_deref(), runs, output.as_deref()),

        Commands::Benchmark { tasks, runs, objects, speed, budget, field, seed, output } => {
            let config = BenchmarkConfig {
                num_tasks: tasks,
                num_runs: runs,
                num_objects: objects,
                speed,
                time_budget: budget,
                field,
                seed,
            };
            run_benchmark(config, &output)
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Six-object task used when no task file is given
fn demo_task() -> Result<Task, TaskError> {
    Task::new(
        Point::new(0.0, 8.0),
        Point::new(16.0, 8.0),
        vec![
            InspectionObject::new(2.0, 3.0, 7.0),
            InspectionObject::new(5.0, 14.0, 4.0),
            InspectionObject::new(9.0, 7.0, 9.0),
            InspectionObject::new(12.0, 12.0, 8.0),
            InspectionObject::new(14.0, 5.0, 10.0),
            InspectionObject::new(15.0, 10.0, 12.0),
        ],
        6.0,
        30.0,
    )
}

fn load_task(path: Option<&Path>) -> Result<Task, TaskError> {
    match path {
        Some(path) => {
            println!("Loading task from {:?}...", path);
            Task::from_file(path)
        }
        None => demo_task(),
    }
}

fn solve_task(
    path: Option<&Path>,
    algorithm: Algorithm,
    config: ColonyConfig,
    output: Option<&Path>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let task = load_task(path)?;

    if verbose {
        println!("{}", task);
        println!("{}", task.statistics());
    }

    let mut planner = heuristics::Algorithm::from(algorithm).build(&task, &config);

    println!("Solving with {} algorithm...", planner.name());
    let solution = planner.solve_route();

    println!("\n========== Results ==========");
    print!("{}", solution);
    let inspected: Vec<String> = solution.inspected.iter().map(|p| p.to_string()).collect();
    println!("  Inspected objects: {}", inspected.join(", "));

    if verbose {
        for (i, (d, t)) in solution.distances.iter().zip(&solution.flight_times).enumerate() {
            println!("  Leg {}: distance {:.2}, flight time {:.2}", i + 1, d, t);
        }
    }

    if let Some(out_path) = output {
        let json = serde_json::to_string_pretty(&solution)?;
        std::fs::write(out_path, json)?;
        println!("\nSolution saved to {:?}", out_path);
    }

    Ok(())
}

fn generate_task(
    objects: usize,
    speed: f64,
    budget: f64,
    field: u32,
    seed: u64,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let task = TaskGenerator::new(seed).generate(objects, speed, budget, field)?;
    task.to_file(output)?;
    println!("{} saved to {:?}", task, output);
    Ok(())
}

fn compare(path: Option<&Path>, runs: usize, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let task = load_task(path)?;
    println!("Comparing algorithms on {} over {} runs...\n", task, runs);

    let benchmark = compare_algorithms(&task, runs);

    println!("========== Summary ==========");
    print!("{}", format_statistics_table(&benchmark.compute_statistics()));

    if let Some(out_path) = output {
        benchmark.export_to_csv(out_path)?;
        println!("\nResults exported to {:?}", out_path);
    }

    Ok(())
}

fn run_benchmark(config: BenchmarkConfig, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(output)?;

    let mut benchmark = Benchmark::new(config);
    let num_tasks = benchmark.config().num_tasks;

    let progress = ProgressBar::new(num_tasks as u64);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} tasks")?,
    );

    for index in 0..num_tasks {
        let task = benchmark.generate_task(index)?;
        benchmark.run_on_task(index, &task);
        progress.inc(1);
    }
    progress.finish();

    let results_path = output.join("results.csv");
    benchmark.export_to_csv(&results_path)?;
    println!("\nResults exported to {:?}", results_path);

    let stats_path = output.join("statistics.csv");
    benchmark.export_statistics_csv(&stats_path)?;
    println!("Statistics exported to {:?}", stats_path);

    let report = benchmark.generate_report();
    println!("\n{}", report);

    let report_path = output.join("report.txt");
    std::fs::write(&report_path, &report)?;
    println!("Report saved to {:?}", report_path);

    Ok(())
}
