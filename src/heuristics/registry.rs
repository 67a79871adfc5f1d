//! Name -> planner factory mapping used by callers that enumerate solvers.

use crate::heuristics::aco::{AntColonyOptimization, ColonyConfig};
use crate::heuristics::greedy::GreedyPlanner;
use crate::heuristics::RoutePlanner;
use crate::task::Task;
use std::collections::BTreeMap;

/// Builds a planner for a task; the seed is ignored by deterministic planners
pub type PlannerFactory = fn(&Task, u64) -> Box<dyn RoutePlanner>;

/// The planners shipped with this crate
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Algorithm {
    Greedy,
    Colony,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::Greedy, Algorithm::Colony];

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Greedy => "Greedy",
            Algorithm::Colony => "ACO",
        }
    }

    pub fn factory(&self) -> PlannerFactory {
        match self {
            Algorithm::Greedy => build_greedy,
            Algorithm::Colony => build_colony,
        }
    }

    /// Build a planner for `task`; the greedy planner ignores `config`
    pub fn build(&self, task: &Task, config: &ColonyConfig) -> Box<dyn RoutePlanner> {
        match self {
            Algorithm::Greedy => Box::new(GreedyPlanner::new(task.clone())),
            Algorithm::Colony => Box::new(AntColonyOptimization::new(task.clone(), config.clone())),
        }
    }
}

fn build_greedy(task: &Task, _seed: u64) -> Box<dyn RoutePlanner> {
    Algorithm::Greedy.build(task, &ColonyConfig::default())
}

fn build_colony(task: &Task, seed: u64) -> Box<dyn RoutePlanner> {
    Algorithm::Colony.build(task, &ColonyConfig { seed, ..Default::default() })
}

/// Registry of available planners, iterated in name order
#[derive(Clone, Default)]
pub struct AlgorithmRegistry {
    algorithms: BTreeMap<String, PlannerFactory>,
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every [`Algorithm`]
    pub fn with_default_algorithms() -> Self {
        let mut registry = Self::new();
        for algorithm in Algorithm::ALL {
            registry.register(algorithm.name(), algorithm.factory());
        }
        registry
    }

    /// Add a planner; an existing entry with the same name is replaced
    pub fn register(&mut self, name: &str, factory: PlannerFactory) {
        self.algorithms.insert(name.to_string(), factory);
    }

    pub fn algorithms(&self) -> &BTreeMap<String, PlannerFactory> {
        &self.algorithms
    }

    pub fn get(&self, name: &str) -> Option<PlannerFactory> {
        self.algorithms.get(name).copied()
    }
}
