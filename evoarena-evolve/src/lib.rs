//! EvoArena Evolution - Genetic algorithm over strategy populations
//!
//! This crate provides evolutionary algorithms:
//! - Population management
//! - Tournament-based fitness evaluation
//! - Selection (tournament, roulette) with optional elitism
//! - Mutation and crossover operators
//! - Per-generation statistics

pub mod crossover;
pub mod engine;
pub mod fitness;
pub mod mutation;
pub mod population;
pub mod selection;
pub mod stats;

use evoarena_core::{ArenaError, Result};
use evoarena_tournament::TournamentConfig;
use serde::{Deserialize, Serialize};

pub use crossover::crossover_genomes;
pub use engine::{EvolutionEngine, EvolutionResult, RankedStrategy};
pub use fitness::{FitnessEvaluator, FitnessScope, TournamentFitness};
pub use mutation::mutate_genome;
pub use population::{Genome, Individual, Population};
pub use selection::{
    roulette_select, select_elite, tournament_select, RouletteSelection, SelectionPolicy,
    TournamentSelection,
};
pub use stats::{GenerationStats, StatsSink};

/// Selection mechanism used to pick parents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Selection {
    /// Best of `size` uniformly drawn individuals
    Tournament { size: usize },
    /// Fitness-proportionate
    Roulette,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament { size: 3 }
    }
}

impl Selection {
    pub fn policy(self) -> Box<dyn SelectionPolicy> {
        match self {
            Selection::Tournament { size } => Box::new(TournamentSelection { size }),
            Selection::Roulette => Box::new(RouletteSelection),
        }
    }
}

/// Evolution configuration
///
/// Elitism keeps the best fitness non-decreasing only when fitness is
/// stationary: `scope` set to [`FitnessScope::Pool`] and zero noise. Under the
/// default [`FitnessScope::Population`] an individual's score depends on who
/// else is present, so the best fitness can drop between generations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    /// Individuals copied unmutated into the next generation (0 disables elitism)
    pub elitism: usize,
    pub selection: Selection,
    /// Tournament settings for fitness evaluation
    pub fitness: TournamentConfig,
    /// Which opponents the fitness tournament includes
    pub scope: FitnessScope,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            generations: 30,
            mutation_rate: 0.1,
            crossover_rate: 0.7,
            elitism: 2,
            selection: Selection::default(),
            fitness: TournamentConfig::new(50),
            scope: FitnessScope::Population,
        }
    }
}

impl EvolutionConfig {
    /// Reject values outside the accepted ranges
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(ArenaError::config(format!(
                "population size must be at least 2, got {}",
                self.population_size
            )));
        }
        if self.generations == 0 {
            return Err(ArenaError::config("generations must be at least 1"));
        }
        validate_rate("mutation rate", self.mutation_rate)?;
        validate_rate("crossover rate", self.crossover_rate)?;
        if self.elitism > self.population_size {
            return Err(ArenaError::config(format!(
                "elitism ({}) cannot exceed population size ({})",
                self.elitism, self.population_size
            )));
        }
        if let Selection::Tournament { size: 0 } = self.selection {
            return Err(ArenaError::config("selection tournament size must be at least 1"));
        }
        self.fitness.validate()
    }
}

fn validate_rate(what: &str, rate: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(ArenaError::config(format!(
            "{} must be within [0, 1], got {}",
            what, rate
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EvolutionConfig::default();
        assert_eq!(config.population_size, 100);
        assert_eq!(config.generations, 30);
        assert_eq!(config.fitness.rounds_per_match, 50);
        assert_eq!(config.selection, Selection::Tournament { size: 3 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = EvolutionConfig::default();

        let cases = vec![
            EvolutionConfig { population_size: 1, ..base.clone() },
            EvolutionConfig { generations: 0, ..base.clone() },
            EvolutionConfig { mutation_rate: 1.5, ..base.clone() },
            EvolutionConfig { crossover_rate: -0.2, ..base.clone() },
            EvolutionConfig { elitism: 101, ..base.clone() },
            EvolutionConfig { selection: Selection::Tournament { size: 0 }, ..base.clone() },
            EvolutionConfig { fitness: TournamentConfig::new(0), ..base.clone() },
        ];

        for config in cases {
            assert!(
                matches!(config.validate(), Err(ArenaError::Config(_))),
                "{:?} should be rejected",
                config
            );
        }
    }

    #[test]
    fn test_selection_serde_tags() {
        let json = serde_json::to_string(&Selection::Tournament { size: 4 }).unwrap();
        assert_eq!(json, r#"{"kind":"tournament","size":4}"#);
        let roulette: Selection = serde_json::from_str(r#"{"kind":"roulette"}"#).unwrap();
        assert_eq!(roulette, Selection::Roulette);
    }
}
