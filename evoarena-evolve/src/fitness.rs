//! Fitness evaluation
//!
//! Fitness of a strategy is its total score in a round-robin tournament.
//! Every individual expressing the same strategy shares that score.

use evoarena_core::{ArenaError, GameDefinition, Result, StrategyTemplate};
use evoarena_tournament::{run_tournament, TournamentConfig};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::population::Genome;

/// Scores the strategies present in a population
pub trait FitnessEvaluator {
    /// Return one fitness per entry of `present`, in the same order.
    fn evaluate(
        &self,
        pool: &[StrategyTemplate],
        present: &[Genome],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>>;
}

/// Which strategies take part in the fitness tournament
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessScope {
    /// Only strategies currently present in the population
    #[default]
    Population,
    /// Every strategy in the pool, whether present or not
    Pool,
}

/// Fitness from a round-robin tournament in one game
#[derive(Clone, Debug)]
pub struct TournamentFitness {
    game: GameDefinition,
    config: TournamentConfig,
    scope: FitnessScope,
}

impl TournamentFitness {
    pub fn new(game: GameDefinition, config: TournamentConfig, scope: FitnessScope) -> Self {
        Self { game, config, scope }
    }

    pub fn game(&self) -> &GameDefinition {
        &self.game
    }

    pub fn scope(&self) -> FitnessScope {
        self.scope
    }
}

impl FitnessEvaluator for TournamentFitness {
    fn evaluate(
        &self,
        pool: &[StrategyTemplate],
        present: &[Genome],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>> {
        let participants: Vec<StrategyTemplate> = match self.scope {
            FitnessScope::Population => present
                .iter()
                .map(|g| lookup(pool, *g).cloned())
                .collect::<Result<_>>()?,
            FitnessScope::Pool => pool.to_vec(),
        };

        let result = run_tournament(&participants, &self.game, &self.config, rng)?;

        present
            .iter()
            .map(|g| {
                let name = lookup(pool, *g)?.name();
                result
                    .entry_for(name)
                    .map(|e| e.total_score)
                    .ok_or_else(|| ArenaError::config(format!("'{}' missing from standings", name)))
            })
            .collect()
    }
}

fn lookup(pool: &[StrategyTemplate], genome: Genome) -> Result<&StrategyTemplate> {
    pool.get(genome.index()).ok_or_else(|| {
        ArenaError::config(format!(
            "genome {} is outside a pool of {} strategies",
            genome.index(),
            pool.len()
        ))
    })
}
