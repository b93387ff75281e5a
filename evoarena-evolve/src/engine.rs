//! Evolutionary engine
//!
//! Architecture:
//! - Level 1: `run` / `run_from` drive the generation loop
//! - Level 2: evaluate, record, breed
//! - Level 3: elitism, parent selection, crossover, mutation

use evoarena_core::{ArenaError, GameDefinition, Result, StrategyTemplate};
use rand::Rng;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::crossover::crossover_genomes;
use crate::fitness::{FitnessEvaluator, TournamentFitness};
use crate::mutation::mutate_genome;
use crate::population::{Genome, Individual, Population};
use crate::selection::{select_elite, SelectionPolicy};
use crate::stats::{GenerationStats, StatsSink};
use crate::EvolutionConfig;

/// A strategy in the final population with its fitness and head count
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedStrategy {
    pub name: String,
    pub fitness: f64,
    pub count: usize,
}

/// Outcome of an evolution run
#[derive(Clone, Debug, Serialize)]
pub struct EvolutionResult {
    /// One entry per generation, in order
    pub stats: Vec<GenerationStats>,
    /// Final evaluated population
    pub population: Population,
    /// Strategies of the final population by fitness (desc), then name
    pub ranking: Vec<RankedStrategy>,
}

impl EvolutionResult {
    pub fn best(&self) -> Option<&RankedStrategy> {
        self.ranking.first()
    }

    pub fn best_fitness_history(&self) -> Vec<f64> {
        self.stats.iter().map(|s| s.best_fitness).collect()
    }

    pub fn mean_fitness_history(&self) -> Vec<f64> {
        self.stats.iter().map(|s| s.mean_fitness).collect()
    }

    pub fn generations_run(&self) -> usize {
        self.stats.len()
    }
}

/// Evolves a population of strategies drawn from a fixed pool
pub struct EvolutionEngine {
    pool: Vec<StrategyTemplate>,
    config: EvolutionConfig,
    evaluator: Box<dyn FitnessEvaluator>,
    selection: Box<dyn SelectionPolicy>,
}

impl EvolutionEngine {
    /// Engine scoring fitness with a round-robin tournament in `game`
    pub fn new(pool: Vec<StrategyTemplate>, config: EvolutionConfig, game: GameDefinition) -> Result<Self> {
        let evaluator = TournamentFitness::new(game, config.fitness.clone(), config.scope);
        Self::with_evaluator(pool, config, evaluator)
    }

    /// Engine with a custom fitness evaluator
    pub fn with_evaluator(
        pool: Vec<StrategyTemplate>,
        config: EvolutionConfig,
        evaluator: impl FitnessEvaluator + 'static,
    ) -> Result<Self> {
        validate_pool(&pool)?;
        config.validate()?;

        let selection = config.selection.policy();
        Ok(Self {
            pool,
            config,
            evaluator: Box::new(evaluator),
            selection,
        })
    }

    /// Replace the selection policy derived from the config
    pub fn with_selection(mut self, policy: impl SelectionPolicy + 'static) -> Self {
        self.selection = Box::new(policy);
        self
    }

    pub fn pool(&self) -> &[StrategyTemplate] {
        &self.pool
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Population of the configured size, each genome drawn uniformly from the pool
    pub fn initial_population<R: Rng>(&self, rng: &mut R) -> Population {
        Population::random(self.config.population_size, self.pool.len(), rng)
    }

    /// Run the full evolution from a random initial population (Level 1)
    pub fn run<R: Rng>(&self, rng: &mut R, sink: &mut dyn StatsSink) -> Result<EvolutionResult> {
        let population = self.initial_population(rng);
        self.run_from(population, rng, sink)
    }

    /// Run the full evolution from a given initial population (Level 1)
    ///
    /// Each generation is evaluated, reported to `sink`, and then bred into
    /// the next one. The last generation is evaluated but not bred.
    pub fn run_from<R: Rng>(
        &self,
        population: Population,
        rng: &mut R,
        sink: &mut dyn StatsSink,
    ) -> Result<EvolutionResult> {
        self.validate_population(&population)?;

        tracing::info!(
            "Starting evolution: population={}, generations={}, pool={}",
            self.config.population_size,
            self.config.generations,
            self.pool.len()
        );

        let mut population = population;
        let mut stats = Vec::with_capacity(self.config.generations);

        for generation in 0..self.config.generations {
            self.evaluate(&mut population, rng)?;

            let record = GenerationStats::from_population(generation, &population, &self.pool);
            tracing::info!(
                "Generation {}: best={:.2}, mean={:.2}, strategies={}",
                generation + 1,
                record.best_fitness,
                record.mean_fitness,
                record.frequencies.len()
            );
            sink.record(&record);
            stats.push(record);

            if generation + 1 < self.config.generations {
                population = self.next_generation(&population, rng);
            }
        }

        let ranking = rank_strategies(&population, &self.pool);
        if let Some(best) = ranking.first() {
            tracing::info!("Evolution complete: best strategy {} ({:.2})", best.name, best.fitness);
        }

        Ok(EvolutionResult {
            stats,
            population,
            ranking,
        })
    }

    // ========================================================================
    // Level 2 - Phases
    // ========================================================================

    /// Assign every individual the fitness of the strategy it expresses
    pub fn evaluate<R: Rng>(&self, population: &mut Population, rng: &mut R) -> Result<()> {
        let present = population.distinct_genomes();
        let scores = self.evaluator.evaluate(&self.pool, &present, rng)?;

        if scores.len() != present.len() {
            return Err(ArenaError::config(format!(
                "fitness evaluator returned {} scores for {} strategies",
                scores.len(),
                present.len()
            )));
        }

        let by_genome: FxHashMap<Genome, f64> = present.into_iter().zip(scores).collect();
        for ind in population.individuals_mut() {
            ind.fitness = by_genome.get(&ind.genome).copied().unwrap_or(0.0);
        }
        Ok(())
    }

    /// Breed the next generation from an evaluated one
    fn next_generation<R: Rng>(&self, population: &Population, rng: &mut R) -> Population {
        let size = self.config.population_size;
        let fitness = population.fitness_values();
        let individuals = population.individuals();

        let mut next: Vec<Individual> = select_elite(&fitness, self.config.elitism)
            .into_iter()
            .map(|idx| Individual::new(individuals[idx].genome))
            .collect();

        while next.len() < size {
            let parent_a = individuals[self.selection.select(&fitness, rng)].genome;
            let parent_b = individuals[self.selection.select(&fitness, rng)].genome;

            let (child_a, child_b) = if rng.gen_bool(self.config.crossover_rate) {
                crossover_genomes(parent_a, parent_b, rng)
            } else {
                (parent_a, parent_b)
            };

            next.push(Individual::new(self.maybe_mutate(child_a, rng)));
            if next.len() < size {
                next.push(Individual::new(self.maybe_mutate(child_b, rng)));
            }
        }

        Population::from_individuals(next)
    }

    // ========================================================================
    // Level 3 - Steps
    // ========================================================================

    fn maybe_mutate<R: Rng>(&self, genome: Genome, rng: &mut R) -> Genome {
        if rng.gen_bool(self.config.mutation_rate) {
            mutate_genome(genome, self.pool.len(), rng)
        } else {
            genome
        }
    }

    fn validate_population(&self, population: &Population) -> Result<()> {
        if population.len() != self.config.population_size {
            return Err(ArenaError::config(format!(
                "initial population has {} individuals, expected {}",
                population.len(),
                self.config.population_size
            )));
        }
        if let Some(bad) = population.genomes().into_iter().find(|g| g.index() >= self.pool.len()) {
            return Err(ArenaError::config(format!(
                "genome {} is outside a pool of {} strategies",
                bad.index(),
                self.pool.len()
            )));
        }
        Ok(())
    }
}

fn validate_pool(pool: &[StrategyTemplate]) -> Result<()> {
    if pool.is_empty() {
        return Err(ArenaError::config("strategy pool is empty"));
    }
    let mut seen = FxHashSet::default();
    for template in pool {
        if !seen.insert(template.name()) {
            return Err(ArenaError::config(format!(
                "strategy '{}' appears twice in the pool",
                template.name()
            )));
        }
    }
    Ok(())
}

/// Rank the strategies present in an evaluated population
fn rank_strategies(population: &Population, pool: &[StrategyTemplate]) -> Vec<RankedStrategy> {
    let mut ranking: Vec<RankedStrategy> = population
        .distinct_genomes()
        .into_iter()
        .filter_map(|genome| {
            let template = pool.get(genome.index())?;
            let fitness = population
                .individuals()
                .iter()
                .find(|i| i.genome == genome)
                .map(|i| i.fitness)?;
            Some(RankedStrategy {
                name: template.name().to_string(),
                fitness,
                count: population.count(genome),
            })
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.fitness
            .partial_cmp(&a.fitness)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranking
}
