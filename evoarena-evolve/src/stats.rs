//! Per-generation statistics

use evoarena_core::StrategyTemplate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::population::Population;

/// Summary of one evaluated generation
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationStats {
    /// Zero-based generation index
    pub generation: usize,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    /// Individuals per strategy name; only strategies present are listed
    pub frequencies: BTreeMap<String, usize>,
}

impl GenerationStats {
    pub fn from_population(
        generation: usize,
        population: &Population,
        pool: &[StrategyTemplate],
    ) -> Self {
        let mut frequencies = BTreeMap::new();
        for ind in population.individuals() {
            if let Some(template) = pool.get(ind.genome.index()) {
                *frequencies.entry(template.name().to_string()).or_insert(0) += 1;
            }
        }

        Self {
            generation,
            best_fitness: population.best().map(|b| b.fitness).unwrap_or(0.0),
            mean_fitness: population.mean_fitness(),
            frequencies,
        }
    }

    /// Most common strategy; ties go to the alphabetically first name
    pub fn dominant(&self) -> Option<(&str, usize)> {
        self.frequencies
            .iter()
            .fold(None, |best: Option<(&str, usize)>, (name, &count)| match best {
                Some((_, c)) if c >= count => best,
                _ => Some((name.as_str(), count)),
            })
    }

    pub fn frequency(&self, name: &str) -> usize {
        self.frequencies.get(name).copied().unwrap_or(0)
    }

    pub fn population_size(&self) -> usize {
        self.frequencies.values().sum()
    }
}

/// Receives statistics as each generation completes
pub trait StatsSink {
    fn record(&mut self, stats: &GenerationStats);
}

impl StatsSink for Vec<GenerationStats> {
    fn record(&mut self, stats: &GenerationStats) {
        self.push(stats.clone());
    }
}

impl StatsSink for () {
    fn record(&mut self, _stats: &GenerationStats) {}
}

impl<F: FnMut(&GenerationStats)> StatsSink for F {
    fn record(&mut self, stats: &GenerationStats) {
        self(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::Genome;
    use evoarena_core::BuiltIn;

    fn pool() -> Vec<StrategyTemplate> {
        vec![
            BuiltIn::AlwaysCooperate.template(),
            BuiltIn::AlwaysDefect.template(),
            BuiltIn::TitForTat.template(),
        ]
    }

    fn evaluated(genomes: &[usize], fitness: &[f64]) -> Population {
        let mut population = Population::from_genomes(genomes.iter().map(|&g| Genome(g)));
        for (ind, &f) in population.individuals_mut().iter_mut().zip(fitness) {
            ind.fitness = f;
        }
        population
    }

    #[test]
    fn test_from_population() {
        let population = evaluated(&[0, 1, 1, 2], &[10.0, 20.0, 20.0, 6.0]);
        let stats = GenerationStats::from_population(3, &population, &pool());

        assert_eq!(stats.generation, 3);
        assert_eq!(stats.best_fitness, 20.0);
        assert_eq!(stats.mean_fitness, 14.0);
        assert_eq!(stats.frequency("AlwaysDefect"), 2);
        assert_eq!(stats.frequency("AlwaysCooperate"), 1);
        assert_eq!(stats.population_size(), 4);
        assert_eq!(stats.dominant(), Some(("AlwaysDefect", 2)));
    }

    #[test]
    fn test_absent_strategies_not_listed() {
        let population = evaluated(&[2, 2], &[1.0, 1.0]);
        let stats = GenerationStats::from_population(0, &population, &pool());

        assert_eq!(stats.frequencies.len(), 1);
        assert_eq!(stats.frequency("AlwaysCooperate"), 0);
    }

    #[test]
    fn test_dominant_tie_prefers_first_name() {
        let population = evaluated(&[0, 2], &[1.0, 1.0]);
        let stats = GenerationStats::from_population(0, &population, &pool());
        assert_eq!(stats.dominant(), Some(("AlwaysCooperate", 1)));
    }

    #[test]
    fn test_sinks() {
        let population = evaluated(&[0], &[1.0]);
        let stats = GenerationStats::from_population(0, &population, &pool());

        let mut collected: Vec<GenerationStats> = Vec::new();
        collected.record(&stats);
        assert_eq!(collected, vec![stats.clone()]);

        let mut seen = 0;
        let mut counter = |_: &GenerationStats| seen += 1;
        counter.record(&stats);
        counter.record(&stats);
        assert_eq!(seen, 2);

        ().record(&stats);
    }
}
