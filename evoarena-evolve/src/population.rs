//! Population of individuals, each expressing one strategy from the pool

use rand::Rng;
use serde::Serialize;
use std::collections::BTreeSet;

/// Index of a strategy in the evolution pool
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Genome(pub usize);

impl Genome {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A population member and its most recent fitness
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Individual {
    pub genome: Genome,
    pub fitness: f64,
}

impl Individual {
    /// Create an individual that has not been evaluated yet
    pub fn new(genome: Genome) -> Self {
        Self { genome, fitness: 0.0 }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Sample `size` genomes uniformly from a pool of `pool_size` strategies
    pub fn random<R: Rng + ?Sized>(size: usize, pool_size: usize, rng: &mut R) -> Self {
        assert!(pool_size > 0, "Pool cannot be empty");
        let individuals = (0..size)
            .map(|_| Individual::new(Genome(rng.gen_range(0..pool_size))))
            .collect();
        Self { individuals }
    }

    pub fn from_genomes(genomes: impl IntoIterator<Item = Genome>) -> Self {
        Self {
            individuals: genomes.into_iter().map(Individual::new).collect(),
        }
    }

    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn individuals_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }

    pub fn genomes(&self) -> Vec<Genome> {
        self.individuals.iter().map(|i| i.genome).collect()
    }

    pub fn fitness_values(&self) -> Vec<f64> {
        self.individuals.iter().map(|i| i.fitness).collect()
    }

    /// Distinct genomes present, in ascending pool order
    pub fn distinct_genomes(&self) -> Vec<Genome> {
        self.individuals
            .iter()
            .map(|i| i.genome)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of individuals expressing `genome`
    pub fn count(&self, genome: Genome) -> usize {
        self.individuals.iter().filter(|i| i.genome == genome).count()
    }

    /// Fittest individual; the earliest one wins ties
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.iter().fold(None, |best, ind| match best {
            Some(b) if b.fitness >= ind.fitness => Some(b),
            _ => Some(ind),
        })
    }

    pub fn mean_fitness(&self) -> f64 {
        if self.individuals.is_empty() {
            return 0.0;
        }
        self.individuals.iter().map(|i| i.fitness).sum::<f64>() / self.individuals.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_population_stays_in_pool() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let population = Population::random(50, 4, &mut rng);

        assert_eq!(population.len(), 50);
        assert!(population.genomes().iter().all(|g| g.index() < 4));
    }

    #[test]
    fn test_random_population_is_seeded() {
        let a = Population::random(20, 8, &mut ChaCha8Rng::seed_from_u64(5));
        let b = Population::random(20, 8, &mut ChaCha8Rng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_genomes_sorted() {
        let population = Population::from_genomes([Genome(3), Genome(1), Genome(3), Genome(0)]);
        assert_eq!(population.distinct_genomes(), vec![Genome(0), Genome(1), Genome(3)]);
        assert_eq!(population.count(Genome(3)), 2);
        assert_eq!(population.count(Genome(2)), 0);
    }

    #[test]
    fn test_best_and_mean() {
        let mut population = Population::from_genomes([Genome(0), Genome(1), Genome(2)]);
        assert!(population.individuals().iter().all(|i| i.fitness == 0.0));

        for (ind, f) in population.individuals_mut().iter_mut().zip([1.0, 4.0, 4.0]) {
            ind.fitness = f;
        }

        let best = population.best().unwrap();
        assert_eq!(best.genome, Genome(1));
        assert_eq!(population.mean_fitness(), 3.0);
    }

    #[test]
    fn test_empty_population() {
        let population = Population::default();
        assert!(population.is_empty());
        assert!(population.best().is_none());
        assert_eq!(population.mean_fitness(), 0.0);
    }
}
