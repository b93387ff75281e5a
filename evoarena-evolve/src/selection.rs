//! Selection operators for genetic algorithms
//!
//! Implements tournament selection, where individuals compete in small
//! tournaments and the winner breeds, and fitness-proportionate
//! (roulette) selection. Operators work on fitness slices and return
//! indices into the population.

use rand::{Rng, RngCore};

/// Picks one parent index given the fitness of every individual
pub trait SelectionPolicy: Send + Sync {
    fn select(&self, fitness: &[f64], rng: &mut dyn RngCore) -> usize;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TournamentSelection {
    pub size: usize,
}

impl Default for TournamentSelection {
    fn default() -> Self {
        Self { size: 3 }
    }
}

impl SelectionPolicy for TournamentSelection {
    fn select(&self, fitness: &[f64], rng: &mut dyn RngCore) -> usize {
        tournament_select(fitness, self.size, rng)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouletteSelection;

impl SelectionPolicy for RouletteSelection {
    fn select(&self, fitness: &[f64], rng: &mut dyn RngCore) -> usize {
        roulette_select(fitness, rng)
    }
}

/// Tournament selection: select an individual by running a tournament.
///
/// Randomly picks `tournament_size` individuals (with replacement),
/// then returns the index of the one with the highest fitness.
///
/// # Panics
/// Panics if fitness is empty or tournament_size is 0
pub fn tournament_select<R: Rng + ?Sized>(
    fitness: &[f64],
    tournament_size: usize,
    rng: &mut R,
) -> usize {
    assert!(!fitness.is_empty(), "Population cannot be empty");
    assert!(tournament_size > 0, "Tournament size must be > 0");

    let mut best_idx = rng.gen_range(0..fitness.len());
    let mut best_fitness = fitness[best_idx];

    for _ in 1..tournament_size {
        let idx = rng.gen_range(0..fitness.len());
        if fitness[idx] > best_fitness {
            best_idx = idx;
            best_fitness = fitness[idx];
        }
    }

    best_idx
}

/// Fitness-proportionate selection.
///
/// Payoffs may be negative, so weights are shifted by the minimum fitness
/// when it is below zero. If every weight is zero the draw is uniform.
///
/// # Panics
/// Panics if fitness is empty
pub fn roulette_select<R: Rng + ?Sized>(fitness: &[f64], rng: &mut R) -> usize {
    assert!(!fitness.is_empty(), "Population cannot be empty");

    let min = fitness.iter().copied().fold(f64::INFINITY, f64::min);
    let shift = if min < 0.0 { -min } else { 0.0 };
    let total: f64 = fitness.iter().map(|f| f + shift).sum();

    if total <= 0.0 || !total.is_finite() {
        return rng.gen_range(0..fitness.len());
    }

    let mut target = rng.gen::<f64>() * total;
    for (idx, f) in fitness.iter().enumerate() {
        let weight = f + shift;
        if target < weight {
            return idx;
        }
        target -= weight;
    }

    // Float rounding can leave a sliver past the last weight
    fitness.len() - 1
}

/// Select the top N individuals by fitness (elitism).
///
/// Returns indices sorted by fitness (descending); ties keep population order.
pub fn select_elite(fitness: &[f64], n: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..fitness.len()).collect();
    indices.sort_by(|&a, &b| {
        fitness[b].partial_cmp(&fitness[a]).unwrap_or(std::cmp::Ordering::Equal)
    });
    indices.truncate(n);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_tournament_select_returns_higher_fitness() {
        let fitness: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let mut high_count = 0;
        for _ in 0..100 {
            if tournament_select(&fitness, 3, &mut rng) >= 7 {
                high_count += 1;
            }
        }

        // With tournament size 3, we should heavily favor high-fitness individuals
        assert!(high_count > 50, "Tournament selection should favor high fitness, got {}", high_count);
    }

    #[test]
    fn test_tournament_size_one_is_uniform_draw() {
        let fitness = vec![100.0, 0.0];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let low = (0..200).filter(|_| tournament_select(&fitness, 1, &mut rng) == 1).count();
        assert!(low > 50, "size 1 ignores fitness, got {} low picks", low);
    }

    #[test]
    fn test_roulette_favors_weight() {
        let fitness = vec![1.0, 9.0];
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let heavy = (0..1000).filter(|_| roulette_select(&fitness, &mut rng) == 1).count();
        assert!(heavy > 800, "expected ~900 picks of the heavy slot, got {}", heavy);
    }

    #[test]
    fn test_roulette_handles_negative_fitness() {
        // Shifted weights are [0, 2, 4]; the minimum is never picked
        let fitness = vec![-3.0, -1.0, 1.0];
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            assert_ne!(roulette_select(&fitness, &mut rng), 0);
        }
    }

    #[test]
    fn test_roulette_all_zero_is_uniform() {
        let fitness = vec![0.0; 4];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let picks: std::collections::BTreeSet<usize> =
            (0..100).map(|_| roulette_select(&fitness, &mut rng)).collect();
        assert_eq!(picks.len(), 4);
    }

    #[test]
    fn test_policies_through_trait_object() {
        let fitness = vec![0.0, 0.0, 5.0];
        let policies: Vec<Box<dyn SelectionPolicy>> =
            vec![Box::new(TournamentSelection { size: 50 }), Box::new(RouletteSelection)];
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for policy in &policies {
            assert_eq!(policy.select(&fitness, &mut rng), 2);
        }
    }

    #[test]
    fn test_select_elite() {
        let fitness = vec![0.5, 0.9, 0.3, 0.7, 0.1];
        let elite = select_elite(&fitness, 3);

        assert_eq!(elite, vec![1, 3, 0]);
    }

    #[test]
    fn test_select_elite_ties_keep_order() {
        let fitness = vec![2.0, 5.0, 5.0, 1.0];
        assert_eq!(select_elite(&fitness, 2), vec![1, 2]);
        assert!(select_elite(&fitness, 0).is_empty());
    }

    #[test]
    fn test_select_elite_handles_small_pop() {
        let fitness = vec![0.5, 0.9];
        let elite = select_elite(&fitness, 5);

        assert_eq!(elite.len(), 2); // Can't select more than population
    }
}
