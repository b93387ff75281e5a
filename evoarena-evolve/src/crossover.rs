//! Crossover operators for strategy evolution
//!
//! A genome is a single gene (the strategy index), so crossover reduces
//! to deciding whether two children exchange their parents' genes.

use rand::Rng;

use crate::population::Genome;

/// Crossover two genomes by swapping their single gene.
///
/// With a 50% chance the children are `(b, a)`, otherwise `(a, b)`.
///
/// # Arguments
/// * `a` - First parent genome
/// * `b` - Second parent genome
/// * `rng` - Random number generator
pub fn crossover_genomes<R: Rng + ?Sized>(a: Genome, b: Genome, rng: &mut R) -> (Genome, Genome) {
    if rng.gen_bool(0.5) {
        (b, a)
    } else {
        (a, b)
    }
}
