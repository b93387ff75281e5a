//! Mutation operators for strategy evolution

use rand::Rng;

use crate::population::Genome;

/// Replace the genome with a different strategy drawn uniformly from the pool.
///
/// A pool with a single strategy leaves the genome unchanged.
pub fn mutate_genome<R: Rng + ?Sized>(genome: Genome, pool_size: usize, rng: &mut R) -> Genome {
    if pool_size < 2 {
        return genome;
    }
    let offset = rng.gen_range(1..pool_size);
    Genome((genome.index() + offset) % pool_size)
}
