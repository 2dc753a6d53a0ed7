//! Elitist generational GA over bit-string populations.
//!
//! # Algorithm Overview
//!
//! One generation of the GA runs these steps:
//!
//! 1. **Evaluate** - every individual is scored and the population is sorted
//!    best first ([`Population::evaluate`], or the work queue when evaluation
//!    is distributed)
//! 2. **Elitism** - the first `elite_count` individuals survive unchanged
//! 3. **Selection** - two distinct parents are drawn uniformly from the elites
//! 4. **Crossover** - a segment of the second parent is spliced into the first
//! 5. **Mutation** - each gene of the child flips with probability `mutation_rate`
//!
//! Only elites breed. This keeps selection pressure high and bounds drift, at
//! the cost of diversity; a small `elite_count` relative to the population
//! converges quickly.
//!
//! Reproduction is in place: slots `elite_count..` are overwritten and their
//! fitness reset to 0 until the next evaluation.
//!
//! # Example
//!
//! ```
//! use bitevo_genome::{Population, fitness::OneMax};
//! use bitevo_training::genetic::PopulationEvolver;
//!
//! let mut rng = rand::rng();
//! let mut population = Population::new(10, 32);
//! population.randomize(&mut rng);
//!
//! let evolver = PopulationEvolver {
//!     elite_count: 3,
//!     mutation_rate: 0.02,
//! };
//! for _ in 0..20 {
//!     population.evaluate(&OneMax);
//!     evolver.reproduce(&mut population, &mut rng);
//! }
//! ```

use bitevo_genome::Population;
use rand::Rng;

use crate::bits;

/// Controls how a population is turned into the next generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationEvolver {
    /// Number of top individuals preserved unchanged; also the breeding pool.
    pub elite_count: usize,
    /// Per-gene flip probability applied to every child.
    pub mutation_rate: f64,
}

impl PopulationEvolver {
    /// Replaces every non-elite slot with a mutated child of two elites.
    ///
    /// The population must already be sorted best first.
    ///
    /// # Panics
    ///
    /// Panics if `elite_count < 2` or `elite_count > population.len()`.
    pub fn reproduce<R>(&self, population: &mut Population, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        assert!(self.elite_count <= population.len());
        debug_assert!(population.is_sorted_by_fitness());

        for i in self.elite_count..population.len() {
            let (a, b) = bits::select_parents(rng, self.elite_count);
            let parents = population.individuals();
            let mut child = bits::crossover(&parents[a], &parents[b], rng);
            bits::mutate(&mut child, self.mutation_rate, rng);
            child.set_fitness(0.0);
            population.individuals_mut()[i] = child;
        }
    }
}
