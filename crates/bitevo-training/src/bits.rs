//! Genetic operators on bit-string chromosomes.
//!
//! These are the building blocks used by
//! [`PopulationEvolver`](crate::genetic::PopulationEvolver):
//!
//! - **Selection**: [`select_parents`] picks two distinct elites
//! - **Crossover**: [`crossover`] splices a segment of one parent into the other
//! - **Mutation**: [`mutate`] flips genes independently
//!
//! # Crossover layout
//!
//! Two cut points are drawn: `point` in `[2, len]` and `p` in `[1, point)`.
//!
//! ```text
//! index:   0 ........ p ........ point ........ len
//! child:   | parent A | parent B  |   parent A   |
//! ```
//!
//! The tail after `point` is copied from parent A, so every gene of the child
//! comes from one of its parents.

use bitevo_genome::Chromosome;
use rand::Rng;

/// Picks two distinct indices uniformly from `[0, elite_count)`.
///
/// # Panics
///
/// Panics if `elite_count < 2`.
pub fn select_parents<R>(rng: &mut R, elite_count: usize) -> (usize, usize)
where
    R: Rng + ?Sized,
{
    assert!(elite_count >= 2, "need at least two elites to breed");
    let a = rng.random_range(0..elite_count);
    let mut b = rng.random_range(0..elite_count - 1);
    if b >= a {
        b += 1;
    }
    (a, b)
}

/// Produces a child from two parents of equal length.
///
/// The child's fitness is 0.
///
/// # Panics
///
/// Panics if the parents differ in length or are shorter than 2 genes.
pub fn crossover<R>(parent_a: &Chromosome, parent_b: &Chromosome, rng: &mut R) -> Chromosome
where
    R: Rng + ?Sized,
{
    assert_eq!(parent_a.len(), parent_b.len());
    let len = parent_a.len();
    assert!(len >= 2, "crossover needs at least two genes");

    let point = rng.random_range(2..=len);
    let p = rng.random_range(1..point);
    crossover_at(parent_a, parent_b, p, point)
}

fn crossover_at(
    parent_a: &Chromosome,
    parent_b: &Chromosome,
    p: usize,
    point: usize,
) -> Chromosome {
    let mut child = parent_a.clone();
    child.genes_mut()[p..point].copy_from_slice(&parent_b.genes()[p..point]);
    child.set_fitness(0.0);
    child
}

/// Flips each gene independently with probability `rate`.
///
/// # Panics
///
/// Panics if `rate` is outside `[0, 1]`.
pub fn mutate<R>(chromosome: &mut Chromosome, rate: f64, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for i in 0..chromosome.len() {
        if rng.random_bool(rate) {
            chromosome.flip(i);
        }
    }
}
