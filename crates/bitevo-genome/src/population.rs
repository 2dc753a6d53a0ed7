use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{chromosome::Chromosome, fitness::Evaluator, stats::FitnessStats};

/// An ordered, fixed-size collection of chromosomes sharing one gene length.
///
/// The population is mutated in place from generation to generation. Its
/// length never changes after construction. After [`Population::evaluate`]
/// (or [`Population::sort_by_fitness_desc`]) individuals are ordered best
/// first, which is the order the GA engine relies on for elitism and parent
/// selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    gene_length: usize,
    individuals: Vec<Chromosome>,
}

impl Population {
    /// Allocates `size` chromosomes of `gene_length` zero genes.
    #[must_use]
    pub fn new(size: usize, gene_length: usize) -> Self {
        Self {
            gene_length,
            individuals: vec![Chromosome::zeroed(gene_length); size],
        }
    }

    /// Builds a population from existing chromosomes.
    ///
    /// Chromosomes whose length differs from `gene_length` are zero-padded or
    /// truncated to fit.
    #[must_use]
    pub fn from_individuals(gene_length: usize, individuals: Vec<Chromosome>) -> Self {
        let individuals = individuals
            .into_iter()
            .map(|c| {
                if c.len() == gene_length {
                    c
                } else {
                    let mut fitted = Chromosome::from_bytes(c.genes(), gene_length);
                    fitted.set_fitness(c.fitness());
                    fitted
                }
            })
            .collect();
        Self {
            gene_length,
            individuals,
        }
    }

    /// Fills every gene of every individual uniformly at random.
    pub fn randomize<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for c in &mut self.individuals {
            c.randomize(rng);
            c.set_fitness(0.0);
        }
    }

    #[must_use]
    pub fn gene_length(&self) -> usize {
        self.gene_length
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    #[must_use]
    pub fn individuals(&self) -> &[Chromosome] {
        &self.individuals
    }

    #[must_use]
    pub fn individuals_mut(&mut self) -> &mut [Chromosome] {
        &mut self.individuals
    }

    /// Returns the first individual, which is the fittest once sorted.
    #[must_use]
    pub fn best(&self) -> Option<&Chromosome> {
        self.individuals.first()
    }

    /// Scores every individual with `evaluator`, then sorts best first.
    pub fn evaluate<E>(&mut self, evaluator: &E)
    where
        E: Evaluator + ?Sized,
    {
        for c in &mut self.individuals {
            let score = evaluator.score(c.genes());
            c.set_fitness(score);
        }
        self.sort_by_fitness_desc();
    }

    /// Stable sort by fitness, highest first. Equal scores keep their order.
    pub fn sort_by_fitness_desc(&mut self) {
        self.individuals
            .sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
    }

    #[must_use]
    pub fn is_sorted_by_fitness(&self) -> bool {
        self.individuals
            .is_sorted_by(|a, b| a.fitness() >= b.fitness())
    }

    /// Summary of the current fitness distribution.
    ///
    /// Returns `None` for an empty population.
    #[must_use]
    pub fn fitness_stats(&self) -> Option<FitnessStats> {
        FitnessStats::new(self.individuals.iter().map(Chromosome::fitness))
    }
}
