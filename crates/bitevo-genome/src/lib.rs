//! In-memory genome store for bit-string genetic algorithms.
//!
//! This crate holds the data the GA operates on and nothing else:
//!
//! - [`Chromosome`] - a fixed-length bit string (one byte per bit) with a fitness score
//! - [`Population`] - an ordered, fixed-size set of chromosomes, sorted best first after evaluation
//! - [`fitness::Evaluator`] - the pluggable fitness function capability
//! - [`stats::FitnessStats`] - min/max/mean summary used for progress reporting
//!
//! Genetic operators live in `bitevo-training`, and persistence lives in
//! `bitevo-queue`. Both only exchange [`Population`] values and raw gene bytes
//! with this crate.
//!
//! # Example
//!
//! ```
//! use bitevo_genome::{Population, fitness::OneMax};
//!
//! let mut population = Population::new(6, 32);
//! population.randomize(&mut rand::rng());
//! population.evaluate(&OneMax);
//! assert!(population.is_sorted_by_fitness());
//! ```

pub use self::{chromosome::Chromosome, population::Population};

pub mod chromosome;
pub mod fitness;
pub mod population;
pub mod stats;
