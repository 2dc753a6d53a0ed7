//! Run-wide hyperparameters and their startup validation.

use crate::genetic::PopulationEvolver;

/// Smallest accepted elite size.
pub const MIN_ELITE_COUNT: usize = 3;

/// Hyperparameters of one GA run.
///
/// `population_size` and `gene_length` describe the shape of the population.
/// When a run resumes from a work store, the stored shape replaces them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hyperparameters {
    pub population_size: usize,
    pub gene_length: usize,
    /// Number of top individuals kept unchanged each generation.
    pub elite_count: usize,
    /// Last generation to produce. Generations are numbered from 0.
    pub total_generations: u32,
    /// Write a checkpoint every this many generations.
    pub checkpoint_interval: u32,
    /// Per-gene flip probability.
    pub mutation_rate: f64,
    pub current_generation: u32,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            population_size: 10,
            gene_length: 64,
            elite_count: 5,
            total_generations: 1000,
            checkpoint_interval: 100,
            mutation_rate: 0.02,
            current_generation: 0,
        }
    }
}

/// A hyperparameter combination the GA cannot run with.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ParamsError {
    #[display("elitism of {elite_count} is too low (elitism >= {})", MIN_ELITE_COUNT)]
    EliteTooSmall { elite_count: usize },
    #[display("elitism of {elite_count} leaves no room to breed in a population of {population_size}")]
    EliteNotBelowPopulation {
        elite_count: usize,
        population_size: usize,
    },
    #[display("gene length {gene_length} is too short for crossover (gene length >= 2)")]
    GeneLengthTooShort { gene_length: usize },
    #[display("mutation rate {mutation_rate} is outside [0, 1]")]
    MutationRateOutOfRange { mutation_rate: f64 },
    #[display("checkpoint interval must be at least 1")]
    ZeroCheckpointInterval,
}

impl Hyperparameters {
    /// Checks every invariant the GA relies on.
    pub fn validate(&self) -> Result<(), ParamsError> {
        self.validate_settings()?;
        self.validate_shape()
    }

    /// Checks the rules that hold regardless of the population shape.
    ///
    /// A resumed run takes its shape from the work store, so these are the
    /// only rules that can be checked before the store is consulted.
    pub fn validate_settings(&self) -> Result<(), ParamsError> {
        if self.elite_count < MIN_ELITE_COUNT {
            return Err(ParamsError::EliteTooSmall {
                elite_count: self.elite_count,
            });
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ParamsError::MutationRateOutOfRange {
                mutation_rate: self.mutation_rate,
            });
        }
        if self.checkpoint_interval == 0 {
            return Err(ParamsError::ZeroCheckpointInterval);
        }
        Ok(())
    }

    /// Checks the rules that depend on `population_size` and `gene_length`.
    pub fn validate_shape(&self) -> Result<(), ParamsError> {
        if self.elite_count >= self.population_size {
            return Err(ParamsError::EliteNotBelowPopulation {
                elite_count: self.elite_count,
                population_size: self.population_size,
            });
        }
        if self.gene_length < 2 {
            return Err(ParamsError::GeneLengthTooShort {
                gene_length: self.gene_length,
            });
        }
        Ok(())
    }

    /// Same parameters with the population shape replaced.
    #[must_use]
    pub fn with_shape(self, population_size: usize, gene_length: usize) -> Self {
        Self {
            population_size,
            gene_length,
            ..self
        }
    }

    #[must_use]
    pub fn evolver(&self) -> PopulationEvolver {
        PopulationEvolver {
            elite_count: self.elite_count,
            mutation_rate: self.mutation_rate,
        }
    }

    /// True if a checkpoint is due after finishing `generation`.
    #[must_use]
    pub fn is_checkpoint_generation(&self, generation: u32) -> bool {
        self.checkpoint_interval > 0 && generation.is_multiple_of(self.checkpoint_interval)
    }
}
