//! Distributed generational GA over bit-string chromosomes.
//!
//! This crate holds the GA itself and the two processes that run it through a
//! shared [`WorkStore`](bitevo_queue::WorkStore):
//!
//! - the [`coordinator`] breeds generations, seeds them into the store, waits
//!   for their evaluation and writes checkpoints
//! - [`worker`]s claim single items from the store, score them and report back
//!
//! # How a Run Works
//!
//! 1. **Seed** - generation 0 is a random population (or a checkpoint's)
//! 2. **Evaluate** - every item of the generation is scored, locally or by workers
//! 3. **Load** - the scored generation is read back, best first
//! 4. **Reproduce** - elites survive, the rest are replaced by children
//! 5. **Repeat** - until `total_generations`, checkpointing periodically
//!
//! # Architecture
//!
//! ```text
//! Hyperparameters (params)
//!     ↓ configure
//! PopulationEvolver (genetic) ── uses ──> bits (selection, crossover, mutation)
//!     ↓ driven by
//! Coordinator ──seed/wait/load──> WorkStore <──claim/report── Worker(s)
//!     ↓ writes
//! Checkpoint files (checkpoint)
//! ```
//!
//! Fitness functions live in [`bitevo_genome::fitness`]; any
//! [`Evaluator`](bitevo_genome::fitness::Evaluator) can be plugged into both the
//! coordinator and workers.

pub mod bits;
pub mod checkpoint;
pub mod coordinator;
pub mod genetic;
pub mod params;
pub mod worker;
