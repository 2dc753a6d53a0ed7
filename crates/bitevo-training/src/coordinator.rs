//! Drives a GA run through the persistent work queue.
//!
//! The coordinator owns the generational loop. Each generation is written to
//! the [`WorkStore`] as pending items, scored, and read back best first before
//! the next generation is bred from it:
//!
//! ```text
//!            +-------------------- next generation --------------------+
//!            v                                                         |
//! reproduce -> seed_generation -> evaluate (local or workers) -> load_generation
//!                                                                      |
//!                                              checkpoint every N generations
//! ```
//!
//! # Evaluation modes
//!
//! - [`EvaluationMode::Local`]: the coordinator claims and reports the items
//!   of the current generation itself, then waits for any item still held by
//!   another process.
//! - [`EvaluationMode::External`]: the coordinator only polls the store until
//!   workers have reported every item.
//!
//! Both modes leave identical rows behind, so a run can switch modes across
//! restarts.
//!
//! # Restart
//!
//! The store is the source of truth. On startup, if it already holds a
//! generation, the run continues from the latest one with the stored
//! population shape, finishing its evaluation first. Otherwise generation 0
//! (or a checkpoint's generation) is seeded fresh.

use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use bitevo_genome::{Population, fitness::Evaluator};
use bitevo_queue::{ClaimOutcome, StoreError, WorkStore};
use log::{debug, info, warn};
use rand::Rng;

use crate::{
    checkpoint::{self, CheckpointError},
    params::{Hyperparameters, ParamsError},
};

/// Default delay between polls of the store.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum EvaluationMode {
    /// Score items in this process.
    #[default]
    Local,
    /// Leave scoring to worker processes.
    External,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorConfig {
    /// Hyperparameters for a fresh run. A non-empty store overrides the
    /// population shape.
    pub params: Hyperparameters,
    pub mode: EvaluationMode,
    pub poll_interval: Duration,
    /// Give up waiting for a generation after this long. `None` waits forever.
    pub wait_timeout: Option<Duration>,
    /// Base path of checkpoint files.
    pub checkpoint_path: PathBuf,
    /// Checkpoint to start from when the store is empty.
    pub resume_checkpoint: Option<PathBuf>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            params: Hyperparameters::default(),
            mode: EvaluationMode::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            wait_timeout: None,
            checkpoint_path: PathBuf::from("checkpoint"),
            resume_checkpoint: None,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum CoordinatorError {
    #[display("invalid hyperparameters")]
    #[from]
    Params(ParamsError),
    #[display("work store failed")]
    #[from]
    Store(StoreError),
    #[display("checkpoint failed")]
    #[from]
    Checkpoint(CheckpointError),
    #[display("generation {generation} still incomplete after {waited:?} ({done}/{total} done)")]
    WaitTimeout {
        generation: u32,
        done: usize,
        total: usize,
        waited: Duration,
    },
}

impl CoordinatorError {
    /// True for errors detected before the store was modified.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Params(_))
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Parameters the run finished with, shape included.
    pub params: Hyperparameters,
    /// Final generation, best first.
    pub population: Population,
    /// Generation found in the store at startup, if any.
    pub resumed_from: Option<u32>,
}

pub struct Coordinator<'a, E, R>
where
    E: ?Sized,
{
    store: &'a mut WorkStore,
    evaluator: &'a E,
    rng: R,
    config: CoordinatorConfig,
}

impl<'a, E, R> Coordinator<'a, E, R>
where
    E: Evaluator + ?Sized,
    R: Rng,
{
    pub fn new(
        store: &'a mut WorkStore,
        evaluator: &'a E,
        rng: R,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            store,
            evaluator,
            rng,
            config,
        }
    }

    /// Runs the GA up to `total_generations`.
    ///
    /// Invalid hyperparameters are rejected before any generation is seeded.
    /// Shape rules are checked against the shape the run actually uses: the
    /// stored one when resuming, the configured or checkpoint one otherwise.
    pub fn run(mut self) -> Result<RunSummary, CoordinatorError> {
        self.config.params.validate_settings()?;
        self.store.init_schema()?;

        let (mut params, mut population, resumed_from) = self.start()?;
        let evolver = params.evolver();

        for generation in params.current_generation + 1..=params.total_generations {
            evolver.reproduce(&mut population, &mut self.rng);
            self.store.seed_generation(generation, &population)?;
            population = self.evaluate_generation(generation)?;
            params.current_generation = generation;
            log_generation(generation, &population);

            if params.is_checkpoint_generation(generation) {
                let path = checkpoint::tagged_path(&self.config.checkpoint_path, generation);
                checkpoint::save(&path, &params, &population)?;
                info!("checkpoint written to {}", path.display());
            }
        }

        info!("run finished at generation {}", params.current_generation);
        Ok(RunSummary {
            params,
            population,
            resumed_from,
        })
    }

    /// Produces the evaluated population the main loop starts from.
    fn start(&mut self) -> Result<(Hyperparameters, Population, Option<u32>), CoordinatorError> {
        let Some(latest) = self.store.latest_generation()? else {
            let (params, population) = self.seed_initial()?;
            return Ok((params, population, None));
        };
        if let Some(path) = &self.config.resume_checkpoint {
            warn!(
                "work store already holds generation {latest}, ignoring checkpoint {}",
                path.display()
            );
        }
        let (params, population) = self.resume_from_store(latest)?;
        Ok((params, population, Some(latest)))
    }

    fn resume_from_store(
        &mut self,
        latest: u32,
    ) -> Result<(Hyperparameters, Population), CoordinatorError> {
        let shape = self.store.shape_of_generation(latest)?.unwrap_or_default();
        let params = Hyperparameters {
            current_generation: latest,
            ..self
                .config
                .params
                .with_shape(shape.population_size, shape.gene_length)
        };
        params.validate()?;

        let counts = self.store.count_status(latest)?;
        info!(
            "resuming generation {latest}: {} individuals of {} genes, {}/{} done",
            shape.population_size, shape.gene_length, counts.done, counts.total
        );
        let population = self.evaluate_generation(latest)?;
        log_generation(latest, &population);
        Ok((params, population))
    }

    fn seed_initial(&mut self) -> Result<(Hyperparameters, Population), CoordinatorError> {
        let (params, population) = if let Some(path) = &self.config.resume_checkpoint {
            let cp = checkpoint::load(path, &self.config.params)?;
            cp.params.validate()?;
            info!(
                "starting from checkpoint {} at generation {}",
                path.display(),
                cp.params.current_generation
            );
            (cp.params, cp.population)
        } else {
            let params = self.config.params;
            params.validate()?;
            let mut population = Population::new(params.population_size, params.gene_length);
            population.randomize(&mut self.rng);
            info!(
                "starting fresh run: {} individuals of {} genes",
                params.population_size, params.gene_length
            );
            (params, population)
        };

        let generation = params.current_generation;
        self.store.seed_generation(generation, &population)?;
        let population = self.evaluate_generation(generation)?;
        log_generation(generation, &population);
        checkpoint::save(&self.config.checkpoint_path, &params, &population)?;
        Ok((params, population))
    }

    /// Waits until every item of `generation` is done and loads it.
    ///
    /// In local mode every claimable item is scored here first, including
    /// items whose lease expired while waiting.
    fn evaluate_generation(&mut self, generation: u32) -> Result<Population, CoordinatorError> {
        let started = Instant::now();
        let mut last_done = None;
        loop {
            if self.config.mode.is_local() {
                self.drain_locally(generation)?;
            }

            let counts = self.store.count_status(generation)?;
            if counts.is_complete() {
                break;
            }
            if last_done != Some(counts.done) {
                info!(
                    "generation {generation}: {}/{} done, {} claimed, waiting",
                    counts.done, counts.total, counts.claimed
                );
                last_done = Some(counts.done);
            }
            let waited = started.elapsed();
            if self.config.wait_timeout.is_some_and(|limit| waited >= limit) {
                return Err(CoordinatorError::WaitTimeout {
                    generation,
                    done: counts.done,
                    total: counts.total,
                    waited,
                });
            }
            thread::sleep(self.config.poll_interval);
        }

        Ok(self.store.load_generation(generation)?)
    }

    fn drain_locally(&mut self, generation: u32) -> Result<(), CoordinatorError> {
        let mut evaluated = 0_usize;
        loop {
            match self.store.claim_pending_in(generation)? {
                ClaimOutcome::Claimed(item) => {
                    let fitness = self.evaluator.score(&item.genes);
                    self.store.report_done(item.generation, item.index, fitness)?;
                    evaluated += 1;
                }
                ClaimOutcome::Busy => {
                    debug!("work store busy, retrying");
                    thread::sleep(self.config.poll_interval);
                }
                ClaimOutcome::Empty => break,
            }
        }
        if evaluated > 0 {
            debug!("evaluated {evaluated} items of generation {generation}");
        }
        Ok(())
    }
}

fn log_generation(generation: u32, population: &Population) {
    if let Some(stats) = population.fitness_stats() {
        info!(
            "generation {generation}: min={:.3} max={:.3} mean={:.3}",
            stats.min, stats.max, stats.mean
        );
    }
}
