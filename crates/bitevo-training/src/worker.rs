//! Stateless evaluation worker.
//!
//! A worker repeatedly claims the lowest pending item from the store, scores
//! it with a process-local [`Evaluator`], and reports the fitness. Any number
//! of workers can share one store; the claim transaction guarantees each item
//! goes to exactly one of them.

use std::{thread, time::Duration};

use bitevo_genome::fitness::Evaluator;
use bitevo_queue::{ClaimOutcome, StoreError, WorkStore};
use log::{debug, info};

use crate::coordinator::DEFAULT_POLL_INTERVAL;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum WorkerMode {
    /// Exit as soon as no work is pending.
    #[default]
    OneShot,
    /// Keep polling for new work.
    Loop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerConfig {
    pub mode: WorkerMode,
    pub poll_interval: Duration,
    /// Stop after evaluating this many items.
    pub max_items: Option<usize>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            mode: WorkerMode::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_items: None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSummary {
    /// Items claimed and scored.
    pub evaluated: usize,
    /// Reports the store did not apply because the item was no longer claimed.
    pub ignored_reports: usize,
}

/// Result of a single [`Worker::step`].
#[derive(Debug, Clone, Copy, PartialEq, derive_more::IsVariant)]
pub enum Step {
    Evaluated {
        generation: u32,
        index: u32,
        fitness: f64,
        applied: bool,
    },
    Idle,
    Busy,
}

pub struct Worker<'a, E>
where
    E: ?Sized,
{
    store: &'a mut WorkStore,
    evaluator: &'a E,
    config: WorkerConfig,
}

impl<'a, E> Worker<'a, E>
where
    E: Evaluator + ?Sized,
{
    pub fn new(store: &'a mut WorkStore, evaluator: &'a E, config: WorkerConfig) -> Self {
        Self {
            store,
            evaluator,
            config,
        }
    }

    /// Processes items until the configured stop condition.
    ///
    /// Store errors end the run; a busy store is retried after the poll
    /// interval in either mode.
    pub fn run(&mut self) -> Result<WorkerSummary, StoreError> {
        let mut summary = WorkerSummary::default();
        loop {
            if self
                .config
                .max_items
                .is_some_and(|max| summary.evaluated >= max)
            {
                info!("evaluated {} items, stopping", summary.evaluated);
                break;
            }
            match self.step()? {
                Step::Evaluated { applied, .. } => {
                    summary.evaluated += 1;
                    if !applied {
                        summary.ignored_reports += 1;
                    }
                }
                Step::Idle if self.config.mode.is_one_shot() => {
                    info!("no pending work, exiting");
                    break;
                }
                Step::Idle | Step::Busy => thread::sleep(self.config.poll_interval),
            }
        }
        Ok(summary)
    }

    /// Claims, scores and reports at most one item.
    pub fn step(&mut self) -> Result<Step, StoreError> {
        let item = match self.store.claim_one_pending()? {
            ClaimOutcome::Claimed(item) => item,
            ClaimOutcome::Empty => return Ok(Step::Idle),
            ClaimOutcome::Busy => {
                debug!("work store busy, retrying");
                return Ok(Step::Busy);
            }
        };
        let fitness = self.evaluator.score(&item.genes);
        let applied = self
            .store
            .report_done(item.generation, item.index, fitness)?;
        debug!(
            "generation {} index {}: fitness {fitness}",
            item.generation, item.index
        );
        Ok(Step::Evaluated {
            generation: item.generation,
            index: item.index,
            fitness,
            applied,
        })
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use std::path::Path;

    use bitevo_genome::{Population, fitness::OneMax};
    use bitevo_queue::StoreOptions;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn seeded_store(path: &Path, generation: u32, size: usize) -> WorkStore {
        let mut store = WorkStore::open(path).unwrap();
        store.init_schema().unwrap();
        let mut population = Population::new(size, 12);
        population.randomize(&mut Pcg32::seed_from_u64(u64::from(generation)));
        store.seed_generation(generation, &population).unwrap();
        store
    }

    fn one_shot() -> WorkerConfig {
        WorkerConfig {
            poll_interval: Duration::from_millis(2),
            ..WorkerConfig::default()
        }
    }

    #[test]
    fn test_one_shot_drains_and_exits() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = seeded_store(&dir.path().join("ga.db"), 0, 6);

        let summary = Worker::new(&mut store, &OneMax, one_shot()).run().unwrap();
        assert_eq!(
            summary,
            WorkerSummary {
                evaluated: 6,
                ignored_reports: 0
            }
        );
        assert!(store.count_status(0).unwrap().is_complete());
        for c in store.load_generation(0).unwrap().individuals() {
            assert_eq!(c.fitness(), OneMax.score(c.genes()));
        }
    }

    #[test]
    fn test_one_shot_on_empty_store_exits_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = WorkStore::open(dir.path().join("ga.db")).unwrap();
        store.init_schema().unwrap();
        let summary = Worker::new(&mut store, &OneMax, one_shot()).run().unwrap();
        assert_eq!(summary.evaluated, 0);
    }

    #[test]
    fn test_max_items_stops_early() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = seeded_store(&dir.path().join("ga.db"), 0, 6);
        let config = WorkerConfig {
            max_items: Some(4),
            ..one_shot()
        };
        let summary = Worker::new(&mut store, &OneMax, config).run().unwrap();
        assert_eq!(summary.evaluated, 4);
        let counts = store.count_status(0).unwrap();
        assert_eq!((counts.done, counts.pending), (4, 2));
    }

    #[test]
    fn test_loop_mode_picks_up_later_generations() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("ga.db");
        let mut store = seeded_store(&db, 0, 3);

        let seeder = thread::spawn({
            let db = db.clone();
            move || {
                thread::sleep(Duration::from_millis(50));
                drop(seeded_store(&db, 1, 3));
            }
        });

        let config = WorkerConfig {
            mode: WorkerMode::Loop,
            max_items: Some(6),
            ..one_shot()
        };
        let summary = Worker::new(&mut store, &OneMax, config).run().unwrap();
        seeder.join().unwrap();

        assert_eq!(summary.evaluated, 6);
        assert!(store.count_status(0).unwrap().is_complete());
        assert!(store.count_status(1).unwrap().is_complete());
    }

    #[test]
    fn test_claims_follow_generation_and_index_order() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("ga.db");
        drop(seeded_store(&db, 2, 2));
        let mut store = seeded_store(&db, 1, 2);

        let mut worker = Worker::new(&mut store, &OneMax, one_shot());
        let mut order = vec![];
        while let Step::Evaluated {
            generation, index, ..
        } = worker.step().unwrap()
        {
            order.push((generation, index));
        }
        assert_eq!(order, vec![(1, 0), (1, 1), (2, 0), (2, 1)]);
    }

    #[test]
    fn test_late_report_is_not_applied() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("ga.db");
        let mut store = seeded_store(&db, 0, 2);

        // another worker reclaims the item through an expired lease and
        // reports it first
        let options = StoreOptions {
            claim_lease: Some(Duration::ZERO),
            ..StoreOptions::default()
        };
        let slow_evaluator = |genes: &[u8]| {
            let mut other = WorkStore::open_with(&db, options).unwrap();
            let item = other.claim_one_pending().unwrap().into_claimed().unwrap();
            assert!(other.report_done(item.generation, item.index, 99.0).unwrap());
            OneMax.score(genes)
        };

        let mut worker = Worker::new(&mut store, &slow_evaluator, one_shot());
        let step = worker.step().unwrap();
        assert!(matches!(
            step,
            Step::Evaluated {
                index: 0,
                applied: false,
                ..
            }
        ));
        let population = store.load_generation(0).unwrap();
        assert_eq!(population.individuals()[0].fitness(), 99.0);
    }
}
