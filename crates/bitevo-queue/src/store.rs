use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use bitevo_genome::{Chromosome, Population};
use chrono::Utc;
use log::debug;
use rusqlite::{Connection, ErrorCode, OptionalExtension as _, TransactionBehavior, params};

use crate::{
    error::StoreError,
    item::{
        ClaimOutcome, ClaimedItem, GenerationCounts, GenerationShape, GenerationSummary, WorkStatus,
    },
    schema,
};

/// How long a connection waits on another writer before giving up.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection-level settings of a [`WorkStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Time a transaction waits for a competing writer before the store is
    /// considered busy.
    pub busy_timeout: Duration,
    /// When set, items left in `claimed` for longer than this are claimable
    /// again. `None` keeps a claim forever.
    pub claim_lease: Option<Duration>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            claim_lease: None,
        }
    }
}

/// Handle to the durable work queue shared by the coordinator and workers.
///
/// Each process opens its own handle on the same database file. All
/// coordination between processes happens through the transactions issued
/// here:
///
/// - seeding takes the write lock and inserts a whole generation at once, so
///   readers see either none or all of its rows
/// - claiming selects and marks one item inside a single write transaction,
///   so two claimants can never receive the same item
/// - reporting only applies to items that are currently `claimed`
///
/// Read-only queries run without the write lock and may observe a slightly
/// stale snapshot.
///
/// The connection is closed when the handle is dropped, or explicitly with
/// [`WorkStore::close`].
#[derive(Debug)]
pub struct WorkStore {
    conn: Connection,
    options: StoreOptions,
}

impl WorkStore {
    /// Opens (creating if missing) the store at `path` with default options.
    pub fn open<P>(path: P) -> Result<Self, StoreError>
    where
        P: AsRef<Path>,
    {
        Self::open_with(path, StoreOptions::default())
    }

    pub fn open_with<P>(path: P, options: StoreOptions) -> Result<Self, StoreError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path)
            .and_then(|conn| configure(&conn, &options).map(|()| conn))
            .map_err(|source| StoreError::Open { path, source })?;
        Ok(Self { conn, options })
    }

    /// Opens a private in-memory store. Nothing is shared or persisted.
    pub fn open_in_memory(options: StoreOptions) -> Result<Self, StoreError> {
        let path = PathBuf::from(":memory:");
        let conn = Connection::open_in_memory()
            .and_then(|conn| configure(&conn, &options).map(|()| conn))
            .map_err(|source| StoreError::Open { path, source })?;
        Ok(Self { conn, options })
    }

    /// Closes the connection, reporting any error the drop would swallow.
    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_conn, err)| err.into())
    }

    /// Creates the tables and index if they do not exist yet.
    pub fn init_schema(&self) -> Result<(), StoreError> {
        schema::init(&self.conn)?;
        Ok(())
    }

    /// Writes `population` as the pending items of `generation`.
    ///
    /// Existing rows of the generation are overwritten and rows beyond the
    /// population size are removed, so a re-seed never leaves stale items
    /// behind. The whole operation is one transaction.
    pub fn seed_generation(
        &mut self,
        generation: u32,
        population: &Population,
    ) -> Result<(), StoreError> {
        self.seed_generation_with(generation, population, |_| {})
    }

    fn seed_generation_with<F>(
        &mut self,
        generation: u32,
        population: &Population,
        mut after_row: F,
    ) -> Result<(), StoreError>
    where
        F: FnMut(u32),
    {
        let count =
            u32::try_from(population.len()).map_err(|_| StoreError::TooManyIndividuals {
                generation,
                count: population.len(),
            })?;
        let now = now_ts();

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT OR REPLACE INTO generations (gen, created_ts) VALUES (?1, ?2)",
            params![generation, now],
        )?;
        tx.execute(
            "DELETE FROM individuals WHERE gen = ?1 AND idx >= ?2",
            params![generation, count],
        )?;
        {
            let mut insert = tx.prepare(
                "INSERT OR REPLACE INTO individuals
                    (gen, idx, chromosome, status, fitness, claimed_ts, done_ts)
                 VALUES (?1, ?2, ?3, 'pending', NULL, NULL, NULL)",
            )?;
            for (index, chromosome) in (0..count).zip(population.individuals()) {
                insert.execute(params![generation, index, chromosome.genes()])?;
                after_row(index);
            }
        }
        tx.commit()?;

        debug!("seeded generation {generation} with {count} pending items");
        Ok(())
    }

    /// Claims the oldest claimable item of any generation.
    ///
    /// Items are taken in `(generation, index)` order. With a claim lease
    /// configured, items whose claim has expired are claimable as well.
    pub fn claim_one_pending(&mut self) -> Result<ClaimOutcome, StoreError> {
        self.claim(None)
    }

    /// Like [`WorkStore::claim_one_pending`], restricted to one generation.
    pub fn claim_pending_in(&mut self, generation: u32) -> Result<ClaimOutcome, StoreError> {
        self.claim(Some(generation))
    }

    fn claim(&mut self, generation: Option<u32>) -> Result<ClaimOutcome, StoreError> {
        let now = now_ts();
        let expired_before = self.options.claim_lease.map(|lease| {
            let lease = i64::try_from(lease.as_secs()).unwrap_or(i64::MAX);
            now.saturating_sub(lease)
        });

        let tx = match self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
        {
            Ok(tx) => tx,
            Err(err) if is_busy(&err) => {
                debug!("work store busy, claim skipped");
                return Ok(ClaimOutcome::Busy);
            }
            Err(err) => return Err(err.into()),
        };

        let selected = tx
            .query_row(
                "SELECT gen, idx, chromosome FROM individuals
                 WHERE (?1 IS NULL OR gen = ?1)
                   AND (status = 'pending'
                        OR (status = 'claimed' AND ?2 IS NOT NULL AND claimed_ts <= ?2))
                 ORDER BY gen ASC, idx ASC
                 LIMIT 1",
                params![generation, expired_before],
                |row| {
                    Ok(ClaimedItem {
                        generation: row.get(0)?,
                        index: row.get(1)?,
                        genes: row.get(2)?,
                    })
                },
            )
            .optional()?;

        let Some(item) = selected else {
            tx.rollback()?;
            return Ok(ClaimOutcome::Empty);
        };

        tx.execute(
            "UPDATE individuals SET status = 'claimed', claimed_ts = ?3
             WHERE gen = ?1 AND idx = ?2",
            params![item.generation, item.index, now],
        )?;
        tx.commit()?;

        debug!(
            "claimed generation {} index {} ({} genes)",
            item.generation,
            item.index,
            item.genes.len()
        );
        Ok(ClaimOutcome::Claimed(item))
    }

    /// Records the fitness of a claimed item and marks it done.
    ///
    /// Returns `false`, changing nothing, if the item is not currently
    /// `claimed` (already reported, never claimed, or re-seeded since).
    pub fn report_done(
        &mut self,
        generation: u32,
        index: u32,
        fitness: f64,
    ) -> Result<bool, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE individuals SET status = 'done', fitness = ?3, done_ts = ?4
             WHERE gen = ?1 AND idx = ?2 AND status = 'claimed'",
            params![generation, index, fitness, now_ts()],
        )?;
        tx.commit()?;

        if changed == 0 {
            debug!("ignored report for generation {generation} index {index}: not claimed");
        }
        Ok(changed > 0)
    }

    /// Counts the items of `generation` in each state.
    pub fn count_status(&self, generation: u32) -> Result<GenerationCounts, StoreError> {
        let counts = self.conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(status = 'pending'), 0),
                    COALESCE(SUM(status = 'claimed'), 0),
                    COALESCE(SUM(status = 'done'), 0)
             FROM individuals WHERE gen = ?1",
            params![generation],
            |row| {
                Ok(GenerationCounts {
                    total: to_usize(row.get(0)?),
                    pending: to_usize(row.get(1)?),
                    claimed: to_usize(row.get(2)?),
                    done: to_usize(row.get(3)?),
                })
            },
        )?;
        Ok(counts)
    }

    /// Highest generation number that has been seeded.
    pub fn latest_generation(&self) -> Result<Option<u32>, StoreError> {
        let latest = self
            .conn
            .query_row("SELECT MAX(gen) FROM generations", [], |row| row.get(0))?;
        Ok(latest)
    }

    /// Population size and gene length of a stored generation.
    ///
    /// The gene length is the byte length of the first item's chromosome.
    /// Returns `None` if the generation has no items.
    pub fn shape_of_generation(
        &self,
        generation: u32,
    ) -> Result<Option<GenerationShape>, StoreError> {
        let (count, gene_length): (i64, Option<i64>) = self.conn.query_row(
            "SELECT COUNT(*),
                    (SELECT LENGTH(chromosome) FROM individuals
                     WHERE gen = ?1 ORDER BY idx LIMIT 1)
             FROM individuals WHERE gen = ?1",
            params![generation],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        if count == 0 {
            return Ok(None);
        }
        Ok(Some(GenerationShape {
            population_size: to_usize(count),
            gene_length: gene_length.map_or(0, to_usize),
        }))
    }

    /// Rebuilds the population of `generation`, best first.
    ///
    /// Items without a reported fitness load with fitness 0. Chromosomes are
    /// sized to the generation's gene length, zero-filling short blobs. An
    /// unseeded generation loads as an empty population.
    pub fn load_generation(&self, generation: u32) -> Result<Population, StoreError> {
        let Some(shape) = self.shape_of_generation(generation)? else {
            return Ok(Population::new(0, 0));
        };

        let mut stmt = self.conn.prepare(
            "SELECT idx, chromosome, status, fitness FROM individuals
             WHERE gen = ?1 ORDER BY idx",
        )?;
        let rows = stmt.query_map(params![generation], |row| {
            Ok((
                row.get::<_, u32>(0)?,
                row.get::<_, Vec<u8>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<f64>>(3)?,
            ))
        })?;

        let mut individuals = Vec::with_capacity(shape.population_size);
        for row in rows {
            let (index, genes, status, fitness) = row?;
            status
                .parse::<WorkStatus>()
                .map_err(|_| StoreError::InvalidStatus {
                    generation,
                    index,
                    status: status.clone(),
                })?;
            let mut chromosome = Chromosome::from_bytes(&genes, shape.gene_length);
            chromosome.set_fitness(fitness.unwrap_or(0.0));
            individuals.push(chromosome);
        }

        let mut population = Population::from_individuals(shape.gene_length, individuals);
        population.sort_by_fitness_desc();
        Ok(population)
    }

    /// One summary row per seeded generation, oldest first.
    pub fn generation_summaries(&self) -> Result<Vec<GenerationSummary>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT g.gen, g.created_ts,
                    COUNT(i.idx),
                    COALESCE(SUM(i.status = 'pending'), 0),
                    COALESCE(SUM(i.status = 'claimed'), 0),
                    COALESCE(SUM(i.status = 'done'), 0),
                    MAX(i.fitness)
             FROM generations g
             LEFT JOIN individuals i ON i.gen = g.gen
             GROUP BY g.gen
             ORDER BY g.gen",
        )?;
        let summaries = stmt
            .query_map([], |row| {
                Ok(GenerationSummary {
                    generation: row.get(0)?,
                    created_at: row.get(1)?,
                    counts: GenerationCounts {
                        total: to_usize(row.get(2)?),
                        pending: to_usize(row.get(3)?),
                        claimed: to_usize(row.get(4)?),
                        done: to_usize(row.get(5)?),
                    },
                    best_fitness: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(summaries)
    }
}

fn configure(conn: &Connection, options: &StoreOptions) -> rusqlite::Result<()> {
    conn.busy_timeout(options.busy_timeout)?;
    // in-memory databases answer "memory" here; both are fine
    let _mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
    conn.execute_batch("PRAGMA synchronous=NORMAL;")?;
    Ok(())
}

fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}

fn now_ts() -> i64 {
    Utc::now().timestamp()
}

fn to_usize(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use std::{
        collections::HashSet,
        sync::{
            Arc, Barrier,
            atomic::{AtomicBool, Ordering},
        },
        thread,
    };

    use tempfile::TempDir;

    use super::*;

    fn temp_store() -> (TempDir, WorkStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = WorkStore::open(dir.path().join("queue.db")).unwrap();
        store.init_schema().unwrap();
        (dir, store)
    }

    fn population_of(bits: &[&str]) -> Population {
        let individuals = bits
            .iter()
            .map(|b| Chromosome::from_bitstring(b).unwrap())
            .collect();
        Population::from_individuals(bits[0].len(), individuals)
    }

    fn zero_population(size: usize, gene_length: usize) -> Population {
        Population::new(size, gene_length)
    }

    fn claim(store: &mut WorkStore) -> ClaimedItem {
        store.claim_one_pending().unwrap().into_claimed().unwrap()
    }

    mod schema {
        use super::*;

        #[test]
        fn test_init_is_idempotent() {
            let (_dir, store) = temp_store();
            store.init_schema().unwrap();
            store.init_schema().unwrap();
            assert_eq!(store.latest_generation().unwrap(), None);
        }

        #[test]
        fn test_state_survives_reopen() {
            let (dir, mut store) = temp_store();
            store.seed_generation(3, &zero_population(2, 4)).unwrap();
            store.close().unwrap();

            let store = WorkStore::open(dir.path().join("queue.db")).unwrap();
            store.init_schema().unwrap();
            assert_eq!(store.latest_generation().unwrap(), Some(3));
        }
    }

    mod seed {
        use super::*;

        #[test]
        fn test_seed_creates_pending_items() {
            let (_dir, mut store) = temp_store();
            store.seed_generation(0, &zero_population(5, 16)).unwrap();

            let counts = store.count_status(0).unwrap();
            assert_eq!(
                counts,
                GenerationCounts {
                    total: 5,
                    pending: 5,
                    claimed: 0,
                    done: 0,
                }
            );
            assert!(!counts.is_complete());
            assert_eq!(
                store.shape_of_generation(0).unwrap(),
                Some(GenerationShape {
                    population_size: 5,
                    gene_length: 16,
                })
            );
        }

        #[test]
        fn test_unseeded_generation_is_empty() {
            let (_dir, store) = temp_store();
            assert_eq!(store.count_status(9).unwrap(), GenerationCounts::default());
            assert_eq!(store.shape_of_generation(9).unwrap(), None);
            assert!(store.load_generation(9).unwrap().is_empty());
        }

        #[test]
        fn test_reseed_overwrites_instead_of_appending() {
            let (_dir, mut store) = temp_store();
            store.seed_generation(1, &zero_population(6, 4)).unwrap();
            let item = claim(&mut store);
            store.report_done(item.generation, item.index, 1.0).unwrap();

            store
                .seed_generation(1, &population_of(&["1111", "1100", "1000"]))
                .unwrap();

            let counts = store.count_status(1).unwrap();
            assert_eq!(counts.total, 3);
            assert_eq!(counts.pending, 3);
            let loaded = store.load_generation(1).unwrap();
            let bits: Vec<_> = loaded.individuals().iter().map(Chromosome::to_bitstring).collect();
            assert_eq!(bits, vec!["1111", "1100", "1000"]);
            assert!(loaded.individuals().iter().all(|c| c.fitness() == 0.0));
        }

        #[test]
        fn test_latest_generation_tracks_max() {
            let (_dir, mut store) = temp_store();
            for generation in [0, 2, 1] {
                store
                    .seed_generation(generation, &zero_population(2, 2))
                    .unwrap();
            }
            assert_eq!(store.latest_generation().unwrap(), Some(2));
            let summaries = store.generation_summaries().unwrap();
            let generations: Vec<_> = summaries.iter().map(|s| s.generation).collect();
            assert_eq!(generations, vec![0, 1, 2]);
        }

        #[test]
        fn test_reader_never_sees_partial_generation() {
            const SIZE: usize = 12;
            let (dir, mut writer) = temp_store();
            let path = dir.path().join("queue.db");
            let seeding = Arc::new(AtomicBool::new(true));
            let started = Arc::new(Barrier::new(2));

            let reader = {
                let seeding = Arc::clone(&seeding);
                let started = Arc::clone(&started);
                thread::spawn(move || {
                    let store = WorkStore::open(&path).unwrap();
                    let mut observed = HashSet::new();
                    started.wait();
                    while seeding.load(Ordering::SeqCst) {
                        observed.insert(store.count_status(4).unwrap().total);
                        thread::sleep(Duration::from_millis(2));
                    }
                    observed.insert(store.count_status(4).unwrap().total);
                    observed
                })
            };

            started.wait();
            writer
                .seed_generation_with(4, &zero_population(SIZE, 8), |_| {
                    thread::sleep(Duration::from_millis(10));
                })
                .unwrap();
            seeding.store(false, Ordering::SeqCst);

            let observed = reader.join().unwrap();
            assert!(observed.contains(&SIZE));
            assert!(
                observed.iter().all(|total| *total == 0 || *total == SIZE),
                "observed partial generation: {observed:?}"
            );
        }
    }

    mod claim {
        use super::*;

        #[test]
        fn test_claims_oldest_generation_and_index_first() {
            let (_dir, mut store) = temp_store();
            store
                .seed_generation(2, &population_of(&["0001", "0010"]))
                .unwrap();
            store
                .seed_generation(1, &population_of(&["1000", "0100"]))
                .unwrap();

            let order: Vec<_> = (0..4)
                .map(|_| {
                    let item = claim(&mut store);
                    (item.generation, item.index, item.genes)
                })
                .collect();
            assert_eq!(
                order,
                vec![
                    (1, 0, vec![1, 0, 0, 0]),
                    (1, 1, vec![0, 1, 0, 0]),
                    (2, 0, vec![0, 0, 0, 1]),
                    (2, 1, vec![0, 0, 1, 0]),
                ]
            );
            assert_eq!(store.claim_one_pending().unwrap(), ClaimOutcome::Empty);
        }

        #[test]
        fn test_claim_reports_busy_while_another_writer_holds_the_lock() {
            let (dir, mut store) = temp_store();
            store.seed_generation(0, &zero_population(2, 4)).unwrap();
            let path = dir.path().join("queue.db");

            let blocker = Connection::open(&path).unwrap();
            blocker.execute_batch("BEGIN IMMEDIATE").unwrap();

            let options = StoreOptions {
                busy_timeout: Duration::from_millis(50),
                ..StoreOptions::default()
            };
            let mut contender = WorkStore::open_with(&path, options).unwrap();
            assert_eq!(contender.claim_one_pending().unwrap(), ClaimOutcome::Busy);
            assert!(contender.report_done(0, 0, 1.0).is_err());

            blocker.execute_batch("COMMIT").unwrap();
            let item = claim(&mut contender);
            assert_eq!((item.generation, item.index), (0, 0));
            assert_eq!(store.count_status(0).unwrap().claimed, 1);
        }

        #[test]
        fn test_claim_marks_item_claimed() {
            let (_dir, mut store) = temp_store();
            store.seed_generation(0, &zero_population(3, 4)).unwrap();
            claim(&mut store);
            let counts = store.count_status(0).unwrap();
            assert_eq!((counts.pending, counts.claimed, counts.done), (2, 1, 0));
        }

        #[test]
        fn test_claim_in_generation_ignores_others() {
            let (_dir, mut store) = temp_store();
            store.seed_generation(0, &zero_population(1, 4)).unwrap();
            store.seed_generation(1, &zero_population(1, 4)).unwrap();

            let item = store.claim_pending_in(1).unwrap().into_claimed().unwrap();
            assert_eq!((item.generation, item.index), (1, 0));
            assert!(store.claim_pending_in(1).unwrap().is_empty());
            assert!(store.claim_pending_in(0).unwrap().is_claimed());
        }

        #[test]
        fn test_claim_on_empty_store() {
            let (_dir, mut store) = temp_store();
            assert!(store.claim_one_pending().unwrap().is_empty());
        }

        #[test]
        fn test_claimed_items_stay_claimed_without_lease() {
            let (_dir, mut store) = temp_store();
            store.seed_generation(0, &zero_population(1, 4)).unwrap();
            claim(&mut store);
            assert!(store.claim_one_pending().unwrap().is_empty());
        }

        #[test]
        fn test_expired_claim_is_reclaimable() {
            let dir = tempfile::tempdir().unwrap();
            let options = StoreOptions {
                claim_lease: Some(Duration::ZERO),
                ..StoreOptions::default()
            };
            let mut store = WorkStore::open_with(dir.path().join("queue.db"), options).unwrap();
            store.init_schema().unwrap();
            store.seed_generation(0, &zero_population(1, 4)).unwrap();

            let first = claim(&mut store);
            let second = claim(&mut store);
            assert_eq!((first.generation, first.index), (second.generation, second.index));

            assert!(store.report_done(0, 0, 2.0).unwrap());
            assert!(store.claim_one_pending().unwrap().is_empty());
        }

        #[test]
        fn test_concurrent_claims_are_exclusive() {
            const WORKERS: usize = 8;
            const ITEMS: usize = 5;
            let (dir, mut store) = temp_store();
            store.seed_generation(0, &zero_population(ITEMS, 8)).unwrap();
            let path = dir.path().join("queue.db");
            let barrier = Arc::new(Barrier::new(WORKERS));

            let handles: Vec<_> = (0..WORKERS)
                .map(|_| {
                    let path = path.clone();
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        let mut store = WorkStore::open(&path).unwrap();
                        barrier.wait();
                        loop {
                            match store.claim_one_pending().unwrap() {
                                ClaimOutcome::Claimed(item) => {
                                    break Some((item.generation, item.index));
                                }
                                ClaimOutcome::Empty => break None,
                                ClaimOutcome::Busy => thread::sleep(Duration::from_millis(5)),
                            }
                        }
                    })
                })
                .collect();

            let claims: Vec<_> = handles
                .into_iter()
                .filter_map(|h| h.join().unwrap())
                .collect();
            let distinct: HashSet<_> = claims.iter().copied().collect();
            assert_eq!(claims.len(), WORKERS.min(ITEMS));
            assert_eq!(distinct.len(), claims.len());
            assert_eq!(store.count_status(0).unwrap().claimed, ITEMS);
        }

        #[test]
        fn test_concurrent_drain_claims_every_item_once() {
            const WORKERS: usize = 4;
            const ITEMS: usize = 40;
            let (dir, mut store) = temp_store();
            store.seed_generation(0, &zero_population(ITEMS, 8)).unwrap();
            let path = dir.path().join("queue.db");

            let handles: Vec<_> = (0..WORKERS)
                .map(|_| {
                    let path = path.clone();
                    thread::spawn(move || {
                        let mut store = WorkStore::open(&path).unwrap();
                        let mut mine = vec![];
                        loop {
                            match store.claim_one_pending().unwrap() {
                                ClaimOutcome::Claimed(item) => {
                                    let reported =
                                        store.report_done(item.generation, item.index, 1.0);
                                    assert!(reported.unwrap());
                                    mine.push(item.index);
                                }
                                ClaimOutcome::Empty => break mine,
                                ClaimOutcome::Busy => thread::sleep(Duration::from_millis(1)),
                            }
                        }
                    })
                })
                .collect();

            let mut all: Vec<_> = handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect();
            all.sort_unstable();
            let expected: Vec<_> = (0..u32::try_from(ITEMS).unwrap()).collect();
            assert_eq!(all, expected);
            assert!(store.count_status(0).unwrap().is_complete());
        }
    }

    mod report {
        use super::*;

        #[test]
        fn test_report_marks_done_with_fitness() {
            let (_dir, mut store) = temp_store();
            store
                .seed_generation(0, &population_of(&["1100", "1110"]))
                .unwrap();
            let item = claim(&mut store);
            assert!(store.report_done(item.generation, item.index, 2.0).unwrap());

            let counts = store.count_status(0).unwrap();
            assert_eq!((counts.pending, counts.claimed, counts.done), (1, 0, 1));
            let loaded = store.load_generation(0).unwrap();
            assert_eq!(loaded.individuals()[0].to_bitstring(), "1100");
            assert_eq!(loaded.individuals()[0].fitness(), 2.0);
            assert_eq!(loaded.individuals()[1].fitness(), 0.0);
        }

        #[test]
        fn test_second_report_is_ignored() {
            let (_dir, mut store) = temp_store();
            store.seed_generation(0, &zero_population(1, 4)).unwrap();
            let item = claim(&mut store);
            assert!(store.report_done(item.generation, item.index, 3.0).unwrap());
            assert!(!store.report_done(item.generation, item.index, 99.0).unwrap());

            let loaded = store.load_generation(0).unwrap();
            assert_eq!(loaded.individuals()[0].fitness(), 3.0);
            assert_eq!(store.count_status(0).unwrap().done, 1);
        }

        #[test]
        fn test_report_for_unclaimed_item_is_ignored() {
            let (_dir, mut store) = temp_store();
            store.seed_generation(0, &zero_population(2, 4)).unwrap();
            assert!(!store.report_done(0, 1, 5.0).unwrap());
            assert!(!store.report_done(7, 0, 5.0).unwrap());
            assert_eq!(store.count_status(0).unwrap().pending, 2);
        }
    }

    mod load {
        use super::*;

        #[test]
        fn test_load_sorts_best_first() {
            let (_dir, mut store) = temp_store();
            store
                .seed_generation(0, &population_of(&["0001", "0111", "0011"]))
                .unwrap();
            while let Some(item) = store.claim_one_pending().unwrap().into_claimed() {
                let score = item.genes.iter().map(|g| f64::from(*g)).sum();
                store.report_done(item.generation, item.index, score).unwrap();
            }

            let loaded = store.load_generation(0).unwrap();
            let bits: Vec<_> = loaded.individuals().iter().map(Chromosome::to_bitstring).collect();
            assert_eq!(bits, vec!["0111", "0011", "0001"]);
            assert!(loaded.is_sorted_by_fitness());

            let summary = &store.generation_summaries().unwrap()[0];
            assert_eq!(summary.best_fitness, Some(3.0));
            assert!(summary.counts.is_complete());
        }
    }

    #[test]
    fn test_in_memory_store() {
        let mut store = WorkStore::open_in_memory(StoreOptions::default()).unwrap();
        store.init_schema().unwrap();
        store.seed_generation(0, &zero_population(2, 3)).unwrap();
        assert_eq!(store.count_status(0).unwrap().total, 2);
    }
}
