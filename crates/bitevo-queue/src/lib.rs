//! Durable, transactional work queue for distributed fitness evaluation.
//!
//! The queue stores one row per individual per generation in an `SQLite`
//! database. The coordinator seeds a generation, any number of worker
//! processes claim and evaluate items, and the coordinator harvests the
//! results once every item of the generation is done.
//!
//! # Item lifecycle
//!
//! ```text
//! seed_generation          claim_one_pending          report_done
//!   ──────────▶ pending ──────────────────▶ claimed ──────────────▶ done
//!                  ▲                           │
//!                  └──── lease expired ────────┘  (optional)
//! ```
//!
//! - An item is claimed by at most one caller. Exclusivity comes from the
//!   database write lock taken by the claim transaction, not from any
//!   coordination between processes.
//! - Reports only apply to `claimed` items, so duplicated or stale reports are
//!   ignored.
//! - A generation is seeded in a single transaction and is never observed half
//!   written.
//!
//! # Concurrency
//!
//! Every process opens its own [`WorkStore`] on the same file. The database
//! runs in WAL mode, so readers (status counts, loads) never wait for writers.
//! Writers wait up to [`StoreOptions::busy_timeout`]; a claim that still cannot
//! get the lock returns [`ClaimOutcome::Busy`] instead of failing.
//!
//! # Example
//!
//! ```
//! use bitevo_genome::Population;
//! use bitevo_queue::{ClaimOutcome, StoreOptions, WorkStore};
//!
//! let mut store = WorkStore::open_in_memory(StoreOptions::default())?;
//! store.init_schema()?;
//! store.seed_generation(0, &Population::new(2, 8))?;
//!
//! while let ClaimOutcome::Claimed(item) = store.claim_one_pending()? {
//!     store.report_done(item.generation, item.index, 0.0)?;
//! }
//! assert!(store.count_status(0)?.is_complete());
//! # Ok::<(), bitevo_queue::StoreError>(())
//! ```

pub use self::{
    error::StoreError,
    item::{
        ClaimOutcome, ClaimedItem, GenerationCounts, GenerationShape, GenerationSummary, WorkStatus,
    },
    store::{DEFAULT_BUSY_TIMEOUT, StoreOptions, WorkStore},
};

mod error;
mod item;
mod schema;
mod store;
