use std::path::PathBuf;

/// Errors raised by the persistent work queue.
///
/// Every variant is fatal for write paths. The only benign condition, a busy
/// store while claiming, is reported as [`ClaimOutcome::Busy`](crate::ClaimOutcome::Busy)
/// rather than as an error.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum StoreError {
    #[display("failed to open work store at {}", path.display())]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    #[display("work store query failed")]
    #[from]
    Sqlite(rusqlite::Error),
    #[display("unknown work item status '{status}' for generation {generation} index {index}")]
    InvalidStatus {
        generation: u32,
        index: u32,
        status: String,
    },
    #[display("generation {generation} has {count} individuals, more than the store can index")]
    TooManyIndividuals { generation: u32, count: usize },
}
