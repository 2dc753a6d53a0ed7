use serde::Serialize;

/// Lifecycle state of one work item.
///
/// Items only move forward: `Pending -> Claimed -> Done`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    derive_more::Display,
    derive_more::FromStr,
    derive_more::IsVariant,
)]
#[serde(rename_all = "lowercase")]
pub enum WorkStatus {
    #[display("pending")]
    Pending,
    #[display("claimed")]
    Claimed,
    #[display("done")]
    Done,
}

/// A work item handed out by a successful claim.
///
/// Holds a private copy of the chromosome bytes; the row in the store is not
/// touched again until the claimant reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedItem {
    pub generation: u32,
    pub index: u32,
    pub genes: Vec<u8>,
}

/// Result of a claim attempt.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum ClaimOutcome {
    /// An item was claimed by this caller.
    Claimed(ClaimedItem),
    /// Nothing is claimable right now.
    Empty,
    /// The store was locked by another writer for longer than the busy
    /// timeout. Not an error: retry after a delay.
    Busy,
}

impl ClaimOutcome {
    #[must_use]
    pub fn into_claimed(self) -> Option<ClaimedItem> {
        match self {
            Self::Claimed(item) => Some(item),
            Self::Empty | Self::Busy => None,
        }
    }
}

/// Status counts for one generation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationCounts {
    pub total: usize,
    pub pending: usize,
    pub claimed: usize,
    pub done: usize,
}

impl GenerationCounts {
    /// True when the generation has rows and all of them are done.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.done == self.total
    }
}

/// Population size and gene length of a stored generation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationShape {
    pub population_size: usize,
    pub gene_length: usize,
}

/// One row of [`WorkStore::generation_summaries`](crate::WorkStore::generation_summaries).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationSummary {
    pub generation: u32,
    /// Unix timestamp (seconds) at which the generation was seeded.
    pub created_at: i64,
    pub counts: GenerationCounts,
    pub best_fitness: Option<f64>,
}
