//! Pluggable fitness functions.
//!
//! A fitness function is anything implementing [`Evaluator`]: it receives the
//! raw gene bytes of one chromosome and returns a score, higher is better. The
//! same evaluator is used by the coordinator in local mode and by workers, so
//! it only sees the bytes that travel through the work queue.
//!
//! Closures of the form `Fn(&[u8]) -> f64` implement [`Evaluator`] directly.
//!
//! ```
//! use bitevo_genome::fitness::{Evaluator, LeadingOnes, OneMax};
//!
//! assert_eq!(OneMax.score(&[1, 0, 1, 1]), 3.0);
//! assert_eq!(LeadingOnes.score(&[1, 1, 0, 1]), 2.0);
//!
//! let zeros = |genes: &[u8]| genes.iter().filter(|g| **g == 0).count() as f64;
//! assert_eq!(zeros.score(&[1, 0, 0]), 2.0);
//! ```

/// Scores a chromosome given its gene bytes.
///
/// Implementations must be pure: the result may be computed by any process,
/// any number of times, and only the first reported value is kept.
pub trait Evaluator {
    fn score(&self, genes: &[u8]) -> f64;
}

impl<F> Evaluator for F
where
    F: Fn(&[u8]) -> f64,
{
    fn score(&self, genes: &[u8]) -> f64 {
        self(genes)
    }
}

/// Counts set genes (the "one-max" problem).
#[derive(Debug, Default, Clone, Copy)]
pub struct OneMax;

impl Evaluator for OneMax {
    #[expect(clippy::cast_precision_loss)]
    fn score(&self, genes: &[u8]) -> f64 {
        genes.iter().filter(|g| **g != 0).count() as f64
    }
}

/// Counts consecutive set genes from the start of the chromosome.
#[derive(Debug, Default, Clone, Copy)]
pub struct LeadingOnes;

impl Evaluator for LeadingOnes {
    #[expect(clippy::cast_precision_loss)]
    fn score(&self, genes: &[u8]) -> f64 {
        genes.iter().take_while(|g| **g != 0).count() as f64
    }
}
