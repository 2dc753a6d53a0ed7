/// Summary of a population's fitness distribution.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct FitnessStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl FitnessStats {
    /// Computes min, max and mean of `values`.
    ///
    /// Returns `None` if `values` is empty.
    ///
    /// ```
    /// # use bitevo_genome::stats::FitnessStats;
    /// let stats = FitnessStats::new([3.0, 1.0, 2.0]).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 3.0);
    /// assert_eq!(stats.mean, 2.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut count = 0_usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        if count == 0 {
            return None;
        }
        #[expect(clippy::cast_precision_loss)]
        let mean = sum / count as f64;
        Some(Self { min, max, mean })
    }
}
