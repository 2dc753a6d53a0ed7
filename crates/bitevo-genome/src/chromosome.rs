use rand::Rng;
use serde::{Deserialize, Serialize};

/// A fixed-length bit-string candidate solution and its fitness score.
///
/// Genes are stored one byte per bit, each byte being `0` or `1`. This is the
/// same representation that is persisted as the raw chromosome bytes in the
/// work queue, so a chromosome can be rebuilt from stored bytes without any
/// decoding step.
///
/// # Example
///
/// ```
/// use bitevo_genome::Chromosome;
///
/// let c = Chromosome::from_bitstring("10110").unwrap();
/// assert_eq!(c.len(), 5);
/// assert_eq!(c.count_ones(), 3);
/// assert_eq!(c.to_bitstring(), "10110");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chromosome {
    genes: Vec<u8>,
    fitness: f64,
}

impl Chromosome {
    /// Creates a chromosome of `gene_length` zero genes with fitness 0.
    #[must_use]
    pub fn zeroed(gene_length: usize) -> Self {
        Self {
            genes: vec![0; gene_length],
            fitness: 0.0,
        }
    }

    /// Rebuilds a chromosome from raw gene bytes.
    ///
    /// Any non-zero byte is read as a set bit. The result always has exactly
    /// `gene_length` genes: missing trailing genes are zero-filled and extra
    /// bytes are dropped.
    #[must_use]
    pub fn from_bytes(bytes: &[u8], gene_length: usize) -> Self {
        let mut genes = vec![0; gene_length];
        for (dst, src) in genes.iter_mut().zip(bytes) {
            *dst = u8::from(*src != 0);
        }
        Self {
            genes,
            fitness: 0.0,
        }
    }

    /// Parses a string of `'0'`/`'1'` characters.
    ///
    /// Returns `None` if the string contains any other character.
    #[must_use]
    pub fn from_bitstring(bits: &str) -> Option<Self> {
        let genes = bits
            .chars()
            .map(|ch| match ch {
                '0' => Some(0),
                '1' => Some(1),
                _ => None,
            })
            .collect::<Option<Vec<u8>>>()?;
        Some(Self {
            genes,
            fitness: 0.0,
        })
    }

    /// Returns the gene bytes (`0` or `1` each).
    #[must_use]
    pub fn genes(&self) -> &[u8] {
        &self.genes
    }

    #[must_use]
    pub fn genes_mut(&mut self) -> &mut [u8] {
        &mut self.genes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Returns the fitness score. Unevaluated chromosomes report 0.
    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Re-draws every gene uniformly from {0, 1}.
    pub fn randomize<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for g in &mut self.genes {
            *g = u8::from(rng.random::<bool>());
        }
    }

    /// Flips the gene at `index`.
    pub fn flip(&mut self, index: usize) {
        self.genes[index] ^= 1;
    }

    /// Number of set genes.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.genes.iter().filter(|g| **g != 0).count()
    }

    /// Renders the genes as a `'0'`/`'1'` string.
    #[must_use]
    pub fn to_bitstring(&self) -> String {
        self.genes
            .iter()
            .map(|g| if *g != 0 { '1' } else { '0' })
            .collect()
    }
}
