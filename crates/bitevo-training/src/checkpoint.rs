//! Human-readable population snapshots.
//!
//! A checkpoint is a text file with a header line of hyperparameters followed
//! by one line per individual, best first:
//!
//! ```text
//! # generation=200 population=4 geneLength=8 elitism=3 generations=1000 saveEvery=100 mutation=0.020000
//! 7 11111110
//! 6 01111110
//! 6 11011101
//! 3 10010001
//! ```
//!
//! Checkpoints are independent of the work store. They serve as a backup that
//! can be read by humans, and as a starting point for a fresh run
//! (`coordinate --resume <checkpoint>`).
//!
//! Reading is lenient. Header keys that are missing or unparsable keep the
//! caller's value, and a data line that cannot be used is repaired
//! or skipped with a warning. Only I/O failures and a file with no usable
//! content are errors.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use bitevo_genome::{Chromosome, Population};
use log::warn;

use crate::params::Hyperparameters;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum CheckpointError {
    #[display("failed to write checkpoint {}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[display("failed to read checkpoint {}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[display("checkpoint {} declares no gene length and holds no individuals", path.display())]
    MissingGeneLength { path: PathBuf },
}

/// Contents of a checkpoint file.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    /// Header values. `population_size` and `gene_length` always match
    /// `population`.
    pub params: Hyperparameters,
    pub population: Population,
}

/// Path of the checkpoint written after `generation`: `<base>-<generation>`.
#[must_use]
pub fn tagged_path(base: &Path, generation: u32) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!("-{generation}"));
    PathBuf::from(name)
}

/// Writes a checkpoint file, replacing any existing one.
///
/// The header's `generation` is `params.current_generation`; its shape comes
/// from `population`.
pub fn save<P>(
    path: P,
    params: &Hyperparameters,
    population: &Population,
) -> Result<(), CheckpointError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let to_error = |source| CheckpointError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(to_error)?;
    let mut writer = BufWriter::new(file);
    write(&mut writer, params, population).map_err(to_error)?;
    writer.flush().map_err(to_error)?;
    Ok(())
}

pub fn write<W>(
    writer: &mut W,
    params: &Hyperparameters,
    population: &Population,
) -> io::Result<()>
where
    W: Write + ?Sized,
{
    writeln!(
        writer,
        "# generation={} population={} geneLength={} elitism={} generations={} saveEvery={} mutation={:.6}",
        params.current_generation,
        population.len(),
        population.gene_length(),
        params.elite_count,
        params.total_generations,
        params.checkpoint_interval,
        params.mutation_rate,
    )?;
    for c in population.individuals() {
        writeln!(writer, "{} {}", c.fitness(), c.to_bitstring())?;
    }
    Ok(())
}

/// Reads a checkpoint file.
///
/// Header keys absent from the file take their value from `defaults`.
pub fn load<P>(path: P, defaults: &Hyperparameters) -> Result<Checkpoint, CheckpointError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| CheckpointError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    read(BufReader::new(file), defaults, path)
}

fn read<R>(
    reader: R,
    defaults: &Hyperparameters,
    path: &Path,
) -> Result<Checkpoint, CheckpointError>
where
    R: BufRead,
{
    let mut params = *defaults;
    let mut gene_length = None;
    let mut entries = vec![];

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| CheckpointError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(header) = line.strip_prefix('#') {
            parse_header(header, &mut params, &mut gene_length);
            continue;
        }
        let location = format!("{}:{}", path.display(), line_no + 1);
        match parse_entry(line, &location) {
            Some(entry) => entries.push(entry),
            None => warn!("{location}: skipping malformed line"),
        }
    }

    let Some(gene_length) = gene_length.or_else(|| entries.first().map(Chromosome::len)) else {
        return Err(CheckpointError::MissingGeneLength {
            path: path.to_path_buf(),
        });
    };

    for c in entries.iter().filter(|c| c.len() != gene_length) {
        warn!(
            "{}: bitstring of length {} fitted to gene length {gene_length}",
            path.display(),
            c.len()
        );
    }
    if entries.len() != params.population_size {
        warn!(
            "{}: header declares {} individuals, found {}",
            path.display(),
            params.population_size,
            entries.len()
        );
    }

    let mut population = Population::from_individuals(gene_length, entries);
    population.sort_by_fitness_desc();
    Ok(Checkpoint {
        params: params.with_shape(population.len(), gene_length),
        population,
    })
}

fn parse_header(header: &str, params: &mut Hyperparameters, gene_length: &mut Option<usize>) {
    fn set<T: std::str::FromStr>(slot: &mut T, key: &str, value: &str) {
        match value.parse() {
            Ok(v) => *slot = v,
            Err(_) => warn!("ignoring checkpoint header value {key}={value}"),
        }
    }

    for token in header.split_whitespace() {
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };
        match key {
            "generation" => set(&mut params.current_generation, key, value),
            "population" => set(&mut params.population_size, key, value),
            "geneLength" => {
                let mut len = 0;
                set(&mut len, key, value);
                if len > 0 {
                    *gene_length = Some(len);
                }
            }
            "elitism" => set(&mut params.elite_count, key, value),
            "generations" => set(&mut params.total_generations, key, value),
            "saveEvery" => set(&mut params.checkpoint_interval, key, value),
            "mutation" => set(&mut params.mutation_rate, key, value),
            _ => {}
        }
    }
}

/// Parses `<fitness> <bits>` or a bare `<bits>` line (fitness 0).
///
/// An unparsable fitness reads as 0 and characters other than `0`/`1` are
/// dropped from the bitstring.
fn parse_entry(line: &str, location: &str) -> Option<Chromosome> {
    let mut tokens = line.split_whitespace();
    let (fitness, bits) = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(bits), None, None) => ("0", bits),
        (Some(fitness), Some(bits), None) => (fitness, bits),
        _ => return None,
    };
    let fitness = fitness.parse().unwrap_or_else(|_| {
        warn!("{location}: invalid fitness {fitness:?}, using 0");
        0.0
    });
    let clean: String = bits.chars().filter(|ch| matches!(ch, '0' | '1')).collect();
    if clean.len() != bits.len() {
        warn!("{location}: dropped invalid characters from {bits:?}");
    }
    if clean.is_empty() {
        return None;
    }
    let mut chromosome = Chromosome::from_bitstring(&clean)?;
    chromosome.set_fitness(fitness);
    Some(chromosome)
}
