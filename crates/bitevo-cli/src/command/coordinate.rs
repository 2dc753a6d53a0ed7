use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use bitevo_genome::{Population, stats::FitnessStats};
use bitevo_training::{
    coordinator::{Coordinator, CoordinatorConfig, EvaluationMode, RunSummary},
    params::Hyperparameters,
};
use chrono::{DateTime, Utc};
use log::error;
use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use super::StoreArg;
use crate::util::{FitnessKind, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CoordinateArg {
    #[clap(flatten)]
    store: StoreArg,
    /// Leave evaluation to `work` processes
    #[arg(long)]
    external: bool,
    /// Delay between store polls in milliseconds
    #[arg(long, default_value_t = 250)]
    poll_ms: u64,
    /// Fail if a generation is not fully evaluated within this many seconds
    #[arg(long)]
    wait_timeout_secs: Option<u64>,
    /// Start from this checkpoint when the work store is empty
    #[arg(long)]
    resume: Option<PathBuf>,
    /// Base path of checkpoint files
    #[arg(long, default_value = "checkpoint")]
    checkpoint: PathBuf,
    #[arg(long, default_value_t = 64)]
    gene_length: usize,
    #[arg(long, default_value_t = 10)]
    population: usize,
    /// Number of top individuals kept each generation
    #[arg(long, default_value_t = 5)]
    elitism: usize,
    /// Last generation to produce
    #[arg(long, default_value_t = 1000)]
    generations: u32,
    /// Write a checkpoint every this many generations
    #[arg(long, default_value_t = 100)]
    save_every: u32,
    /// Per-gene flip probability
    #[arg(long, default_value_t = 0.02)]
    mutation: f64,
    /// Seed of the random number generator
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value = "onemax")]
    fitness: FitnessKind,
    /// Also write the final population as JSON to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, serde::Serialize)]
struct FinalReport {
    finished_at: DateTime<Utc>,
    generation: u32,
    resumed_from: Option<u32>,
    stats: Option<FitnessStats>,
    individuals: Vec<IndividualReport>,
}

#[derive(Debug, serde::Serialize)]
struct IndividualReport {
    fitness: f64,
    genes: String,
}

pub(crate) fn run(arg: &CoordinateArg) -> anyhow::Result<()> {
    let params = Hyperparameters {
        population_size: arg.population,
        gene_length: arg.gene_length,
        elite_count: arg.elitism,
        total_generations: arg.generations,
        checkpoint_interval: arg.save_every,
        mutation_rate: arg.mutation,
        current_generation: 0,
    };
    // shape rules are checked by the coordinator against the effective shape
    if let Err(err) = params.validate_settings() {
        error!("invalid hyperparameters: {err}");
        return Ok(());
    }

    let rng = match arg.seed {
        Some(seed) => Pcg32::seed_from_u64(seed),
        None => Pcg32::from_rng(&mut rand::rng()),
    };
    let config = CoordinatorConfig {
        params,
        mode: if arg.external {
            EvaluationMode::External
        } else {
            EvaluationMode::Local
        },
        poll_interval: Duration::from_millis(arg.poll_ms),
        wait_timeout: arg.wait_timeout_secs.map(Duration::from_secs),
        checkpoint_path: arg.checkpoint.clone(),
        resume_checkpoint: arg.resume.clone(),
    };

    let mut store = arg.store.open()?;
    let result = Coordinator::new(&mut store, arg.fitness.evaluator(), rng, config).run();
    let summary = match result {
        Ok(summary) => summary,
        Err(err) if err.is_config_error() => {
            error!("{:#}", anyhow::Error::new(err));
            return Ok(());
        }
        Err(err) => return Err(err).context("GA run failed"),
    };
    store.close()?;

    print_population(&summary.population);
    if let Some(path) = &arg.output {
        Output::open(path.clone())?.write_json(&final_report(&summary))?;
    }
    Ok(())
}

fn print_population(population: &Population) {
    if let Some(stats) = population.fitness_stats() {
        println!(
            "Final population: avg fitness={:.3}, best fitness={}",
            stats.mean, stats.max
        );
    }
    for (i, c) in population.individuals().iter().enumerate() {
        println!("[{i}] fitness={} genes={}", c.fitness(), c.to_bitstring());
    }
}

fn final_report(summary: &RunSummary) -> FinalReport {
    FinalReport {
        finished_at: Utc::now(),
        generation: summary.params.current_generation,
        resumed_from: summary.resumed_from,
        stats: summary.population.fitness_stats(),
        individuals: summary
            .population
            .individuals()
            .iter()
            .map(|c| IndividualReport {
                fitness: c.fitness(),
                genes: c.to_bitstring(),
            })
            .collect(),
    }
}
