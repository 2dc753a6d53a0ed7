use std::time::Duration;

use bitevo_training::worker::{Worker, WorkerConfig, WorkerMode};
use log::info;

use super::StoreArg;
use crate::util::FitnessKind;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct WorkArg {
    #[clap(flatten)]
    store: StoreArg,
    /// Keep polling when no work is pending instead of exiting
    #[arg(long = "loop")]
    keep_polling: bool,
    /// Delay between store polls in milliseconds
    #[arg(long, default_value_t = 250)]
    poll_ms: u64,
    /// Stop after evaluating this many items
    #[arg(long)]
    max_items: Option<usize>,
    #[arg(long, default_value = "onemax")]
    fitness: FitnessKind,
}

pub(crate) fn run(arg: &WorkArg) -> anyhow::Result<()> {
    let config = WorkerConfig {
        mode: if arg.keep_polling {
            WorkerMode::Loop
        } else {
            WorkerMode::OneShot
        },
        poll_interval: Duration::from_millis(arg.poll_ms),
        max_items: arg.max_items,
    };

    let mut store = arg.store.open()?;
    let summary = Worker::new(&mut store, arg.fitness.evaluator(), config).run()?;
    store.close()?;

    info!(
        "worker finished: {} items evaluated, {} reports ignored",
        summary.evaluated, summary.ignored_reports
    );
    Ok(())
}
