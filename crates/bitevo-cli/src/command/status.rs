use std::path::PathBuf;

use anyhow::ensure;
use bitevo_queue::{GenerationSummary, WorkStore};
use chrono::DateTime;

use crate::util::Output;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct StatusArg {
    /// Path of the `SQLite` work store
    #[arg(long, default_value = "ga.db")]
    db: PathBuf,
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub(crate) fn run(arg: &StatusArg) -> anyhow::Result<()> {
    ensure!(
        arg.db.exists(),
        "Work store not found: {}",
        arg.db.display()
    );
    let store = WorkStore::open(&arg.db)?;
    store.init_schema()?;
    let summaries = store.generation_summaries()?;
    store.close()?;

    if arg.json {
        Output::stdout().write_json(&summaries)?;
    } else {
        print_table(&summaries);
    }
    Ok(())
}

fn print_table(summaries: &[GenerationSummary]) {
    println!(
        "{:>6}  {:<19}  {:>6}  {:>7}  {:>7}  {:>6}  {:>8}",
        "gen", "created", "total", "pending", "claimed", "done", "best"
    );
    for s in summaries {
        let created = DateTime::from_timestamp(s.created_at, 0).map_or_else(
            || s.created_at.to_string(),
            |t| t.format("%Y-%m-%d %H:%M:%S").to_string(),
        );
        let best = s
            .best_fitness
            .map_or_else(|| "-".to_owned(), |f| f.to_string());
        println!(
            "{:>6}  {:<19}  {:>6}  {:>7}  {:>7}  {:>6}  {:>8}",
            s.generation,
            created,
            s.counts.total,
            s.counts.pending,
            s.counts.claimed,
            s.counts.done,
            best
        );
    }
}
