use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use bitevo_queue::{StoreOptions, WorkStore};
use clap::{Parser, Subcommand};

use self::{coordinate::CoordinateArg, status::StatusArg, work::WorkArg};

mod coordinate;
mod status;
mod work;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log debug messages (overridden by `RUST_LOG`)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run the genetic algorithm, seeding each generation into the work store
    Coordinate(#[clap(flatten)] CoordinateArg),
    /// Evaluate pending work items from the store
    Work(#[clap(flatten)] WorkArg),
    /// Show per-generation progress of a work store
    Status(#[clap(flatten)] StatusArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    crate::util::init_logger(args.verbose);
    match args.mode {
        Mode::Coordinate(arg) => coordinate::run(&arg)?,
        Mode::Work(arg) => work::run(&arg)?,
        Mode::Status(arg) => status::run(&arg)?,
    }
    Ok(())
}

/// Work store location and claim settings shared by `coordinate` and `work`.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct StoreArg {
    /// Path of the `SQLite` work store
    #[arg(long, default_value = "ga.db")]
    db: PathBuf,
    /// Let claims older than this many seconds be taken over
    #[arg(long)]
    lease_secs: Option<u64>,
}

impl StoreArg {
    fn open(&self) -> anyhow::Result<WorkStore> {
        let options = StoreOptions {
            claim_lease: self.lease_secs.map(Duration::from_secs),
            ..StoreOptions::default()
        };
        let store = WorkStore::open_with(&self.db, options)?;
        store
            .init_schema()
            .with_context(|| format!("Failed to prepare work store {}", self.db.display()))?;
        Ok(store)
    }
}
