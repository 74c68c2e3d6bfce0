//! League Sim CLI
//!
//! Simulate a league many times over, checkpointing as it goes, and print
//! average standings and finish probabilities.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use league_sim::checkpoint::{CheckpointStore, FileCheckpointStore};
use league_sim::config::{load_config, Config};
use league_sim::{report, BatchRunner, League};

#[derive(Parser)]
#[command(name = "league-sim")]
#[command(about = "Monte Carlo estimation of final league-table positions", long_about = None)]
struct Cli {
    /// TOML config file; built-in defaults when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate seasons until the target count is reached, then print standings
    Run {
        /// Target number of simulated seasons
        #[arg(long)]
        seasons: Option<u64>,

        /// Seasons between checkpoint saves
        #[arg(long)]
        checkpoint_interval: Option<u64>,

        /// Checkpoint file path
        #[arg(long)]
        checkpoint: Option<PathBuf>,

        /// Master seed for reproducible batches
        #[arg(long)]
        seed: Option<u64>,

        /// Worker threads
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Print standings from an existing checkpoint without simulating
    Report {
        /// Checkpoint file path
        #[arg(long)]
        checkpoint: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Run {
            seasons,
            checkpoint_interval,
            checkpoint,
            seed,
            threads,
        } => {
            let batch = &mut config.batch;
            if let Some(n) = seasons {
                batch.seasons = n;
            }
            if let Some(n) = checkpoint_interval {
                batch.checkpoint_interval = n;
            }
            if let Some(path) = checkpoint {
                batch.checkpoint_path = path;
            }
            batch.seed = seed.or(batch.seed);
            batch.threads = threads.or(batch.threads);
            config.validate().context("invalid command-line overrides")?;

            let league = League::from_config(&config.league).context("loading league")?;
            info!(
                "Simulating {} seasons of {} ({} competitors, {} fixtures)",
                config.batch.seasons,
                league.name(),
                league.len(),
                league.schedule().len()
            );

            let mut store = FileCheckpointStore::new(&config.batch.checkpoint_path);
            let runner = BatchRunner::new(&league, &config.model, &config.batch)?;
            let aggregate = runner.run(&mut store).with_context(|| {
                format!("simulating into {}", store.path().display())
            })?;

            let standings = aggregate.finalize()?;
            print!("{}", report::render(league.name(), &standings));
        }

        Commands::Report { checkpoint } => {
            let path = checkpoint.unwrap_or(config.batch.checkpoint_path);
            let store = FileCheckpointStore::new(&path);
            let aggregate = store
                .load()
                .with_context(|| format!("reading checkpoint {}", path.display()))?
                .with_context(|| format!("no checkpoint at {}", path.display()))?;

            let league = League::from_config(&config.league).context("loading league")?;
            if !aggregate.matches_league(&league) {
                warn!("Checkpoint roster differs from {}", league.name());
            }
            let standings = aggregate.finalize().context("checkpoint holds no seasons")?;
            print!("{}", report::render(league.name(), &standings));
        }
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("league_sim=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
