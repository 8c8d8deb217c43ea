//! Pursuit: SARS experience collection for a pursuit grid-world.
//!
//! Provides subcommands:
//!
//! - `collect`      -- Collect a fixed number of SARS records and print statistics
//! - `show-config`  -- Print the effective configuration as JSON

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pursuit::config::PursuitConfig;
use pursuit::domain::{FactoredModel, LayoutGenerator, PursuitModel, PursuitTerminal};
use pursuit::env::SimulatedEnvironment;
use pursuit::experience::{
    ClosedFormSource, CollectError, EnvironmentSource, RolloutSource, SarsCollector,
    TransitionDataset, UniformRandomPolicy,
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Pursuit: SARS experience collection for a pursuit grid-world
#[derive(Parser)]
#[command(name = "pursuit", version, about)]
struct Cli {
    /// Path to a JSON configuration file (uses defaults if not provided).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum SourceChoice {
    /// Sample transitions directly from the state model.
    Model,
    /// Step a simulated environment.
    Env,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect SARS records with a uniform random behavior policy.
    Collect {
        /// Number of records to collect (defaults to the configured budget).
        #[arg(long)]
        samples: Option<usize>,

        /// Step cap per rollout (defaults to the configured cap).
        #[arg(long)]
        max_steps: Option<usize>,

        /// Seed for the model and policy generators.
        #[arg(long)]
        seed: Option<u64>,

        /// Where transitions come from.
        #[arg(long, value_enum, default_value = "model")]
        source: SourceChoice,
    },

    /// Print the effective configuration.
    ShowConfig,
}

// ---------------------------------------------------------------------------
// Entrypoint
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // Initialise tracing (reads RUST_LOG env var, defaults to info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            serde_json::from_str::<PursuitConfig>(&text)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?
        }
        None => PursuitConfig::default(),
    };

    match cli.command {
        Commands::Collect {
            samples,
            max_steps,
            seed,
            source,
        } => {
            let collection = &mut config.collection;
            if let Some(samples) = samples {
                collection.samples = samples;
            }
            if let Some(max_steps) = max_steps {
                collection.max_steps = max_steps;
            }
            if let Some(seed) = seed {
                collection.seed = seed;
            }
            cmd_collect(&config, source)
        }
        Commands::ShowConfig => cmd_show_config(&config),
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_collect(config: &PursuitConfig, source: SourceChoice) -> Result<()> {
    let run = &config.collection;
    tracing::info!(
        samples = run.samples,
        max_steps = run.max_steps,
        seed = run.seed,
        source = ?source,
        "Collecting SARS records"
    );

    let generator =
        LayoutGenerator::new(&config.domain).context("Invalid domain configuration")?;
    let model = FactoredModel::new(
        PursuitModel::new(config.dynamics.p_random),
        config.rewards,
        PursuitTerminal,
    );

    let dataset = match source {
        SourceChoice::Model => {
            let mut source = ClosedFormSource::new(generator, model, run.seed);
            collect(config, &mut source)?
        }
        SourceChoice::Env => {
            let env = SimulatedEnvironment::new(generator, model, run.seed);
            let mut source = EnvironmentSource::new(env);
            collect(config, &mut source)?
        }
    };

    println!("Dataset {}", dataset.id());
    println!("  Created: {}", dataset.created_at().format("%Y-%m-%d %H:%M:%S UTC"));
    print!("{}", dataset.stats());
    Ok(())
}

fn cmd_show_config(config: &PursuitConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    println!("{json}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

fn collect<S: RolloutSource>(config: &PursuitConfig, source: &mut S) -> Result<TransitionDataset> {
    let run = &config.collection;
    // Offset the policy seed so it does not mirror the model generator.
    let policy = UniformRandomPolicy::seeded(run.seed.wrapping_add(1));
    let mut collector =
        SarsCollector::new(policy).with_max_stalled_rollouts(run.max_stalled_rollouts);

    match collector.collect_n(source, run.samples, run.max_steps, None) {
        Ok(dataset) => Ok(dataset),
        Err(CollectError::BudgetUnreachable {
            requested,
            collected,
            partial,
            ..
        }) => {
            tracing::warn!(
                requested,
                collected,
                "Sample budget not met; reporting partial dataset"
            );
            Ok(*partial)
        }
        Err(err) => Err(err.into()),
    }
}
