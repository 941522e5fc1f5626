use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use q_connect_four::ai::QLearner;
use q_connect_four::config::AppConfig;
use q_connect_four::game::Player;
use q_connect_four::training::Trainer;

/// Train a connect-N Q-learning agent via self-play.
#[derive(Parser)]
#[command(name = "train", about = "Train a connect-N Q-learning agent")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override number of training games
    #[arg(long)]
    epochs: Option<usize>,

    /// Override the filter window size (0 = whole-board keys)
    #[arg(long)]
    filter_size: Option<usize>,

    /// Value table to load before and save after the run
    #[arg(long)]
    table: Option<PathBuf>,

    /// Seed both agents for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Write a JSON run summary to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(epochs) = cli.epochs {
        config.training.num_epochs = epochs;
    }
    if let Some(filter_size) = cli.filter_size {
        config.agent.filter_size = filter_size;
        config.opponent.filter_size = filter_size;
    }
    if let Some(table) = cli.table {
        config.training.table_path = Some(table);
    }
    if let Some(seed) = cli.seed {
        config.agent.seed = Some(seed);
        config.opponent.seed = Some(seed.wrapping_add(1));
    }
    config.validate().context("validating configuration")?;

    let mut red = QLearner::new(Player::Red, config.agent);
    let mut yellow = QLearner::new(Player::Yellow, config.opponent);
    println!(
        "Agents: red alpha {} epsilon {}, yellow alpha {} epsilon {}",
        red.learning_rate(),
        red.epsilon(),
        yellow.learning_rate(),
        yellow.epsilon()
    );

    // Resume from a persisted table when one is already on disk
    if let Some(path) = &config.training.table_path {
        if path.exists() {
            let entries = red
                .load_table(path)
                .with_context(|| format!("loading table from {}", path.display()))?;
            println!("Loaded {} states from {}", entries, path.display());
        }
    }

    let trainer = Trainer::new(config.training.clone(), config.game);
    let report = trainer.train(&mut red, &mut yellow);

    if let Some(path) = &config.training.table_path {
        match red.save_table(path) {
            Ok(()) => println!(
                "Saved {} states to {}",
                red.table().len(),
                path.display()
            ),
            Err(e) => eprintln!("Failed to save table: {e}"),
        }
    }

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&report).context("serializing run summary")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing run summary to {}", path.display()))?;
        println!("Run summary written to {}", path.display());
    }

    Ok(())
}
