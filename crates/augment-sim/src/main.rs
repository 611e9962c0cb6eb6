//! Auto-augment simulator
//!
//! - `config` prints the effective configuration
//! - `scenario` replays the canonical scenarios against an in-memory world

use anyhow::Context;
use augment_core::{AugmentConfig, DEFAULT_CONFIG_PATH};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod scenarios;

use scenarios::Scenario;

/// Auto-augment simulator
#[derive(Parser)]
#[command(name = "augment-sim")]
#[command(about = "Inspect auto-augment configuration and replay workflow scenarios", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "AUTO_AUGMENT_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the effective configuration
    Config {
        /// Fail instead of falling back to defaults
        #[arg(long)]
        strict: bool,
    },

    /// Replay a canonical scenario
    Scenario {
        /// Scenario to run
        #[arg(value_enum, default_value = "all")]
        which: Scenario,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Loaded before tracing so debug_log can pick the level
    let loaded = AugmentConfig::load(&cli.config);

    let filter = match &loaded {
        Ok(config) if config.debug_log => "debug",
        _ if cli.verbose => "debug",
        _ => "info",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    match cli.command {
        Commands::Config { strict } => {
            let config = if strict {
                loaded.with_context(|| format!("loading {}", cli.config))?
            } else {
                loaded.unwrap_or_else(|e| {
                    tracing::warn!("Config {} rejected, using defaults: {}", cli.config, e);
                    AugmentConfig::default()
                })
            };
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Scenario { which } => {
            let base = loaded.unwrap_or_else(|e| {
                tracing::warn!("Config {} rejected, using defaults: {}", cli.config, e);
                AugmentConfig::default()
            });

            let mut failed = 0;
            for scenario in which.expand() {
                let report = scenarios::run(scenario, &base).await?;
                print!("{}", report.generate_text());
                if !report.passed() {
                    failed += 1;
                }
            }

            if failed > 0 {
                anyhow::bail!("{failed} scenario(s) failed");
            }
        }
    }

    Ok(())
}
