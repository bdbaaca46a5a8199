//! CLI commands and handlers

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use super::report::to_json;
use super::services::SimulationService;
use crate::shared::config::ConfigLoader;
use crate::shared::errors::AppError;
use crate::shared::types::{Amount, AssetId, BlockHeight, Principal};

#[derive(Parser, Debug)]
#[command(name = "swap-engine")]
#[command(version, about = "Multi-hop swap engine simulator")]
pub struct Cli {
    /// Path to the engine TOML file
    #[arg(short, long, default_value = "Engine.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a swap against the in-memory ledger
    Swap {
        /// Asset to sell
        #[arg(long)]
        from: String,

        /// Asset to buy
        #[arg(long)]
        to: String,

        #[arg(long)]
        amount: Amount,

        /// Minimum acceptable output
        #[arg(long)]
        min_out: Amount,

        /// Account performing the swap
        #[arg(long)]
        caller: String,

        /// Current block height
        #[arg(long)]
        height: BlockHeight,
    },

    /// Price a swap without settling it
    Quote {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        #[arg(long)]
        amount: Amount,

        #[arg(long)]
        height: BlockHeight,
    },

    /// Show configured assets, pairs and routes
    Routes,
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command and return its JSON output
    pub async fn execute(cli: Cli) -> Result<String, AppError> {
        let config = ConfigLoader::load_config(&cli.config)?;
        info!(config = %cli.config.display(), "Loaded engine config");
        let service = SimulationService::new(&config).await?;

        let output = match cli.command {
            Commands::Swap {
                from,
                to,
                amount,
                min_out,
                caller,
                height,
            } => {
                let report = service
                    .swap(
                        &AssetId::new(from),
                        &AssetId::new(to),
                        amount,
                        min_out,
                        &Principal::new(caller),
                        height,
                    )
                    .await?;
                to_json(&report)
            }
            Commands::Quote {
                from,
                to,
                amount,
                height,
            } => {
                let report = service
                    .quote(&AssetId::new(from), &AssetId::new(to), amount, height)
                    .await?;
                to_json(&report)
            }
            Commands::Routes => to_json(&service.topology().await),
        };

        Ok(output?)
    }
}
