use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use swap_engine::application::{Cli, CommandExecutor};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = CommandExecutor::execute(cli).await?;
    println!("{}", output);
    Ok(())
}
