//! sdkforge - SDK provisioning CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sdkforge_cli::cmd;
use sdkforge_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let yes = cli.yes;
    let json = cli.json;

    match cli.command {
        Commands::Install { target } => cmd::install::install(&target, yes, json).await,
        Commands::Remove { target } => cmd::remove::remove(&target, yes, json).await,
        Commands::List { family } => cmd::list::list(family.as_deref()),
        Commands::Status => cmd::status::status(),
        Commands::Check { target } => cmd::check::check(&target),
        Commands::Update => cmd::update::update().await,
    }
}
