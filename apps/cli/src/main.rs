//! webcorpus CLI — bounded single-domain crawler that accumulates fetched
//! pages into one hierarchical corpus document for downstream retrieval.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
