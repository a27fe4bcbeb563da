//! llmstxt CLI: generate and serve per-language llms.txt files.
//!
//! Reads a multilingual site snapshot, writes one summary document per
//! language, and serves them at `/llms.txt` and `/{slug}/llms.txt`.

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
