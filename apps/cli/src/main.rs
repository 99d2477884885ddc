//! reddit2epub CLI: download a Reddit story series as an EPUB.
//!
//! Given the URL of one chapter, finds every post by the same author whose
//! title starts with the same words and packages them oldest first.

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
