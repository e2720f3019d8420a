use clap::Parser;
use embedding_cache::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Embed(args) => cli::embed::run(args).await,
        Command::Warm(args) => cli::warm::run(args).await,
        Command::Similarity(args) => cli::similarity::run(args).await,
    }
}
