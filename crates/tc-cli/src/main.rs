//! Tripcheck CLI - classify and run trip data checks

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{catalog, classify, issues, run, status, summary, sync_list, trip};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = match &cli.command {
        cli::Commands::Catalog(args) => catalog::execute(args, &cli.global).await,
        cli::Commands::Trip(args) => trip::execute(args, &cli.global).await,
        cli::Commands::Classify(args) => classify::execute(args, &cli.global).await,
        cli::Commands::Run(args) => run::execute(args, &cli.global).await,
        cli::Commands::Issues(args) => issues::execute(args, &cli.global).await,
        cli::Commands::Summary(args) => summary::execute(args, &cli.global).await,
        cli::Commands::Status(args) => status::execute(args, &cli.global).await,
        cli::Commands::SyncList(args) => sync_list::execute(args, &cli.global).await,
    };

    if let Err(err) = &result {
        if let Some(ExitCode(code)) = err.downcast_ref::<ExitCode>() {
            std::process::exit(*code);
        }
    }
    result
}
