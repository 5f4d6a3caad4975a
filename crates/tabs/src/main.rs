//! `tabs` — command-line glue for saving and restoring tab sessions.
//!
//! Talks to a running `vault` over its loopback message channel:
//! - `tabs export` serialises URLs, has the vault encrypt them and writes
//!   the envelope to a file.
//! - `tabs restore` reads an envelope file, has the vault decrypt it and
//!   prints the URLs, one per line, for the caller to open.

mod cli;
mod client;
mod commands;
mod telemetry;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::error;

use cli::{Cli, Commands};
use client::VaultClient;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = telemetry::init(&cli.log_level) {
        eprintln!("tabs: failed to initialise logging: {e:#}");
        return ExitCode::FAILURE;
    }
    report(run(cli).await)
}

async fn run(cli: Cli) -> Result<()> {
    let client = VaultClient::new(cli.vault);
    match cli.command {
        Commands::Export {
            urls,
            input,
            output,
        } => {
            let urls = commands::collect_urls(urls, input.as_deref()).await?;
            commands::export(&client, &urls, &output).await
        }
        Commands::Restore { file } => {
            for url in commands::restore(&client, &file).await? {
                println!("{url}");
            }
            Ok(())
        }
    }
}

/// Log a failed command once and turn the outcome into the exit status.
fn report(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "operation failed");
            ExitCode::FAILURE
        }
    }
}
