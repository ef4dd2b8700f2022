// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! asc - All Sites Cron operator CLI

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod error;
mod output;

use anyhow::Result;
use asc_core::config::LogConfig;
use clap::{Parser, Subcommand};
use commands::{drain, install, run, status, Context};
use error::CliError;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "asc",
    version,
    about = "All Sites Cron - coordinated wp-cron runs across a multisite network"
)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trigger wp-cron on every site now
    Run(run::RunArgs),
    /// Run a queued job
    Drain(drain::DrainArgs),
    /// Show lock, cooldown and queue state
    Status(status::StatusArgs),
    /// Clear run state and migrate legacy keys
    Install,
    /// Remove all state, including the migration flag
    Uninstall,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match execute(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            match e.downcast_ref::<CliError>() {
                Some(cli_error) => eprint!("{}", cli_error),
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

/// Returns false when the command ran but did not succeed
async fn execute(cli: Cli) -> Result<bool> {
    let config = Context::load_config(cli.config.as_deref())?;
    setup_logging(&config.log);
    let ctx = Context::open(config, cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => Ok(run::run(&ctx, args).await),
        Commands::Drain(args) => drain::drain(&ctx, args).await,
        Commands::Status(args) => status::status(&ctx, args).await.map(|()| true),
        Commands::Install => install::install(&ctx).await.map(|()| true),
        Commands::Uninstall => install::uninstall(&ctx).await.map(|()| true),
    }
}

/// Logs go to stderr so stdout stays machine-readable
fn setup_logging(log: &LogConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_level = log.level.as_deref().unwrap_or("info");
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
