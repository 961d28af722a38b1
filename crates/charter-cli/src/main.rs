//! Charter - draft an AI constitution from the terminal

mod cli;
mod commands;
mod logging;
mod view;
mod viewer;

use std::process::ExitCode;

use anyhow::{Context, Result};
use charter_core::{Config, Feedback};
use clap::Parser;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path),
        None => Config::load_default(),
    }
    .context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);

    logging::init_logging(cli.log_level(&config));

    match cli.command {
        Command::Draft { topic } => commands::draft::run(&config, &topic).await,
        Command::Show { raw } => {
            commands::show::run(&config, raw)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Feedback {
            score,
            text,
            run_id,
            user_id,
        } => {
            let feedback = Feedback {
                score,
                text,
                run_id,
                user_id,
            };
            commands::feedback::run(&config, feedback).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
