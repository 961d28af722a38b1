//! Command-line arguments

use std::path::PathBuf;

use charter_core::Config;
use clap::{ArgAction, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "charter", version, about = "Draft a binding AI constitution with the agent pipeline")]
pub struct Cli {
    /// Config file (defaults to <config_dir>/charter/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Drafting service URL, overrides the config file
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Directory for the stored draft, overrides the config file
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Draft a constitution for a use case and open it when done
    Draft {
        /// Use case to draft for; prompted for when omitted
        topic: Vec<String>,
    },
    /// Show the last drafted constitution
    Show {
        /// Print the stored value without formatting
        #[arg(long)]
        raw: bool,
    },
    /// Rate a draft
    Feedback {
        #[arg(long)]
        score: f64,
        #[arg(long)]
        text: Option<String>,
        /// Session the draft came from
        #[arg(long)]
        run_id: Option<String>,
        #[arg(long)]
        user_id: Option<String>,
    },
}

impl Cli {
    /// Apply flag overrides on top of the loaded config
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(store_dir) = &self.store_dir {
            config.store_dir = Some(store_dir.clone());
        }
    }

    /// Tracing filter used when `RUST_LOG` is unset
    pub fn log_level<'a>(&self, config: &'a Config) -> &'a str {
        match self.verbose {
            0 => &config.log_level,
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
