//! `charter show` - print the last stored draft

use anyhow::{Context, Result};
use charter_core::{Config, FileStore, NavigationError};

use crate::viewer::open_viewer;

pub fn run(config: &Config, raw: bool) -> Result<()> {
    let store = FileStore::new(config.store_dir());
    let mut stdout = std::io::stdout().lock();

    match open_viewer(&store, &mut stdout, raw) {
        Err(NavigationError::Missing(_)) => {
            anyhow::bail!("No constitution has been drafted yet. Run `charter draft <use case>` first.")
        }
        other => other.context("Failed to show the drafted constitution"),
    }
}
