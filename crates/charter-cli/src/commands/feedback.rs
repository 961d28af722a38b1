//! `charter feedback` - rate a draft

use anyhow::{Context, Result};
use charter_core::{AgentClient, Config, Feedback};

pub async fn run(config: &Config, feedback: Feedback) -> Result<()> {
    anyhow::ensure!(feedback.score.is_finite(), "Score must be a finite number");

    let client = AgentClient::from_config(config).context("Invalid drafting service URL")?;
    client
        .send_feedback(&feedback)
        .await
        .context("Failed to send feedback")?;

    println!("Thanks, feedback recorded.");
    Ok(())
}
