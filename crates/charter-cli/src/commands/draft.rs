//! `charter draft` - submit a topic and follow the pipeline

use std::io::{BufRead, IsTerminal, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use charter_core::{flow, AgentClient, Config, FileStore, FlowState, ProgressController, SessionId};
use tracing::info;

use crate::view::TerminalView;
use crate::viewer::ViewerNavigator;

pub async fn run(config: &Config, topic_words: &[String]) -> Result<ExitCode> {
    let client = AgentClient::from_config(config).context("Invalid drafting service URL")?;
    let store = FileStore::new(config.store_dir());

    // One identifier per process, like one per page load
    let session_id = SessionId::generate();
    info!(session_id = %session_id, "Using store at {:?}", store.dir());

    let stderr = std::io::stderr();
    let interactive = stderr.is_terminal();
    let mut controller = ProgressController::new(
        session_id,
        Box::new(store.clone()),
        Box::new(ViewerNavigator::new(store, std::io::stdout())),
        Box::new(TerminalView::new(stderr, interactive)),
    );

    let topic = if topic_words.is_empty() {
        match prompt_topic()? {
            Some(topic) => topic,
            None => return Ok(ExitCode::from(exit_status(&FlowState::Idle))),
        }
    } else {
        topic_words.join(" ")
    };

    let state = flow::run(&mut controller, &client, &topic).await;
    Ok(ExitCode::from(exit_status(&state)))
}

/// Ask until a non-blank topic is entered; `None` on end of input
fn prompt_topic() -> Result<Option<String>> {
    read_topic(std::io::stdin().lock(), &mut std::io::stderr())
}

fn read_topic(input: impl BufRead, prompt: &mut impl Write) -> Result<Option<String>> {
    let mut lines = input.lines();
    loop {
        write!(prompt, "Use case: ").ok();
        prompt.flush().ok();

        let Some(line) = lines.next() else {
            return Ok(None);
        };
        let line = line.context("Failed to read topic")?;
        if !line.trim().is_empty() {
            return Ok(Some(line));
        }
    }
}

fn exit_status(state: &FlowState) -> u8 {
    match state {
        FlowState::Completed => 0,
        // Blank topic: nothing was sent
        FlowState::Idle => 2,
        _ => 1,
    }
}
