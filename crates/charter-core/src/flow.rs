//! Drives one submission flow end to end
//!
//! submit → open stream → decode records → apply to controller, one chunk at a
//! time on the calling task.

use std::fmt::Display;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::debug;

use crate::client::AgentClient;
use crate::progress::{Flow, FlowState, ProgressController};
use crate::stream::records;

/// Run a full flow for `topic` and return the state it ended in
///
/// A blank topic returns immediately with the controller untouched.
pub async fn run(
    controller: &mut ProgressController,
    client: &AgentClient,
    topic: &str,
) -> FlowState {
    let Some(request) = controller.on_submit(topic) else {
        return controller.state().clone();
    };

    match client.chat_stream(&request).await {
        Ok(body) => drive(controller, body).await,
        Err(e) => {
            controller.on_transport_error(&e);
            controller.state().clone()
        }
    }
}

/// Feed a response body into a submitted controller until the flow ends
///
/// Stops reading as soon as the controller reports [`Flow::Finished`]; the
/// rest of the body is dropped unread.
pub async fn drive<S, E>(controller: &mut ProgressController, body: S) -> FlowState
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    let records = records(body);
    futures::pin_mut!(records);

    while let Some(item) = records.next().await {
        match item {
            Ok(record) => {
                if controller.on_event(record) == Flow::Finished {
                    debug!("Flow finished, closing stream");
                    return controller.state().clone();
                }
            }
            Err(e) => {
                controller.on_transport_error(&e);
                return controller.state().clone();
            }
        }
    }

    controller.on_stream_end();
    controller.state().clone()
}
