//! NDJSON response stream consumer
//!
//! Turns the chunked response body of the drafting service into an ordered,
//! lazy sequence of [`EventRecord`]s.

mod decoder;
mod record;

pub use decoder::{DecodeStats, DecodeSummary, NdjsonDecoder, Utf8StreamDecoder};
pub use record::{EventRecord, RecordKind};

use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::debug;

use crate::error::ClientError;

struct RecordStreamState<S> {
    body: Pin<Box<S>>,
    /// `None` once the body ended or failed
    decoder: Option<NdjsonDecoder>,
    ready: VecDeque<EventRecord>,
}

/// Adapt a byte stream into a stream of decoded records
///
/// Records are yielded in source order as soon as their line is complete. A
/// failed read is yielded once as [`ClientError::Read`] and ends the stream.
/// Whatever partial line remains when the body ends is dropped.
pub fn records<S, E>(body: S) -> impl Stream<Item = Result<EventRecord, ClientError>>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    let state = RecordStreamState {
        body: Box::pin(body),
        decoder: Some(NdjsonDecoder::new()),
        ready: VecDeque::new(),
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(record) = state.ready.pop_front() {
                return Some((Ok(record), state));
            }
            if state.decoder.is_none() {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => {
                    if let Some(decoder) = state.decoder.as_mut() {
                        state.ready.extend(decoder.consume(&chunk));
                    }
                }
                Some(Err(e)) => {
                    state.decoder = None;
                    return Some((Err(ClientError::Read(e.to_string())), state));
                }
                None => {
                    if let Some(decoder) = state.decoder.take() {
                        let summary = decoder.finish();
                        if let Some(partial) = summary.dropped_partial {
                            debug!("Stream ended mid-line, dropped: {}", partial);
                        }
                    }
                    return None;
                }
            }
        }
    })
}
