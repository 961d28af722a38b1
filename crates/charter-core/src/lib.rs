//! Charter core library
//!
//! Streams a constitution draft from the agent pipeline:
//! - `stream`: NDJSON consumer for the chunked response body
//! - `progress`: flow state machine and terminal hand-off
//! - `client`: HTTP transport
//! - `flow`: wires the three together for one submission
//! - `storage`: where the finished draft is kept for the viewer

pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod progress;
pub mod session;
pub mod storage;
pub mod stream;

pub use client::{AgentClient, ChatRequest, Feedback};
pub use config::Config;
pub use error::{ClientError, ConfigError, NavigationError, StorageError};
pub use progress::{
    FailureReason, FlowState, Navigator, Phase, ProgressController, ProgressView,
    RESULT_DESTINATION, RESULT_KEY,
};
pub use session::SessionId;
pub use storage::{FileStore, MemoryStore, ResultSink, ResultSource};
pub use stream::{EventRecord, NdjsonDecoder};
