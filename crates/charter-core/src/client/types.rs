//! Wire types for the drafting service

use serde::{Deserialize, Serialize};

use crate::session::SessionId;

/// Body of `POST /api/chat_stream`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: SessionId,
}

impl ChatRequest {
    /// Build the drafting instruction for a topic
    pub fn for_topic(topic: &str, session_id: SessionId) -> Self {
        Self {
            message: format!("Draft a binding AI Constitution for this use case: {topic}"),
            session_id,
        }
    }
}

/// Body of `POST /feedback`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Acknowledgement returned by the feedback endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackAck {
    pub status: String,
}
