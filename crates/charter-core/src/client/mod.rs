//! HTTP transport for the drafting service
//!
//! - `POST /api/chat_stream` returns an NDJSON progress stream
//! - `POST /feedback` records a rating for a finished draft

mod types;

pub use types::{ChatRequest, Feedback, FeedbackAck};

use std::time::Duration;

use bytes::Bytes;
use futures::Stream;
use reqwest::header::ACCEPT;
use reqwest::Response;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::error::{ClientError, ClientResult};

pub const CHAT_STREAM_PATH: &str = "/api/chat_stream";
pub const FEEDBACK_PATH: &str = "/feedback";

/// Longest error body kept in [`ClientError::Status`]
const MAX_ERROR_BODY: usize = 512;

/// Client for one drafting service
#[derive(Debug, Clone)]
pub struct AgentClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AgentClient {
    pub fn new(base_url: &str, connect_timeout: Option<Duration>) -> ClientResult<Self> {
        // Trailing slash so endpoint joins keep any path prefix
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url =
            Url::parse(&normalized).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;

        let mut builder =
            reqwest::Client::builder().user_agent(concat!("charter/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    pub fn from_config(config: &Config) -> ClientResult<Self> {
        Self::new(&config.base_url, config.connect_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Open the progress stream for a drafting request
    ///
    /// Fails on network errors and non-success statuses; the returned stream
    /// yields the raw body chunks in order.
    pub async fn chat_stream(
        &self,
        request: &ChatRequest,
    ) -> ClientResult<impl Stream<Item = reqwest::Result<Bytes>>> {
        let url = self.endpoint(CHAT_STREAM_PATH)?;
        info!(session_id = %request.session_id, "Opening drafting stream at {}", url);

        let response = self
            .http
            .post(url)
            .header(ACCEPT, "application/x-ndjson")
            .json(request)
            .send()
            .await?;
        let response = Self::handle_error_response(response).await?;

        debug!(
            "Drafting stream opened: status={}, content-type={:?}",
            response.status(),
            response.headers().get(reqwest::header::CONTENT_TYPE)
        );
        Ok(response.bytes_stream())
    }

    /// Submit a rating for a draft
    pub async fn send_feedback(&self, feedback: &Feedback) -> ClientResult<()> {
        let url = self.endpoint(FEEDBACK_PATH)?;
        debug!("Sending feedback to {}", url);

        let response = self.http.post(url).json(feedback).send().await?;
        let response = Self::handle_error_response(response).await?;

        let ack: FeedbackAck = response.json().await?;
        if ack.status != "success" {
            return Err(ClientError::Feedback(ack.status));
        }
        info!("Feedback accepted (score {})", feedback.score);
        Ok(())
    }

    async fn handle_error_response(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        warn!("Drafting service returned {}: {}", status, body);
        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
