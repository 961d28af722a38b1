//! Records carried by the NDJSON response stream

use serde::{Deserialize, Serialize};

/// One decoded line of the drafting stream
///
/// Wire shape is `{"type": "progress" | "result", "text": "..."}`. Any other
/// `type` fails to parse and the line is treated as malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventRecord {
    /// Human-readable pipeline status
    Progress { text: String },
    /// Final artifact, kept as an opaque serialized string
    Result { text: String },
}

/// Discriminant of an [`EventRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Progress,
    Result,
}

impl EventRecord {
    pub fn progress(text: impl Into<String>) -> Self {
        Self::Progress { text: text.into() }
    }

    pub fn result(text: impl Into<String>) -> Self {
        Self::Result { text: text.into() }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Progress { .. } => RecordKind::Progress,
            Self::Result { .. } => RecordKind::Result,
        }
    }

    pub fn payload(&self) -> &str {
        match self {
            Self::Progress { text } | Self::Result { text } => text,
        }
    }

    /// Serialize as a single newline-terminated wire line
    pub fn to_line(&self) -> String {
        // Serializing a two-string enum cannot fail
        let mut line = serde_json::to_string(self).unwrap_or_default();
        line.push('\n');
        line
    }
}
