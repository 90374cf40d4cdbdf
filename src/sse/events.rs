//! Event type definitions for the answer stream.
//!
//! Contains the wire-level [`Frame`], the typed [`StreamEvent`] enum, and the
//! error returned when a frame cannot be turned into an event.

use serde::{Deserialize, Serialize};

/// Event name assumed when a frame carries no `event:` line.
pub const DEFAULT_EVENT_NAME: &str = "message";

/// Represents a parsed SSE line
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Event type declaration (e.g., "event: answer_chunk")
    Event(String),
    /// Data payload (e.g., "data: \"hello\"")
    Data(String),
    /// Empty line - signals end of event
    Empty,
    /// Comment line (starts with ':')
    Comment(String),
    /// Any other field (`id:`, `retry:`, vendor extensions)
    Unknown(String),
}

/// One delimited block of the wire protocol, before payload interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Event name, `"message"` when the block had no `event:` line
    pub event: String,
    /// Data payload; multiple `data:` lines joined with `\n`
    pub data: String,
}

impl Frame {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }
}

/// A reference source attached to an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

/// Structured error reported by the backend through an `error` event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorInfo {
    pub message: String,
    pub status_code: Option<u16>,
    pub code: Option<String>,
    pub kind: Option<String>,
    pub details: Option<String>,
}

impl ErrorInfo {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Render the error the way it is appended to channel text.
    pub fn annotation(&self) -> String {
        match self.status_code {
            Some(status) => format!("\n[Error: {} (status {})]", self.message, status),
            None => format!("\n[Error: {}]", self.message),
        }
    }
}

/// Discriminator of a generic chunk event (`type` field of the payload).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChunkKind {
    SearchResult,
    ReporterResult,
    Stream,
    Intermediate,
    Final,
    /// No `type` field at all
    #[default]
    Unspecified,
    /// Unrecognized discriminator, kept verbatim
    Other(String),
}

impl ChunkKind {
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            None => ChunkKind::Unspecified,
            Some("search_result") => ChunkKind::SearchResult,
            Some("reporter_result") => ChunkKind::ReporterResult,
            Some("stream") => ChunkKind::Stream,
            Some("intermediate") => ChunkKind::Intermediate,
            Some("final") => ChunkKind::Final,
            Some(other) => ChunkKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ChunkKind::SearchResult => "search_result",
            ChunkKind::ReporterResult => "reporter_result",
            ChunkKind::Stream => "stream",
            ChunkKind::Intermediate => "intermediate",
            ChunkKind::Final => "final",
            ChunkKind::Unspecified => "",
            ChunkKind::Other(s) => s,
        }
    }
}

/// Payload of a generic chunk event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub kind: ChunkKind,
    /// Set on the last chunk of a turn
    pub done: bool,
    /// Backend-side failure reported alongside the chunk
    pub error: Option<String>,
}

impl Chunk {
    pub fn new(text: impl Into<String>, kind: ChunkKind) -> Self {
        Self {
            text: text.into(),
            kind,
            done: false,
            error: None,
        }
    }

    pub fn finished(mut self) -> Self {
        self.done = true;
        self
    }
}

/// Typed events of the answer stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Reference sources, replacing any previously received list
    Sources(Vec<Source>),
    /// Plain text fragment for the chat channel
    AnswerChunk(String),
    /// Error from the backend (terminal)
    Error(ErrorInfo),
    /// Stream completed successfully
    Done,
    /// Generic chunk routed by its discriminator
    Chunk(Chunk),
}

impl StreamEvent {
    /// Returns the event type name as a string for debugging purposes.
    pub fn event_type_name(&self) -> &'static str {
        match self {
            StreamEvent::Sources(_) => "sources",
            StreamEvent::AnswerChunk(_) => "answer_chunk",
            StreamEvent::Error(_) => "error",
            StreamEvent::Done => "done",
            StreamEvent::Chunk(_) => "chunk",
        }
    }
}

/// Errors that can occur while decoding a frame into a [`StreamEvent`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The frame carried no payload; callers drop it silently.
    #[error("frame has no data")]
    Empty,
    /// The payload did not have the shape the event name requires.
    #[error("malformed payload for event '{event}': {reason}")]
    Malformed {
        event: String,
        raw: String,
        reason: String,
    },
}

impl DecodeError {
    pub(crate) fn malformed(frame: &Frame, reason: impl ToString) -> Self {
        DecodeError::Malformed {
            event: frame.event.clone(),
            raw: frame.data.clone(),
            reason: reason.to_string(),
        }
    }
}
