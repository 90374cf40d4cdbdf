//! Internal payload deserialization structs.
//!
//! These mirror the JSON bodies the search backends put on `data:` lines and
//! are converted into the public event types by the decoder.

use serde::Deserialize;

/// `error` event body. The deep-search backend sends `{"error": "..."}`,
/// the summary backend `{"message": "...", "status_code": 502, ...}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(alias = "error")]
    pub message: String,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

/// Generic chunk body: `{"chunk": "...", "type": "stream", "done": false}`.
/// Extra fields such as `node` are ignored.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChunkPayload {
    #[serde(default)]
    pub chunk: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}
