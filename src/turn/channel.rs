//! Content channels of a turn.

use std::fmt;

use crate::sse::ChunkKind;

/// A named logical output stream within a turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Channel {
    /// Conversational answer text; always present
    #[default]
    Chat,
    /// Raw search trace
    Search,
    /// Final research report
    Reporter,
    /// Channel announced by a `<name>_result` discriminator this client does
    /// not know yet
    Other(String),
}

impl Channel {
    /// Channel a generic chunk is routed to.
    pub fn for_chunk(kind: &ChunkKind) -> Channel {
        match kind {
            ChunkKind::SearchResult => Channel::Search,
            ChunkKind::ReporterResult => Channel::Reporter,
            ChunkKind::Stream | ChunkKind::Intermediate | ChunkKind::Final => Channel::Chat,
            ChunkKind::Unspecified => Channel::Chat,
            ChunkKind::Other(tag) => match tag.strip_suffix("_result") {
                // Never aliased onto a known channel, so it cannot promote
                Some(name) if !name.is_empty() => Channel::Other(name.to_string()),
                _ => Channel::Chat,
            },
        }
    }

    /// Parse a channel name as typed by a user or sent by a backend.
    pub fn from_name(name: &str) -> Channel {
        match name.trim().to_ascii_lowercase().as_str() {
            "chat" => Channel::Chat,
            "search" => Channel::Search,
            "reporter" | "report" => Channel::Reporter,
            other => Channel::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Channel::Chat => "chat",
            Channel::Search => "search",
            Channel::Reporter => "reporter",
            Channel::Other(name) => name,
        }
    }

    /// Receiving content on this channel makes it the default view.
    pub fn promotes_on_content(&self) -> bool {
        matches!(self, Channel::Reporter)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
