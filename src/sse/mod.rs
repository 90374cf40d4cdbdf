//! SSE (Server-Sent Events) stream framing and decoding
//!
//! Turns the answer stream of the search backends into typed events.
//! SSE format consists of:
//! - `event: <type>` - event type line
//! - `data: <json>` - data payload line(s)
//! - Empty line - signals end of event
//! - Lines starting with `:` - comments (ignored)
//!
//! # Module structure
//! - `events` - Event type definitions (Frame, StreamEvent, DecodeError)
//! - `payloads` - Internal payload deserialization structs
//! - `parser` - Framing logic (FrameSplitter, parse_frame, parse_sse_line)
//! - `decoder` - Frame to event decoding

mod decoder;
mod events;
mod parser;
mod payloads;

// Re-export public types
pub use decoder::decode;
pub use events::{
    Chunk, ChunkKind, DecodeError, ErrorInfo, Frame, Source, SseLine, StreamEvent,
    DEFAULT_EVENT_NAME,
};
pub use parser::{parse_frame, parse_sse_line, FrameSplitter};
