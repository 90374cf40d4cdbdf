//! Frame-to-event decoding.
//!
//! Dispatches on the frame's event name and checks the payload has the
//! shape that event requires. Anything else is reported as
//! [`DecodeError::Malformed`] so the caller can drop the frame and go on.

use crate::sse::events::{Chunk, ChunkKind, DecodeError, ErrorInfo, Frame, Source, StreamEvent};
use crate::sse::payloads::{ChunkPayload, ErrorPayload};

/// Decode a frame into a typed [`StreamEvent`].
pub fn decode(frame: &Frame) -> Result<StreamEvent, DecodeError> {
    if frame.data.trim().is_empty() {
        return Err(DecodeError::Empty);
    }

    match frame.event.as_str() {
        "sources" => decode_sources(frame),
        "answer_chunk" => decode_answer_chunk(frame),
        "error" => decode_error(frame),
        "done" => decode_done(frame),
        // stream, final, message and anything newer carry a chunk object
        _ => decode_chunk(frame),
    }
}

fn decode_sources(frame: &Frame) -> Result<StreamEvent, DecodeError> {
    let sources: Vec<Source> =
        serde_json::from_str(&frame.data).map_err(|e| DecodeError::malformed(frame, e))?;
    Ok(StreamEvent::Sources(sources))
}

fn decode_answer_chunk(frame: &Frame) -> Result<StreamEvent, DecodeError> {
    let text: String =
        serde_json::from_str(&frame.data).map_err(|e| DecodeError::malformed(frame, e))?;
    Ok(StreamEvent::AnswerChunk(text))
}

fn decode_error(frame: &Frame) -> Result<StreamEvent, DecodeError> {
    let payload: ErrorPayload =
        serde_json::from_str(&frame.data).map_err(|e| DecodeError::malformed(frame, e))?;
    Ok(StreamEvent::Error(error_info(payload)))
}

fn decode_done(frame: &Frame) -> Result<StreamEvent, DecodeError> {
    // Any well-formed JSON closes the turn; the summary backend sends a
    // status message, the deep-search backend an empty object.
    serde_json::from_str::<serde_json::Value>(&frame.data)
        .map_err(|e| DecodeError::malformed(frame, e))?;
    Ok(StreamEvent::Done)
}

fn decode_chunk(frame: &Frame) -> Result<StreamEvent, DecodeError> {
    let payload: ChunkPayload =
        serde_json::from_str(&frame.data).map_err(|e| DecodeError::malformed(frame, e))?;

    match payload.chunk {
        Some(text) => Ok(StreamEvent::Chunk(Chunk {
            text,
            kind: ChunkKind::from_wire(payload.kind.as_deref()),
            done: payload.done,
            error: payload.error.filter(|e| !e.is_empty()),
        })),
        None => match payload.error.filter(|e| !e.is_empty()) {
            Some(message) => Ok(StreamEvent::Error(ErrorInfo::new(message))),
            None => Err(DecodeError::malformed(frame, "missing field `chunk`")),
        },
    }
}

fn error_info(payload: ErrorPayload) -> ErrorInfo {
    let code = payload.code.and_then(|code| match code {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    });
    ErrorInfo {
        message: payload.message,
        status_code: payload.status_code,
        code,
        kind: payload.kind,
        details: payload.details,
    }
}
