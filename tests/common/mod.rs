//! Common test utilities for integration tests.
//!
//! Builders for SSE wire text and helpers to run a turn over a scripted
//! transport.
//!
//! # Example
//!
//! ```ignore
//! let body = [frame("answer_chunk", "\"Hi\""), frame("done", "{}")].concat();
//! let snapshot = run_chunks(vec![body.into_bytes()]).await;
//! ```

#![allow(dead_code)]

use bytes::Bytes;
use searchstream::adapters::mock::ScriptedTransport;
use searchstream::turn::{TurnController, TurnSnapshot};

/// One SSE block with an explicit event name.
pub fn frame(event: &str, data: &str) -> String {
    format!("event: {}\ndata: {}\n\n", event, data)
}

/// One SSE block without an event line (generic chunk stream).
pub fn data_frame(data: &str) -> String {
    format!("data: {}\n\n", data)
}

/// Generic chunk JSON as sent by the deep-search backend.
pub fn chunk_json(text: &str, kind: &str, done: bool) -> String {
    serde_json::json!({ "chunk": text, "type": kind, "done": done }).to_string()
}

/// Summary-backend body: sources, answer pieces, done.
pub fn summary_body(sources: &[(&str, &str)], answer: &[&str]) -> String {
    let sources: Vec<_> = sources
        .iter()
        .map(|(title, url)| serde_json::json!({ "title": title, "url": url }))
        .collect();
    let mut body = frame("sources", &serde_json::Value::from(sources).to_string());
    for piece in answer {
        body.push_str(&frame(
            "answer_chunk",
            &serde_json::Value::from(*piece).to_string(),
        ));
    }
    body.push_str(&frame("done", "{}"));
    body
}

/// Every way to cut `body` into two chunks.
pub fn two_way_splits(body: &[u8]) -> impl Iterator<Item = Vec<Bytes>> + '_ {
    (0..=body.len()).map(move |i| {
        vec![
            Bytes::copy_from_slice(&body[..i]),
            Bytes::copy_from_slice(&body[i..]),
        ]
    })
}

/// `body` delivered one byte per chunk.
pub fn byte_chunks(body: &[u8]) -> Vec<Bytes> {
    body.iter().map(|b| Bytes::copy_from_slice(&[*b])).collect()
}

pub fn controller(transport: ScriptedTransport) -> TurnController {
    TurnController::from_transport(transport)
}

/// Run one turn to its end over the given chunks.
pub async fn run_chunks<B: Into<Bytes>>(chunks: Vec<B>) -> TurnSnapshot {
    controller(ScriptedTransport::new().with_chunks(chunks))
        .run("test query")
        .await
        .expect("turn should start")
}
