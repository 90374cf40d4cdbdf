//! searchstream - streaming client for search-and-answer backends.
//!
//! A query is posted to a backend that answers with a server-sent event
//! stream. The bytes are framed ([`sse::FrameSplitter`]), decoded into typed
//! events ([`sse::decode`]) and folded into a per-turn state
//! ([`turn::TurnState`]) by a [`turn::TurnController`] that publishes a
//! snapshot after every change and supports cooperative cancellation.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod error;
pub mod logging;
pub mod models;
pub mod sse;
pub mod traits;
pub mod turn;
