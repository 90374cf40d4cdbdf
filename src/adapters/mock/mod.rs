//! Test doubles for the trait abstractions.
//!
//! - [`ScriptedTransport`] - replays scripted chunks and failures

pub mod transport;

pub use transport::ScriptedTransport;
