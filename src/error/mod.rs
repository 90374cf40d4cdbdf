//! Error types for searchstream.
//!
//! - [`StreamError`]: why a finished turn ended abnormally (recorded on the
//!   turn state, never returned)
//! - [`TurnError`]: misuse of the controller API
//!
//! Transport failures live next to the trait that produces them
//! ([`crate::traits::TransportError`]); per-frame decoding failures next to
//! the decoder ([`crate::sse::DecodeError`]).

mod stream;

pub use stream::StreamError;

/// Errors returned by the turn controller API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    /// A turn is already sending or streaming on this controller.
    #[error("a turn is already in progress")]
    AlreadyActive,
    /// The background task driving the turn panicked or was aborted.
    #[error("turn task aborted: {0}")]
    Aborted(String),
    /// The query was empty after trimming.
    #[error("query is empty")]
    EmptyQuery,
}

/// Result type alias for controller operations
pub type TurnResult<T> = Result<T, TurnError>;
