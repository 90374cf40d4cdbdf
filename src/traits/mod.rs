//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`Transport`] - Opens the answer byte stream for a query

pub mod transport;

pub use transport::{ByteStream, Transport, TransportError};
