//! Byte-stream transport trait abstraction.
//!
//! The turn controller never talks HTTP directly; it asks a [`Transport`]
//! for a stream of raw chunks. This keeps connection setup swappable and
//! lets tests script the exact chunk boundaries a server would produce.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

use crate::models::QueryRequest;

/// Raw answer body, delivered in arbitrarily cut chunks.
///
/// The stream ending signals end-of-stream. Dropping it asks the transport to
/// stop delivering data.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Transport errors.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// Connection failed
    ConnectionFailed(String),
    /// Request timeout
    Timeout(String),
    /// Server answered with a non-success status
    Status { status: u16, message: String },
    /// Reading the body failed after streaming began
    Read(String),
    /// Invalid URL
    InvalidUrl(String),
    /// Other error
    Other(String),
}

impl TransportError {
    /// HTTP status, when the failure came from the server's answer
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            TransportError::Timeout(msg) => write!(f, "Request timeout: {}", msg),
            TransportError::Status { status, message } => {
                if message.is_empty() {
                    write!(f, "HTTP error {}", status)
                } else {
                    write!(f, "HTTP error {}: {}", status, message)
                }
            }
            TransportError::Read(msg) => write!(f, "Stream read failed: {}", msg),
            TransportError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            TransportError::Other(msg) => write!(f, "Transport error: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

/// Trait for opening an answer stream.
///
/// # Example
///
/// ```ignore
/// use searchstream::traits::Transport;
/// use searchstream::models::QueryRequest;
///
/// async fn first_chunk<T: Transport>(transport: &T) {
///     let mut body = transport.open(&QueryRequest::new("what is rust?")).await?;
///     if let Some(chunk) = body.next().await {
///         println!("{:?}", chunk?);
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the query and return the response body as a byte stream.
    ///
    /// Fails before any byte is delivered when the connection cannot be made
    /// or the server refuses the request.
    async fn open(&self, request: &QueryRequest) -> Result<ByteStream, TransportError>;
}
