//! Scripted transport for testing.
//!
//! Replays a fixed list of chunks exactly as given, so tests control the
//! chunk boundaries a server would produce.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::models::QueryRequest;
use crate::traits::{ByteStream, Transport, TransportError};

#[derive(Debug, Clone, Default)]
struct Script {
    chunks: Vec<Bytes>,
    open_error: Option<TransportError>,
    read_error: Option<TransportError>,
    hold_open: bool,
    open_delay: Option<Duration>,
    chunk_delay: Option<Duration>,
}

/// Transport double replaying a script.
///
/// After the scripted chunks the stream either ends, yields the configured
/// read error, or (when held open) never yields again.
///
/// # Example
///
/// ```ignore
/// use searchstream::adapters::mock::ScriptedTransport;
///
/// let transport = ScriptedTransport::new()
///     .with_chunks(["event: answer_chunk\ndata: \"Hi\"\n\n"])
///     .holding_open();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    script: Script,
    /// Requests received, shared between clones
    requests: Arc<Mutex<Vec<QueryRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chunks delivered in order, one stream item each.
    pub fn with_chunks<I, B>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        self.script.chunks.extend(chunks.into_iter().map(Into::into));
        self
    }

    /// Fail `open` with this error.
    pub fn with_open_error(mut self, err: TransportError) -> Self {
        self.script.open_error = Some(err);
        self
    }

    /// Yield this error after the scripted chunks.
    pub fn with_read_error(mut self, err: TransportError) -> Self {
        self.script.read_error = Some(err);
        self
    }

    /// Never end the stream after the scripted chunks.
    pub fn holding_open(mut self) -> Self {
        self.script.hold_open = true;
        self
    }

    /// Wait before answering `open`.
    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.script.open_delay = Some(delay);
        self
    }

    /// Wait before each chunk.
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.script.chunk_delay = Some(delay);
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<QueryRequest> {
        self.lock_requests().clone()
    }

    pub fn clear_requests(&self) {
        self.lock_requests().clear();
    }

    fn lock_requests(&self) -> MutexGuard<'_, Vec<QueryRequest>> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn open(&self, request: &QueryRequest) -> Result<ByteStream, TransportError> {
        self.lock_requests().push(request.clone());

        if let Some(delay) = self.script.open_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = &self.script.open_error {
            return Err(err.clone());
        }

        let delay = self.script.chunk_delay;
        let chunks = futures::stream::iter(self.script.chunks.clone()).then(move |chunk| async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok::<_, TransportError>(chunk)
        });
        let tail = futures::stream::iter(self.script.read_error.clone().map(Err));

        if self.script.hold_open {
            Ok(Box::pin(chunks.chain(tail).chain(futures::stream::pending())))
        } else {
            Ok(Box::pin(chunks.chain(tail)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(transport: &ScriptedTransport) -> Vec<Result<Bytes, TransportError>> {
        let body = transport.open(&QueryRequest::new("q")).await.unwrap();
        body.collect().await
    }

    #[tokio::test]
    async fn test_replays_chunks_in_order() {
        let transport = ScriptedTransport::new().with_chunks(["a", "b"]);
        let items = collect(&transport).await;
        assert_eq!(items, vec![Ok(Bytes::from("a")), Ok(Bytes::from("b"))]);
    }

    #[tokio::test]
    async fn test_read_error_after_chunks() {
        let transport = ScriptedTransport::new()
            .with_chunks(["a"])
            .with_read_error(TransportError::Read("reset".to_string()));
        let items = collect(&transport).await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[1], Err(TransportError::Read("reset".to_string())));
    }

    #[tokio::test]
    async fn test_open_error() {
        let transport = ScriptedTransport::new()
            .with_open_error(TransportError::Timeout("slow".to_string()));
        let result = transport.open(&QueryRequest::new("q")).await;
        assert!(matches!(result, Err(TransportError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_records_requests_across_clones() {
        let transport = ScriptedTransport::new();
        let clone = transport.clone();
        let _ = clone.open(&QueryRequest::new("first")).await;
        assert_eq!(transport.requests(), vec![QueryRequest::new("first")]);
        transport.clear_requests();
        assert!(clone.requests().is_empty());
    }
}
