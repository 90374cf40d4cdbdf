//! Reqwest-based transport adapter.
//!
//! Posts the query as JSON and hands back the response body as a
//! [`ByteStream`], implementing [`Transport`] from `crate::traits`.

use async_trait::async_trait;
use futures_util::StreamExt;

use crate::config::ClientConfig;
use crate::models::QueryRequest;
use crate::traits::{ByteStream, Transport, TransportError};

/// HTTP transport using reqwest.
///
/// # Example
///
/// ```ignore
/// use searchstream::adapters::ReqwestTransport;
/// use searchstream::config::ClientConfig;
///
/// let transport = ReqwestTransport::from_config(&ClientConfig::from_env()?)?;
/// let body = transport.open(&QueryRequest::new("rust async")).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl ReqwestTransport {
    /// Create a transport posting to `endpoint` with a default client.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    /// Build a transport for the configured endpoint.
    ///
    /// Only the connect phase is bounded by the configured timeout; an answer
    /// may legitimately stream for minutes.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(Self::convert_error)?;
        Ok(Self::with_client(client, config.endpoint()))
    }

    /// Use a preconfigured reqwest::Client.
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn convert_error(err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::ConnectionFailed(err.to_string())
        } else if err.is_builder() {
            TransportError::InvalidUrl(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }

    fn convert_read_error(err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else {
            TransportError::Read(err.to_string())
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn open(&self, request: &QueryRequest) -> Result<ByteStream, TransportError> {
        tracing::debug!(endpoint = %self.endpoint, "Opening answer stream");

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await
            .map_err(Self::convert_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .ok()
                .map(|body| body.trim().to_string())
                .filter(|body| !body.is_empty())
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let stream = response
            .bytes_stream()
            .map(|result| result.map_err(Self::convert_read_error));
        Ok(Box::pin(stream))
    }
}
