//! Turn failure classification.
//!
//! A finished turn that did not complete normally records one of these
//! variants next to its content, so a front-end can decide how to present it
//! without parsing annotation text.

use std::fmt;

use crate::sse::ErrorInfo;
use crate::traits::TransportError;

/// Why a turn ended abnormally.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// The connection failed, the server refused the request, or the body
    /// could not be read.
    Transport {
        message: String,
        status: Option<u16>,
    },

    /// The backend sent an explicit `error` event.
    Protocol {
        message: String,
        status: Option<u16>,
        code: Option<String>,
    },

    /// The user cancelled the turn.
    Cancelled,
}

impl StreamError {
    /// Check if re-sending the same query may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::Transport { status, .. } => match status {
                Some(code) => *code >= 500 || *code == 408 || *code == 429,
                None => true,
            },
            StreamError::Protocol { status, .. } => matches!(status, Some(429) | Some(503)),
            StreamError::Cancelled => false,
        }
    }

    /// Cancellation is informational, not a failure shown to the user.
    pub fn is_user_visible_failure(&self) -> bool {
        !matches!(self, StreamError::Cancelled)
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::Transport { message, .. } => {
                format!("Failed to get response: {}", message)
            }
            StreamError::Protocol { message, .. } => format!("Server error: {}", message),
            StreamError::Cancelled => "Response interrupted by user".to_string(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::Transport { .. } => "E_STREAM_TRANSPORT",
            StreamError::Protocol { .. } => "E_STREAM_BACKEND",
            StreamError::Cancelled => "E_STREAM_CANCELLED",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Transport { message, .. } => write!(f, "Transport failure: {}", message),
            StreamError::Protocol { message, code, .. } => match code {
                Some(c) => write!(f, "Backend error [{}]: {}", c, message),
                None => write!(f, "Backend error: {}", message),
            },
            StreamError::Cancelled => write!(f, "Stream cancelled by user"),
        }
    }
}

impl std::error::Error for StreamError {}

impl From<&TransportError> for StreamError {
    fn from(err: &TransportError) -> Self {
        StreamError::Transport {
            message: err.to_string(),
            status: err.status(),
        }
    }
}

impl From<&ErrorInfo> for StreamError {
    fn from(info: &ErrorInfo) -> Self {
        StreamError::Protocol {
            message: info.message.clone(),
            status: info.status_code,
            code: info.code.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(StreamError::Transport {
            message: "refused".to_string(),
            status: None
        }
        .is_retryable());
        assert!(StreamError::Transport {
            message: "bad gateway".to_string(),
            status: Some(502)
        }
        .is_retryable());
        assert!(!StreamError::Transport {
            message: "not found".to_string(),
            status: Some(404)
        }
        .is_retryable());
        assert!(!StreamError::Cancelled.is_retryable());
    }

    #[test]
    fn test_user_messages() {
        let err = StreamError::Transport {
            message: "HTTP error 500".to_string(),
            status: Some(500),
        };
        assert_eq!(err.user_message(), "Failed to get response: HTTP error 500");
        assert_eq!(
            StreamError::Cancelled.user_message(),
            "Response interrupted by user"
        );
        assert!(!StreamError::Cancelled.is_user_visible_failure());
    }

    #[test]
    fn test_display_with_code() {
        let err = StreamError::Protocol {
            message: "quota".to_string(),
            status: None,
            code: Some("insufficient_quota".to_string()),
        };
        assert_eq!(err.to_string(), "Backend error [insufficient_quota]: quota");
        assert_eq!(err.error_code(), "E_STREAM_BACKEND");
    }

    #[test]
    fn test_from_transport_error() {
        let err: StreamError = (&TransportError::Status {
            status: 503,
            message: "busy".to_string(),
        })
            .into();
        assert_eq!(
            err,
            StreamError::Transport {
                message: "HTTP error 503: busy".to_string(),
                status: Some(503)
            }
        );
    }
}
