//! Backend error taxonomy.
//!
//! Every failed backend call is classified exactly once, at the HTTP
//! gateway, into this tagged union. Workflows match on variants instead
//! of probing status codes or heterogeneous error shapes, and the
//! user-facing copy per class lives in one place.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response arrived at all: DNS, connect, TLS, broken transport.
    #[error("network unreachable: {detail}")]
    Network { detail: String },

    /// The client-side deadline elapsed before a response arrived.
    #[error("request timed out")]
    Timeout,

    /// The server rejected the request (4xx), optionally saying why.
    #[error("request rejected by server")]
    Validation { message: Option<String> },

    /// The server failed (5xx). Nothing in the payload is trusted.
    #[error("server error (status {status})")]
    Server { status: u16 },

    /// Authentication rejected (401). Handled globally by the gateway;
    /// workflows normally never branch on this.
    #[error("unauthorized")]
    Unauthorized,

    /// The owning workflow tore down while the call was in flight.
    /// Silent by contract: never surfaced to the operator.
    #[error("operation cancelled")]
    Cancelled,

    /// A 2xx response whose body did not match the expected shape.
    #[error("malformed response: {detail}")]
    Decode { detail: String },
}

impl ApiError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }

    /// Whether a second, identical attempt may plausibly succeed. Only
    /// transport-level failures qualify; a rejection or a decode error
    /// will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Network { .. } | ApiError::Timeout)
    }

    /// Fixed copy per class, shown verbatim by the shell. A validation
    /// rejection echoes the server's own message when one was sent.
    /// `None` means stay silent (cancellations).
    pub fn user_message(&self) -> Option<String> {
        match self {
            ApiError::Network { .. } => {
                Some("Network unreachable. Check your connection and try again.".to_string())
            }
            ApiError::Timeout => Some("The request timed out. Please try again.".to_string()),
            ApiError::Validation {
                message: Some(message),
            } => Some(message.clone()),
            ApiError::Validation { message: None } => {
                Some("Request could not be processed. Please review the details and try again."
                    .to_string())
            }
            ApiError::Server { .. } => {
                Some("Something went wrong on the server. Please try again later.".to_string())
            }
            ApiError::Unauthorized => {
                Some("Your session has expired. Please sign in again.".to_string())
            }
            ApiError::Cancelled => None,
            ApiError::Decode { .. } => {
                Some("Received an unexpected response. Please try again.".to_string())
            }
        }
    }
}
