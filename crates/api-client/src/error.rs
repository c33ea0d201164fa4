//! Normalized request failures.
//!
//! Callers never see transport-library errors or raw response bodies:
//! every failure becomes one of these variants, each carrying a status
//! code and a message fit for display.

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error type for API operations.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The session could not be established or renewed (401).
    #[error("{message}")]
    Unauthenticated { message: String },

    /// The session is valid but not permitted (403).
    #[error("{message}")]
    AccessDenied { message: String },

    /// Any other rejection from the server.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The request never produced a response.
    #[error("connection error")]
    Connection,

    /// The response arrived but its body could not be decoded.
    #[error("Response decoding error: {0}")]
    Serialization(String),
}

impl ApiError {
    /// The status code associated with this failure. Failures without a
    /// server response report 0.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Unauthenticated { .. } => 401,
            ApiError::AccessDenied { .. } => 403,
            ApiError::Http { status, .. } => *status,
            ApiError::Connection => 0,
            ApiError::Serialization(_) => 0,
        }
    }

    /// The display message for this failure.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Body shape the backend uses for error responses. Anything else in
/// the body is ignored.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Map an error response to the matching [`ApiError`] variant, pulling
/// the display message from the body when the backend provided one.
pub(crate) async fn normalize_failure(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let body_message = match response.bytes().await {
        Ok(bytes) => serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(|body| body.message),
        Err(err) => {
            debug!(status, error = %err, "Failed to read error response body");
            None
        }
    };

    match status {
        401 => ApiError::Unauthenticated {
            message: body_message.unwrap_or_else(|| "authentication required".to_string()),
        },
        403 => ApiError::AccessDenied {
            message: body_message.unwrap_or_else(|| "access denied".to_string()),
        },
        _ => ApiError::Http {
            status,
            message: body_message.unwrap_or_else(|| "unknown error".to_string()),
        },
    }
}

/// Map a transport failure (no response at all) to [`ApiError`].
pub(crate) fn normalize_transport(err: reqwest::Error) -> ApiError {
    debug!(error = %err, "Request produced no response");
    ApiError::Connection
}
