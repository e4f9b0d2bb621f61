//! Errors returned by the CMS client.

use serde::Deserialize;
use thiserror::Error;

/// Result type for CMS operations.
pub type Result<T> = std::result::Result<T, CmsError>;

/// CMS request errors.
#[derive(Debug, Error)]
pub enum CmsError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("CMS request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The CMS answered with a non-success status.
    #[error("CMS returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error identifier from the response body, e.g. `AccessTokenInvalid`.
        error_id: Option<String>,
        /// Human-readable message from the response body.
        message: String,
    },

    /// A success response whose body could not be decoded.
    #[error("Failed to decode CMS response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Error body shape used by the management API.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub sys: Option<ApiErrorSys>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorSys {
    #[serde(default)]
    pub id: Option<String>,
}

impl CmsError {
    /// Build an API error from a status code and raw response body.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("HTTP status {status}")
                } else {
                    body.trim().to_string()
                }
            });

        Self::Api {
            status,
            error_id: parsed.sys.and_then(|s| s.id),
            message,
        }
    }

    /// Message reported by the CMS, if this is an API error.
    #[must_use]
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Error identifier reported by the CMS, if any.
    #[must_use]
    pub fn error_id(&self) -> Option<&str> {
        match self {
            Self::Api { error_id, .. } => error_id.as_deref(),
            _ => None,
        }
    }

    /// HTTP status of an API error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) => None,
        }
    }
}
