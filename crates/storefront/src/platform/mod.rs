//! Clients for the hosted backend platform.
//!
//! The platform exposes three REST endpoint groups, each with its own
//! client here:
//!
//! - `/auth/v1` - token-based authentication ([`AuthClient`])
//! - `/rest/v1` - row-oriented table access ([`ProfileStore`],
//!   [`ProductStore`])
//! - `/storage/v1` - object storage ([`StorageClient`])
//!
//! Every request carries the publishable API key; user-scoped operations
//! additionally carry the caller's bearer token. The [`AuthApi`] and
//! [`ProfileApi`] traits seam the session synchronizer from the wire
//! clients so tests can substitute in-memory fakes.

pub mod auth;
pub mod profiles;
pub mod products;
pub mod storage;

pub use auth::{AuthApi, AuthClient, SignUpOutcome};
pub use profiles::{ProfileApi, ProfileChanges, ProfileInsert, ProfileRecord, ProfileStore};
pub use products::{ProductChanges, ProductInsert, ProductQuery, ProductRecord, ProductStore};
pub use storage::{StorageClient, StoredObject};

use serde::Deserialize;
use thiserror::Error;

/// Errors from the platform boundary.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform rejected the request.
    #[error("platform error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, or the raw body.
        message: String,
    },

    /// A response could not be interpreted.
    #[error("parse error: {0}")]
    Parse(String),
}

impl PlatformError {
    /// Whether the platform rejected the caller's credentials.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }
}

/// Error body shapes the platform responds with; any of these fields may
/// carry the message depending on the endpoint group.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.message)
            .or(self.msg)
            .or(self.error)
    }
}

/// Pass a successful response through, or read the body into a
/// [`PlatformError::Api`].
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, PlatformError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or(body);

    Err(PlatformError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_field_priority() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"msg":"low","error_description":"high"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("high"));
    }

    #[test]
    fn test_is_unauthorized() {
        let err = PlatformError::Api {
            status: 401,
            message: "invalid token".into(),
        };
        assert!(err.is_unauthorized());

        let err = PlatformError::Api {
            status: 500,
            message: "boom".into(),
        };
        assert!(!err.is_unauthorized());
    }
}
