/**
 * Gateway Error Types
 *
 * This module defines the error taxonomy for the request pipeline.
 * Every failure surfaced by a middleware stage, strategy, or handler is one
 * of these variants and can be converted to an HTTP response.
 */

use axum::http::StatusCode;
use thiserror::Error;

/// Pipeline-wide error type
///
/// Strategy and guard failures propagate unchanged to the error normalizer.
/// Storage and internal failures keep their detail for the logs; the client
/// only ever sees the generic message from [`GatewayError::client_message`].
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request did not carry the credentials the strategy expects
    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    /// Credentials were presented but did not verify
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Upstream identity provider failure or timeout
    #[error("identity provider error: {0}")]
    Provider(String),

    /// Access Guard denial for a protected route
    #[error("unauthorized")]
    Unauthorized,

    /// Unknown route, strategy, or file reference
    #[error("not found: {0}")]
    NotFound(String),

    /// Upload or download I/O failure
    #[error("storage failure during {context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Upload exceeds the configured size cap
    #[error("upload exceeds size limit")]
    TooLarge,

    /// Malformed body or a request shape the pipeline rejects outright
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Catch-all for failures that should never reach the client verbatim
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn missing_credentials(message: impl Into<String>) -> Self {
        Self::MissingCredentials(message.into())
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn storage(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingCredentials(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Provider(_) => StatusCode::BAD_GATEWAY,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the client
    ///
    /// Storage and internal variants carry I/O detail (paths, error kinds)
    /// that must stay server-side.
    pub fn client_message(&self) -> String {
        match self {
            Self::Storage { .. } => "file storage failed".to_string(),
            Self::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            GatewayError::missing_credentials("no password").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GatewayError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GatewayError::provider("timeout").status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            GatewayError::not_found("no such route").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(GatewayError::TooLarge.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_storage_detail_not_exposed() {
        let err = GatewayError::storage(
            "writing /var/uploads/file-1.part",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.client_message(), "file storage failed");
        // the full chain stays available for logging
        assert!(err.to_string().contains("/var/uploads"));
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let err = GatewayError::internal("strategy registry misconfigured");
        assert_eq!(err.client_message(), "internal server error");
    }
}
