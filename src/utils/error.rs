//! Error handling for the gateway
//!
//! All admission failures collapse to a small set of wire-visible responses.
//! Authentication failures in particular render as a single opaque 401 body
//! regardless of root cause, so a caller cannot probe which check rejected it.

use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Result type alias for the gateway
pub type Result<T> = std::result::Result<T, GateError>;

/// Main error type for the gateway
#[derive(Error, Debug)]
pub enum GateError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Redis errors
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Rate limit rejection (expected traffic shedding, never logged as error)
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Token could not be parsed as a JWT at all
    #[error("Malformed token")]
    MalformedToken,

    /// Token parsed but its signature does not verify
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token verified but its expiry has passed
    #[error("Expired token")]
    ExpiredToken,

    /// Session store unreachable or timed out; treated as not-live upstream
    #[error("Session store unavailable: {0}")]
    SessionStoreUnavailable(String),

    /// Request lacks a live identity for a protected endpoint
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated identity lacks the required role
    #[error("Access denied")]
    Forbidden,

    /// Subject already exists (duplicate registration)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Credential hashing/verification errors
    #[error("Credential error: {0}")]
    Credential(String),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl GateError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict(message.into())
    }

    pub fn credential<S: Into<String>>(message: S) -> Self {
        Self::Credential(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    pub fn store_unavailable<S: Into<String>>(message: S) -> Self {
        Self::SessionStoreUnavailable(message.into())
    }

    /// Whether this error originated from a failed authentication check.
    ///
    /// These all render identically on the wire.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            GateError::MalformedToken
                | GateError::InvalidSignature
                | GateError::ExpiredToken
                | GateError::SessionStoreUnavailable(_)
                | GateError::Unauthorized
        )
    }
}

/// Wire-format error body: `{"error": "..."}`
#[derive(serde::Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

impl ResponseError for GateError {
    fn error_response(&self) -> HttpResponse {
        let (status, message) = match self {
            GateError::RateLimitExceeded => (
                actix_web::http::StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded. Please try again later.",
            ),
            // All authentication failures collapse to one opaque signal
            GateError::MalformedToken
            | GateError::InvalidSignature
            | GateError::ExpiredToken
            | GateError::SessionStoreUnavailable(_)
            | GateError::Unauthorized => {
                (actix_web::http::StatusCode::UNAUTHORIZED, "Unauthorized")
            }
            GateError::Forbidden => (actix_web::http::StatusCode::FORBIDDEN, "Access Denied"),
            GateError::Conflict(_) => (actix_web::http::StatusCode::CONFLICT, "Conflict"),
            GateError::Config(_)
            | GateError::Io(_)
            | GateError::Serialization(_)
            | GateError::Redis(_)
            | GateError::Credential(_)
            | GateError::Internal(_) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ),
        };

        HttpResponse::build(status).json(ErrorBody::new(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_rate_limit_response() {
        let resp = GateError::RateLimitExceeded.error_response();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_auth_failures_collapse_to_unauthorized() {
        for err in [
            GateError::MalformedToken,
            GateError::InvalidSignature,
            GateError::ExpiredToken,
            GateError::store_unavailable("timeout"),
            GateError::Unauthorized,
        ] {
            assert!(err.is_auth_failure());
            assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_forbidden_response() {
        let resp = GateError::Forbidden.error_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_conflict_response() {
        let resp = GateError::conflict("email exists").error_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }
}
