//! Error handling module with type-safe, non-exhaustive error types
//!
//! Expected request conditions (a replayed code, a missing cookie, a bypass
//! asset) are routes, not errors. The variants here cover what is left: an
//! event the edge runtime should never have produced, bad configuration and
//! infrastructure failures. Each one still turns into an HTTP response via
//! [`ErrorResponse`], with sensitive details scrubbed.

use rust_common::PlatformError;
use thiserror::Error;
use uuid::Uuid;

use crate::config::ConfigError;
use crate::edge::EdgeResponse;

/// Sensitive patterns that should be sanitized from error messages
const SENSITIVE_PATTERNS: &[&str] = &[
    "password",
    "secret",
    "token",
    "cookie",
    "credential",
    "bearer",
    "authorization",
    "private",
];

/// Non-exhaustive error enum for forward compatibility
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AuthEdgeError {
    /// A header the authenticator cannot work without is absent or empty
    #[error("Required header missing: {name}")]
    MissingHeader {
        /// Lower-case header name
        name: &'static str,
    },

    /// The edge event does not have the expected shape
    #[error("Malformed edge event: {reason}")]
    MalformedEvent {
        /// Description of the problem
        reason: String,
    },

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Shared platform failure (serialization, tracing setup)
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// Internal error (details sanitized in responses)
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Error codes for edge responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// A required request header was missing
    MissingHeader,
    /// The event could not be understood
    MalformedEvent,
    /// Configuration is invalid
    ConfigInvalid,
    /// Anything else
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingHeader => "EDGE_MISSING_HEADER",
            Self::MalformedEvent => "EDGE_MALFORMED_EVENT",
            Self::ConfigInvalid => "CONFIG_INVALID",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::MissingHeader | Self::MalformedEvent => 400,
            Self::ConfigInvalid | Self::Internal => 500,
        }
    }
}

/// Structured error response with correlation ID
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message (sanitized)
    pub message: String,
    /// Correlation ID for tracing
    pub correlation_id: Uuid,
}

impl ErrorResponse {
    /// Create a new error response from an `AuthEdgeError`
    #[must_use]
    pub fn from_error(error: &AuthEdgeError, correlation_id: Uuid) -> Self {
        let message = match error {
            AuthEdgeError::MissingHeader { name } => format!("The request has no {name} header"),
            AuthEdgeError::MalformedEvent { reason } => sanitize_message(reason),
            AuthEdgeError::Config(_) => "Authenticator is misconfigured".to_string(),
            AuthEdgeError::Platform(err) if err.is_client_error() => {
                "The request could not be decoded".to_string()
            }
            // Never expose internal error details
            AuthEdgeError::Platform(_) | AuthEdgeError::Internal(_) => {
                "Internal error".to_string()
            }
        };

        Self {
            code: error.code(),
            message,
            correlation_id,
        }
    }

    /// Convert to an edge response the runtime can return to the viewer
    #[must_use]
    pub fn to_edge_response(&self) -> EdgeResponse {
        let message = format!(
            "{} [{}, correlation_id: {}]",
            self.message,
            self.code.as_str(),
            self.correlation_id
        );
        EdgeResponse::failure(self.code.http_status(), &message)
    }
}

impl AuthEdgeError {
    /// Get the error code for this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MissingHeader { .. } => ErrorCode::MissingHeader,
            Self::MalformedEvent { .. } => ErrorCode::MalformedEvent,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::Platform(err) if err.is_client_error() => ErrorCode::MalformedEvent,
            Self::Platform(_) | Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Build the sanitized edge response for this error
    #[must_use]
    pub fn to_edge_response(&self, correlation_id: Uuid) -> EdgeResponse {
        ErrorResponse::from_error(self, correlation_id).to_edge_response()
    }

    /// Shorthand for a [`AuthEdgeError::MalformedEvent`]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEvent {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for AuthEdgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Platform(PlatformError::Serialization(err))
    }
}

/// Sanitize a message by removing sensitive information
fn sanitize_message(message: &str) -> String {
    if contains_sensitive_info(message) {
        return "Invalid request".to_string();
    }
    message.to_string()
}

/// Check if a string contains sensitive information
#[must_use]
pub fn contains_sensitive_info(text: &str) -> bool {
    let lower = text.to_lowercase();
    SENSITIVE_PATTERNS.iter().any(|p| lower.contains(p))
}
