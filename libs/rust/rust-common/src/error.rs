//! Centralized error types for all Rust libraries.
//!
//! This module provides a unified error type that can be used across all
//! auth-platform Rust services, classified by whether the caller or the
//! platform is at fault.

use thiserror::Error;

/// Common error type for platform operations.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The global tracing subscriber could not be installed
    #[error("Tracing initialization failed: {0}")]
    TracingInit(String),
}

impl PlatformError {
    /// Check if this error was caused by the caller's input.
    ///
    /// Client errors map to 4xx responses; everything else is the platform's
    /// fault and maps to 5xx.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_common::PlatformError;
    ///
    /// let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    /// assert!(PlatformError::from(json).is_client_error());
    ///
    /// let err = PlatformError::TracingInit("already set".to_string());
    /// assert!(!err.is_client_error());
    /// ```
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Serialization(_))
    }
}
