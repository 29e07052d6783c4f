//! Shared library for cross-cutting concerns in auth-platform Rust services.
//!
//! This crate provides centralized implementations for:
//! - Platform error types shared by services
//! - `tracing` subscriber setup (plain or JSON output)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod tracing_config;

pub use error::PlatformError;
pub use tracing_config::{init_tracing, TracingConfig};
