//! Unit Tests
//!
//! Organized by domain. Each submodule focuses on one component:
//! - cookies: cookie header parsing and Set-Cookie rendering
//! - extractor: referer, query string and destination extraction
//! - responses: reject and redirect responses
//! - routing: the five-branch classification, example by example
//! - errors: error codes and sanitization

mod cookies;
