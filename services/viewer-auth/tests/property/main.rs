//! Property-Based Tests
//!
//! Uses proptest for invariant verification.
//! Each test runs minimum 100 iterations.
//!
//! Test categories:
//! - routing: branch priority of the classifier
//! - cookies: parse/encode equivalence
//! - matchers: matcher behaviour on generated paths

mod cookies;
mod generators;
mod matchers;
mod routing;
