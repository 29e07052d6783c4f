//! Observability Module
//!
//! Structured decision logging, injected into the classifier and dispatcher.

pub mod logging;

pub use logging::{
    init_logging, AuthEdgeLogger, DispatchEvent, DispatchLog, NoopLog, QuerySkip, RefererSkip,
};
