//! Viewer Auth - request authenticator for CDN edge nodes.
//!
//! Every viewer request reaching the edge is classified, before it touches an
//! origin, into exactly one of five outcomes:
//!
//! 1. reject (401) when the referer already carries an authorization code,
//! 2. exchange the authorization code carried in the query string,
//! 3. validate the session cookie,
//! 4. pass bypass assets (favicons) through untouched,
//! 5. redirect to the identity provider's login page.
//!
//! Classification is a pure function of the request ([`routing::Classifier`]).
//! Code exchange, session validation and login construction are delegated to
//! an [`routing::AuthFlows`] implementation supplied by the caller.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod edge;
pub mod error;
pub mod observability;
pub mod routing;

pub use config::{Config, ConfigError};
pub use edge::{
    CookieJar, EdgeResponse, HandlerOutput, SetCookieDirective, ViewerRequest, ViewerRequestEvent,
};
pub use error::{AuthEdgeError, ErrorCode, ErrorResponse};
pub use observability::{AuthEdgeLogger, DispatchEvent, DispatchLog, NoopLog};
pub use routing::{AuthFlows, Classification, Classifier, Dispatcher, Route, RoutingSettings};
