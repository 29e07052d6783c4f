//! Structured logging for routing decisions.
//!
//! The classifier reports what it saw through [`DispatchLog`] and never reads
//! anything back, so logging cannot change a decision. Authorization codes,
//! session tokens and referer query strings are never written out.

use std::sync::Arc;

use rust_common::init_tracing;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AuthEdgeError;
use crate::routing::RouteKind;

/// Why a referer was not treated as carrying a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefererSkip {
    /// Not an absolute URL
    Unparseable,
    /// Came from the alternate identity provider
    ExcludedSource,
    /// No non-empty `code` parameter
    NoCode,
}

impl RefererSkip {
    /// Stable label for log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unparseable => "unparseable",
            Self::ExcludedSource => "excluded_source",
            Self::NoCode => "no_code",
        }
    }
}

/// Why a query string was not treated as carrying a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySkip {
    /// Referer is the alternate identity provider
    ExcludedSource,
    /// Destination is a bypass asset
    BypassAsset,
    /// `code` or `state` missing or empty
    MissingCodeOrState,
}

impl QuerySkip {
    /// Stable label for log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExcludedSource => "excluded_source",
            Self::BypassAsset => "bypass_asset",
            Self::MissingCodeOrState => "missing_code_or_state",
        }
    }
}

/// Something worth recording while a request is routed.
#[derive(Debug)]
pub enum DispatchEvent<'a> {
    /// A referer header was present but is not actionable
    RefererIgnored {
        /// Raw referer
        referer: &'a str,
        /// Reason
        reason: RefererSkip,
    },
    /// A query string was present but carries no usable code
    QueryCodeIgnored {
        /// Reason
        reason: QuerySkip,
    },
    /// Classification finished
    RouteSelected {
        /// Chosen route
        route: RouteKind,
        /// Normalized destination
        final_destination: &'a str,
    },
    /// A collaborator produced the final output
    Delegated {
        /// Route that was delegated
        route: RouteKind,
        /// Whether the collaborator let the request through
        pass_through: bool,
    },
    /// The request could not be routed
    Failed {
        /// The error
        error: &'a AuthEdgeError,
        /// Correlation ID returned to the viewer
        correlation_id: Uuid,
    },
}

/// Sink for [`DispatchEvent`]s.
pub trait DispatchLog: Send + Sync {
    /// Records one event.
    fn record(&self, event: &DispatchEvent<'_>);
}

impl<T: DispatchLog + ?Sized> DispatchLog for &T {
    fn record(&self, event: &DispatchEvent<'_>) {
        (**self).record(event);
    }
}

impl<T: DispatchLog + ?Sized> DispatchLog for Arc<T> {
    fn record(&self, event: &DispatchEvent<'_>) {
        (**self).record(event);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLog;

impl DispatchLog for NoopLog {
    fn record(&self, _event: &DispatchEvent<'_>) {}
}

/// Writes events as `tracing` records under the `viewer_auth` target.
#[derive(Debug, Clone)]
pub struct AuthEdgeLogger {
    service: String,
}

impl AuthEdgeLogger {
    /// Creates a logger tagging records with `service`.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }
}

impl Default for AuthEdgeLogger {
    fn default() -> Self {
        Self::new("viewer-auth")
    }
}

impl DispatchLog for AuthEdgeLogger {
    fn record(&self, event: &DispatchEvent<'_>) {
        match event {
            DispatchEvent::RefererIgnored { referer, reason } => debug!(
                target: "viewer_auth",
                service = %self.service,
                referer = %strip_query(referer),
                reason = reason.as_str(),
                "Referer carries no actionable code"
            ),
            DispatchEvent::QueryCodeIgnored { reason } => debug!(
                target: "viewer_auth",
                service = %self.service,
                reason = reason.as_str(),
                "Query string carries no usable code"
            ),
            DispatchEvent::RouteSelected {
                route,
                final_destination,
            } => {
                if *route == RouteKind::Reject {
                    warn!(
                        target: "viewer_auth",
                        service = %self.service,
                        route = route.as_str(),
                        final_destination = %strip_query(final_destination),
                        "Rejecting request: referer already carries an authorization code"
                    );
                } else {
                    info!(
                        target: "viewer_auth",
                        service = %self.service,
                        route = route.as_str(),
                        final_destination = %strip_query(final_destination),
                        "Route selected"
                    );
                }
            }
            DispatchEvent::Delegated {
                route,
                pass_through,
            } => debug!(
                target: "viewer_auth",
                service = %self.service,
                route = route.as_str(),
                pass_through = *pass_through,
                "Collaborator completed"
            ),
            DispatchEvent::Failed {
                error,
                correlation_id,
            } => error!(
                target: "viewer_auth",
                service = %self.service,
                correlation_id = %correlation_id,
                error_code = error.code().as_str(),
                error = %error,
                "Request could not be routed"
            ),
        }
    }
}

/// Installs the global `tracing` subscriber for `config`.
///
/// # Errors
///
/// [`AuthEdgeError::Platform`] when the log filter is invalid or a subscriber
/// is already installed.
pub fn init_logging(config: &Config) -> Result<(), AuthEdgeError> {
    init_tracing(&config.tracing_config())?;
    Ok(())
}

/// `url` without its query string or fragment.
#[must_use]
pub fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}
