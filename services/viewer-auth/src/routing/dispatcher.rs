//! Priority-ordered request classification and delegation.
//!
//! Branches are checked in this order and the first match is final:
//!
//! 1. the referer carries an authorization code: reject with 401,
//! 2. the query string carries `code` and `state` (never for bypass assets):
//!    exchange the code,
//! 3. the session cookie is present and non-empty: validate it,
//! 4. the destination is a bypass asset: pass the request through,
//! 5. otherwise: redirect to login.
//!
//! The referer check must come first. One navigation can carry both a stale
//! code in its referer and a fresh code in its query string; an authorization
//! code is single-use, so exchanging here would race the referer page's own
//! exchange of the same code.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::config::DEFAULT_SESSION_COOKIE;
use crate::edge::response::escape_html;
use crate::edge::{CookieJar, EdgeResponse, HandlerOutput, ViewerRequest, ViewerRequestEvent};
use crate::error::AuthEdgeError;
use crate::observability::logging::strip_query;
use crate::observability::{DispatchEvent, DispatchLog};
use crate::routing::context::{AuthorizationCode, ContextExtractor};
use crate::routing::matchers::RouteMatchers;

/// Reserved names and matchers used by classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingSettings {
    /// Cookie carrying the identity session token
    pub session_cookie_name: String,
    /// Path matchers
    pub matchers: RouteMatchers,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            session_cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            matchers: RouteMatchers::default(),
        }
    }
}

/// The five outcomes, without their payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// Replayed authorization code
    Reject,
    /// Code exchange
    ExchangeCode,
    /// Session cookie validation
    ValidateSession,
    /// Bypass asset
    PassThrough,
    /// No identity at all
    RedirectToLogin,
}

impl RouteKind {
    /// Stable label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::ExchangeCode => "exchange_code",
            Self::ValidateSession => "validate_session",
            Self::PassThrough => "pass_through",
            Self::RedirectToLogin => "redirect_to_login",
        }
    }
}

/// Session token read from the session cookie.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// The raw token.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

/// Outcome of classification. Serializes without codes or tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    /// Refuse the request with a 401 page
    Reject {
        /// HTML-safe explanation shown to the viewer
        message: String,
    },
    /// Hand the query-string code to code exchange
    ExchangeCode {
        /// Code and state
        #[serde(skip)]
        authorization: AuthorizationCode,
        /// `https://host`
        origin: String,
    },
    /// Hand the session cookie to session validation
    ValidateSession {
        /// Cookie value
        #[serde(skip)]
        token: SessionToken,
        /// `https://host`
        origin: String,
        /// Normalized destination
        #[serde(rename = "finalDestination")]
        final_destination: String,
    },
    /// Let the request continue untouched
    PassThrough,
    /// Send the viewer to the identity provider
    RedirectToLogin {
        /// `https://host`
        origin: String,
        /// Normalized destination
        #[serde(rename = "finalDestination")]
        final_destination: String,
    },
}

impl Route {
    /// The route without its payload.
    #[must_use]
    pub const fn kind(&self) -> RouteKind {
        match self {
            Self::Reject { .. } => RouteKind::Reject,
            Self::ExchangeCode { .. } => RouteKind::ExchangeCode,
            Self::ValidateSession { .. } => RouteKind::ValidateSession,
            Self::PassThrough => RouteKind::PassThrough,
            Self::RedirectToLogin { .. } => RouteKind::RedirectToLogin,
        }
    }
}

/// A classified request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Selected route
    pub route: Route,
    /// Cookies the viewer sent
    pub cookies: CookieJar,
}

/// Pure classifier: no I/O, no state kept between calls.
pub struct Classifier<'a> {
    settings: &'a RoutingSettings,
    log: &'a dyn DispatchLog,
}

impl<'a> Classifier<'a> {
    /// Creates a classifier.
    pub fn new(settings: &'a RoutingSettings, log: &'a dyn DispatchLog) -> Self {
        Self { settings, log }
    }

    /// Picks the route for `request`.
    ///
    /// # Errors
    ///
    /// [`AuthEdgeError::MissingHeader`] when a route needs the origin and the
    /// request has no `host` header. A replayed code is rejected without
    /// looking at the host.
    pub fn classify(&self, request: &ViewerRequest) -> Result<Classification, AuthEdgeError> {
        let extractor = ContextExtractor::new(&self.settings.matchers, self.log);
        let cookies = CookieJar::parse(request.header_values("cookie"));

        if let Some(referer) = extractor.get_referer(request) {
            let route = Route::Reject {
                message: replay_message(&referer.url),
            };
            self.selected(&route, &request.uri);
            return Ok(Classification { route, cookies });
        }

        let origin = request.origin()?;
        let destination = extractor.compute_final_destination(&origin, request);

        let route = if let Some(authorization) = extractor.parse_query_string(request, &destination)
        {
            Route::ExchangeCode {
                authorization,
                origin,
            }
        } else if let Some(token) = cookies.non_empty(&self.settings.session_cookie_name) {
            Route::ValidateSession {
                token: SessionToken(token.to_string()),
                origin,
                final_destination: destination.to_string(),
            }
        } else if self.settings.matchers.asset_bypass.matches(destination.path()) {
            Route::PassThrough
        } else {
            Route::RedirectToLogin {
                origin,
                final_destination: destination.to_string(),
            }
        };

        self.selected(&route, destination.as_str());
        Ok(Classification { route, cookies })
    }

    fn selected(&self, route: &Route, final_destination: &str) {
        self.log.record(&DispatchEvent::RouteSelected {
            route: route.kind(),
            final_destination,
        });
    }
}

/// Explanation shown when a referer already carries a code. The referer's
/// query (the code) is left out.
fn replay_message(referer: &str) -> String {
    format!(
        "The referer {} had an authorization code, but that code is not exchanged here: \
         an authorization code can be exchanged only once, and the original request to \
         the referer must be the one that exchanges it.",
        escape_html(strip_query(referer))
    )
}

/// Flows the authenticator delegates to.
///
/// Implementations own their network calls, retries and timeouts; their
/// output is returned to the runtime unchanged.
#[async_trait]
pub trait AuthFlows: Send + Sync {
    /// Exchanges an authorization code for a session.
    async fn exchange_authorization_code(
        &self,
        code: &str,
        state: &str,
        cookies: &CookieJar,
        origin: &str,
    ) -> HandlerOutput;

    /// Validates a session token; passes `request` through when it is valid.
    async fn validate_session_cookie(
        &self,
        token: &str,
        origin: &str,
        final_destination: &str,
        request: &ViewerRequest,
    ) -> HandlerOutput;

    /// Redirects the viewer to the identity provider's login page.
    async fn redirect_to_login(&self, origin: &str, final_destination: &str) -> HandlerOutput;
}

#[async_trait]
impl<T: AuthFlows + ?Sized> AuthFlows for Arc<T> {
    async fn exchange_authorization_code(
        &self,
        code: &str,
        state: &str,
        cookies: &CookieJar,
        origin: &str,
    ) -> HandlerOutput {
        (**self)
            .exchange_authorization_code(code, state, cookies, origin)
            .await
    }

    async fn validate_session_cookie(
        &self,
        token: &str,
        origin: &str,
        final_destination: &str,
        request: &ViewerRequest,
    ) -> HandlerOutput {
        (**self)
            .validate_session_cookie(token, origin, final_destination, request)
            .await
    }

    async fn redirect_to_login(&self, origin: &str, final_destination: &str) -> HandlerOutput {
        (**self).redirect_to_login(origin, final_destination).await
    }
}

/// Classifies requests and runs the selected route.
pub struct Dispatcher<F, L> {
    settings: RoutingSettings,
    flows: F,
    log: L,
}

impl<F, L> Dispatcher<F, L>
where
    F: AuthFlows,
    L: DispatchLog,
{
    /// Creates a dispatcher.
    pub const fn new(settings: RoutingSettings, flows: F, log: L) -> Self {
        Self {
            settings,
            flows,
            log,
        }
    }

    /// A classifier sharing this dispatcher's settings and log.
    #[must_use]
    pub fn classifier(&self) -> Classifier<'_> {
        Classifier::new(&self.settings, &self.log)
    }

    /// Classifies `request` and runs its route.
    ///
    /// # Errors
    ///
    /// Propagates classification errors; collaborator output is never an error.
    pub async fn dispatch(&self, request: ViewerRequest) -> Result<HandlerOutput, AuthEdgeError> {
        let Classification { route, cookies } = self.classifier().classify(&request)?;
        let kind = route.kind();

        let output = match route {
            Route::Reject { message } => return Ok(EdgeResponse::reject(&message).into()),
            Route::PassThrough => return Ok(HandlerOutput::PassThrough(request)),
            Route::ExchangeCode {
                authorization,
                origin,
            } => {
                self.flows
                    .exchange_authorization_code(
                        &authorization.code,
                        &authorization.state,
                        &cookies,
                        &origin,
                    )
                    .await
            }
            Route::ValidateSession {
                token,
                origin,
                final_destination,
            } => {
                self.flows
                    .validate_session_cookie(token.expose(), &origin, &final_destination, &request)
                    .await
            }
            Route::RedirectToLogin {
                origin,
                final_destination,
            } => self.flows.redirect_to_login(&origin, &final_destination).await,
        };

        self.log.record(&DispatchEvent::Delegated {
            route: kind,
            pass_through: output.is_pass_through(),
        });
        Ok(output)
    }

    /// Like [`Dispatcher::dispatch`], but failures become a sanitized error
    /// page carrying a correlation id.
    pub async fn handle(&self, request: ViewerRequest) -> HandlerOutput {
        let correlation_id = Uuid::new_v4();
        let span = info_span!(
            "viewer_request",
            correlation_id = %correlation_id,
            uri = %request.uri
        );

        async move {
            match self.dispatch(request).await {
                Ok(output) => output,
                Err(error) => self.fail(&error, correlation_id),
            }
        }
        .instrument(span)
        .await
    }

    /// Handles a whole viewer-request event.
    pub async fn handle_event(&self, event: ViewerRequestEvent) -> HandlerOutput {
        match event.into_request() {
            Ok(request) => self.handle(request).await,
            Err(error) => self.fail(&error, Uuid::new_v4()),
        }
    }

    fn fail(&self, error: &AuthEdgeError, correlation_id: Uuid) -> HandlerOutput {
        self.log.record(&DispatchEvent::Failed {
            error,
            correlation_id,
        });
        HandlerOutput::Response(error.to_edge_response(correlation_id))
    }
}
