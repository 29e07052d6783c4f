//! Request context extraction.
//!
//! Pulls out of a viewer request the three things classification needs: a
//! code-bearing referer, a code/state pair in the query string, and the
//! normalized final destination.

use std::fmt;

use url::{form_urlencoded, Url};

use crate::edge::ViewerRequest;
use crate::observability::{DispatchEvent, DispatchLog, QuerySkip, RefererSkip};
use crate::routing::matchers::{CodePageMatcher, RouteMatchers};

/// URL the viewer is ultimately trying to reach.
///
/// `origin + path + ("?" + query)`, except that the code-handling page never
/// keeps its query: the page is the same page whatever code it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalDestination {
    uri: String,
    path_start: usize,
    path_end: usize,
}

impl FinalDestination {
    /// Builds the destination for a request to `path?querystring` on `origin`.
    #[must_use]
    pub fn compute(
        origin: &str,
        path: &str,
        querystring: &str,
        code_page: &CodePageMatcher,
    ) -> Self {
        let mut uri = String::with_capacity(origin.len() + path.len() + querystring.len() + 1);
        uri.push_str(origin);
        uri.push_str(path);
        let path_end = uri.len();
        if !querystring.is_empty() && !code_page.matches(path) {
            uri.push('?');
            uri.push_str(querystring);
        }
        Self {
            uri,
            path_start: origin.len(),
            path_end,
        }
    }

    /// Full destination URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// Path component.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.uri[self.path_start..self.path_end]
    }

    /// Query component, when kept.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.uri.get(self.path_end + 1..).filter(|q| !q.is_empty())
    }
}

impl fmt::Display for FinalDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

/// A referer carrying an authorization code.
///
/// Only its presence matters; the code in it is never exchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefererCode {
    /// Raw referer URL
    pub url: String,
}

/// Code and state returned by the identity provider in the query string.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationCode {
    /// Single-use authorization code
    pub code: String,
    /// Opaque state echoed by the identity provider
    pub state: String,
}

impl fmt::Debug for AuthorizationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationCode")
            .field("code", &"[REDACTED]")
            .field("state", &self.state)
            .finish()
    }
}

/// Reads the routing-relevant parts of a request.
pub struct ContextExtractor<'a> {
    matchers: &'a RouteMatchers,
    log: &'a dyn DispatchLog,
}

impl<'a> ContextExtractor<'a> {
    /// Creates an extractor over `matchers`, reporting to `log`.
    pub fn new(matchers: &'a RouteMatchers, log: &'a dyn DispatchLog) -> Self {
        Self { matchers, log }
    }

    /// The first `Referer` header, when it carries a `code` parameter and is
    /// not a redirect from the excluded identity source.
    #[must_use]
    pub fn get_referer(&self, request: &ViewerRequest) -> Option<RefererCode> {
        let raw = request.first_header("referer")?.trim();
        if raw.is_empty() {
            return None;
        }

        let Ok(url) = Url::parse(raw) else {
            self.referer_ignored(raw, RefererSkip::Unparseable);
            return None;
        };
        if self.matchers.excluded_source.matches(&url) {
            self.referer_ignored(raw, RefererSkip::ExcludedSource);
            return None;
        }
        let has_code = url
            .query_pairs()
            .find(|(key, _)| key == "code")
            .is_some_and(|(_, value)| !value.is_empty());
        if !has_code {
            self.referer_ignored(raw, RefererSkip::NoCode);
            return None;
        }

        Some(RefererCode {
            url: raw.to_string(),
        })
    }

    /// Final destination of `request` on `origin`.
    #[must_use]
    pub fn compute_final_destination(
        &self,
        origin: &str,
        request: &ViewerRequest,
    ) -> FinalDestination {
        FinalDestination::compute(
            origin,
            &request.uri,
            &request.querystring,
            &self.matchers.code_page,
        )
    }

    /// The request's own `code` and `state`, when both are present and
    /// non-empty, the referer is not the excluded identity source and the
    /// destination is not a bypass asset.
    #[must_use]
    pub fn parse_query_string(
        &self,
        request: &ViewerRequest,
        destination: &FinalDestination,
    ) -> Option<AuthorizationCode> {
        if request.querystring.is_empty() {
            return None;
        }

        let referer = request
            .referer_url
            .as_deref()
            .or_else(|| request.first_header("referer"));
        if referer.is_some_and(|r| self.matchers.excluded_source.matches_str(r.trim())) {
            self.query_ignored(QuerySkip::ExcludedSource);
            return None;
        }
        if self.matchers.asset_bypass.matches(destination.path()) {
            self.query_ignored(QuerySkip::BypassAsset);
            return None;
        }

        let mut code = None;
        let mut state = None;
        for (key, value) in form_urlencoded::parse(request.querystring.as_bytes()) {
            match &*key {
                "code" if code.is_none() => code = Some(value.into_owned()),
                "state" if state.is_none() => state = Some(value.into_owned()),
                _ => {}
            }
        }

        match (code, state) {
            (Some(code), Some(state)) if !code.is_empty() && !state.is_empty() => {
                Some(AuthorizationCode { code, state })
            }
            _ => {
                self.query_ignored(QuerySkip::MissingCodeOrState);
                None
            }
        }
    }

    fn referer_ignored(&self, referer: &str, reason: RefererSkip) {
        self.log
            .record(&DispatchEvent::RefererIgnored { referer, reason });
    }

    fn query_ignored(&self, reason: QuerySkip) {
        self.log.record(&DispatchEvent::QueryCodeIgnored { reason });
    }
}
