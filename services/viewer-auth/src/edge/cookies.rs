//! Cookie codec: `Cookie` request header in, `Set-Cookie` response values out.
//!
//! Values are carried byte-for-byte. Nothing is percent-decoded on the way in
//! or encoded on the way out.

use std::collections::HashMap;
use std::fmt;

use cookie::Cookie;
use time::{Duration, OffsetDateTime};

use crate::edge::request::HeaderEntry;

pub use cookie::SameSite;

/// Cookies sent by the viewer, keyed by name.
///
/// When a name repeats, the first occurrence wins: browsers send the cookie
/// with the most specific path first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    entries: HashMap<String, String>,
}

impl CookieJar {
    /// Parses every value of a `Cookie` header.
    ///
    /// Pairs are separated by `;` and split on the first `=`. Pairs without
    /// `=` or with an empty name are skipped.
    pub fn parse<'a, I>(header_values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        header_values
            .into_iter()
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
            .collect()
    }

    /// Value of the named cookie.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Value of the named cookie, treating an empty value as absent.
    #[must_use]
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|value| !value.is_empty())
    }

    /// True when the named cookie was sent.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of distinct cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no cookies were sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name/value pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CookieJar {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut jar = Self::default();
        for (name, value) in iter {
            jar.entries.entry(name.into()).or_insert_with(|| value.into());
        }
        jar
    }
}

/// A cookie the response asks the browser to store.
///
/// Thin builder over [`cookie::Cookie`]; rendering is the crate's
/// `Set-Cookie` serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct SetCookieDirective {
    cookie: Cookie<'static>,
}

impl SetCookieDirective {
    /// A session cookie with no attributes.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            cookie: Cookie::new(name.into(), value.into()),
        }
    }

    /// Cookie name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.cookie.name()
    }

    /// Cookie value.
    #[must_use]
    pub fn value(&self) -> &str {
        self.cookie.value()
    }

    /// The underlying cookie.
    #[must_use]
    pub const fn as_cookie(&self) -> &Cookie<'static> {
        &self.cookie
    }

    /// Sets `Path`.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.cookie.set_path(path.into());
        self
    }

    /// Sets `Domain`.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.cookie.set_domain(domain.into());
        self
    }

    /// Sets `Expires`.
    #[must_use]
    pub fn with_expires(mut self, expires: OffsetDateTime) -> Self {
        self.cookie.set_expires(expires);
        self
    }

    /// Sets `Max-Age`.
    #[must_use]
    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.cookie.set_max_age(Duration::seconds(seconds));
        self
    }

    /// Adds `Secure`.
    #[must_use]
    pub fn secure(mut self) -> Self {
        self.cookie.set_secure(true);
        self
    }

    /// Adds `HttpOnly`.
    #[must_use]
    pub fn http_only(mut self) -> Self {
        self.cookie.set_http_only(true);
        self
    }

    /// Sets `SameSite`.
    #[must_use]
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.cookie.set_same_site(same_site);
        self
    }
}

impl From<Cookie<'static>> for SetCookieDirective {
    fn from(cookie: Cookie<'static>) -> Self {
        Self { cookie }
    }
}

impl fmt::Display for SetCookieDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.cookie, f)
    }
}

/// Renders one `Set-Cookie` header value per directive.
///
/// An empty slice yields an empty vector; callers must then omit the header.
#[must_use]
pub fn encode(directives: &[SetCookieDirective]) -> Vec<HeaderEntry> {
    directives
        .iter()
        .map(|directive| HeaderEntry::keyed("Set-Cookie", directive.to_string()))
        .collect()
}
