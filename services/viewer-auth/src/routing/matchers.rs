//! Named path matchers.
//!
//! Each matcher is plain data plus a pure `matches` function, so the same
//! input always gives the same answer no matter how often it is asked.

use url::Url;

/// Recognizes the page that finishes a login by exchanging its code.
///
/// The destination of that page is identified by path alone; its query string
/// (the code) is dropped from the final destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodePageMatcher {
    fragment: String,
}

impl CodePageMatcher {
    /// Matches paths containing `fragment`.
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
        }
    }

    /// True when `path` is the code-handling page.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        path.contains(&self.fragment)
    }
}

/// Recognizes referers from the alternate identity provider.
///
/// That provider issues codes this site never exchanges, so a code on such a
/// referer is neither a replay nor something to hand to code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludedSourceMatcher {
    path_suffix: String,
}

impl ExcludedSourceMatcher {
    /// Matches URLs whose path ends with `path_suffix` and carry a `code`.
    pub fn new(path_suffix: impl Into<String>) -> Self {
        Self {
            path_suffix: path_suffix.into(),
        }
    }

    /// True when `url` is a code-bearing redirect from the excluded source.
    #[must_use]
    pub fn matches(&self, url: &Url) -> bool {
        url.path().ends_with(&self.path_suffix) && url.query_pairs().any(|(key, _)| key == "code")
    }

    /// Same as [`ExcludedSourceMatcher::matches`] for a raw string. Text that
    /// is not an absolute URL never matches.
    #[must_use]
    pub fn matches_str(&self, raw: &str) -> bool {
        Url::parse(raw).is_ok_and(|url| self.matches(&url))
    }
}

/// Recognizes public icon assets that are served without authentication.
///
/// A path matches when its final segment sits directly in the asset
/// directory (at any depth), starts with the prefix, and the path ends with one of the suffixes
/// (case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetBypassMatcher {
    directory: String,
    prefix: String,
    suffixes: Vec<String>,
}

impl AssetBypassMatcher {
    /// Creates a matcher for `<directory><prefix>*<suffix>`.
    pub fn new<I, S>(directory: &str, prefix: &str, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut directory = directory.to_string();
        if !directory.starts_with('/') {
            directory.insert(0, '/');
        }
        if !directory.ends_with('/') {
            directory.push('/');
        }
        Self {
            directory,
            prefix: prefix.to_string(),
            suffixes: suffixes
                .into_iter()
                .map(|s| s.into().to_ascii_lowercase())
                .collect(),
        }
    }

    /// True when `path` is a bypass asset.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let Some(slash) = path.rfind('/') else {
            return false;
        };
        let (parent, file) = path.split_at(slash + 1);
        if !parent.ends_with(self.directory.as_str()) || !file.starts_with(&self.prefix) {
            return false;
        }
        let lower = file.to_ascii_lowercase();
        self.suffixes
            .iter()
            .any(|suffix| lower.len() > suffix.len() && lower.ends_with(suffix.as_str()))
    }
}

/// The full matcher table used by classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatchers {
    /// Code-handling page
    pub code_page: CodePageMatcher,
    /// Alternate identity provider referers
    pub excluded_source: ExcludedSourceMatcher,
    /// Public icon assets
    pub asset_bypass: AssetBypassMatcher,
}

impl Default for RouteMatchers {
    fn default() -> Self {
        Self {
            code_page: CodePageMatcher::new("handleCode"),
            excluded_source: ExcludedSourceMatcher::new("/open-athens-redirect"),
            asset_bypass: AssetBypassMatcher::new("/favicons/", "favicon", [".png"]),
        }
    }
}
