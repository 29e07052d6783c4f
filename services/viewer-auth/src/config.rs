//! Type-Safe Configuration with Validation
//!
//! Reserved identifiers (session cookie name, code-page fragment, excluded
//! identity source, bypass assets) and logging options, loaded from
//! environment variables with defaults that match the deployed site.

use std::env;

use rust_common::TracingConfig;
use thiserror::Error;

use crate::routing::{
    AssetBypassMatcher, CodePageMatcher, ExcludedSourceMatcher, RouteMatchers, RoutingSettings,
};

/// Default name of the cookie holding the identity session token.
pub const DEFAULT_SESSION_COOKIE: &str = "transcend_internal_id_token";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Missing required field
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    /// Asset suffix is not a file extension
    #[error("Invalid asset suffix {suffix:?}: must start with '.'")]
    InvalidSuffix {
        /// Offending suffix
        suffix: String,
    },

    /// Environment variable parse error
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError {
        /// Variable name
        name: String,
        /// Parser message
        reason: String,
    },
}

/// Service configuration with validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Cookie carrying the identity session token
    pub session_cookie_name: String,
    /// Path fragment identifying the code-handling page
    pub code_page_fragment: String,
    /// Path suffix of the alternate identity provider's redirect page
    pub excluded_referer_path: String,
    /// Directory holding bypass assets
    pub asset_bypass_directory: String,
    /// File-name prefix of bypass assets
    pub asset_bypass_prefix: String,
    /// File extensions of bypass assets
    pub asset_bypass_suffixes: Vec<String>,
    /// Log filter directive
    pub log_level: String,
    /// Emit JSON logs
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            code_page_fragment: "handleCode".to_string(),
            excluded_referer_path: "/open-athens-redirect".to_string(),
            asset_bypass_directory: "/favicons/".to_string(),
            asset_bypass_prefix: "favicon".to_string(),
            asset_bypass_suffixes: vec![".png".to_string()],
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables with validation.
    ///
    /// A `.env` file in the working directory is honoured when present.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a variable cannot be parsed or a value
    /// fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let string = |name: &str, default: String| lookup(name).unwrap_or(default);

        let config = Self {
            session_cookie_name: string("SESSION_COOKIE_NAME", defaults.session_cookie_name),
            code_page_fragment: string("CODE_PAGE_FRAGMENT", defaults.code_page_fragment),
            excluded_referer_path: string("EXCLUDED_REFERER_PATH", defaults.excluded_referer_path),
            asset_bypass_directory: string(
                "ASSET_BYPASS_DIRECTORY",
                defaults.asset_bypass_directory,
            ),
            asset_bypass_prefix: string("ASSET_BYPASS_PREFIX", defaults.asset_bypass_prefix),
            asset_bypass_suffixes: lookup("ASSET_BYPASS_SUFFIXES")
                .map_or(defaults.asset_bypass_suffixes, |raw| parse_list(&raw)),
            log_level: string("LOG_LEVEL", defaults.log_level),
            log_json: parse_var(&lookup, "LOG_JSON", defaults.log_json)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("session_cookie_name", &self.session_cookie_name),
            ("code_page_fragment", &self.code_page_fragment),
            ("excluded_referer_path", &self.excluded_referer_path),
            ("asset_bypass_directory", &self.asset_bypass_directory),
            ("asset_bypass_prefix", &self.asset_bypass_prefix),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingRequired(field.to_string()));
            }
        }
        if self.asset_bypass_suffixes.is_empty() {
            return Err(ConfigError::MissingRequired(
                "asset_bypass_suffixes".to_string(),
            ));
        }
        if let Some(suffix) = self
            .asset_bypass_suffixes
            .iter()
            .find(|s| !s.starts_with('.') || s.len() < 2)
        {
            return Err(ConfigError::InvalidSuffix {
                suffix: suffix.clone(),
            });
        }
        Ok(())
    }

    /// Builds the matcher table and cookie name used for classification.
    #[must_use]
    pub fn routing_settings(&self) -> RoutingSettings {
        RoutingSettings {
            session_cookie_name: self.session_cookie_name.clone(),
            matchers: RouteMatchers {
                code_page: CodePageMatcher::new(&self.code_page_fragment),
                excluded_source: ExcludedSourceMatcher::new(&self.excluded_referer_path),
                asset_bypass: AssetBypassMatcher::new(
                    &self.asset_bypass_directory,
                    &self.asset_bypass_prefix,
                    self.asset_bypass_suffixes.iter().cloned(),
                ),
            },
        }
    }

    /// Builds the tracing subscriber configuration.
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        let config = TracingConfig::default()
            .with_service_name("viewer-auth")
            .with_log_level(&self.log_level);
        if self.log_json {
            config.with_json_output()
        } else {
            config
        }
    }
}

/// Parse a variable with a default value.
fn parse_var<T, F>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(val) => val.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Parse a comma-separated list, dropping empty items.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
