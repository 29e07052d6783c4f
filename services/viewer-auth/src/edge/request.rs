//! Viewer request and event envelope.

use std::collections::BTreeMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::edge::response::EdgeResponse;
use crate::error::AuthEdgeError;

/// One value of a (possibly multi-valued) header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    /// Original header name casing, when the runtime supplies it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Header value
    pub value: String,
}

impl HeaderEntry {
    /// Creates an entry without the original-casing key.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            key: None,
            value: value.into(),
        }
    }

    /// Creates an entry that also records the header's display name.
    pub fn keyed(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: value.into(),
        }
    }
}

/// Lower-case header name to its ordered values.
pub type HeaderMap = BTreeMap<String, Vec<HeaderEntry>>;

/// Incoming viewer request as delivered by the edge runtime.
///
/// Fields the authenticator does not read (method, client IP, body, ...) are
/// kept in `extra` so a pass-through returns the record unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerRequest {
    /// Request path
    pub uri: String,
    /// Raw query string without the leading `?`
    #[serde(default)]
    pub querystring: String,
    /// Request headers
    #[serde(default)]
    pub headers: HeaderMap,
    /// Referer already resolved by an upstream hop
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer_url: Option<String>,
    /// Everything else the runtime sent
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ViewerRequest {
    /// Creates a request for `uri` with no query string or headers.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            querystring: String::new(),
            headers: HeaderMap::new(),
            referer_url: None,
            extra: Map::new(),
        }
    }

    /// Sets the query string.
    #[must_use]
    pub fn with_querystring(mut self, querystring: impl Into<String>) -> Self {
        self.querystring = querystring.into();
        self
    }

    /// Appends a header value.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(HeaderEntry::keyed(name, value));
        self
    }

    /// Attaches upstream referer metadata.
    #[must_use]
    pub fn with_referer_url(mut self, referer: impl Into<String>) -> Self {
        self.referer_url = Some(referer.into());
        self
    }

    /// All values of a header, in order. Lookup ignores name casing.
    pub fn header_values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        let values = self.headers.get(name).or_else(|| {
            self.headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, values)| values)
        });
        values
            .into_iter()
            .flatten()
            .map(|entry| entry.value.as_str())
    }

    /// First value of a header, if any.
    #[must_use]
    pub fn first_header(&self, name: &str) -> Option<&str> {
        self.header_values(name).next()
    }

    /// `https://` followed by the first `host` header value.
    ///
    /// # Errors
    ///
    /// [`AuthEdgeError::MissingHeader`] when there is no non-empty host.
    pub fn origin(&self) -> Result<String, AuthEdgeError> {
        match self.first_header("host").map(str::trim) {
            Some(host) if !host.is_empty() => Ok(format!("https://{host}")),
            _ => Err(AuthEdgeError::MissingHeader { name: "host" }),
        }
    }
}

/// Viewer-request event envelope: `{"Records": [{"cf": {"request": ...}}]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewerRequestEvent {
    /// Event records; the runtime sends exactly one
    #[serde(rename = "Records", default)]
    pub records: Vec<EventRecord>,
}

/// One record of a [`ViewerRequestEvent`].
#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    /// CDN payload
    pub cf: CdnPayload,
}

/// CDN-specific part of an event record.
#[derive(Debug, Clone, Deserialize)]
pub struct CdnPayload {
    /// Distribution metadata, unused by the authenticator
    #[serde(default)]
    pub config: Option<Value>,
    /// The viewer request
    pub request: ViewerRequest,
}

impl ViewerRequestEvent {
    /// Decodes an event from its JSON text.
    ///
    /// # Errors
    ///
    /// A serialization error when the text is not a valid event.
    pub fn from_json(raw: &str) -> Result<Self, AuthEdgeError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads and decodes one event from `reader` until end of input.
    ///
    /// # Errors
    ///
    /// [`AuthEdgeError::Internal`] when the input cannot be read as UTF-8
    /// text, or the errors of [`ViewerRequestEvent::from_json`].
    pub async fn read_from<R>(mut reader: R) -> Result<Self, AuthEdgeError>
    where
        R: AsyncRead + Unpin,
    {
        let mut raw = String::new();
        reader
            .read_to_string(&mut raw)
            .await
            .context("failed to read viewer-request event")?;
        Self::from_json(&raw)
    }

    /// Takes the request out of the first record.
    ///
    /// # Errors
    ///
    /// [`AuthEdgeError::MalformedEvent`] when the event has no records.
    pub fn into_request(self) -> Result<ViewerRequest, AuthEdgeError> {
        self.records
            .into_iter()
            .next()
            .map(|record| record.cf.request)
            .ok_or_else(|| AuthEdgeError::malformed("event contains no records"))
    }
}

/// What the hook hands back to the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HandlerOutput {
    /// Answer the viewer directly
    Response(EdgeResponse),
    /// Continue normal processing with the original request
    PassThrough(ViewerRequest),
}

impl HandlerOutput {
    /// The response, when this output is one.
    #[must_use]
    pub const fn as_response(&self) -> Option<&EdgeResponse> {
        match self {
            Self::Response(response) => Some(response),
            Self::PassThrough(_) => None,
        }
    }

    /// True when the original request is passed through.
    #[must_use]
    pub const fn is_pass_through(&self) -> bool {
        matches!(self, Self::PassThrough(_))
    }
}

impl From<EdgeResponse> for HandlerOutput {
    fn from(response: EdgeResponse) -> Self {
        Self::Response(response)
    }
}
