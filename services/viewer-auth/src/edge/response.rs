//! Responses the authenticator answers with directly.

use serde::{Deserialize, Serialize};

use crate::edge::cookies::{self, SetCookieDirective};
use crate::edge::request::{HeaderEntry, HeaderMap};

/// Path of the page that finishes a login by exchanging its code.
pub const CODE_PAGE_PATH: &str = "/handleCode.html";

/// How `body` is encoded. Pages built here are always plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    /// Plain text
    Text,
}

/// Response returned to the edge runtime instead of forwarding the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeResponse {
    /// HTTP status, serialized as a string
    #[serde(with = "status_string")]
    pub status: u16,
    /// Reason phrase
    pub status_description: String,
    /// Lower-case header name to ordered values
    #[serde(default)]
    pub headers: HeaderMap,
    /// Response body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Body encoding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_encoding: Option<BodyEncoding>,
}

impl EdgeResponse {
    /// 401 page explaining why the request was refused.
    ///
    /// `message` is embedded verbatim; callers must not pass unescaped
    /// viewer-controlled text.
    #[must_use]
    pub fn reject(message: &str) -> Self {
        let body = format!(
            r#"<!DOCTYPE html>
<html>
  <head>
    <meta http-equiv="Cache-Control" content="no-cache, no-store, must-revalidate" />
    <meta http-equiv="Pragma" content="no-cache" />
    <meta http-equiv="Expires" content="0" />
  </head>
  <body>
    <script>
      function removeExtraParams() {{
        window.history.replaceState({{}}, document.title, "{CODE_PAGE_PATH}");
      }}
    </script>
    <p>If you just signed in, click <a href="{CODE_PAGE_PATH}" onclick="removeExtraParams()">here</a> to finish signing in.</p>
    <p><u>Error Message:</u></p>
    <p style="color:red;font-size:20px;">{message}</p>
  </body>
</html>
"#
        );
        Self::html(401, "Unauthorized", body)
    }

    /// 302 to `destination`, setting `cookies` when there are any.
    #[must_use]
    pub fn redirect(destination: &str, cookies: &[SetCookieDirective]) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            "location".to_string(),
            vec![HeaderEntry::keyed("Location", destination)],
        );
        let set_cookie = cookies::encode(cookies);
        if !set_cookie.is_empty() {
            headers.insert("set-cookie".to_string(), set_cookie);
        }

        Self {
            status: 302,
            status_description: "Moved Temporarily".to_string(),
            headers,
            body: None,
            body_encoding: None,
        }
    }

    /// Plain HTML error page for failures that are not a rejection.
    #[must_use]
    pub fn failure(status: u16, message: &str) -> Self {
        let description = match status {
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            _ => "Internal Server Error",
        };
        let body = format!(
            "<!DOCTYPE html>\n<html><head><meta http-equiv=\"Cache-Control\" \
             content=\"no-store\" /></head><body><p>{message}</p></body></html>\n"
        );
        Self::html(status, description, body)
    }

    fn html(status: u16, description: &str, body: String) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type".to_string(),
            vec![HeaderEntry::keyed("Content-Type", "text/html")],
        );
        Self {
            status,
            status_description: description.to_string(),
            headers,
            body: Some(body),
            body_encoding: Some(BodyEncoding::Text),
        }
    }

    /// First value of a response header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|values| values.first())
            .map(|entry| entry.value.as_str())
    }
}

/// Escapes text for inclusion in HTML element content or attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

mod status_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(status: &u16, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(status)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Status {
            Text(String),
            Number(u16),
        }
        match Status::deserialize(deserializer)? {
            Status::Text(text) => text.trim().parse().map_err(D::Error::custom),
            Status::Number(number) => Ok(number),
        }
    }
}
