//! Edge runtime data model.
//!
//! Shapes exchanged with the CDN's viewer-request hook: the incoming request,
//! the response the hook may answer with, and the cookie codec used on both.

pub mod cookies;
pub mod request;
pub mod response;

pub use cookies::{CookieJar, SameSite, SetCookieDirective};
pub use request::{HandlerOutput, HeaderEntry, HeaderMap, ViewerRequest, ViewerRequestEvent};
pub use response::{BodyEncoding, EdgeResponse};
