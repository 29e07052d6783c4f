//! Cookie Codec Unit Tests

use viewer_auth::edge::cookies::encode;
use viewer_auth::edge::SameSite;
use viewer_auth::{CookieJar, SetCookieDirective, ViewerRequest};

#[test]
fn test_parse_from_request_headers() {
    let request = ViewerRequest::new("/")
        .with_header("Cookie", "transcend_internal_id_token=eyJ.a.b; theme=dark")
        .with_header("Cookie", "lang=en");
    let jar = CookieJar::parse(request.header_values("cookie"));

    assert_eq!(jar.len(), 3);
    assert_eq!(jar.get("transcend_internal_id_token"), Some("eyJ.a.b"));
    assert_eq!(jar.get("lang"), Some("en"));
}

#[test]
fn test_no_cookie_header_is_empty_jar() {
    let request = ViewerRequest::new("/");
    let jar = CookieJar::parse(request.header_values("cookie"));
    assert!(jar.is_empty());
}

#[test]
fn test_whitespace_and_garbage_tolerated() {
    let jar = CookieJar::parse(["  ;;  a=1 ;garbage;  b = two words "]);
    assert_eq!(jar.get("a"), Some("1"));
    assert_eq!(jar.get("b"), Some("two words"));
    assert!(!jar.contains("garbage"));
}

#[test]
fn test_jar_from_pairs() {
    let jar: CookieJar = [("a", "1"), ("a", "2"), ("b", "3")].into_iter().collect();
    assert_eq!(jar.get("a"), Some("1"));
    assert_eq!(jar.len(), 2);
}

#[test]
fn test_encode_preserves_directive_order() {
    let entries = encode(&[
        SetCookieDirective::new("z", "1"),
        SetCookieDirective::new("a", "2").http_only(),
    ]);
    let values: Vec<_> = entries.iter().map(|e| e.value.as_str()).collect();
    assert_eq!(values, ["z=1", "a=2; HttpOnly"]);
    assert!(entries.iter().all(|e| e.key.as_deref() == Some("Set-Cookie")));
}

#[test]
fn test_directive_from_built_cookie() {
    let cookie = cookie::Cookie::build(("state", "s1"))
        .path("/")
        .same_site(SameSite::Lax)
        .build();
    let directive = SetCookieDirective::from(cookie);
    let rendered = directive.to_string();
    assert_eq!(directive.name(), "state");
    assert!(rendered.starts_with("state=s1; "));
    assert!(rendered.contains("; Path=/"));
    assert!(rendered.contains("; SameSite=Lax"));
}

#[test]
fn test_quoted_value_kept_verbatim() {
    let jar = CookieJar::parse([r#"pref="a b"; sid=x"#]);
    assert_eq!(jar.get("pref"), Some(r#""a b""#));
    assert_eq!(jar.get("sid"), Some("x"));
}
