//! Proptest Generators
//!
//! Shared generators for property-based tests.

use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Generates ordinary page paths (never the code page, never a bypass asset)
pub fn arb_page_path() -> impl Strategy<Value = String> {
    vec("[a-z]{1,10}", 1..4).prop_map(|segments| format!("/{}", segments.join("/")))
}

/// Generates bypass asset paths
pub fn arb_asset_path() -> impl Strategy<Value = String> {
    (
        "(/static|/favicons)?(/favicons)?",
        "[a-z0-9-]{0,8}",
        prop_oneof![Just(".png"), Just(".PNG")],
    )
        .prop_map(|(prefix, rest, ext)| format!("{prefix}/favicons/favicon{rest}{ext}"))
}

/// Generates URL-safe authorization codes and states
pub fn arb_code_value() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-]{1,24}"
}

/// Generates session token values as they appear in a cookie header
pub fn arb_token() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-]{8,20}\\.[A-Za-z0-9_-]{8,20}\\.[A-Za-z0-9_-]{8,20}"
}

/// Generates identity provider callback URLs carrying a code
pub fn arb_code_referer() -> impl Strategy<Value = String> {
    ("[a-z]{3,10}", "[a-z]{1,10}", arb_code_value())
        .prop_map(|(host, path, code)| format!("https://{host}.example/{path}?code={code}"))
}

/// Generates optional unrelated query strings
pub fn arb_noise_query() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[a-z]{1,6}=[a-z0-9]{0,6}"]
}

/// Generates cookie name/value maps that are well formed
pub fn arb_cookie_pairs() -> impl Strategy<Value = BTreeMap<String, String>> {
    btree_map("[a-z][a-z0-9_]{0,12}", "[A-Za-z0-9._~-]{0,24}", 0..8)
}
