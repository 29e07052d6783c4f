//! Property-based tests for the cookie codec.

use proptest::prelude::*;
use viewer_auth::edge::cookies::encode;
use viewer_auth::{CookieJar, SetCookieDirective};

use crate::generators::arb_cookie_pairs;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Parsing a header and re-encoding its cookies loses no name/value pair.
    #[test]
    fn prop_parse_then_encode_keeps_pairs(pairs in arb_cookie_pairs()) {
        let header = pairs
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        let jar = CookieJar::parse([header.as_str()]);
        prop_assert_eq!(jar.len(), pairs.len());

        let directives: Vec<_> = jar
            .iter()
            .map(|(name, value)| SetCookieDirective::new(name, value))
            .collect();
        let entries = encode(&directives);
        prop_assert_eq!(entries.len(), pairs.len());

        let reparsed = CookieJar::parse(entries.iter().map(|e| e.value.as_str()));
        for (name, value) in &pairs {
            prop_assert_eq!(reparsed.get(name), Some(value.as_str()));
        }
    }

    /// Malformed segments never hide well-formed ones.
    #[test]
    fn prop_garbage_is_skipped(pairs in arb_cookie_pairs(), garbage in "[a-z ]{0,10}") {
        let mut segments: Vec<String> = pairs
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        segments.insert(0, garbage);
        let jar = CookieJar::parse([segments.join(";").as_str()]);
        for (name, value) in &pairs {
            prop_assert_eq!(jar.get(name), Some(value.as_str()));
        }
    }
}
