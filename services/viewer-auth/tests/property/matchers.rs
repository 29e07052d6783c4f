//! Property-based tests for the route matchers.

use proptest::prelude::*;
use viewer_auth::routing::RouteMatchers;

use crate::generators::{arb_asset_path, arb_page_path};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_asset_paths_match(path in arb_asset_path()) {
        prop_assert!(RouteMatchers::default().asset_bypass.matches(&path));
    }

    #[test]
    fn prop_page_paths_do_not_match(path in arb_page_path()) {
        let matchers = RouteMatchers::default();
        prop_assert!(!matchers.asset_bypass.matches(&path));
        prop_assert!(!matchers.code_page.matches(&path));
    }

    /// Excluded-source referers are recognized wherever the code sits.
    #[test]
    fn prop_excluded_source_matches(
        host in "[a-z]{3,10}",
        before in "([a-z]{1,5}=[a-z]{1,5}&)?",
        code in "[a-z0-9]{1,10}",
    ) {
        let url = format!("https://{host}.example/open-athens-redirect?{before}code={code}");
        prop_assert!(RouteMatchers::default().excluded_source.matches_str(&url));
    }
}
