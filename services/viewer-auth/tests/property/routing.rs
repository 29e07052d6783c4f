//! Property-based tests for classification priority.

use proptest::prelude::*;
use viewer_auth::routing::RouteKind;
use viewer_auth::{Classifier, NoopLog, Route, RoutingSettings, ViewerRequest};

use crate::generators::{
    arb_asset_path, arb_code_referer, arb_code_value, arb_noise_query, arb_page_path, arb_token,
};

const HOST: &str = "app.example.com";
const SESSION_COOKIE: &str = "transcend_internal_id_token";

fn classify(request: &ViewerRequest) -> Route {
    let settings = RoutingSettings::default();
    Classifier::new(&settings, &NoopLog)
        .classify(request)
        .unwrap()
        .route
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A code in the referer always rejects, whatever else is present.
    #[test]
    fn prop_referer_code_always_rejects(
        path in prop_oneof![arb_page_path(), arb_asset_path(), Just("/handleCode.html".to_string())],
        referer in arb_code_referer(),
        code in arb_code_value(),
        state in arb_code_value(),
        with_query in any::<bool>(),
        token in proptest::option::of(arb_token()),
    ) {
        let mut request = ViewerRequest::new(path)
            .with_header("Host", HOST)
            .with_header("Referer", referer);
        if with_query {
            request = request.with_querystring(format!("code={code}&state={state}"));
        }
        if let Some(token) = token {
            request = request.with_header("Cookie", format!("{SESSION_COOKIE}={token}"));
        }

        prop_assert_eq!(classify(&request).kind(), RouteKind::Reject);
    }

    /// A complete code/state pair is exchanged with exactly those values.
    #[test]
    fn prop_query_code_is_exchanged(
        path in arb_page_path(),
        code in arb_code_value(),
        state in arb_code_value(),
        token in proptest::option::of(arb_token()),
    ) {
        let mut request = ViewerRequest::new(path)
            .with_header("Host", HOST)
            .with_querystring(format!("state={state}&code={code}"));
        if let Some(token) = token {
            request = request.with_header("Cookie", format!("{SESSION_COOKIE}={token}"));
        }

        match classify(&request) {
            Route::ExchangeCode { authorization, origin } => {
                prop_assert_eq!(authorization.code, code);
                prop_assert_eq!(authorization.state, state);
                prop_assert_eq!(origin, format!("https://{HOST}"));
            }
            other => prop_assert!(false, "unexpected route {:?}", other),
        }
    }

    /// Without a query code, a session cookie is validated with its value.
    #[test]
    fn prop_cookie_is_validated(
        path in prop_oneof![arb_page_path(), arb_asset_path()],
        query in arb_noise_query(),
        token in arb_token(),
    ) {
        let request = ViewerRequest::new(path)
            .with_header("Host", HOST)
            .with_querystring(query)
            .with_header("Cookie", format!("theme=dark; {SESSION_COOKIE}={token}"));

        match classify(&request) {
            Route::ValidateSession { token: found, .. } => prop_assert_eq!(found.expose(), token.as_str()),
            other => prop_assert!(false, "unexpected route {:?}", other),
        }
    }

    /// Bypass assets with no code and no cookie pass through.
    #[test]
    fn prop_asset_passes_through(path in arb_asset_path(), query in arb_noise_query()) {
        let request = ViewerRequest::new(path)
            .with_header("Host", HOST)
            .with_querystring(query);
        prop_assert_eq!(classify(&request), Route::PassThrough);
    }

    /// Everything else goes to login with the computed destination.
    #[test]
    fn prop_everything_else_logs_in(path in arb_page_path(), query in arb_noise_query()) {
        let request = ViewerRequest::new(path.clone())
            .with_header("Host", HOST)
            .with_querystring(query.clone());
        let expected = if query.is_empty() {
            format!("https://{HOST}{path}")
        } else {
            format!("https://{HOST}{path}?{query}")
        };

        prop_assert_eq!(
            classify(&request),
            Route::RedirectToLogin {
                origin: format!("https://{HOST}"),
                final_destination: expected,
            }
        );
    }

    /// Classification is deterministic.
    #[test]
    fn prop_classification_is_deterministic(
        path in prop_oneof![arb_page_path(), arb_asset_path()],
        query in arb_noise_query(),
    ) {
        let request = ViewerRequest::new(path)
            .with_header("Host", HOST)
            .with_querystring(query);
        prop_assert_eq!(classify(&request), classify(&request));
    }
}
