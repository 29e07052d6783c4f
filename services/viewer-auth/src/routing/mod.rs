//! Request routing: matcher table, context extraction and dispatch.

pub mod context;
pub mod dispatcher;
pub mod matchers;

pub use context::{AuthorizationCode, ContextExtractor, FinalDestination, RefererCode};
pub use dispatcher::{
    AuthFlows, Classification, Classifier, Dispatcher, Route, RouteKind, RoutingSettings,
};
pub use matchers::{AssetBypassMatcher, CodePageMatcher, ExcludedSourceMatcher, RouteMatchers};
