//! Test doubles for the dispatcher's seams.

use std::sync::Mutex;

use async_trait::async_trait;
use viewer_auth::{
    AuthFlows, CookieJar, DispatchEvent, DispatchLog, EdgeResponse, HandlerOutput, ViewerRequest,
};

/// One collaborator invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Exchange {
        code: String,
        state: String,
        cookies: Vec<(String, String)>,
        origin: String,
    },
    Validate {
        token: String,
        origin: String,
        final_destination: String,
        uri: String,
    },
    Login {
        origin: String,
        final_destination: String,
    },
}

/// Records calls and answers with fixed outputs.
#[derive(Debug, Default)]
pub struct RecordingFlows {
    calls: Mutex<Vec<Call>>,
    /// Pass the request through when a session is validated
    pub accept_sessions: bool,
}

impl RecordingFlows {
    pub fn accepting_sessions() -> Self {
        Self {
            accept_sessions: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AuthFlows for RecordingFlows {
    async fn exchange_authorization_code(
        &self,
        code: &str,
        state: &str,
        cookies: &CookieJar,
        origin: &str,
    ) -> HandlerOutput {
        let mut pairs: Vec<_> = cookies
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        pairs.sort();
        self.push(Call::Exchange {
            code: code.to_string(),
            state: state.to_string(),
            cookies: pairs,
            origin: origin.to_string(),
        });
        EdgeResponse::redirect(&format!("{origin}/"), &[]).into()
    }

    async fn validate_session_cookie(
        &self,
        token: &str,
        origin: &str,
        final_destination: &str,
        request: &ViewerRequest,
    ) -> HandlerOutput {
        self.push(Call::Validate {
            token: token.to_string(),
            origin: origin.to_string(),
            final_destination: final_destination.to_string(),
            uri: request.uri.clone(),
        });
        if self.accept_sessions {
            HandlerOutput::PassThrough(request.clone())
        } else {
            EdgeResponse::reject("session expired").into()
        }
    }

    async fn redirect_to_login(&self, origin: &str, final_destination: &str) -> HandlerOutput {
        self.push(Call::Login {
            origin: origin.to_string(),
            final_destination: final_destination.to_string(),
        });
        EdgeResponse::redirect("https://idp.example/login", &[]).into()
    }
}

/// Keeps a textual trace of dispatch events.
#[derive(Debug, Default)]
pub struct RecordingLog {
    lines: Mutex<Vec<String>>,
}

impl RecordingLog {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl DispatchLog for RecordingLog {
    fn record(&self, event: &DispatchEvent<'_>) {
        let line = match event {
            DispatchEvent::RefererIgnored { reason, .. } => {
                format!("referer_ignored:{}", reason.as_str())
            }
            DispatchEvent::QueryCodeIgnored { reason } => format!("query_ignored:{}", reason.as_str()),
            DispatchEvent::RouteSelected { route, .. } => format!("route:{}", route.as_str()),
            DispatchEvent::Delegated { route, pass_through } => {
                format!("delegated:{}:{pass_through}", route.as_str())
            }
            DispatchEvent::Failed { error, .. } => format!("failed:{}", error.code().as_str()),
        };
        self.lines.lock().unwrap().push(line);
    }
}
