// Forwarding handler: inbound request -> token -> upstream GET -> relayed response
use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::{AppError, AppResult, UpstreamFailure};
use crate::proxy::common::cors::{cors_headers, json_headers};
use crate::proxy::config::API_VERSION;
use crate::proxy::server::AppState;
use crate::proxy::upstream::client::UpstreamClient;
use crate::proxy::TokenManager;

/// Sub-path used when the inbound path names no resource
const DEFAULT_SUB_PATH: &str = "/animals";

/// One inbound call
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub path: String,
    pub method: Method,
    pub query: Vec<(String, String)>,
}

impl ProxyRequest {
    #[cfg(test)]
    pub fn get(path: &str, query: &[(&str, &str)]) -> Self {
        Self {
            path: path.to_string(),
            method: Method::GET,
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn from_parts(method: Method, uri: &Uri) -> Self {
        let query = uri
            .query()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        Self {
            path: uri.path().to_string(),
            method,
            query,
        }
    }
}

/// Response handed back to the caller
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ProxyResponse {
    pub fn preflight() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            headers: cors_headers(),
            body: String::new(),
        }
    }

    pub fn json(status: StatusCode, body: String) -> Self {
        Self {
            status,
            headers: json_headers(),
            body,
        }
    }

    fn message(status: StatusCode, message: &str) -> Self {
        Self::json(status, json!({ "message": message }).to_string())
    }

    /// Generic body used when the upstream gave nothing to relay
    pub fn internal_error() -> Self {
        Self::message(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }

    /// Relay an upstream failure: its status (else 500) and its body (else the generic body)
    pub fn from_error(err: &AppError) -> Self {
        if let AppError::BadRequest(message) = err {
            return Self::message(StatusCode::BAD_REQUEST, message);
        }

        let Some(failure) = err.upstream_failure() else {
            return Self::internal_error();
        };

        let status = failure
            .status
            .and_then(|s| StatusCode::from_u16(s).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match failure.body.as_deref() {
            Some(body) => Self::json(status, as_json_body(body)),
            None => Self {
                status,
                ..Self::internal_error()
            },
        }
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        if self.body.is_empty() {
            (self.status, self.headers).into_response()
        } else {
            (self.status, self.headers, self.body).into_response()
        }
    }
}

/// Pass JSON through untouched; anything else is wrapped as a JSON string
fn as_json_body(body: &str) -> String {
    if serde_json::from_str::<Value>(body).is_ok() {
        body.to_string()
    } else {
        Value::String(body.to_string()).to_string()
    }
}

/// Recover the upstream sub-path from an inbound path
///
/// Strips the first routing prefix that matches on a segment boundary, then
/// any leading version segments, so `/v2/animals`, `/v2/v2/animals` and
/// `/animals` all yield `/animals`. Dot segments (plain or `%2e`-encoded) and
/// backslashes are rejected: the upstream URL parser would resolve them out of
/// the versioned namespace.
pub fn clean_sub_path<S: AsRef<str>>(path: &str, route_prefixes: &[S]) -> AppResult<String> {
    let rest = route_prefixes
        .iter()
        .map(|p| p.as_ref().trim_end_matches('/'))
        .filter(|p| !p.is_empty())
        .find_map(|prefix| {
            path.strip_prefix(prefix)
                // "/api" must not eat "/apiary"
                .filter(|stripped| stripped.is_empty() || stripped.starts_with('/'))
        })
        .unwrap_or(path);

    let mut segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();

    if let Some(bad) = segments.iter().find(|s| is_unsafe_segment(s)) {
        return Err(AppError::BadRequest(format!(
            "Path segment not allowed: {}",
            bad
        )));
    }

    let leading_versions = segments.iter().take_while(|s| **s == API_VERSION).count();
    segments.drain(..leading_versions);

    if segments.is_empty() {
        Ok(DEFAULT_SUB_PATH.to_string())
    } else {
        Ok(format!("/{}", segments.join("/")))
    }
}

fn is_unsafe_segment(segment: &str) -> bool {
    if segment.contains('\\') {
        return true;
    }
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}

pub struct ForwardingProxy {
    token_manager: Arc<TokenManager>,
    upstream: Arc<UpstreamClient>,
    route_prefixes: Vec<String>,
}

impl ForwardingProxy {
    pub fn new(
        token_manager: Arc<TokenManager>,
        upstream: Arc<UpstreamClient>,
        route_prefixes: Vec<String>,
    ) -> Self {
        Self {
            token_manager,
            upstream,
            route_prefixes,
        }
    }

    pub fn token_manager(&self) -> &Arc<TokenManager> {
        &self.token_manager
    }

    pub async fn handle(&self, request: ProxyRequest) -> ProxyResponse {
        if request.method == Method::OPTIONS {
            return ProxyResponse::preflight();
        }

        if request.method != Method::GET && request.method != Method::HEAD {
            return ProxyResponse::message(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        }

        tracing::debug!(
            "Request received: {} {} {:?}",
            request.method,
            request.path,
            request.query
        );

        let result = match clean_sub_path(&request.path, &self.route_prefixes) {
            Ok(sub_path) => {
                tracing::debug!("Path after cleaning: {}", sub_path);
                self.forward(&sub_path, &request.query).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Error proxying to Petfinder: {}", e);
                ProxyResponse::from_error(&e)
            }
        }
    }

    async fn forward(
        &self,
        sub_path: &str,
        query: &[(String, String)],
    ) -> AppResult<ProxyResponse> {
        let token = self.token_manager.get_valid_token().await?;

        let reply = self.upstream.get(sub_path, query, &token).await?;

        if reply.status.is_success() {
            Ok(ProxyResponse::json(StatusCode::OK, as_json_body(&reply.body)))
        } else {
            Err(AppError::UpstreamRequest(UpstreamFailure::rejected(
                reply.status.as_u16(),
                reply.body,
            )))
        }
    }
}

/// Fallback route: everything that is not a fixed route is forwarded
pub async fn handle_forward(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    state
        .proxy
        .handle(ProxyRequest::from_parts(method, &uri))
        .await
        .into_response()
}
