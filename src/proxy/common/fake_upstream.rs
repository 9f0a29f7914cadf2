// In-process stand-in for the Petfinder API, used by tests

use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const ANIMALS_BODY: &str = r#"{"animals":[],"pagination":{"count_per_page":20,"total_count":0,"current_page":1,"total_pages":0,"_links":{"next":{"href":"/v2/animals?page=2"}}}}"#;
pub const UNAUTHORIZED_BODY: &str = r#"{"type":"https://www.petfinder.com/developers/v2/docs/errors/ERR-401/","status":401,"title":"Unauthorized","detail":"Access token invalid or expired"}"#;

pub struct FakeUpstream {
    base_url: String,
    token_requests: Arc<AtomicUsize>,
    handle: tokio::task::JoinHandle<()>,
}

impl FakeUpstream {
    /// Token requests with this client id are rejected with 401
    pub const REJECTED_CLIENT_ID: &'static str = "rejected-client";
    /// Token requests with this client id get an `expires_in` that overflows milliseconds
    pub const OVERFLOW_EXPIRY_CLIENT_ID: &'static str = "overflow-expiry-client";
    /// Token requests with this client id get a negative `expires_in`
    pub const NEGATIVE_EXPIRY_CLIENT_ID: &'static str = "negative-expiry-client";

    pub async fn spawn() -> Self {
        let token_requests = Arc::new(AtomicUsize::new(0));

        let app = Router::new()
            .route("/v2/oauth2/token", post(token))
            .route("/v2/animals", get(animals))
            .route("/v2/animals/empty-error", get(empty_error))
            .route("/v2/animals/plain-error", get(plain_error))
            .route("/v2/organizations/forbidden", get(forbidden))
            .route("/v2/echo", get(echo))
            .with_state(token_requests.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            token_requests,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    pub fn token_url(&self) -> String {
        format!("{}/v2/oauth2/token", self.base_url)
    }

    pub fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }
}

impl Drop for FakeUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn token(
    State(counter): State<Arc<AtomicUsize>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;

    if form.get("grant_type").map(String::as_str) != Some("client_credentials") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "unsupported_grant_type"})),
        )
            .into_response();
    }
    if form.get("client_id").map(String::as_str) == Some(FakeUpstream::REJECTED_CLIENT_ID)
        || form.get("client_secret").map_or(true, |s| s.is_empty())
    {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "invalid_client",
                "error_description": "Client authentication failed"
            })),
        )
            .into_response();
    }

    let expires_in: i64 = match form.get("client_id").map(String::as_str) {
        Some(FakeUpstream::OVERFLOW_EXPIRY_CLIENT_ID) => 9_300_000_000_000_000,
        Some(FakeUpstream::NEGATIVE_EXPIRY_CLIENT_ID) => -5,
        _ => 3600,
    };

    Json(json!({
        "token_type": "Bearer",
        "expires_in": expires_in,
        "access_token": format!("token-{}", n)
    }))
    .into_response()
}

fn is_authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map_or(false, |v| v.starts_with("Bearer token-"))
}

fn json_body(status: StatusCode, body: &'static str) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn animals(headers: HeaderMap) -> Response {
    if !is_authorized(&headers) {
        return json_body(StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY);
    }
    json_body(StatusCode::OK, ANIMALS_BODY)
}

async fn forbidden() -> Response {
    json_body(StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY)
}

async fn empty_error() -> Response {
    StatusCode::SERVICE_UNAVAILABLE.into_response()
}

async fn plain_error() -> Response {
    (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
}

async fn echo(headers: HeaderMap, RawQuery(query): RawQuery) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();

    Json(json!({
        "query": query,
        "authorization": authorization
    }))
    .into_response()
}
