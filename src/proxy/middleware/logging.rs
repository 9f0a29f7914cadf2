// Request logging middleware
use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Log method, URI, status and latency of every inbound request
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis();
    if status.is_server_error() {
        tracing::warn!("{} {} -> {} ({} ms)", method, uri, status, elapsed_ms);
    } else {
        tracing::info!("{} {} -> {} ({} ms)", method, uri, status, elapsed_ms);
    }

    response
}
