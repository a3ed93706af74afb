use std::time::Instant;

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};

/// Paths that never need credentials.
const PUBLIC_PATHS: &[&str] = &["/health", "/token", "/login", "/public"];

/// Add `X-Process-Time` (seconds, as a decimal) to every response.
pub async fn process_time(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let mut response = next.run(request).await;
    let elapsed = started.elapsed().as_secs_f64();

    if let Ok(value) = HeaderValue::from_str(&format!("{elapsed:.6}")) {
        response.headers_mut().insert("x-process-time", value);
    }
    response
}

/// Log whether a request to a non-public path carried an `X-API-Key`.
/// Observational only; authorization is the bearer-token extractors' job.
pub async fn api_key_audit(request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if !is_public(path) {
        match request.headers().get("x-api-key").and_then(|v| v.to_str().ok()) {
            Some(key) => {
                let prefix: String = key.chars().take(8).collect();
                tracing::debug!(path, key_prefix = %prefix, "request with API key");
            }
            None => tracing::debug!(path, "request without API key"),
        }
    }
    next.run(request).await
}

fn is_public(path: &str) -> bool {
    path == "/" || PUBLIC_PATHS.iter().any(|p| path.starts_with(p))
}
