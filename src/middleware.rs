use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

/// Logs every request with its status and latency
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis() as u64;
    if status.is_success() {
        info!(
            target: "fred_exporter::middleware",
            method = %method,
            path = %path,
            status = %status,
            elapsed_ms,
            "Request completed"
        );
    } else {
        warn!(
            target: "fred_exporter::middleware",
            method = %method,
            path = %path,
            status = %status,
            elapsed_ms,
            "Request failed"
        );
    }

    response
}
