use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, field};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Wraps every request in a span carrying a request id, and echoes the id
/// back so the dashboard can correlate failed calls with gateway logs.
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let span = tracing::info_span!(
        "gateway_request",
        request_id = %request_id,
        method = %method,
        path = %path,
        status = field::Empty,
        latency_ms = field::Empty
    );

    let start = Instant::now();
    let mut response = next.run(req).instrument(span.clone()).await;
    let latency_ms = start.elapsed().as_millis();
    let status = response.status();

    span.record("status", field::display(status.as_u16()));
    span.record("latency_ms", field::display(latency_ms));

    if status.is_server_error() {
        tracing::error!(parent: &span, "Request failed");
    } else if status.is_client_error() {
        tracing::warn!(parent: &span, "Request rejected");
    } else {
        tracing::info!(parent: &span, "Request completed");
    }

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), header_value);
    }

    response
}
