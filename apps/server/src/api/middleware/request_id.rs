//! Root request span, request ids and trace id propagation

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use opentelemetry::trace::TraceContextExt;
use std::time::Instant;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use uuid::Uuid;

use crate::request_context::SESSION_ID_HEADER;

const REQUEST_ID_HEADER: &str = "x-request-id";
const CORRELATION_ID_HEADER: &str = "x-correlation-id";
const TRACE_ID_HEADER: &str = "x-trace-id";

/// Opens the `http_request` span every handler, cache lookup and store call
/// nests under.
///
/// Each request gets a fresh server id. A client-supplied `X-Request-Id` is
/// never trusted as ours; it comes back as `X-Correlation-Id`.
#[tracing::instrument(
    name = "http_request",
    skip_all,
    fields(
        http.method = %req.method(),
        http.route = %req.uri().path(),
        otel.kind = "server",
        http.response.status_code = tracing::field::Empty,
        session_id = tracing::field::Empty,
        request_id = tracing::field::Empty,
    )
)]
pub async fn request_id_middleware(req: Request, next: Next) -> Response {
    let span = Span::current();
    let started = Instant::now();

    let request_id = Uuid::new_v4().to_string();
    span.record("request_id", request_id.as_str());

    let client_id = header_str(req.headers(), REQUEST_ID_HEADER).map(str::to_string);
    if let Some(session_id) = header_str(req.headers(), SESSION_ID_HEADER) {
        span.record("session_id", session_id);
    }

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let mut response = next.run(req).await;

    let status = response.status();
    span.record("http.response.status_code", status.as_u16());
    tracing::info!(
        method = %method,
        path = %path,
        status = status.as_u16(),
        duration_ms = started.elapsed().as_millis() as u64,
        "Request completed"
    );

    let trace_id = span.context().span().span_context().trace_id().to_string();
    let headers = response.headers_mut();
    insert_header(headers, REQUEST_ID_HEADER, &request_id);
    insert_header(headers, TRACE_ID_HEADER, &trace_id);
    if let Some(client_id) = client_id.filter(|id| *id != request_id) {
        insert_header(headers, CORRELATION_ID_HEADER, &client_id);
    }

    response
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}
