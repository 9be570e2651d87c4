//! Request ID middleware for request tracing and correlation.
//!
//! Every request carries an ID: either the `x-request-id` an upstream proxy
//! already assigned, or a freshly generated UUID v4. The ID is recorded in
//! the current tracing span, tagged on the Sentry scope and echoed in the
//! response headers, so a customer report can be matched to server logs.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that ensures every request has a unique request ID.
///
/// Must sit inside the `TraceLayer` so that the recorded `request_id` lands
/// in the request span.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = incoming_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// The request ID an upstream proxy already assigned, if any.
fn incoming_id(request: &Request) -> Option<String> {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(String::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;

    use super::*;

    #[test]
    fn test_incoming_id_reads_upstream_header() {
        let request = Request::builder()
            .header(REQUEST_ID_HEADER, "abc-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(incoming_id(&request).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_incoming_id_absent_without_header() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(incoming_id(&request), None);
    }

    #[test]
    fn test_incoming_id_rejects_non_ascii_header() {
        let request = Request::builder()
            .header(REQUEST_ID_HEADER, HeaderValue::from_bytes(b"\xff").unwrap())
            .body(Body::empty())
            .unwrap();
        assert_eq!(incoming_id(&request), None);
    }
}
