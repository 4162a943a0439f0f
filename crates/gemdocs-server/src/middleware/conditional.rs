//! Conditional GET.
//!
//! A successful GET or HEAD whose `If-Modified-Since` is not older than the
//! response's `Last-Modified` becomes `304 Not Modified` with no body.
//! Comparison is at whole-second resolution, the precision of HTTP dates.

use axum::body::Body;
use axum::extract::Request;
use axum::http::{Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::Response;

use crate::middleware::parse_http_date;

/// Answer conditional requests for unchanged resources.
pub(crate) async fn conditional_get(request: Request, next: Next) -> Response {
    let since = if matches!(*request.method(), Method::GET | Method::HEAD) {
        request
            .headers()
            .get(header::IF_MODIFIED_SINCE)
            .and_then(parse_http_date)
    } else {
        None
    };

    let response = next.run(request).await;
    let Some(since) = since else {
        return response;
    };
    if response.status() != StatusCode::OK {
        return response;
    }

    let modified = response
        .headers()
        .get(header::LAST_MODIFIED)
        .and_then(parse_http_date);
    match modified {
        Some(modified) if modified.timestamp() <= since.timestamp() => not_modified(response),
        _ => response,
    }
}

fn not_modified(response: Response) -> Response {
    let (mut parts, _) = response.into_parts();
    parts.status = StatusCode::NOT_MODIFIED;
    parts.headers.remove(header::CONTENT_TYPE);
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::empty())
}
