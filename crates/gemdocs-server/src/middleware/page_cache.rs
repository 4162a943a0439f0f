//! Page cache lookup and freshness metadata.
//!
//! Runs before routing. A GET or HEAD whose path has a stored artifact is
//! answered from the cache without reaching any handler. Every other response
//! gets a revalidation policy unless the handler already chose one.

use std::sync::Arc;
use std::time::SystemTime;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use gemdocs_cache::CacheEntry;

use crate::middleware::http_date_header;
use crate::state::AppState;

/// Cache-Control for freshly rendered responses.
const REVALIDATE: &str = "public, must-revalidate, max-age=60";

/// Cache-Control for responses served from the page cache.
const CACHED: &str = "public";

/// Serve cached pages and set freshness headers on everything else.
pub(crate) async fn page_cache(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if matches!(*request.method(), Method::GET | Method::HEAD)
        && let Some(entry) = state.cache.lookup(request.uri().path())
    {
        return cached_response(entry);
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers
        .entry(header::CACHE_CONTROL)
        .or_insert(HeaderValue::from_static(REVALIDATE));

    if state.cache.is_enabled()
        && !headers.contains_key(header::LAST_MODIFIED)
        && let Some(now) = http_date_header(SystemTime::now())
    {
        headers.insert(header::LAST_MODIFIED, now);
    }

    response
}

fn cached_response(entry: CacheEntry) -> Response {
    let mut response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, CACHED),
        ],
        Body::from(entry.content),
    )
        .into_response();

    if let Some(modified) = http_date_header(entry.written_at) {
        response
            .headers_mut()
            .insert(header::LAST_MODIFIED, modified);
    }
    response
}
