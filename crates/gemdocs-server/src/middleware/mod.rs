//! HTTP middleware.
//!
//! Layers, from outermost to innermost:
//!
//! - [`conditional`]: answers conditional GETs with `304 Not Modified`
//! - [`empty_body`]: disables client caching of empty responses
//! - [`page_cache`]: serves cached pages and sets freshness metadata

pub(crate) mod conditional;
pub(crate) mod empty_body;
pub(crate) mod page_cache;

use std::time::SystemTime;

use axum::http::HeaderValue;
use chrono::{DateTime, Utc};

/// IMF-fixdate format used by `Last-Modified` and `If-Modified-Since`.
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format a timestamp as an HTTP date.
pub(crate) fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format(HTTP_DATE_FORMAT)
        .to_string()
}

/// Format a timestamp as an HTTP date header value.
pub(crate) fn http_date_header(time: SystemTime) -> Option<HeaderValue> {
    HeaderValue::from_str(&format_http_date(time)).ok()
}

/// Parse an HTTP date header value. Returns `None` for malformed input.
pub(crate) fn parse_http_date(value: &HeaderValue) -> Option<DateTime<Utc>> {
    let value = value.to_str().ok()?;
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}
