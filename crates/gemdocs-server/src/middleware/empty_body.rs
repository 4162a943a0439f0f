//! Empty responses must not be cached by clients.

use axum::body::HttpBody;
use axum::extract::Request;
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;

/// Set `Cache-Control: max-age=0` on responses whose body is known to be empty.
pub(crate) async fn expire_empty_body(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    if response.body().size_hint().exact() == Some(0) {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    }
    response
}
