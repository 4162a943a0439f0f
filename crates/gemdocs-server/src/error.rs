//! Error types for the HTTP server.
//!
//! Only not-found and rejected packages get specific bodies. Everything else
//! is logged with full detail and collapses to one generic error page.

use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use gemdocs_library::LibraryError;

use crate::views;

/// Body of the service-unavailable response for rejected packages.
pub(crate) const REJECTED_BODY: &str = "Cannot parse this gem";

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// Package, or a page below it, is not in the library index.
    #[error("Package not found: {0}")]
    PackageNotFound(String),

    /// Package rejected by the access policy.
    #[error("Package rejected by access policy: {0}")]
    Rejected(String),

    /// No route matched.
    #[error("Not found")]
    NotFound,

    /// Library index or renderer failure.
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            Self::PackageNotFound(name) => {
                (StatusCode::NOT_FOUND, Html(views::gems_404(name))).into_response()
            }
            Self::Rejected(name) => {
                tracing::info!(package = %name, "Rejected package request");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    REJECTED_BODY,
                )
                    .into_response()
            }
            Self::NotFound => (StatusCode::NOT_FOUND, Html(views::not_found())).into_response(),
            Self::Library(e) => {
                tracing::error!(error = %e, source = ?std::error::Error::source(e), "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Html(views::error_page())).into_response()
            }
        }
    }
}
