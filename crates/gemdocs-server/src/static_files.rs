//! Static file pass-through.
//!
//! Serves files below the public directory as they are on disk, bypassing
//! the page cache. Responses carry a short public max-age and the file's
//! modification time.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Path as UrlPath, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::error::ServerError;
use crate::middleware::http_date_header;
use crate::state::AppState;

/// Cache-Control for static assets.
const STATIC_CACHE_CONTROL: &str = "public, max-age=30";

/// Handle GET /static/{*path}.
pub(crate) async fn serve(
    State(state): State<Arc<AppState>>,
    UrlPath(path): UrlPath<String>,
) -> Result<Response, ServerError> {
    try_serve(&state.public_dir, &format!("static/{path}")).ok_or(ServerError::NotFound)
}

/// Serve `relative` from `public_dir` if it names a readable regular file.
///
/// Returns `None` when the path escapes the public directory, the file does
/// not exist, or it cannot be read.
pub(crate) fn try_serve(public_dir: &Path, relative: &str) -> Option<Response> {
    let file = resolve(public_dir, relative)?;
    let metadata = fs::metadata(&file).ok().filter(fs::Metadata::is_file)?;

    let content = match fs::read(&file) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %file.display(), error = %e, "Failed to read static file");
            return None;
        }
    };

    let mime = mime_guess::from_path(&file).first_or_octet_stream();
    let mut response = (
        [
            (header::CONTENT_TYPE, mime.as_ref()),
            (header::CACHE_CONTROL, STATIC_CACHE_CONTROL),
        ],
        content,
    )
        .into_response();

    if let Ok(modified) = metadata.modified()
        && let Some(value) = http_date_header(modified)
    {
        response.headers_mut().insert(header::LAST_MODIFIED, value);
    }

    tracing::debug!(path = %file.display(), "Serving static file");
    Some(response)
}

/// Join `relative` onto `public_dir`, rejecting anything but plain segments.
fn resolve(public_dir: &Path, relative: &str) -> Option<PathBuf> {
    let mut file = public_dir.to_path_buf();
    for segment in relative.trim_end_matches('/').split('/') {
        if segment.is_empty()
            || segment == "."
            || segment == ".."
            || segment.contains(['\\', '\0'])
        {
            return None;
        }
        file.push(segment);
    }
    Some(file)
}
