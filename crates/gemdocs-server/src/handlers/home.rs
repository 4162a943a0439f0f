//! Home page.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use gemdocs_library::{LibraryError, PackageRef};

use crate::error::ServerError;
use crate::state::AppState;
use crate::views;

/// Handle GET /.
pub(crate) async fn index(
    State(state): State<Arc<AppState>>,
) -> Result<Html<Vec<u8>>, ServerError> {
    let featured = featured_packages(&state)?;
    let html = views::home(&state.site, &featured);
    Ok(Html(state.cache.store("/", html.into_bytes())))
}

/// Configured featured packages that exist in the index, or the first
/// packages of the collection when none are configured.
fn featured_packages(state: &AppState) -> Result<Vec<PackageRef>, LibraryError> {
    let count = state.listing.featured_count;
    if state.listing.featured.is_empty() {
        return Ok(state.library.list_all()?.into_iter().take(count).collect());
    }

    let mut featured = Vec::with_capacity(count);
    for name in &state.listing.featured {
        if featured.len() >= count {
            break;
        }
        if let Some(package) = state.library.package(name)? {
            featured.push(package);
        }
    }
    Ok(featured)
}
