//! Free-text package search.
//!
//! A query string that cannot be parsed is treated as an empty search.
//! Search results are never written to the page cache: the cache key is the
//! request path alone, which carries no query string.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Html;
use gemdocs_library::paginate;
use serde::Deserialize;

use crate::error::ServerError;
use crate::handlers::parse_page;
use crate::state::AppState;
use crate::views::{self, ListingKind};

/// Query parameters for GET /find/gems.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchParams {
    /// Search text.
    q: Option<String>,
    /// Page number; kept as text so malformed values fall back to page 1.
    page: Option<String>,
}

/// Handle GET /find/gems.
pub(crate) async fn find(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Html<String>, ServerError> {
    let params = params.map_or_else(
        |e| {
            tracing::debug!(error = %e, "Ignoring malformed search query");
            SearchParams::default()
        },
        |Query(params)| params,
    );
    let query = params.q.unwrap_or_default();
    let page_number = parse_page(params.page.as_deref());

    let matches = state.library.search(&query)?;
    let page = paginate(&matches, page_number, state.listing.page_size);

    Ok(Html(views::gems_index(
        &state.site,
        ListingKind::Search(&query),
        &page,
    )))
}
