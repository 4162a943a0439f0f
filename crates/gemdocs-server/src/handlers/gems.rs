//! Gem listing and package documentation.
//!
//! Package documentation is mounted under four prefixes so the renderer's
//! cross-links resolve under any of them:
//!
//! - `/gems/{name}/...`
//! - `/search/gems/{name}/...`
//! - `/list/gems/{name}/...`
//! - `/static/gems/{name}/...`
//!
//! Under the unprefixed mount, `/gems/~{letter}[/{page}]` and `/gems/{page}`
//! are listings rather than packages.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{Uri, header};
use axum::response::{Html, IntoResponse, Response};
use gemdocs_library::{RenderContext, paginate};

use crate::error::ServerError;
use crate::policy::PolicyDecision;
use crate::state::AppState;
use crate::static_files;
use crate::views::{self, ListingKind};

/// Mount prefixes for package documentation.
pub(crate) const DOC_PREFIXES: [&str; 4] = ["", "/search", "/list", "/static"];

/// Mount point a package route was reached under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mount {
    Root,
    Search,
    List,
    Static,
}

impl Mount {
    fn of(path: &str) -> Self {
        match path.trim_start_matches('/').split('/').next() {
            Some("search") => Self::Search,
            Some("list") => Self::List,
            Some("static") => Self::Static,
            _ => Self::Root,
        }
    }
}

/// A listing request parsed from a `/gems/...` path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ListingRequest {
    /// Alphabetic bucket, if any.
    pub(crate) letter: Option<char>,
    /// Requested page (not yet clamped).
    pub(crate) page: usize,
}

/// Recognize the listing shapes `~{letter}`, `~{letter}/{page}` and `{page}`.
///
/// `letter` must be a lowercase ASCII letter and `page` all digits. Anything
/// else names a package.
pub(crate) fn classify_listing(segment: &str, rest: &str) -> Option<ListingRequest> {
    let is_number = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let rest = rest.trim_end_matches('/');

    if is_number(segment) && rest.is_empty() {
        return Some(ListingRequest {
            letter: None,
            page: super::parse_page(Some(segment)),
        });
    }

    let letter = segment.strip_prefix('~')?;
    let mut chars = letter.chars();
    let (Some(letter), None) = (chars.next(), chars.next()) else {
        return None;
    };
    if !letter.is_ascii_lowercase() {
        return None;
    }

    if rest.is_empty() {
        Some(ListingRequest {
            letter: Some(letter),
            page: 1,
        })
    } else if is_number(rest) {
        Some(ListingRequest {
            letter: Some(letter),
            page: super::parse_page(Some(rest)),
        })
    } else {
        None
    }
}

/// Handle GET /gems.
pub(crate) async fn index(
    State(state): State<Arc<AppState>>,
    uri: Uri,
) -> Result<Html<Vec<u8>>, ServerError> {
    render_listing(
        &state,
        uri.path(),
        ListingRequest {
            letter: None,
            page: 1,
        },
    )
}

/// Handle GET {prefix}/gems/{name} and {prefix}/gems/{name}/.
pub(crate) async fn package_index(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    Path(name): Path<String>,
) -> Result<Response, ServerError> {
    show(&state, uri.path(), &name, "")
}

/// Handle GET {prefix}/gems/{name}/{*rest}.
pub(crate) async fn package_page(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    Path((name, rest)): Path<(String, String)>,
) -> Result<Response, ServerError> {
    show(&state, uri.path(), &name, &rest)
}

/// Render one page of a listing and store it in the page cache.
fn render_listing(
    state: &AppState,
    request_path: &str,
    request: ListingRequest,
) -> Result<Html<Vec<u8>>, ServerError> {
    let (collection, kind) = match request.letter {
        Some(letter) => (state.library.bucket_by_letter(letter)?, ListingKind::Letter(letter)),
        None => (state.library.list_all()?, ListingKind::All),
    };

    let page = paginate(&collection, request.page, state.listing.page_size);
    let html = views::gems_index(&state.site, kind, &page);
    Ok(Html(state.cache.store(request_path, html.into_bytes())))
}

/// Shared implementation for package documentation.
fn show(
    state: &AppState,
    request_path: &str,
    name: &str,
    rest: &str,
) -> Result<Response, ServerError> {
    let mount = Mount::of(request_path);

    if mount == Mount::Root
        && let Some(listing) = classify_listing(name, rest)
    {
        return render_listing(state, request_path, listing).map(IntoResponse::into_response);
    }

    if mount == Mount::Static
        && !rest.is_empty()
        && let Some(response) = static_files::try_serve(
            &state.public_dir,
            &format!("static/gems/{name}/{rest}"),
        )
    {
        return Ok(response);
    }

    // Every request starts with the strictest sandbox.
    let mut ctx = RenderContext::strict();

    if state.policy.is_denied_name(name) {
        return Err(ServerError::Rejected(name.to_owned()));
    }

    let package = state.library.package(name)?;
    let project = package.as_ref().and_then(|p| p.project.as_deref());
    match state.policy.evaluate(name, project) {
        PolicyDecision::Rejected => return Err(ServerError::Rejected(name.to_owned())),
        PolicyDecision::AllowedUnsafe => ctx = RenderContext::relaxed(),
        PolicyDecision::Allowed => {}
    }

    let package = package.ok_or_else(|| ServerError::PackageNotFound(name.to_owned()))?;
    let rendered = state
        .library
        .render(&package, rest, &ctx)
        .map_err(|e| {
            if e.is_not_found() {
                ServerError::PackageNotFound(name.to_owned())
            } else {
                ServerError::Library(e)
            }
        })?;

    let content = if rendered.is_html() {
        state.cache.store(request_path, rendered.content)
    } else {
        rendered.content
    };

    Ok(([(header::CONTENT_TYPE, rendered.content_type)], content).into_response())
}
