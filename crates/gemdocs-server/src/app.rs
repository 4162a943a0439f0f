//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::error::ServerError;
use crate::handlers::{self, gems::DOC_PREFIXES};
use crate::middleware::{conditional, empty_body, page_cache};
use crate::state::AppState;
use crate::static_files;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::home::index))
        .route("/gems", get(handlers::gems::index))
        .route("/gems/", get(handlers::gems::index))
        .route("/find/gems", get(handlers::search::find))
        .route("/static/{*path}", get(static_files::serve));

    for prefix in DOC_PREFIXES {
        router = router
            .route(
                &format!("{prefix}/gems/{{name}}"),
                get(handlers::gems::package_index),
            )
            .route(
                &format!("{prefix}/gems/{{name}}/"),
                get(handlers::gems::package_index),
            )
            .route(
                &format!("{prefix}/gems/{{name}}/{{*rest}}"),
                get(handlers::gems::package_page),
            );
    }

    router
        .fallback(not_found)
        .layer(from_fn_with_state(
            Arc::clone(&state),
            page_cache::page_cache,
        ))
        .layer(from_fn(empty_body::expire_empty_body))
        .layer(from_fn(conditional::conditional_get))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> ServerError {
    ServerError::NotFound
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use gemdocs_cache::{FilePageCache, NullPageCache, PageCache};
    use gemdocs_config::{AccessConfig, ListingConfig};
    use gemdocs_library::{
        LibraryCollection, LibraryError, LibraryIndex, MockLibraryIndex, PackageRef, RenderCall,
        RenderContext, Rendered,
    };
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::policy::AccessPolicy;
    use crate::views::SiteInfo;

    /// Index whose every lookup fails, as when the metadata store is down.
    struct UnavailableIndex;

    impl LibraryIndex for UnavailableIndex {
        fn list_all(&self) -> Result<LibraryCollection, LibraryError> {
            Err(LibraryError::Invalid("index unavailable".to_owned()))
        }

        fn package(&self, _name: &str) -> Result<Option<PackageRef>, LibraryError> {
            Err(LibraryError::Invalid("index unavailable".to_owned()))
        }

        fn render(
            &self,
            package: &PackageRef,
            _path: &str,
            _ctx: &RenderContext,
        ) -> Result<Rendered, LibraryError> {
            panic!("render called for {}", package.name)
        }
    }

    fn router(
        library: &Arc<MockLibraryIndex>,
        cache: Arc<dyn PageCache>,
        access: &AccessConfig,
        public_dir: &Path,
    ) -> Router {
        router_with(
            Arc::clone(library) as Arc<dyn LibraryIndex>,
            cache,
            access,
            public_dir,
        )
    }

    fn router_with(
        library: Arc<dyn LibraryIndex>,
        cache: Arc<dyn PageCache>,
        access: &AccessConfig,
        public_dir: &Path,
    ) -> Router {
        let state = AppState {
            library,
            cache,
            policy: AccessPolicy::new(access),
            site: SiteInfo {
                name: "RubyDoc.info".to_owned(),
                url: "https://www.rubydoc.info".to_owned(),
            },
            listing: ListingConfig {
                page_size: 2,
                featured_count: 3,
                featured: Vec::new(),
            },
            public_dir: public_dir.to_path_buf(),
        };
        create_router(Arc::new(state))
    }

    fn library() -> Arc<MockLibraryIndex> {
        Arc::new(
            MockLibraryIndex::new()
                .with_package("delta")
                .with_package("alpha")
                .with_package("charlie")
                .with_package("beta")
                .with_package("rails")
                .with_package("yard")
                .with_package("forbidden-gem")
                .with_package("broken")
                .with_page("rails", "", "<h1>Rails</h1>")
                .with_page("rails", "ActiveRecord/Base", "<h1>Base</h1>")
                .with_page("yard", "", "<h1>YARD</h1>")
                .with_page("forbidden-gem", "", "<h1>Forbidden</h1>")
                .with_page("alpha", "empty", "")
                .with_failure("broken"),
        )
    }

    fn access() -> AccessConfig {
        AccessConfig {
            disallowed_gems: vec!["forbidden-gem".to_owned()],
            whitelisted_gems: vec!["yard".to_owned()],
            ..AccessConfig::default()
        }
    }

    async fn get(router: &Router, uri: &str) -> Response {
        request(router, Request::builder().uri(uri)).await
    }

    async fn request(router: &Router, builder: axum::http::request::Builder) -> Response {
        router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn uncached(tmp: &TempDir) -> (Arc<MockLibraryIndex>, Router) {
        let library = library();
        let router = router(&library, Arc::new(NullPageCache), &access(), tmp.path());
        (library, router)
    }

    fn cached(tmp: &TempDir) -> (Arc<MockLibraryIndex>, Router) {
        let library = library();
        let cache = Arc::new(FilePageCache::new(tmp.path().to_path_buf()));
        let router = router(&library, cache, &access(), tmp.path());
        (library, router)
    }

    #[tokio::test]
    async fn test_home_lists_first_packages() {
        let tmp = TempDir::new().unwrap();
        let (_, router) = uncached(&tmp);

        let response = get(&router, "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains(">alpha</a>"));
        assert!(body.contains(">beta</a>"));
        assert!(body.contains(">broken</a>"));
        assert!(!body.contains(">charlie</a>"));
    }

    #[tokio::test]
    async fn test_forbidden_package_is_rejected_without_rendering() {
        let tmp = TempDir::new().unwrap();
        let (library, router) = uncached(&tmp);

        let response = get(&router, "/gems/forbidden-gem").await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_text(response).await, "Cannot parse this gem");
        assert!(library.render_calls().is_empty());
    }

    #[tokio::test]
    async fn test_forbidden_package_rejected_under_every_prefix() {
        let tmp = TempDir::new().unwrap();
        let (library, router) = uncached(&tmp);

        for uri in [
            "/search/gems/forbidden-gem",
            "/list/gems/forbidden-gem/Foo",
            "/static/gems/forbidden-gem/",
        ] {
            let response = get(&router, uri).await;
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        }
        assert!(library.render_calls().is_empty());
    }

    #[tokio::test]
    async fn test_denied_name_unknown_to_index_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let library = Arc::new(MockLibraryIndex::new());
        let router = router(&library, Arc::new(NullPageCache), &access(), tmp.path());

        let response = get(&router, "/gems/forbidden-gem").await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_denied_name_rejected_when_index_fails() {
        let tmp = TempDir::new().unwrap();
        let router = router_with(
            Arc::new(UnavailableIndex),
            Arc::new(NullPageCache),
            &access(),
            tmp.path(),
        );

        let denied = get(&router, "/gems/forbidden-gem/Foo").await;
        assert_eq!(denied.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_text(denied).await, "Cannot parse this gem");

        let other = get(&router, "/gems/rails").await;
        assert_eq!(other.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_unknown_package_gets_dedicated_404() {
        let tmp = TempDir::new().unwrap();
        let (library, router) = uncached(&tmp);

        let response = get(&router, "/gems/unknown-package").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_text(response).await;
        assert!(body.contains("Gem Not Found"));
        assert!(body.contains("unknown-package"));
        assert!(library.render_calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_page_of_known_package_gets_dedicated_404() {
        let tmp = TempDir::new().unwrap();
        let (_, router) = uncached(&tmp);

        let response = get(&router, "/gems/rails/NoSuchClass").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Gem Not Found"));
    }

    #[tokio::test]
    async fn test_package_page_renders_in_safe_mode() {
        let tmp = TempDir::new().unwrap();
        let (library, router) = uncached(&tmp);

        let response = get(&router, "/gems/rails/ActiveRecord/Base").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert_eq!(body_text(response).await, "<h1>Base</h1>");
        assert_eq!(
            library.render_calls(),
            vec![RenderCall {
                package: "rails".to_owned(),
                path: "ActiveRecord/Base".to_owned(),
                safe_mode: true,
            }]
        );
    }

    #[tokio::test]
    async fn test_whitelisted_package_relaxes_only_its_own_request() {
        let tmp = TempDir::new().unwrap();
        let (library, router) = uncached(&tmp);

        assert_eq!(get(&router, "/gems/yard").await.status(), StatusCode::OK);
        assert_eq!(get(&router, "/gems/rails/").await.status(), StatusCode::OK);

        let modes: Vec<_> = library
            .render_calls()
            .into_iter()
            .map(|call| (call.package, call.safe_mode))
            .collect();
        assert_eq!(
            modes,
            vec![("yard".to_owned(), false), ("rails".to_owned(), true)]
        );
    }

    #[tokio::test]
    async fn test_whitelisted_project_relaxes_sandbox() {
        let tmp = TempDir::new().unwrap();
        let library = Arc::new(
            MockLibraryIndex::new()
                .with_package_ref(PackageRef::new("rspec-core").with_project("rspec/rspec"))
                .with_page("rspec-core", "", "<h1>RSpec</h1>"),
        );
        let access = AccessConfig {
            whitelisted_projects: vec!["rspec/rspec".to_owned()],
            ..AccessConfig::default()
        };
        let router = router(&library, Arc::new(NullPageCache), &access, tmp.path());

        assert_eq!(get(&router, "/gems/rspec-core").await.status(), StatusCode::OK);
        assert!(!library.render_calls()[0].safe_mode);
    }

    #[tokio::test]
    async fn test_doc_prefixes_render_same_package() {
        let tmp = TempDir::new().unwrap();
        let (library, router) = uncached(&tmp);

        for uri in [
            "/search/gems/rails/ActiveRecord/Base",
            "/list/gems/rails/ActiveRecord/Base",
            "/static/gems/rails/ActiveRecord/Base",
        ] {
            let response = get(&router, uri).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert_eq!(body_text(response).await, "<h1>Base</h1>");
        }
        assert_eq!(library.render_calls().len(), 3);
    }

    #[tokio::test]
    async fn test_renderer_failure_gets_generic_error_page() {
        let tmp = TempDir::new().unwrap();
        let (_, router) = uncached(&tmp);

        let response = get(&router, "/gems/broken").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(response).await;
        assert!(body.contains("Unknown Error!"));
        assert!(!body.contains("crashed"));
    }

    #[tokio::test]
    async fn test_listing_second_page() {
        let tmp = TempDir::new().unwrap();
        let library = Arc::new(
            MockLibraryIndex::new()
                .with_package("alpha")
                .with_package("beta")
                .with_package("charlie")
                .with_package("delta"),
        );
        let router = router(&library, Arc::new(NullPageCache), &access(), tmp.path());

        let response = get(&router, "/gems/2").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains(">charlie</a>"));
        assert!(body.contains(">delta</a>"));
        assert!(!body.contains(">alpha</a>"));
        assert!(body.contains("Page 2 of 2"));
    }

    #[tokio::test]
    async fn test_listing_trailing_slash() {
        let tmp = TempDir::new().unwrap();
        let (_, router) = uncached(&tmp);

        let response = get(&router, "/gems/").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("All Gems"));
        assert!(body.contains(">alpha</a>"));
    }

    #[tokio::test]
    async fn test_letter_listing() {
        let tmp = TempDir::new().unwrap();
        let (library, router) = uncached(&tmp);

        let response = get(&router, "/gems/~b").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains(">beta</a>"));
        assert!(body.contains(">broken</a>"));
        assert!(!body.contains(">alpha</a>"));
        assert!(library.render_calls().is_empty());
    }

    #[tokio::test]
    async fn test_listing_past_the_end_is_empty() {
        let tmp = TempDir::new().unwrap();
        let (_, router) = uncached(&tmp);

        let response = get(&router, "/gems/~r/9").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("No further gems."));
        assert!(body.contains("Page 9 of 1"));
    }

    #[tokio::test]
    async fn test_search() {
        let tmp = TempDir::new().unwrap();
        let (_, router) = cached(&tmp);

        let response = get(&router, "/find/gems?q=ar").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains(">charlie</a>"));
        assert!(!body.contains(">alpha</a>"));
        assert!(!tmp.path().join("find/gems.html").exists());
    }

    #[tokio::test]
    async fn test_search_with_garbage_page() {
        let tmp = TempDir::new().unwrap();
        let (_, router) = uncached(&tmp);

        let response = get(&router, "/find/gems?q=a&page=abc").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Page 1 of"));
    }

    #[tokio::test]
    async fn test_search_with_malformed_query_lists_everything() {
        let tmp = TempDir::new().unwrap();
        let (_, router) = uncached(&tmp);

        let response = get(&router, "/find/gems?q=ar&q=al").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        let body = body_text(response).await;
        assert!(body.contains(">alpha</a>"));
        assert!(body.contains("Page 1 of"));
    }

    #[tokio::test]
    async fn test_rendered_page_is_served_from_cache() {
        let tmp = TempDir::new().unwrap();
        let (library, router) = cached(&tmp);

        let first = get(&router, "/gems/rails").await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(
            first.headers()[header::CACHE_CONTROL],
            "public, must-revalidate, max-age=60"
        );
        assert!(first.headers().contains_key(header::LAST_MODIFIED));
        assert!(tmp.path().join("gems/rails.html").is_file());

        let second = get(&router, "/gems/rails/").await;
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(second.headers()[header::CACHE_CONTROL], "public");
        assert!(second.headers().contains_key(header::LAST_MODIFIED));
        assert_eq!(body_text(second).await, "<h1>Rails</h1>");

        assert_eq!(library.render_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_listing_and_home_are_cached() {
        let tmp = TempDir::new().unwrap();
        let (_, router) = cached(&tmp);

        get(&router, "/").await;
        get(&router, "/gems").await;
        get(&router, "/gems/~b/2").await;

        assert!(tmp.path().join("index.html").is_file());
        assert!(tmp.path().join("gems.html").is_file());
        assert!(tmp.path().join("gems/~b/2.html").is_file());
    }

    #[tokio::test]
    async fn test_conditional_get_on_cached_page() {
        let tmp = TempDir::new().unwrap();
        let (_, router) = cached(&tmp);
        get(&router, "/gems/rails").await;

        let fresh = request(
            &router,
            Request::builder()
                .uri("/gems/rails")
                .header(header::IF_MODIFIED_SINCE, "Fri, 01 Jan 2100 00:00:00 GMT"),
        )
        .await;
        assert_eq!(fresh.status(), StatusCode::NOT_MODIFIED);
        assert!(body_text(fresh).await.is_empty());

        let stale = request(
            &router,
            Request::builder()
                .uri("/gems/rails")
                .header(header::IF_MODIFIED_SINCE, "Sat, 01 Jan 2000 00:00:00 GMT"),
        )
        .await;
        assert_eq!(stale.status(), StatusCode::OK);
        assert_eq!(body_text(stale).await, "<h1>Rails</h1>");
    }

    #[tokio::test]
    async fn test_uncached_response_has_no_last_modified() {
        let tmp = TempDir::new().unwrap();
        let (_, router) = uncached(&tmp);

        let response = request(
            &router,
            Request::builder()
                .uri("/gems/rails")
                .header(header::IF_MODIFIED_SINCE, "Fri, 01 Jan 2100 00:00:00 GMT"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response.headers().contains_key(header::LAST_MODIFIED));
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, must-revalidate, max-age=60"
        );
    }

    #[tokio::test]
    async fn test_empty_body_expires_immediately() {
        let tmp = TempDir::new().unwrap();
        let (_, router) = cached(&tmp);

        let response = get(&router, "/gems/alpha/empty").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "max-age=0");
        assert!(!tmp.path().join("gems/alpha/empty.html").exists());
    }

    #[tokio::test]
    async fn test_static_pass_through() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("static/css")).unwrap();
        fs::write(tmp.path().join("static/css/style.css"), "body {}").unwrap();
        let (_, router) = cached(&tmp);

        let response = get(&router, "/static/css/style.css").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, max-age=30"
        );
        assert_eq!(body_text(response).await, "body {}");

        assert_eq!(
            get(&router, "/static/css/missing.css").await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_static_package_asset_skips_renderer() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("static/gems/rails/css")).unwrap();
        fs::write(tmp.path().join("static/gems/rails/css/rails.css"), "h1 {}").unwrap();
        let (library, router) = uncached(&tmp);

        let response = get(&router, "/static/gems/rails/css/rails.css").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "h1 {}");
        assert!(library.render_calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_route_is_generic_404() {
        let tmp = TempDir::new().unwrap();
        let (_, router) = uncached(&tmp);

        let response = get(&router, "/no/such/page").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Not Found"));
    }
}
