//! HTTP server for the gemdocs documentation site.
//!
//! Serves package documentation produced by a [`LibraryIndex`], together with
//! alphabetic listings, search and static assets. Rendered pages are written
//! to a [`PageCache`] so repeat requests skip the renderer entirely.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use gemdocs_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         libraries_dir: Some(PathBuf::from("libraries")),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum router (gemdocs-server)
//!                        │
//!                        ├─► conditional GET / empty body / page cache
//!                        │       │
//!                        │       └─► hit ──► {public_dir}/{path}.html
//!                        │
//!                        ├─► access policy ──► LibraryIndex::render
//!                        │
//!                        └─► static files from {public_dir}/static
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod policy;
mod state;
mod static_files;
mod views;

pub use policy::{AccessPolicy, PolicyDecision};

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use gemdocs_cache::{FilePageCache, NullPageCache, PageCache};
use gemdocs_config::{AccessConfig, ListingConfig};
use gemdocs_library::{FsLibraryIndex, LibraryIndex, NullLibraryIndex};
use state::AppState;
use views::SiteInfo;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Site name shown in page layouts.
    pub site_name: String,
    /// Public base URL of the site.
    pub url: String,
    /// Directory for cached pages and static assets.
    pub public_dir: PathBuf,
    /// Rendered documentation trees (`None` serves no packages).
    pub libraries_dir: Option<PathBuf>,
    /// Whether rendered pages are written to the page cache.
    pub caching: bool,
    /// Per-package access lists.
    pub access: AccessConfig,
    /// Pagination and featured packages.
    pub listing: ListingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            site_name: "RubyDoc.info".to_owned(),
            url: "https://www.rubydoc.info".to_owned(),
            public_dir: PathBuf::from("public"),
            libraries_dir: None,
            caching: false,
            access: AccessConfig::default(),
            listing: ListingConfig::default(),
        }
    }
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the address is invalid or the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    let app = app::create_router(Arc::new(build_state(config)));

    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Assemble handler state from configuration.
fn build_state(config: ServerConfig) -> AppState {
    let library: Arc<dyn LibraryIndex> = match &config.libraries_dir {
        Some(dir) => Arc::new(FsLibraryIndex::new(dir.clone())),
        None => Arc::new(NullLibraryIndex),
    };

    let cache: Arc<dyn PageCache> = if config.caching {
        tracing::info!(dir = %config.public_dir.display(), "Page cache enabled");
        Arc::new(FilePageCache::new(config.public_dir.clone()))
    } else {
        Arc::new(NullPageCache)
    };

    AppState {
        library,
        cache,
        policy: AccessPolicy::new(&config.access),
        site: SiteInfo {
            name: config.site_name,
            url: config.url,
        },
        listing: config.listing,
        public_dir: config.public_dir,
    }
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from gemdocs config.
///
/// Packages are only served when `disable_gems` is off, and the page cache
/// is only used when caching is effectively enabled for the environment.
#[must_use]
pub fn server_config_from_config(config: &gemdocs_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        site_name: config.name.clone(),
        url: config.url.clone(),
        public_dir: config.paths.public_dir.clone(),
        libraries_dir: (!config.disable_gems).then(|| config.paths.libraries_dir.clone()),
        caching: config.caching_enabled(),
        access: config.access.clone(),
        listing: config.listing.clone(),
    }
}
