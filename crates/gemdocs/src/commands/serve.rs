//! `gemdocs serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use gemdocs_config::{CliSettings, Config};
use gemdocs_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover gemdocs.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Environment name: development, staging or production (overrides config).
    #[arg(short, long, env = "GEMDOCS_ENV")]
    environment: Option<String>,

    /// Directory for cached pages and static assets (overrides config).
    #[arg(long)]
    public_dir: Option<PathBuf>,

    /// Directory of rendered package documentation (overrides config).
    #[arg(long)]
    libraries_dir: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable the page cache (effective in staging and production only).
    #[arg(long)]
    cache: bool,

    /// Disable the page cache.
    #[arg(long, conflicts_with = "cache")]
    no_cache: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            cache_enabled: self.resolve_cache_enabled(),
            host: self.host,
            port: self.port,
            environment: self.environment,
            public_dir: self.public_dir,
            libraries_dir: self.libraries_dir,
        };

        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(
            config_path = ?config.config_path,
            environment = %config.environment,
            caching = config.caching_enabled(),
            "Loaded configuration"
        );

        output.info(&format!(
            "Starting {} server on {}:{} ({})",
            config.name, config.server.host, config.server.port, config.environment
        ));

        if config.disable_gems {
            output.info("Gem documentation: disabled");
        } else {
            output.info(&format!(
                "Libraries directory: {}",
                config.paths.libraries_dir.display()
            ));
            if !config.paths.libraries_dir.is_dir() {
                output.warning("Libraries directory does not exist; no gems will be listed");
            }
        }

        if config.caching_enabled() {
            std::fs::create_dir_all(&config.paths.public_dir)?;
            output.info(&format!(
                "Page cache: {}",
                config.paths.public_dir.display()
            ));
        } else if config.caching {
            output.info(&format!(
                "Page cache: disabled in {} environment",
                config.environment
            ));
        } else {
            output.info("Page cache: disabled");
        }

        let server_config = server_config_from_config(&config);
        run_server(server_config).await.map_err(|e| {
            tracing::error!(error = %e, "Server failed");
            CliError::Server(e.to_string())
        })?;

        Ok(())
    }

    /// Resolve `cache_enabled` from --cache/--no-cache flags.
    fn resolve_cache_enabled(&self) -> Option<bool> {
        if self.no_cache {
            Some(false)
        } else {
            self.cache.then_some(true)
        }
    }
}
