//! Configuration management for gemdocs.
//!
//! Parses `gemdocs.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories. Every recognized
//! option is a typed field; unknown keys are rejected at load time.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `name`
//! - `url`
//! - `server.host`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override environment name.
    pub environment: Option<String>,
    /// Override caching flag.
    pub cache_enabled: Option<bool>,
    /// Override public (cache and static asset) directory.
    pub public_dir: Option<PathBuf>,
    /// Override libraries directory.
    pub libraries_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "gemdocs.toml";

/// Environments in which the page cache may be enabled.
const CACHING_ENVIRONMENTS: [&str; 2] = ["staging", "production"];

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Environment name (e.g., "development", "staging", "production").
    pub environment: String,
    /// Site name shown in page titles.
    pub name: String,
    /// Public base URL of the site.
    pub url: String,
    /// Whether rendered pages are cached to disk.
    ///
    /// Only honored in staging and production, see [`Config::caching_enabled`].
    pub caching: bool,
    /// Disable the library integration entirely.
    pub disable_gems: bool,
    /// Public directory (relative string from TOML).
    public_dir: Option<String>,
    /// Libraries directory (relative string from TOML).
    libraries_dir: Option<String>,
    /// Server configuration.
    pub server: ServerConfig,
    /// Access control lists.
    pub access: AccessConfig,
    /// Listing and pagination configuration.
    pub listing: ListingConfig,

    /// Resolved paths (set after loading).
    #[serde(skip)]
    pub paths: PathsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

/// Access control lists.
///
/// A project is a coarser grouping than a single package. Deny lists always
/// take precedence over the whitelists.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AccessConfig {
    /// Packages that are never served.
    pub disallowed_gems: Vec<String>,
    /// Projects whose packages are never served.
    pub disallowed_projects: Vec<String>,
    /// Packages rendered with the safe-mode sandbox disabled.
    pub whitelisted_gems: Vec<String>,
    /// Projects whose packages are rendered with the sandbox disabled.
    pub whitelisted_projects: Vec<String>,
}

/// Listing and pagination configuration.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ListingConfig {
    /// Number of packages per listing or search page.
    pub page_size: usize,
    /// Number of packages shown on the home page.
    pub featured_count: usize,
    /// Package names to feature on the home page, in display order.
    pub featured: Vec<String>,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            featured_count: 10,
            featured: Vec::new(),
        }
    }
}

/// Resolved filesystem paths.
#[derive(Debug, Default)]
pub struct PathsConfig {
    /// Directory holding cached pages and static assets.
    pub public_dir: PathBuf,
    /// Directory holding one rendered documentation tree per package.
    pub libraries_dir: PathBuf,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error (including unknown keys).
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`GEMDOCS_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `gemdocs.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Whether the page cache is effectively enabled.
    ///
    /// Caching must be switched on and the environment must be staging or
    /// production; development servers never cache.
    #[must_use]
    pub fn caching_enabled(&self) -> bool {
        self.caching && CACHING_ENVIRONMENTS.contains(&self.environment.as_str())
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(environment) = &settings.environment {
            self.environment.clone_from(environment);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.caching = cache_enabled;
        }
        if let Some(public_dir) = &settings.public_dir {
            self.paths.public_dir.clone_from(public_dir);
        }
        if let Some(libraries_dir) = &settings.libraries_dir {
            self.paths.libraries_dir.clone_from(libraries_dir);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            environment: "production".to_owned(),
            name: "RubyDoc.info".to_owned(),
            url: "https://www.rubydoc.info".to_owned(),
            caching: false,
            disable_gems: false,
            public_dir: None,
            libraries_dir: None,
            server: ServerConfig::default(),
            access: AccessConfig::default(),
            listing: ListingConfig::default(),
            paths: PathsConfig {
                public_dir: base.join("public"),
                libraries_dir: base.join("libraries"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after applying
    /// CLI settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.environment, "environment")?;
        require_non_empty(&self.url, "url")?;
        require_http_url(&self.url, "url")?;
        self.validate_server()?;

        if self.listing.page_size == 0 {
            return Err(ConfigError::Validation(
                "listing.page_size must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 is technically valid (OS assigns a random port), but it's
        // unlikely to be intentional in a config file
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.name = expand::expand_env(&self.name, "name")?;
        self.url = expand::expand_env(&self.url, "url")?;
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.paths = PathsConfig {
            public_dir: resolve(self.public_dir.as_deref(), "public"),
            libraries_dir: resolve(self.libraries_dir.as_deref(), "libraries"),
        };
    }
}
