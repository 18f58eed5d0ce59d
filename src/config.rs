//! Application configuration management.
//!
//! Settings are layered with figment, lowest priority first:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. `config.toml` in the platform config directory (or `--config PATH`)
//! 3. `UTILBOX_*` environment variables (e.g. `UTILBOX_IO_THREADS=8`)
//! 4. Command-line flags, applied by the caller on top of the result

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "UTILBOX_";

/// Errors raised while loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("Failed to determine project directories")]
    NoConfigDir,

    /// A layer could not be parsed or had the wrong shape.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// The file could not be written.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// File being written
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration could not be serialized.
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default minimum size (bytes, inclusive) for duplicate scans.
    pub min_size: u64,
    /// Default maximum size (bytes, inclusive) for duplicate scans.
    pub max_size: Option<u64>,
    /// Hashing thread count.
    pub io_threads: usize,
    /// Skip dot-files and dot-directories during scans.
    pub skip_hidden: bool,
    /// Follow symbolic links during scans.
    pub follow_symlinks: bool,
    /// Gitignore-style patterns always ignored by scans.
    pub ignore_patterns: Vec<String>,
    /// Default depth for `utils tree`.
    pub tree_depth: usize,
    /// Default depth for `files diskusage`.
    pub disk_usage_depth: usize,
    /// Hosts file shown by `admin hosts`.
    pub hosts_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_size: 0,
            max_size: None,
            io_threads: 4,
            skip_hidden: false,
            follow_symlinks: false,
            ignore_patterns: Vec::new(),
            tree_depth: 2,
            disk_usage_depth: 1,
            hosts_file: default_hosts_file(),
        }
    }
}

fn default_hosts_file() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\Windows\System32\drivers\etc\hosts")
    } else {
        PathBuf::from("/etc/hosts")
    }
}

impl Config {
    /// Load from the default location, falling back to defaults on error.
    ///
    /// A missing file is not an error. A broken file or bad environment
    /// value is logged as a warning and the defaults are used instead.
    #[must_use]
    pub fn load() -> Self {
        let path = match Self::config_path() {
            Ok(path) => Some(path),
            Err(e) => {
                log::debug!("{}, using defaults and environment only", e);
                None
            }
        };

        match Self::figment(path.as_deref()).extract() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Load from a specific file (plus environment overrides).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the file or an environment
    /// variable cannot be parsed.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        Self::figment(Some(path))
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// The figment used by [`load`](Self::load): defaults, then `path` if it exists, then env.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            if path.exists() {
                log::debug!("Loading config from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Write this configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The default platform-specific configuration path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] when no home directory is known.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let project_dirs =
            ProjectDirs::from("com", "utilbox", "utilbox").ok_or(ConfigError::NoConfigDir)?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }
}
