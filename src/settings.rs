//! Viewer settings
//!
//! Loaded from `config.toml` in the platform config directory (or an explicit
//! `--config` path), then overridden by command-line flags and environment.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Cli;

/// Default base URL of the Firestore REST API
pub const DEFAULT_ENDPOINT_URL: &str = "https://firestore.googleapis.com/v1";

/// Default database id within a project
pub const DEFAULT_DATABASE_ID: &str = "(default)";

/// Default suffix appended to rendered balances
pub const DEFAULT_CURRENCY_SUFFIX: &str = "KRW";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors that can occur while loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Service-account key file (JSON)
    pub credential_path: Option<PathBuf>,

    /// Base URL of the document database REST API
    pub endpoint_url: String,

    /// Overrides the project id found in the key file
    pub project_id: Option<String>,

    /// Database id within the project
    pub database_id: String,

    /// Suffix shown after the balance (e.g. "KRW")
    pub currency_suffix: String,

    /// Per-request timeout; unset means the HTTP client's default
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credential_path: None,
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            project_id: None,
            database_id: DEFAULT_DATABASE_ID.to_string(),
            currency_suffix: DEFAULT_CURRENCY_SUFFIX.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl Settings {
    /// Platform default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "joybank-viewer")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load settings from `path`, or from the default location.
    ///
    /// An explicit path must exist. A missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(SettingsError::NotFound(path.to_path_buf()));
                }
                Self::load_from(path)
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => {
                    tracing::debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let settings = toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Apply command-line / environment overrides
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(path) = &cli.credential_path {
            self.credential_path = Some(path.clone());
        }
        if let Some(url) = &cli.endpoint_url {
            self.endpoint_url = url.clone();
        }
        if let Some(project_id) = &cli.project_id {
            self.project_id = Some(project_id.clone());
        }
    }

    pub fn request_timeout(&self) -> Option<std::time::Duration> {
        self.request_timeout_secs.map(std::time::Duration::from_secs)
    }
}
