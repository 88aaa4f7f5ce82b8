//! Configuration module
//! Settings come from `config.json` in the user's config directory, or from an
//! explicit path, with environment overrides on top.

use crate::gateway::{DataGateway, GatewayError, RemoteFacts, Resources};
use crate::matcher::DEFAULT_SUGGESTION_LIMIT;
use crate::projection::MapFrame;
use crate::source::{AnySource, FileSource, HttpSource};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const APP_NAME: &str = "flagday";
const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_BASE_URL: &str = "http://localhost:5001";

/// Overrides the configured source with a web service
pub const ENV_BASE_URL: &str = "FLAGDAY_BASE_URL";
/// Overrides the configured source with a local data directory
pub const ENV_DATA_DIR: &str = "FLAGDAY_DATA_DIR";

/// Errors while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Where flag data comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSettings {
    /// Flag web service
    Http { base_url: String },
    /// Directory holding a copy of the service's documents
    Local { dir: PathBuf },
}

impl Default for SourceSettings {
    fn default() -> Self {
        SourceSettings::Http {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub resources: Resources,
    /// REST Countries style endpoint for countries missing from the directory
    pub facts_url: Option<String>,
    /// Maximum number of autocomplete suggestions
    pub suggestion_limit: usize,
    /// Size of the world map image markers are placed on
    pub map: MapFrame,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: SourceSettings::default(),
            resources: Resources::default(),
            facts_url: None,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            map: MapFrame::default(),
            request_timeout_secs: 10,
        }
    }
}

/// Default location of the configuration file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_NAME).join(CONFIG_FILENAME))
}

impl Settings {
    /// Loads settings.
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// when present and built-in defaults otherwise. Environment overrides are
    /// applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    tracing::debug!("No configuration file, using defaults");
                    Settings::default()
                }
            },
        };
        settings.apply_overrides(
            std::env::var(ENV_BASE_URL).ok(),
            std::env::var(ENV_DATA_DIR).ok(),
        );
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded configuration from {:?}", path);
        Ok(settings)
    }

    /// A data directory wins over a base URL when both are given
    fn apply_overrides(&mut self, base_url: Option<String>, data_dir: Option<String>) {
        if let Some(base_url) = base_url.filter(|v| !v.trim().is_empty()) {
            self.source = SourceSettings::Http { base_url };
        }
        if let Some(dir) = data_dir.filter(|v| !v.trim().is_empty()) {
            self.source = SourceSettings::Local { dir: dir.into() };
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Builds the session gateway these settings describe
    pub fn gateway(&self) -> Result<DataGateway<AnySource>, GatewayError> {
        let source = match &self.source {
            SourceSettings::Http { base_url } => {
                AnySource::Http(HttpSource::new(base_url.clone(), self.request_timeout())?)
            }
            SourceSettings::Local { dir } => AnySource::Local(FileSource::new(dir.clone())),
        };

        let mut gateway = DataGateway::new(source, self.resources.clone());
        if let Some(url) = &self.facts_url {
            let remote = RemoteFacts::new(url.clone(), self.request_timeout())?;
            gateway = gateway.with_remote_facts(remote);
        }
        Ok(gateway)
    }
}
