//! Data gateway for the flag of the day, the country directory and extended
//! country facts.
//!
//! Only the flag snapshot is required. The directory degrades to an empty
//! list and extended facts degrade to `None`, so a snapshot already in hand is
//! always displayable.

use crate::country::{CountryRecord, Directory, ExtendedFacts};
use crate::freshness::RequestGeneration;
use crate::projection::{MapFrame, MapMarker, ProjectionError};
use crate::source::{http_client, FlagCommand, Source};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;

/// Fields requested from the remote facts endpoint
const FACT_FIELDS: &str = "name,capital,population,region,subregion,languages,currencies,timezones";

/// Errors that can occur while talking to a data source
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{resource} returned HTTP {status}")]
    Status { resource: String, status: u16 },
    #[error("Could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed data in {resource}: {source}")]
    Parse {
        resource: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("No country name given")]
    MissingCountry,
    #[error("Flag change rejected: {0}")]
    Rejected(String),
    #[error("Not supported: {0}")]
    Unsupported(&'static str),
}

impl GatewayError {
    /// True for transport and data failures, the "source unavailable" class.
    /// Rejections and unsupported operations are answers, not outages.
    pub fn is_source_unavailable(&self) -> bool {
        !matches!(
            self,
            GatewayError::MissingCountry | GatewayError::Rejected(_) | GatewayError::Unsupported(_)
        )
    }
}

/// The current flag of the day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagSnapshot {
    /// Country name (e.g., "Norway")
    pub country: String,
    #[serde(default)]
    pub emoji: String,
    /// When the flag was last changed, as written by the service
    #[serde(default)]
    pub timestamp: String,
    /// Free text carrying a "Capital: X" label
    #[serde(default)]
    pub info: Option<String>,
}

impl FlagSnapshot {
    /// Capital taken from the `info` label, if any
    pub fn capital(&self) -> Option<String> {
        self.info
            .as_deref()
            .map(|info| info.replacen("Capital: ", "", 1).trim().to_string())
            .filter(|capital| !capital.is_empty())
    }
}

/// Document locations relative to the source root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resources {
    pub flag: String,
    pub directory: String,
    pub change: String,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            flag: "static/data/flag.json".to_string(),
            directory: "static/data/countries.json".to_string(),
            change: "change-flag".to_string(),
        }
    }
}

/// REST Countries style endpoint: `GET {base}/{name}?fields=...` -> `[facts, ...]`
#[derive(Debug, Clone)]
pub struct RemoteFacts {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteFacts {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into(),
        })
    }

    async fn fetch(&self, country: &str) -> Result<Option<ExtendedFacts>, GatewayError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| GatewayError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push(country);

        let response = self
            .client
            .get(url)
            .query(&[("fields", FACT_FIELDS)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                resource: format!("facts for {}", country),
                status: status.as_u16(),
            });
        }

        // The first result is usually the exact match
        let matches: Vec<ExtendedFacts> = response.json().await?;
        Ok(matches.into_iter().next())
    }
}

/// Snapshot plus whatever could be found about its country
#[derive(Debug, Clone, PartialEq)]
pub struct Today {
    pub snapshot: FlagSnapshot,
    /// Directory entry the snapshot's country resolved to
    pub record: Option<CountryRecord>,
    pub facts: Option<ExtendedFacts>,
}

/// Session-scoped access to the flag service data.
///
/// The country directory is fetched at most once successfully per gateway and
/// shared read-only afterwards.
pub struct DataGateway<S> {
    source: S,
    resources: Resources,
    remote_facts: Option<RemoteFacts>,
    directory: OnceCell<Arc<Directory>>,
    /// Tickets for selection-driven fact lookups
    selection: RequestGeneration,
}

impl<S: Source> DataGateway<S> {
    pub fn new(source: S, resources: Resources) -> Self {
        Self {
            source,
            resources,
            remote_facts: None,
            directory: OnceCell::new(),
            selection: RequestGeneration::new(),
        }
    }

    /// Consults `remote` for countries the directory knows nothing about
    pub fn with_remote_facts(mut self, remote: RemoteFacts) -> Self {
        self.remote_facts = Some(remote);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches the current flag of the day. No retry.
    pub async fn load_flag_snapshot(&self) -> Result<FlagSnapshot, GatewayError> {
        let resource = &self.resources.flag;
        let body = self.source.read(resource).await?;
        let snapshot: FlagSnapshot =
            serde_json::from_str(&body).map_err(|source| GatewayError::Parse {
                resource: resource.clone(),
                source,
            })?;
        tracing::debug!("Flag of the day: {} {}", snapshot.country, snapshot.emoji);
        Ok(snapshot)
    }

    /// Returns the session directory, loading it on first use.
    ///
    /// A failed load yields an empty directory and is retried on the next call.
    pub async fn load_country_directory(&self) -> Arc<Directory> {
        match self.directory.get_or_try_init(|| self.fetch_directory()).await {
            Ok(directory) => directory.clone(),
            Err(e) => {
                tracing::warn!("Country directory unavailable: {}", e);
                Arc::new(Directory::default())
            }
        }
    }

    async fn fetch_directory(&self) -> Result<Arc<Directory>, GatewayError> {
        let resource = &self.resources.directory;
        let body = self.source.read(resource).await?;
        let directory = Directory::from_json(&body).map_err(|source| GatewayError::Parse {
            resource: resource.clone(),
            source,
        })?;
        tracing::info!("Loaded {} countries", directory.len());
        Ok(Arc::new(directory))
    }

    /// Best-effort extended facts for `country`.
    ///
    /// Directory entries are preferred; the remote endpoint, when configured,
    /// covers the rest. Every failure is logged and turned into `None`.
    pub async fn load_extended_facts(&self, country: &str) -> Option<ExtendedFacts> {
        let directory = self.load_country_directory().await;
        self.facts_in(&directory, country).await
    }

    /// Extended facts for the country the user just selected.
    ///
    /// Each call supersedes the previous ones: the outer `None` means a newer
    /// selection was made before this lookup finished, so its result must not
    /// be shown. The inner value is [`DataGateway::load_extended_facts`].
    pub fn load_selected_facts<'a>(
        &'a self,
        country: &'a str,
    ) -> impl Future<Output = Option<Option<ExtendedFacts>>> + 'a {
        self.selection.run(self.load_extended_facts(country))
    }

    async fn facts_in(&self, directory: &Directory, country: &str) -> Option<ExtendedFacts> {
        if let Some(facts) = directory.facts_for(country) {
            return Some(facts.clone());
        }

        let remote = self.remote_facts.as_ref()?;
        match remote.fetch(country).await {
            Ok(facts) => facts,
            Err(e) => {
                tracing::warn!("Extended facts for {} unavailable: {}", country, e);
                None
            }
        }
    }

    /// Loads the snapshot and, alongside it, the directory; then looks up the
    /// snapshot's country. Only a snapshot failure is an error.
    pub async fn load_today(&self) -> Result<Today, GatewayError> {
        let (snapshot, directory) = futures_util::future::join(
            self.load_flag_snapshot(),
            self.load_country_directory(),
        )
        .await;
        let snapshot = snapshot?;

        let record = directory.resolve(&snapshot.country).cloned();
        let facts = self.facts_in(&directory, &snapshot.country).await;

        Ok(Today {
            snapshot,
            record,
            facts,
        })
    }

    /// Resolves `country` through the directory and places it on `frame`.
    ///
    /// `Ok(None)` means the country or its coordinates are unknown.
    pub async fn locate(
        &self,
        country: &str,
        frame: MapFrame,
    ) -> Result<Option<MapMarker>, ProjectionError> {
        let directory = self.load_country_directory().await;
        let Some(record) = directory.resolve(country) else {
            tracing::warn!("No coordinates found for country: {}", country);
            return Ok(None);
        };
        let Some(coordinates) = record.coordinates else {
            tracing::debug!("{} has no coordinates", record.name);
            return Ok(None);
        };
        frame
            .marker(&record.name, coordinates.lat, coordinates.lng)
            .map(Some)
    }
}

impl<S: Source + FlagCommand> DataGateway<S> {
    /// Asks the service to switch the flag and returns its confirmation text
    pub async fn change_flag(&self, country: &str) -> Result<String, GatewayError> {
        let country = country.trim();
        if country.is_empty() {
            return Err(GatewayError::MissingCountry);
        }
        let reply = self.source.submit(&self.resources.change, country).await?;
        tracing::info!("Flag change to {} accepted: {}", country, reply);
        Ok(reply)
    }
}
