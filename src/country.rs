//! Country directory module
//! Holds the session's country list and the lenient name lookup used to
//! reconcile snapshot country names with directory entries.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

/// Geographic position of a country's marker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees, [-90, 90]
    pub lat: f64,
    /// Longitude in degrees, [-180, 180]
    pub lng: f64,
}

/// A single known country
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryRecord {
    /// Display name, unique within a directory (e.g., "France")
    pub name: String,
    /// Flag emoji, empty when unknown
    pub emoji: String,
    pub region: Option<String>,
    pub coordinates: Option<Coordinates>,
}

impl CountryRecord {
    pub fn new(name: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emoji: emoji.into(),
            region: None,
            coordinates: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lng: f64) -> Self {
        self.coordinates = Some(Coordinates { lat, lng });
        self
    }
}

/// Currency entry of [`ExtendedFacts`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Supplementary country facts. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtendedFacts {
    #[serde(default, deserialize_with = "null_as_default")]
    pub capital: Vec<String>,
    #[serde(default)]
    pub population: Option<u64>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub subregion: Option<String>,
    /// Language code -> language name
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: BTreeMap<String, String>,
    /// Currency code -> currency
    #[serde(default, deserialize_with = "null_as_default")]
    pub currencies: BTreeMap<String, Currency>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timezones: Vec<String>,
}

impl ExtendedFacts {
    /// True when no field carries any information
    pub fn is_empty(&self) -> bool {
        self.capital.is_empty()
            && self.population.is_none()
            && self.region.is_none()
            && self.subregion.is_none()
            && self.languages.is_empty()
            && self.currencies.is_empty()
            && self.timezones.is_empty()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Raw directory value as found in `countries.json`
#[derive(Debug, Deserialize)]
struct DirectoryEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    flag: String,
    #[serde(default, deserialize_with = "null_as_default")]
    latlng: Vec<f64>,
    #[serde(default)]
    coordinates: Option<Coordinates>,
    #[serde(flatten)]
    facts: ExtendedFacts,
}

impl DirectoryEntry {
    fn into_parts(self, name: String) -> (CountryRecord, ExtendedFacts) {
        let coordinates = match self.latlng.as_slice() {
            [lat, lng] => Some(Coordinates { lat: *lat, lng: *lng }),
            _ => self.coordinates,
        };
        let record = CountryRecord {
            name,
            emoji: self.flag,
            region: self.facts.region.clone().filter(|r| !r.is_empty()),
            coordinates,
        };
        (record, self.facts)
    }
}

/// The session's country list, in document order.
///
/// Names are unique. Extended facts that came with the directory document are
/// kept alongside each record.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    records: Vec<CountryRecord>,
    facts: Vec<ExtendedFacts>,
}

impl Directory {
    /// Builds a directory from a JSON object keyed by country name.
    ///
    /// Values that are not objects, or that carry malformed fields, are skipped.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        let map: Map<String, Value> = serde_json::from_str(body)?;
        let mut directory = Directory::default();

        for (name, value) in map {
            match serde_json::from_value::<DirectoryEntry>(value) {
                Ok(entry) => {
                    let (record, facts) = entry.into_parts(name);
                    directory.records.push(record);
                    directory.facts.push(facts);
                }
                Err(e) => {
                    tracing::warn!("Skipping directory entry {:?}: {}", name, e);
                }
            }
        }

        Ok(directory)
    }

    /// Builds a directory from records; later duplicates of a name are dropped
    pub fn from_records(records: impl IntoIterator<Item = CountryRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut directory = Directory::default();
        for record in records {
            if !seen.insert(record.name.clone()) {
                tracing::warn!("Duplicate country name dropped: {}", record.name);
                continue;
            }
            directory.records.push(record);
            directory.facts.push(ExtendedFacts::default());
        }
        directory
    }

    pub fn records(&self) -> &[CountryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up a country by name with decreasing strictness:
    /// 1. exact name
    /// 2. case-insensitive name
    /// 3. first entry where either name contains the other (case-insensitive)
    ///
    /// The third tier is lenient on purpose and can match short names inside
    /// longer ones ("Chad" inside "Chadwick"). Blank input resolves to nothing.
    pub fn resolve(&self, name: &str) -> Option<&CountryRecord> {
        self.position(name).map(|i| &self.records[i])
    }

    /// Extended facts bundled with the entry [`Directory::resolve`] finds.
    /// Entries without any facts report `None`.
    pub fn facts_for(&self, name: &str) -> Option<&ExtendedFacts> {
        self.position(name)
            .map(|i| &self.facts[i])
            .filter(|facts| !facts.is_empty())
    }

    fn position(&self, name: &str) -> Option<usize> {
        if name.trim().is_empty() {
            return None;
        }

        if let Some(i) = self.records.iter().position(|r| r.name == name) {
            return Some(i);
        }

        let wanted = name.to_lowercase();
        if let Some(i) = self
            .records
            .iter()
            .position(|r| r.name.to_lowercase() == wanted)
        {
            return Some(i);
        }

        let found = self.records.iter().position(|r| {
            let candidate = r.name.to_lowercase();
            candidate.contains(&wanted) || wanted.contains(&candidate)
        });
        if found.is_none() {
            tracing::debug!("No directory entry for country: {}", name);
        }
        found
    }
}
