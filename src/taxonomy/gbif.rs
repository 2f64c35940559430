//! GBIF species API client.

use super::{TaxonRecord, TaxonomyLookup};
use crate::config::TaxonomyConfig;
use crate::constants::taxonomy::CONNECT_TIMEOUT_SECS;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Client for `/species/match` and `/species/{key}/vernacularNames`.
#[derive(Debug, Clone)]
pub struct GbifClient {
    client: Client,
    base_url: String,
    language: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpeciesMatch {
    usage_key: Option<u64>,
    scientific_name: Option<String>,
    rank: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VernacularNames {
    #[serde(default)]
    results: Vec<VernacularName>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VernacularName {
    vernacular_name: String,
    #[serde(default)]
    language: String,
}

impl GbifClient {
    /// Build a client from the taxonomy configuration.
    pub fn from_config(config: &TaxonomyConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Internal {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Option<T> {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("GBIF request to {url} failed: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!("GBIF request to {url} returned HTTP {}", response.status());
            return None;
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read GBIF response from {url}: {e}");
                return None;
            }
        };

        if body.is_empty() {
            return None;
        }

        serde_json::from_slice(&body)
            .inspect_err(|e| warn!("Unparsable GBIF response from {url}: {e}"))
            .ok()
    }

    async fn vernacular_name(&self, usage_key: u64) -> Option<String> {
        let url = Url::parse(&format!(
            "{}/species/{usage_key}/vernacularNames",
            self.base_url
        ))
        .inspect_err(|e| warn!("Invalid GBIF base URL '{}': {e}", self.base_url))
        .ok()?;

        let names: VernacularNames = self.get_json(url).await?;
        pick_vernacular(&names.results, &self.language)
    }
}

#[async_trait]
impl TaxonomyLookup for GbifClient {
    async fn lookup(&self, name: &str) -> Option<TaxonRecord> {
        let url = Url::parse_with_params(
            &format!("{}/species/match", self.base_url),
            &[("name", name)],
        )
        .inspect_err(|e| warn!("Invalid GBIF base URL '{}': {e}", self.base_url))
        .ok()?;

        let matched: SpeciesMatch = self.get_json(url).await?;

        let vernacular_name = match matched.usage_key {
            Some(key) => self.vernacular_name(key).await,
            None => None,
        };

        debug!(
            "GBIF: {name} -> {:?} ({:?}), vernacular {:?}",
            matched.scientific_name, matched.rank, vernacular_name
        );

        Some(TaxonRecord {
            scientific_name: matched.scientific_name,
            rank: matched.rank,
            vernacular_name,
        })
    }
}

/// First vernacular name in `language` (ISO 639-2, case-insensitive).
fn pick_vernacular(names: &[VernacularName], language: &str) -> Option<String> {
    names
        .iter()
        .find(|n| n.language.eq_ignore_ascii_case(language))
        .map(|n| n.vernacular_name.clone())
}
