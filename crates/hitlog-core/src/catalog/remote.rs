use reqwest::header;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::normalize_names;
use crate::net::{FetchError, Fetcher, Request};

/// Version recorded when the remote payload does not carry one.
pub const DEFAULT_CATALOG_VERSION: i64 = 1;

/// The persisted catalog: `{ "version": 3, "exercises": ["Bench Press", ...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct CatalogCacheEntry {
    pub version: i64,
    pub exercises: Vec<String>,
}

impl CatalogCacheEntry {
    /// Parse a persisted entry. Anything that is not exactly an integer
    /// version plus an array of strings is rejected.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Validate and process a remote catalog body.
///
/// The body must be a JSON object with an array at `exercises`. Non-string
/// elements are skipped; a missing or non-integer `version` becomes
/// `DEFAULT_CATALOG_VERSION`.
pub fn parse_remote_catalog(body: &[u8]) -> Result<CatalogCacheEntry, FetchError> {
    let payload: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| FetchError::invalid_payload(format!("catalog is not JSON: {}", e)))?;

    let exercises = payload
        .get("exercises")
        .and_then(|v| v.as_array())
        .ok_or_else(|| FetchError::invalid_payload("catalog has no exercises array"))?;

    let version = payload
        .get("version")
        .and_then(|v| v.as_i64())
        .unwrap_or(DEFAULT_CATALOG_VERSION);

    Ok(CatalogCacheEntry {
        version,
        exercises: normalize_names(exercises.iter().filter_map(|v| v.as_str())),
    })
}

/// GET for the catalog that bypasses intermediary caches.
pub fn catalog_request(url: &Url) -> Request {
    Request::get(url.clone())
        .with_header(header::ACCEPT, "application/json")
        .with_header(header::CACHE_CONTROL, "no-cache")
        .with_header(header::PRAGMA, "no-cache")
}

/// Fetch and validate the remote catalog. Any failure (network, status,
/// payload) comes back as a `FetchError`.
pub async fn fetch_catalog(fetcher: &dyn Fetcher, url: &Url) -> Result<CatalogCacheEntry, FetchError> {
    let response = fetcher.fetch(&catalog_request(url)).await?;
    if !response.is_success() {
        return Err(FetchError::from_status(response.status, &response.text()));
    }
    let entry = parse_remote_catalog(&response.body)?;
    debug!(url = %url, version = entry.version, count = entry.exercises.len(), "Fetched exercise catalog");
    Ok(entry)
}
