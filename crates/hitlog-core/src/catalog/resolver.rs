use std::collections::BTreeSet;
use std::sync::Arc;

use reqwest::Url;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::fallback::fallback_exercises;
use super::normalize_names;
use super::remote::{fetch_catalog, CatalogCacheEntry};
use crate::models::WorkoutRecord;
use crate::net::{FetchError, Fetcher};
use crate::store::KeyValueStore;

/// Store key of the persisted catalog entry.
pub const CATALOG_CACHE_KEY: &str = "hitlog.exerciseCatalog";

type RefreshResult = Result<CatalogCacheEntry, FetchError>;

/// Where the current base list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseSource {
    Fallback,
    Cached,
    Remote,
}

/// Owns the base exercise list and reconciles it with the local cache and the
/// remote catalog.
///
/// Startup is `hydrate` (synchronous, from the store) followed by a refresh.
/// Refresh results are authoritative: once one has been applied, `hydrate`
/// no longer touches the base list.
pub struct CatalogResolver {
    store: Arc<dyn KeyValueStore>,
    fallback: Vec<String>,
    base: Vec<String>,
    source: BaseSource,
    loading: bool,
    last_error: Option<String>,
    refresh_applied: bool,

    // Background refresh channel
    refresh_rx: mpsc::Receiver<RefreshResult>,
    refresh_tx: mpsc::Sender<RefreshResult>,
    pending_refreshes: usize,
}

impl CatalogResolver {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_fallback(store, fallback_exercises())
    }

    pub fn with_fallback(store: Arc<dyn KeyValueStore>, fallback: Vec<String>) -> Self {
        let fallback = normalize_names(&fallback);
        let (tx, rx) = mpsc::channel(4);
        Self {
            store,
            base: fallback.clone(),
            fallback,
            source: BaseSource::Fallback,
            loading: true,
            last_error: None,
            refresh_applied: false,
            refresh_rx: rx,
            refresh_tx: tx,
            pending_refreshes: 0,
        }
    }

    /// Adopt the cached catalog, if one is stored and well-formed.
    ///
    /// Returns whether the base list changed. Loading stays `true` because a
    /// refresh is still expected.
    pub fn hydrate(&mut self) -> bool {
        if self.refresh_applied {
            debug!("Catalog refresh already applied, skipping hydrate");
            return false;
        }

        let raw = match self.store.get(CATALOG_CACHE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(e) => {
                warn!(error = %e, "Failed to read cached exercise catalog");
                return false;
            }
        };

        match CatalogCacheEntry::from_json(&raw) {
            Ok(entry) => {
                self.base = normalize_names(&entry.exercises);
                self.source = BaseSource::Cached;
                debug!(version = entry.version, count = self.base.len(), "Hydrated exercise catalog");
                true
            }
            Err(e) => {
                warn!(error = %e, "Ignoring corrupt cached exercise catalog");
                false
            }
        }
    }

    /// Spawn a refresh on the runtime. The result is delivered to
    /// `poll_refresh` / `wait_refresh`.
    pub fn start_refresh(&mut self, fetcher: Arc<dyn Fetcher>, url: Url) -> JoinHandle<()> {
        let tx = self.refresh_tx.clone();
        self.pending_refreshes += 1;
        self.loading = true;

        tokio::spawn(async move {
            let result = fetch_catalog(fetcher.as_ref(), &url).await;
            if tx.send(result).await.is_err() {
                debug!("Catalog resolver dropped before refresh completed");
            }
        })
    }

    /// Apply any refresh results that have already arrived. Never blocks.
    pub fn poll_refresh(&mut self) -> bool {
        let mut results = Vec::new();
        while let Ok(result) = self.refresh_rx.try_recv() {
            results.push(result);
        }

        let applied = !results.is_empty();
        for result in results {
            self.pending_refreshes = self.pending_refreshes.saturating_sub(1);
            self.apply_refresh(result);
        }
        applied
    }

    /// Wait for the next background refresh and apply it. Returns `false`
    /// when none is in flight.
    pub async fn wait_refresh(&mut self) -> bool {
        if self.pending_refreshes == 0 {
            return false;
        }
        match self.refresh_rx.recv().await {
            Some(result) => {
                self.pending_refreshes -= 1;
                self.apply_refresh(result);
                true
            }
            None => false,
        }
    }

    /// Fetch the remote catalog inline and apply the outcome.
    pub async fn refresh(&mut self, fetcher: &dyn Fetcher, url: &Url) {
        self.loading = true;
        let result = fetch_catalog(fetcher, url).await;
        self.apply_refresh(result);
    }

    /// Fold a refresh outcome into the resolver state.
    pub fn apply_refresh(&mut self, result: RefreshResult) {
        match result {
            Ok(entry) => {
                match serde_json::to_string(&entry) {
                    Ok(json) => {
                        if let Err(e) = self.store.set(CATALOG_CACHE_KEY, &json) {
                            warn!(error = %e, "Failed to cache exercise catalog");
                        }
                    }
                    Err(e) => warn!(error = %e, "Failed to serialize exercise catalog"),
                }
                info!(version = entry.version, count = entry.exercises.len(), "Exercise catalog refreshed");
                self.base = entry.exercises;
                self.source = BaseSource::Remote;
                self.last_error = None;
            }
            Err(e) => {
                warn!(error = %e, "Exercise catalog refresh failed");
                self.last_error = Some(e.to_string());
                match self.store.get(CATALOG_CACHE_KEY) {
                    Ok(None) => {
                        self.base = self.fallback.clone();
                        self.source = BaseSource::Fallback;
                    }
                    Ok(Some(_)) => {}
                    Err(e) => warn!(error = %e, "Failed to read cached exercise catalog"),
                }
            }
        }
        self.loading = false;
        self.refresh_applied = true;
    }

    /// The base list merged with every name in `history`.
    pub fn merged(&self, history: &[WorkoutRecord]) -> Vec<String> {
        merge_catalog(&self.base, history)
    }

    pub fn base(&self) -> &[String] {
        &self.base
    }

    pub fn source(&self) -> BaseSource {
        self.source
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Advisory text for the UI when the last refresh failed.
    pub fn notice(&self) -> Option<String> {
        self.last_error.as_ref()?;
        let using = match self.source {
            BaseSource::Fallback => "built-in list",
            BaseSource::Cached | BaseSource::Remote => "cached list",
        };
        Some(format!("Exercise database refresh failed, using {}", using))
    }
}

/// Sorted union of `base` and every set name in `history`.
///
/// History names are kept verbatim so anything the user logged can be picked
/// again; only blank names are skipped.
pub fn merge_catalog(base: &[String], history: &[WorkoutRecord]) -> Vec<String> {
    let mut names: BTreeSet<String> = base.iter().cloned().collect();
    for set in history.iter().flat_map(|w| w.sets.iter()) {
        if !set.name.trim().is_empty() {
            names.insert(set.name.clone());
        }
    }
    names.into_iter().collect()
}
