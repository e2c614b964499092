//! Request classification for the cache controller.

use reqwest::Url;

use crate::net::Request;

/// Decides whether a URL is a static asset served stale-while-revalidate.
pub trait AssetClassifier: Send + Sync {
    fn is_asset(&self, url: &Url) -> bool;
}

impl<F> AssetClassifier for F
where
    F: Fn(&Url) -> bool + Send + Sync,
{
    fn is_asset(&self, url: &Url) -> bool {
        self(url)
    }
}

/// Path-based asset rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRules {
    /// Bundle output directories, e.g. `/src/` for a dev server or `/assets/`.
    pub path_prefixes: Vec<String>,
    pub extensions: Vec<String>,
    pub well_known_prefix: String,
}

impl Default for AssetRules {
    fn default() -> Self {
        Self {
            path_prefixes: vec!["/src/".to_string()],
            extensions: [".js", ".css", ".png", ".jpg", ".jpeg", ".svg", ".webmanifest"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            well_known_prefix: "/.well-known/".to_string(),
        }
    }
}

impl AssetRules {
    pub fn with_prefixes(prefixes: Vec<String>) -> Self {
        Self {
            path_prefixes: prefixes,
            ..Self::default()
        }
    }
}

impl AssetClassifier for AssetRules {
    fn is_asset(&self, url: &Url) -> bool {
        let path = url.path();
        self.path_prefixes.iter().any(|p| path.starts_with(p.as_str()))
            || self.extensions.iter().any(|e| path.ends_with(e.as_str()))
            || path.starts_with(self.well_known_prefix.as_str())
    }
}

/// Caching strategy chosen for an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// HTML documents: network-first with write-back.
    Document,
    /// Static assets: stale-while-revalidate.
    Asset,
    /// Everything else: network-first, cache fallback, no write-back.
    Network,
}

/// Pick the route for a request. `None` means the request is not intercepted.
pub fn route(request: &Request, classifier: &dyn AssetClassifier) -> Option<Route> {
    if !request.is_get() {
        return None;
    }
    if request.accepts_html() {
        Some(Route::Document)
    } else if classifier.is_asset(&request.url) {
        Some(Route::Asset)
    } else {
        Some(Route::Network)
    }
}
