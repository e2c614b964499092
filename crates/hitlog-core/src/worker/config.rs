use reqwest::Url;

use super::WorkerError;
use crate::net::Request;

pub const DEFAULT_APP_PREFIX: &str = "hit";

/// Bump to invalidate every partition written by older deployments.
pub const DEFAULT_CACHE_VERSION: &str = "v3";

/// Application shell seeded into the static partition at install time.
pub const SHELL_MANIFEST: &[&str] = &[
    "/",
    "/index.html",
    "/manifest.webmanifest",
    "/unnamed-192.png",
    "/unnamed-512.png",
    "/splash.png",
];

/// Document served when a navigation fails and nothing better is cached.
pub const SHELL_DOCUMENT: &str = "/index.html";

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub origin: Url,
    pub app_prefix: String,
    pub version: String,
    pub shell_manifest: Vec<String>,
    pub shell_document: String,
}

impl WorkerConfig {
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            app_prefix: DEFAULT_APP_PREFIX.to_string(),
            version: DEFAULT_CACHE_VERSION.to_string(),
            shell_manifest: SHELL_MANIFEST.iter().map(|p| p.to_string()).collect(),
            shell_document: SHELL_DOCUMENT.to_string(),
        }
    }

    pub fn with_version(mut self, prefix: &str, version: &str) -> Self {
        self.app_prefix = prefix.to_string();
        self.version = version.to_string();
        self
    }

    pub fn static_partition(&self) -> String {
        format!("{}-static-{}", self.app_prefix, self.version)
    }

    pub fn html_partition(&self) -> String {
        format!("{}-html-{}", self.app_prefix, self.version)
    }

    /// The only partitions allowed to survive activation.
    pub fn current_partitions(&self) -> [String; 2] {
        [self.static_partition(), self.html_partition()]
    }

    /// GET request for a root-relative path on the app origin.
    pub fn request_for(&self, path: &str) -> Result<Request, WorkerError> {
        let url = self
            .origin
            .join(path)
            .map_err(|e| WorkerError::InvalidPath {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Request::get(url))
    }

    pub fn shell_request(&self) -> Result<Request, WorkerError> {
        self.request_for(&self.shell_document)
    }
}
