use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::net::{Request, Response};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Clock skew lands here too
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

/// Options for looking up a cached response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Compare URLs without their query string and fragment.
    pub ignore_search: bool,
}

impl MatchOptions {
    pub fn ignoring_search() -> Self {
        Self { ignore_search: true }
    }
}

/// One request/response pair inside a partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub search_key: String,
    pub response: CachedData<Response>,
}

impl CacheEntry {
    pub fn new(request: &Request, response: Response) -> Self {
        Self {
            key: request.cache_key(),
            search_key: request.search_insensitive_key(),
            response: CachedData::new(response),
        }
    }

    pub fn matches(&self, request: &Request, options: MatchOptions) -> bool {
        if options.ignore_search {
            self.search_key == request.search_insensitive_key()
        } else {
            self.key == request.cache_key()
        }
    }
}

/// A named cache bucket. Entries are kept in write order, most recent last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partition {
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub entries: Vec<CacheEntry>,
}

impl Partition {
    pub fn new() -> Self {
        Self {
            created_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    /// Store the response for this exact request. A rewrite moves the entry
    /// to the most recent position.
    pub fn put(&mut self, request: &Request, response: Response) {
        let entry = CacheEntry::new(request, response);
        self.entries.retain(|e| e.key != entry.key);
        self.entries.push(entry);
    }

    /// Look up a request. An exact URL match always wins; otherwise the most
    /// recently written match is returned.
    pub fn find(&self, request: &Request, options: MatchOptions) -> Option<&CacheEntry> {
        let key = request.cache_key();
        self.entries
            .iter()
            .rev()
            .find(|e| e.key == key)
            .or_else(|| self.entries.iter().rev().find(|e| e.matches(request, options)))
    }

    pub fn info(&self, name: &str) -> PartitionInfo {
        let created = CachedData {
            data: (),
            cached_at: self.created_at,
        };
        PartitionInfo {
            name: name.to_string(),
            entries: self.entries.len(),
            age: created.age_display(),
        }
    }
}

impl Default for Partition {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of a partition for status displays.
#[derive(Debug, Clone)]
pub struct PartitionInfo {
    pub name: String,
    pub entries: usize,
    pub age: String,
}

/// Partitioned request/response storage, the capability behind the cache
/// controller. Partitions are created on first `put`.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Partition names in creation order.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Delete a partition. Returns whether it existed.
    async fn delete(&self, partition: &str) -> Result<bool>;

    async fn put(&self, partition: &str, request: &Request, response: &Response) -> Result<()>;

    async fn match_in(
        &self,
        partition: &str,
        request: &Request,
        options: MatchOptions,
    ) -> Result<Option<Response>>;

    async fn info(&self, partition: &str) -> Result<Option<PartitionInfo>>;

    /// Search every partition in creation order.
    async fn match_any(&self, request: &Request, options: MatchOptions) -> Result<Option<Response>> {
        for name in self.keys().await? {
            if let Some(response) = self.match_in(&name, request, options).await? {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }
}
