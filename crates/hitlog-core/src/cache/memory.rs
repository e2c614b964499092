use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::storage::{CacheStorage, MatchOptions, Partition, PartitionInfo};
use crate::net::{Request, Response};

/// In-process `CacheStorage`. Partitions are kept in creation order.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    partitions: Mutex<Vec<(String, Partition)>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_partitions<R>(&self, f: impl FnOnce(&mut Vec<(String, Partition)>) -> R) -> Result<R> {
        let mut guard = self
            .partitions
            .lock()
            .map_err(|_| anyhow!("cache storage lock poisoned"))?;
        Ok(f(&mut guard))
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn keys(&self) -> Result<Vec<String>> {
        self.with_partitions(|parts| parts.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn delete(&self, partition: &str) -> Result<bool> {
        self.with_partitions(|parts| {
            let before = parts.len();
            parts.retain(|(name, _)| name != partition);
            parts.len() != before
        })
    }

    async fn put(&self, partition: &str, request: &Request, response: &Response) -> Result<()> {
        self.with_partitions(|parts| {
            match parts.iter_mut().find(|(name, _)| name == partition) {
                Some((_, p)) => p.put(request, response.clone()),
                None => {
                    let mut p = Partition::new();
                    p.put(request, response.clone());
                    parts.push((partition.to_string(), p));
                }
            }
        })
    }

    async fn match_in(
        &self,
        partition: &str,
        request: &Request,
        options: MatchOptions,
    ) -> Result<Option<Response>> {
        self.with_partitions(|parts| {
            parts
                .iter()
                .find(|(name, _)| name == partition)
                .and_then(|(_, p)| p.find(request, options))
                .map(|entry| entry.response.data.clone())
        })
    }

    async fn info(&self, partition: &str) -> Result<Option<PartitionInfo>> {
        self.with_partitions(|parts| {
            parts
                .iter()
                .find(|(name, _)| name == partition)
                .map(|(name, p)| p.info(name))
        })
    }
}
