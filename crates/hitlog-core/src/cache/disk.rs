use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::storage::{CacheStorage, MatchOptions, Partition, PartitionInfo};
use crate::net::{Request, Response};

/// `CacheStorage` that keeps each partition in its own JSON file.
///
/// Writes go through a temporary file and a rename so a concurrent reader never
/// sees a half-written partition. Read-modify-write cycles are serialized by
/// `write_lock`.
#[derive(Debug)]
pub struct DiskCacheStorage {
    cache_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl DiskCacheStorage {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir).with_context(|| {
            format!("Failed to create cache directory: {}", cache_dir.display())
        })?;
        Ok(Self {
            cache_dir,
            write_lock: Mutex::new(()),
        })
    }

    fn cache_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty()
            || name.starts_with('.')
            || name.contains(|c: char| c == '/' || c == '\\')
            || name.contains("..")
        {
            bail!("Invalid partition name: {:?}", name);
        }
        Ok(self.cache_dir.join(format!("{}.json", name)))
    }

    fn load(&self, name: &str) -> Result<Option<Partition>> {
        let path = self.cache_path(name)?;
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache partition: {}", name))?;

        let partition: Partition = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache partition: {}", name))?;

        Ok(Some(partition))
    }

    fn save(&self, name: &str, partition: &Partition) -> Result<()> {
        let path = self.cache_path(name)?;
        let tmp = path.with_extension("json.tmp");
        let contents = serde_json::to_string(partition)?;
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[async_trait]
impl CacheStorage for DiskCacheStorage {
    async fn keys(&self) -> Result<Vec<String>> {
        let mut found = Vec::new();
        for entry in std::fs::read_dir(&self.cache_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.load(name) {
                Ok(Some(partition)) => found.push((partition.created_at, name.to_string())),
                Ok(None) => {}
                Err(e) => {
                    warn!(partition = name, error = %e, "Skipping unreadable cache partition");
                }
            }
        }
        found.sort();
        Ok(found.into_iter().map(|(_, name)| name).collect())
    }

    async fn delete(&self, partition: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let path = self.cache_path(partition)?;
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path)
            .with_context(|| format!("Failed to delete cache partition: {}", partition))?;
        debug!(partition, "Deleted cache partition");
        Ok(true)
    }

    async fn put(&self, partition: &str, request: &Request, response: &Response) -> Result<()> {
        self.cache_path(partition)?;
        let _guard = self.write_lock.lock().await;
        // A corrupt partition is replaced rather than blocking every write
        let mut current = match self.load(partition) {
            Ok(existing) => existing.unwrap_or_default(),
            Err(e) => {
                warn!(partition, error = %e, "Replacing unreadable cache partition");
                Partition::new()
            }
        };
        current.put(request, response.clone());
        self.save(partition, &current)
    }

    async fn match_in(
        &self,
        partition: &str,
        request: &Request,
        options: MatchOptions,
    ) -> Result<Option<Response>> {
        Ok(self
            .load(partition)?
            .and_then(|p| p.find(request, options).map(|e| e.response.data.clone())))
    }

    async fn info(&self, partition: &str) -> Result<Option<PartitionInfo>> {
        Ok(self.load(partition)?.map(|p| p.info(partition)))
    }
}
