//! Persistence port for small client-side state.
//!
//! `KeyValueStore` is the get/set-by-key seam the catalog resolver and the
//! workout log write through. Values are JSON text.
//! - `MemoryStore`: in-process, for tests
//! - `JsonFileStore`: one file per key under the data directory

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use anyhow::Result;

/// Synchronous key-value persistence.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Returns whether it existed.
    fn remove(&self, key: &str) -> Result<bool>;
}
