//! Offline cache controller.
//!
//! This module provides the `CacheController`, which keeps the application
//! shell and assets available without connectivity:
//! - Install: seed the versioned static partition with the shell manifest
//! - Activate: delete partitions from other versions, then claim clients
//! - Fetch: network-first for documents, stale-while-revalidate for assets,
//!   network-first with cache fallback for everything else
//!
//! Network failures never escape; they degrade to cached or synthesized
//! responses.

pub mod config;
pub mod controller;
pub mod error;
pub mod lifecycle;
pub mod routing;

pub use config::{WorkerConfig, DEFAULT_APP_PREFIX, DEFAULT_CACHE_VERSION, SHELL_DOCUMENT, SHELL_MANIFEST};
pub use controller::{
    ActivationReport, CacheController, EventOutcome, FetchOutcome, InstallReport, ResponseSource,
    WorkerEvent,
};
pub use error::WorkerError;
pub use lifecycle::LifecycleState;
pub use routing::{AssetClassifier, AssetRules, Route};
