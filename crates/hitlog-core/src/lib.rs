//! hitlog core library.
//!
//! Offline-first data layer for a high-intensity training workout log:
//! - `worker`: cache controller that keeps the app shell and assets usable
//!   without connectivity
//! - `catalog`: exercise catalog resolution (fallback, cached, remote, history)
//! - `history` / `progress`: the persisted workout log and views derived from it
//! - `cache`, `store`, `net`: storage and network capabilities the above are
//!   built on

pub mod cache;
pub mod catalog;
pub mod config;
pub mod history;
pub mod models;
pub mod net;
pub mod progress;
pub mod store;
pub mod utils;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{BaseSource, CatalogResolver};
pub use config::Config;
pub use history::{NewSet, NewWorkout, WorkoutLog};
pub use net::{FetchError, Fetcher, ReqwestFetcher, Request, Response};
pub use reqwest::{Method, Url};
pub use worker::{CacheController, FetchOutcome, LifecycleState, WorkerConfig, WorkerEvent};
