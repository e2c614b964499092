//! Network model and fetch capability.
//!
//! This module provides the `Request`/`Response` pair that flows through the
//! cache controller and the catalog resolver, the `Fetcher` trait used to reach
//! the network, and `ReqwestFetcher`, the real implementation.
//!
//! Network failures are reported as `FetchError` and are always recovered by
//! the callers.

pub mod error;
pub mod fetcher;
pub mod request;

pub use error::FetchError;
pub use fetcher::{Fetcher, ReqwestFetcher};
pub use request::{Request, Response};
