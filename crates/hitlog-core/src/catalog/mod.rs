//! Exercise catalog.
//!
//! The list of exercise names offered to the user comes from three places:
//! - a built-in fallback list shipped with the app
//! - a versioned remote catalog, cached in the key-value store
//! - names the user has already logged
//!
//! `CatalogResolver` picks the base list (fallback, cached or remote) and
//! `merge_catalog` folds in the workout history. All lists are trimmed,
//! deduplicated and sorted ordinally.

pub mod fallback;
pub mod normalize;
pub mod remote;
pub mod resolver;

pub use fallback::{fallback_exercises, FALLBACK_EXERCISES};
pub use normalize::normalize_names;
pub use remote::{
    catalog_request, fetch_catalog, parse_remote_catalog, CatalogCacheEntry, DEFAULT_CATALOG_VERSION,
};
pub use resolver::{merge_catalog, BaseSource, CatalogResolver, CATALOG_CACHE_KEY};
