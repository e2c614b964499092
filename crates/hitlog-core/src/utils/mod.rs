//! Utility functions for string formatting and matching.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{
    contains_ignore_case, format_date, format_weight, normalize_search, truncate_string,
};
