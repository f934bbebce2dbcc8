//! Cache module for storing school portal responses to disk
//!
//! This module provides a single-file JSON store whose entries carry the time
//! they were written. Each read passes its own maximum age, so schedule, grades,
//! homework and messages can share one file with different freshness budgets.
//! Load and save failures never reach the caller; they are logged and the cache
//! behaves as empty or missing.

mod entry;
mod error;
mod fetch;
mod store;

pub use entry::{format_timestamp, parse_timestamp, CacheEntry};
pub use error::{CacheError, FetchError};
pub use fetch::{Cached, Source};
pub use store::CacheStore;
