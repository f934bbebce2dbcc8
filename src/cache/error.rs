//! Error types for the cache's internal fallible steps
//!
//! None of these reach callers of `CacheStore`'s public operations: loading,
//! flushing and timestamp parsing return them, and the store logs them before
//! degrading to an empty or missing result.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading, flushing or reading the cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing the backing file failed
    #[error("Cache I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not a JSON object of cache entries
    #[error("Cache file {path} is not valid: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An entry's stored timestamp could not be parsed
    #[error("Invalid cache timestamp '{0}'")]
    InvalidTimestamp(String),
}

/// Error returned by [`CacheStore::get_or_fetch`](super::CacheStore::get_or_fetch)
/// when the upstream fetch fails and nothing is cached for the key.
#[derive(Debug, Error)]
pub enum FetchError<E> {
    /// The upstream source failed and there was no cached entry to fall back to
    #[error("Upstream fetch failed with no cached fallback: {0}")]
    Upstream(E),
}

impl<E> FetchError<E> {
    /// Returns the upstream error.
    pub fn into_inner(self) -> E {
        match self {
            FetchError::Upstream(err) => err,
        }
    }
}
