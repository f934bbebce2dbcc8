//! Cache-aside reads for the data-fetching layer
//!
//! Callers hand `get_or_fetch` a closure that talks to the school portal. The
//! closure only runs on a miss, its result is stored, and when it fails any
//! previously cached value for the key is served instead, however old.

use chrono::Duration;
use serde_json::Value;
use std::fmt::Display;
use tracing::warn;

use super::{CacheStore, FetchError};

/// Where a value returned by [`CacheStore::get_or_fetch`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// A cached entry within its freshness budget
    Fresh,
    /// Freshly fetched from upstream and written to the cache
    Fetched,
    /// An expired cached entry, served because the upstream fetch failed
    Stale,
}

/// Value returned by [`CacheStore::get_or_fetch`], with its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct Cached {
    /// The payload
    pub data: Value,
    /// Whether it was served from cache, fetched, or a stale fallback
    pub source: Source,
}

impl Cached {
    /// Returns true if the payload is an expired fallback
    pub fn is_stale(&self) -> bool {
        self.source == Source::Stale
    }
}

impl CacheStore {
    /// Returns the cached value for `key` if fresh, otherwise calls `fetch`
    ///
    /// # Arguments
    /// * `key` - Cache key, e.g. "schedule_2024-01-01_2024-01-07"
    /// * `max_age` - Freshness budget for this read
    /// * `fetch` - Retrieves the value from upstream on a miss
    ///
    /// # Returns
    /// * `Ok(Cached)` with `Source::Fresh`, `Source::Fetched` or `Source::Stale`
    /// * `Err(FetchError::Upstream)` if `fetch` failed and nothing is cached
    pub fn get_or_fetch<F, E>(
        &mut self,
        key: &str,
        max_age: Duration,
        fetch: F,
    ) -> Result<Cached, FetchError<E>>
    where
        F: FnOnce() -> Result<Value, E>,
        E: Display,
    {
        if let Some(data) = self.get(key, max_age) {
            return Ok(Cached {
                data,
                source: Source::Fresh,
            });
        }

        match fetch() {
            Ok(data) => {
                self.set(key, data.clone());
                Ok(Cached {
                    data,
                    source: Source::Fetched,
                })
            }
            Err(err) => match self.entry(key) {
                Some(entry) => {
                    warn!(key, error = %err, "Upstream fetch failed, serving stale cache entry");
                    Ok(Cached {
                        data: entry.data().clone(),
                        source: Source::Stale,
                    })
                }
                None => Err(FetchError::Upstream(err)),
            },
        }
    }
}
