//! File-backed cache store with per-read TTLs
//!
//! Provides a `CacheStore` that keeps every entry of one JSON file in memory,
//! writes the whole file back after each mutation, and lets each read decide
//! how old an entry may be.

use chrono::{Duration, Local, NaiveDateTime, SubsecRound};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use super::{CacheEntry, CacheError};

/// Entries keyed by cache key, as stored in the backing file
type Entries = BTreeMap<String, CacheEntry>;

/// Time-bounded key-value store persisted to a single JSON file
///
/// The file holds one JSON object mapping cache keys to
/// `{"timestamp": ..., "data": ...}` entries. Every `set` and `clear` rewrites
/// the file. Expired entries are only ignored on read, never removed.
///
/// No operation returns an error: load, flush and timestamp failures are
/// logged and the store behaves as if the data were absent. The cache is an
/// optimization, the upstream service is the source of truth.
#[derive(Debug)]
pub struct CacheStore {
    /// File the store is loaded from and flushed to
    path: PathBuf,
    /// In-memory copy of every entry
    entries: Entries,
}

impl CacheStore {
    /// Opens the store backed by `path`
    ///
    /// A missing file yields an empty store. An unreadable or malformed file is
    /// logged and also yields an empty store; it will be replaced on the next
    /// mutation.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match load_entries(&path) {
            Ok(Some(entries)) => {
                debug!(path = %path.display(), entries = entries.len(), "Loaded cache");
                entries
            }
            Ok(None) => {
                debug!(path = %path.display(), "No cache file yet, starting empty");
                Entries::new()
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "Failed to load cache, starting empty");
                Entries::new()
            }
        };
        Self { path, entries }
    }

    /// Returns the path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the cached value for `key` if it is at most `max_age` old
    ///
    /// # Returns
    /// * `Some(value)` if the entry exists and is fresh
    /// * `None` if the entry is missing, expired, or has no usable timestamp
    pub fn get(&self, key: &str, max_age: Duration) -> Option<Value> {
        self.get_at(key, max_age, now())
    }

    /// Same as [`get`](Self::get), evaluated as if the current time were `now`
    pub fn get_at(&self, key: &str, max_age: Duration, now: NaiveDateTime) -> Option<Value> {
        let entry = self.entries.get(key)?;

        let written_at = match entry.written_at() {
            Some(Ok(written_at)) => written_at,
            Some(Err(err)) => {
                error!(key, error = %err, "Failed to read cache entry");
                return None;
            }
            None => {
                debug!(key, "Cache entry has no timestamp");
                return None;
            }
        };

        let age = now - written_at;
        if age > max_age {
            debug!(
                key,
                age_minutes = age.num_seconds() as f64 / 60.0,
                "Cache entry expired"
            );
            return None;
        }

        Some(entry.data().clone())
    }

    /// Returns whether [`get`](Self::get) would yield a value
    pub fn is_valid(&self, key: &str, max_age: Duration) -> bool {
        self.get(key, max_age).is_some()
    }

    /// Returns the raw entry for `key` regardless of its age
    pub fn entry(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Stores `value` under `key`, replacing any previous entry, and flushes
    ///
    /// A failed flush is logged; the value remains readable from memory.
    pub fn set(&mut self, key: &str, value: Value) {
        self.set_at(key, value, now());
    }

    /// Same as [`set`](Self::set), stamping the entry with `now`
    pub fn set_at(&mut self, key: &str, value: Value, now: NaiveDateTime) {
        self.entries
            .insert(key.to_string(), CacheEntry::new(value, now));
        self.save();
    }

    /// Removes the entry for `key`, or every entry when `key` is `None`
    ///
    /// Removing an absent key does nothing and does not touch the file.
    pub fn clear(&mut self, key: Option<&str>) {
        match key {
            Some(key) => {
                if self.entries.remove(key).is_some() {
                    self.save();
                }
            }
            None => {
                self.entries = Entries::new();
                self.save();
            }
        }
    }

    /// Iterates over the cached keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the number of entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the store to disk, logging any failure
    fn save(&self) {
        if let Err(err) = self.flush() {
            error!(path = %self.path.display(), error = %err, "Failed to save cache");
        }
    }

    /// Writes the whole store to a temporary file next to the target and
    /// renames it into place
    fn flush(&self) -> Result<(), CacheError> {
        let io_err = |source: std::io::Error| CacheError::Io {
            path: self.path.clone(),
            source,
        };

        let json = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            CacheError::Json {
                path: self.path.clone(),
                source,
            }
        })?;

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(io_err)?;

        let mut file = tempfile::Builder::new()
            .prefix(".cache")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(io_err)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;
        file.flush().map_err(io_err)?;
        file.persist(&self.path).map_err(|err| io_err(err.error))?;

        debug!(path = %self.path.display(), entries = self.entries.len(), "Saved cache");
        Ok(())
    }
}

/// Reads the backing file
///
/// # Returns
/// * `Ok(Some(entries))` if the file exists and is a JSON object of entries
/// * `Ok(None)` if the file does not exist
/// * `Err` if the file cannot be read or has the wrong shape
fn load_entries(path: &Path) -> Result<Option<Entries>, CacheError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(CacheError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| CacheError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Current local time, truncated to microseconds
fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(6)
}
