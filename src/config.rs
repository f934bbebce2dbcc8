//! Cache configuration: file location and freshness budgets
//!
//! The default cache file lives in the XDG cache directory
//! (`~/.cache/pronote-cache/cache.json` on Linux). Freshness budgets are set
//! per data category since messages go stale much faster than grades.

use chrono::Duration;
use directories::ProjectDirs;
use std::path::PathBuf;

use crate::keys::DataCategory;

/// Name of the cache file inside the cache directory
pub const CACHE_FILE_NAME: &str = "cache.json";

/// Freshness budget, in minutes, for each data category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryMaxAge {
    pub schedule: u32,
    pub grades: u32,
    pub homework: u32,
    pub messages: u32,
}

impl Default for CategoryMaxAge {
    fn default() -> Self {
        Self {
            schedule: 30,
            grades: 60,
            homework: 15,
            messages: 5,
        }
    }
}

/// Configuration for opening and reading the cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Backing file of the cache store
    pub cache_file: PathBuf,
    /// Maximum age used when a read names no category
    pub default_max_age: Duration,
    /// Maximum age per data category, in minutes
    pub category_max_age: CategoryMaxAge,
}

impl CacheConfig {
    /// Creates a CacheConfig using the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "pronote-cache")?;
        Some(Self::with_file(project_dirs.cache_dir().join(CACHE_FILE_NAME)))
    }

    /// Creates a CacheConfig backed by a specific file
    pub fn with_file(cache_file: PathBuf) -> Self {
        Self {
            cache_file,
            default_max_age: Duration::minutes(30),
            category_max_age: CategoryMaxAge::default(),
        }
    }

    /// Returns the freshness budget for a data category
    pub fn max_age_for(&self, category: DataCategory) -> Duration {
        let minutes = match category {
            DataCategory::Schedule => self.category_max_age.schedule,
            DataCategory::Grades => self.category_max_age.grades,
            DataCategory::Homework => self.category_max_age.homework,
            DataCategory::Messages => self.category_max_age.messages,
        };
        Duration::minutes(i64::from(minutes))
    }
}
