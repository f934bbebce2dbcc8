//! Command-line interface for inspecting and managing the cache
//!
//! This module handles parsing of CLI arguments using clap and runs each
//! subcommand against a `CacheStore`. Output goes to the supplied writer so the
//! binary can print to stdout while tests capture it.

use chrono::{Duration, NaiveDate};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use crate::cache::CacheStore;
use crate::config::CacheConfig;
use crate::keys::{cache_key, ranged_cache_key, DataCategory};

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified category name is not recognized
    #[error("Invalid category: '{0}'. Valid categories: schedule, grades, homework, messages")]
    UnknownCategory(String),

    /// The value passed to `set` is not JSON
    #[error("Invalid JSON value: {0}")]
    InvalidValue(#[source] serde_json::Error),

    /// A date argument is not in YYYY-MM-DD form
    #[error("Invalid date: '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    /// No `--cache-file` was given and the default location is unavailable
    #[error("Could not determine a cache location; pass --cache-file")]
    NoCacheLocation,

    /// Writing command output failed
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Pronote cache - inspect and manage the local school portal cache
#[derive(Parser, Debug)]
#[command(name = "pronote-cache")]
#[command(about = "Inspect and manage the local school portal cache")]
#[command(version)]
pub struct Cli {
    /// Cache file to use instead of the default XDG location
    #[arg(long, global = true, value_name = "PATH", env = "PRONOTE_CACHE_FILE")]
    pub cache_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Freshness budget for a read: explicit minutes or a category's budget
#[derive(clap::Args, Debug, Clone, Default)]
pub struct MaxAgeArgs {
    /// Maximum entry age in minutes
    #[arg(long, value_name = "MINUTES", conflicts_with = "category")]
    pub max_age: Option<u32>,

    /// Use the freshness budget of a data category
    ///
    /// Valid categories: schedule, grades, homework, messages
    #[arg(long, value_name = "CATEGORY")]
    pub category: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a cached value if it is fresh; exits with status 1 otherwise
    Get {
        key: String,
        #[command(flatten)]
        max_age: MaxAgeArgs,
    },

    /// Store a JSON value under a key
    ///
    /// Examples:
    ///   pronote-cache set grades '{"math": 15.5}'
    ///   pronote-cache set homework '[]'
    Set {
        key: String,
        #[arg(value_name = "JSON")]
        value: String,
    },

    /// Remove one entry, or every entry when no key is given
    Clear { key: Option<String> },

    /// Report whether a key holds a fresh value; exits with status 1 otherwise
    Valid {
        key: String,
        #[command(flatten)]
        max_age: MaxAgeArgs,
    },

    /// List cached keys with the time each was written
    List,

    /// Print the cache key for a category and optional date range
    Key {
        category: String,
        /// First day of the range (YYYY-MM-DD)
        #[arg(long, requires = "to", value_name = "DATE")]
        from: Option<String>,
        /// Last day of the range (YYYY-MM-DD)
        #[arg(long, requires = "from", value_name = "DATE")]
        to: Option<String>,
    },
}

/// Result of a successfully executed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The command did what was asked
    Done,
    /// The requested key is missing or stale
    Miss,
}

/// Parses a category string argument into a DataCategory.
///
/// # Returns
/// * `Ok(DataCategory)` if the string matches a valid category
/// * `Err(CliError::UnknownCategory)` if the string doesn't match
pub fn parse_category_arg(s: &str) -> Result<DataCategory, CliError> {
    DataCategory::from_str(s).ok_or_else(|| CliError::UnknownCategory(s.to_string()))
}

/// Parses a JSON value argument for `set`.
pub fn parse_json_arg(s: &str) -> Result<Value, CliError> {
    serde_json::from_str(s).map_err(CliError::InvalidValue)
}

/// Parses a YYYY-MM-DD date argument.
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| CliError::InvalidDate(s.to_string()))
}

impl Cli {
    /// Resolves the cache configuration from `--cache-file` or the XDG default.
    pub fn config(&self) -> Result<CacheConfig, CliError> {
        match &self.cache_file {
            Some(path) => Ok(CacheConfig::with_file(path.clone())),
            None => CacheConfig::new().ok_or(CliError::NoCacheLocation),
        }
    }
}

impl MaxAgeArgs {
    /// Resolves the maximum age for a read.
    ///
    /// `--max-age` wins, then `--category`, then the configured default.
    pub fn resolve(&self, config: &CacheConfig) -> Result<Duration, CliError> {
        if let Some(minutes) = self.max_age {
            return Ok(Duration::minutes(i64::from(minutes)));
        }
        match &self.category {
            Some(category) => Ok(config.max_age_for(parse_category_arg(category)?)),
            None => Ok(config.default_max_age),
        }
    }
}

/// Runs the parsed command, writing its output to `out`.
pub fn execute(cli: &Cli, out: &mut impl Write) -> Result<Outcome, CliError> {
    // Key construction needs no cache file
    if let Command::Key { category, from, to } = &cli.command {
        let category = parse_category_arg(category)?;
        let key = match (from, to) {
            (Some(from), Some(to)) => {
                ranged_cache_key(category, parse_date_arg(from)?, parse_date_arg(to)?)
            }
            _ => cache_key(category),
        };
        writeln!(out, "{}", key)?;
        return Ok(Outcome::Done);
    }

    let config = cli.config()?;
    let mut store = CacheStore::open(&config.cache_file);

    match &cli.command {
        Command::Get { key, max_age } => {
            let max_age = max_age.resolve(&config)?;
            match store.get(key, max_age) {
                Some(value) => {
                    writeln!(out, "{:#}", value)?;
                    Ok(Outcome::Done)
                }
                None => Ok(Outcome::Miss),
            }
        }
        Command::Set { key, value } => {
            let value = parse_json_arg(value)?;
            store.set(key, value);
            info!(key = %key, path = %store.path().display(), "Stored cache entry");
            Ok(Outcome::Done)
        }
        Command::Clear { key } => {
            store.clear(key.as_deref());
            match key {
                Some(key) => info!(key = %key, "Cleared cache entry"),
                None => info!(path = %store.path().display(), "Cleared cache"),
            }
            Ok(Outcome::Done)
        }
        Command::Valid { key, max_age } => {
            let max_age = max_age.resolve(&config)?;
            if store.is_valid(key, max_age) {
                writeln!(out, "valid")?;
                Ok(Outcome::Done)
            } else {
                writeln!(out, "stale or missing")?;
                Ok(Outcome::Miss)
            }
        }
        Command::List => {
            for key in store.keys() {
                let timestamp = store
                    .entry(key)
                    .and_then(|entry| entry.timestamp())
                    .unwrap_or("(no timestamp)");
                writeln!(out, "{}\t{}", key, timestamp)?;
            }
            Ok(Outcome::Done)
        }
        Command::Key { .. } => Ok(Outcome::Done),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn run(temp_dir: &TempDir, args: &[&str]) -> (Result<Outcome, CliError>, String) {
        let cache_file = temp_dir.path().join("cache.json");
        let mut argv = vec![
            "pronote-cache".to_string(),
            "--cache-file".to_string(),
            cache_file.to_string_lossy().into_owned(),
        ];
        argv.extend(args.iter().map(|a| a.to_string()));
        let cli = Cli::parse_from(argv);
        let mut out = Vec::new();
        let result = execute(&cli, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_category_arg_valid() {
        assert_eq!(parse_category_arg("grades").unwrap(), DataCategory::Grades);
        assert_eq!(parse_category_arg("Devoirs").unwrap(), DataCategory::Homework);
    }

    #[test]
    fn test_parse_category_arg_invalid() {
        let err = parse_category_arg("weather").unwrap_err();
        assert!(err.to_string().contains("Invalid category"));
        assert!(err.to_string().contains("weather"));
    }

    #[test]
    fn test_parse_json_arg() {
        assert_eq!(parse_json_arg(r#"{"math": 15.5}"#).unwrap(), json!({"math": 15.5}));
        assert!(matches!(parse_json_arg("{math"), Err(CliError::InvalidValue(_))));
    }

    #[test]
    fn test_parse_date_arg() {
        assert_eq!(
            parse_date_arg("2024-01-07").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()
        );
        assert!(matches!(parse_date_arg("07/01/2024"), Err(CliError::InvalidDate(_))));
    }

    #[test]
    fn test_max_age_resolution_order() {
        let config = CacheConfig::with_file(PathBuf::from("cache.json"));

        let explicit = MaxAgeArgs {
            max_age: Some(2),
            category: None,
        };
        assert_eq!(explicit.resolve(&config).unwrap(), Duration::minutes(2));

        let by_category = MaxAgeArgs {
            max_age: None,
            category: Some("messages".to_string()),
        };
        assert_eq!(by_category.resolve(&config).unwrap(), Duration::minutes(5));

        let default = MaxAgeArgs::default();
        assert_eq!(default.resolve(&config).unwrap(), Duration::minutes(30));
    }

    #[test]
    fn test_cli_rejects_max_age_with_category() {
        let result = Cli::try_parse_from([
            "pronote-cache",
            "get",
            "grades",
            "--max-age",
            "5",
            "--category",
            "grades",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_key_requires_both_dates() {
        let result = Cli::try_parse_from(["pronote-cache", "key", "schedule", "--from", "2024-01-01"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_set_then_get_prints_value() {
        let temp_dir = TempDir::new().unwrap();

        let (result, _) = run(&temp_dir, &["set", "grades", r#"{"math": 15.5}"#]);
        assert_eq!(result.unwrap(), Outcome::Done);

        let (result, out) = run(&temp_dir, &["get", "grades", "--category", "grades"]);
        assert_eq!(result.unwrap(), Outcome::Done);
        let printed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(printed, json!({"math": 15.5}));
    }

    #[test]
    fn test_get_missing_key_is_a_miss() {
        let temp_dir = TempDir::new().unwrap();

        let (result, out) = run(&temp_dir, &["get", "homework"]);

        assert_eq!(result.unwrap(), Outcome::Miss);
        assert!(out.is_empty());
    }

    #[test]
    fn test_set_rejects_invalid_json() {
        let temp_dir = TempDir::new().unwrap();

        let (result, _) = run(&temp_dir, &["set", "grades", "not json"]);

        assert!(matches!(result, Err(CliError::InvalidValue(_))));
        assert!(!temp_dir.path().join("cache.json").exists());
    }

    #[test]
    fn test_valid_and_clear() {
        let temp_dir = TempDir::new().unwrap();
        run(&temp_dir, &["set", "messages", "[]"]).0.unwrap();

        let (result, out) = run(&temp_dir, &["valid", "messages", "--max-age", "5"]);
        assert_eq!(result.unwrap(), Outcome::Done);
        assert_eq!(out.trim(), "valid");

        run(&temp_dir, &["clear", "messages"]).0.unwrap();

        let (result, out) = run(&temp_dir, &["valid", "messages", "--max-age", "5"]);
        assert_eq!(result.unwrap(), Outcome::Miss);
        assert_eq!(out.trim(), "stale or missing");
    }

    #[test]
    fn test_clear_all_then_list_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        run(&temp_dir, &["set", "grades", "1"]).0.unwrap();
        run(&temp_dir, &["set", "schedule", "2"]).0.unwrap();

        run(&temp_dir, &["clear"]).0.unwrap();

        let (result, out) = run(&temp_dir, &["list"]);
        assert_eq!(result.unwrap(), Outcome::Done);
        assert!(out.is_empty());
    }

    #[test]
    fn test_list_prints_keys_with_timestamps() {
        let temp_dir = TempDir::new().unwrap();
        run(&temp_dir, &["set", "schedule", "[]"]).0.unwrap();
        run(&temp_dir, &["set", "grades", "{}"]).0.unwrap();

        let (_, out) = run(&temp_dir, &["list"]);
        let keys: Vec<&str> = out
            .lines()
            .map(|line| line.split('\t').next().unwrap())
            .collect();

        assert_eq!(keys, vec!["grades", "schedule"]);
        assert!(out.lines().all(|line| line.split('\t').nth(1).is_some()));
    }

    #[test]
    fn test_key_command_builds_ranged_key() {
        let temp_dir = TempDir::new().unwrap();

        let (result, out) = run(
            &temp_dir,
            &["key", "timetable", "--from", "2024-01-01", "--to", "2024-01-07"],
        );

        assert_eq!(result.unwrap(), Outcome::Done);
        assert_eq!(out.trim(), "schedule_2024-01-01_2024-01-07");
        assert!(!temp_dir.path().join("cache.json").exists());
    }

    #[test]
    fn test_key_command_rejects_unknown_category() {
        let temp_dir = TempDir::new().unwrap();

        let (result, _) = run(&temp_dir, &["key", "weather"]);

        assert!(matches!(result, Err(CliError::UnknownCategory(_))));
    }
}
