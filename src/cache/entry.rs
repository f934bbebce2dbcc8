//! On-disk representation of a single cache entry

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::CacheError;

/// Format used to write entry timestamps: ISO-8601 local date-time without an
/// offset, with a fractional part only when it is non-zero.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// One cached value plus the time it was written
///
/// The timestamp is kept as raw JSON so that a damaged value, text or not, only
/// affects reads of this entry instead of the whole file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// When the value was written, as ISO-8601 local date-time text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<Value>,
    /// The cached payload, stored opaquely
    #[serde(default)]
    data: Value,
}

impl CacheEntry {
    /// Creates an entry stamped with the given local time
    pub fn new(data: Value, written_at: NaiveDateTime) -> Self {
        Self {
            timestamp: Some(Value::String(format_timestamp(written_at))),
            data,
        }
    }

    /// Returns the cached payload
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Consumes the entry and returns the cached payload
    pub fn into_data(self) -> Value {
        self.data
    }

    /// Returns the stored timestamp text, if the entry carries one as a string
    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_ref().and_then(Value::as_str)
    }

    /// Parses the stored timestamp
    ///
    /// # Returns
    /// * `None` if the entry has no timestamp
    /// * `Some(Err(CacheError::InvalidTimestamp))` if it is not a string or
    ///   cannot be parsed
    pub fn written_at(&self) -> Option<Result<NaiveDateTime, CacheError>> {
        match self.timestamp.as_ref()? {
            Value::String(text) => Some(parse_timestamp(text)),
            other => Some(Err(CacheError::InvalidTimestamp(other.to_string()))),
        }
    }
}

/// Formats a local date-time the way entries store it
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses an entry timestamp back into a local date-time
///
/// Accepts the format written by [`format_timestamp`] and, for files written by
/// other tools, RFC 3339 text carrying an offset (converted to local time).
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, CacheError> {
    let text = text.trim();
    if let Ok(at) = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT) {
        return Ok(at);
    }
    DateTime::parse_from_rfc3339(text)
        .map(|at| at.with_timezone(&Local).naive_local())
        .map_err(|_| CacheError::InvalidTimestamp(text.to_string()))
}
