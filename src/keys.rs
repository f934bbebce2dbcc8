//! Data categories and deterministic cache key construction
//!
//! The data-fetching layer builds one key per request shape, e.g. `"grades"` or
//! `"schedule_2024-01-01_2024-01-07"`, so identical requests hit the same entry.

use chrono::NaiveDate;

/// Kinds of school portal data that are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataCategory {
    /// Lessons in the timetable
    Schedule,
    /// Grades grouped by period
    Grades,
    /// Homework assignments
    Homework,
    /// Discussions and messages
    Messages,
}

impl DataCategory {
    /// Returns a slice containing all category variants.
    pub fn all() -> &'static [DataCategory] {
        &[
            DataCategory::Schedule,
            DataCategory::Grades,
            DataCategory::Homework,
            DataCategory::Messages,
        ]
    }

    /// Returns the identifier used as the cache key prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataCategory::Schedule => "schedule",
            DataCategory::Grades => "grades",
            DataCategory::Homework => "homework",
            DataCategory::Messages => "messages",
        }
    }

    /// Returns a human-readable display label for the category.
    pub fn label(&self) -> &'static str {
        match self {
            DataCategory::Schedule => "Schedule",
            DataCategory::Grades => "Grades",
            DataCategory::Homework => "Homework",
            DataCategory::Messages => "Messages",
        }
    }

    /// Parses user input into a DataCategory.
    ///
    /// Matching is case-insensitive and supports aliases:
    /// - "schedule" | "timetable" | "lessons" | "edt" -> Schedule
    /// - "grades" | "notes" -> Grades
    /// - "homework" | "devoirs" -> Homework
    /// - "messages" | "discussions" -> Messages
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<DataCategory> {
        match s.to_lowercase().trim() {
            "schedule" | "timetable" | "lessons" | "edt" => Some(DataCategory::Schedule),
            "grades" | "notes" => Some(DataCategory::Grades),
            "homework" | "devoirs" => Some(DataCategory::Homework),
            "messages" | "discussions" => Some(DataCategory::Messages),
            _ => None,
        }
    }
}

/// Builds the cache key for a category-wide request, e.g. `"grades"`.
pub fn cache_key(category: DataCategory) -> String {
    category.as_str().to_string()
}

/// Builds the cache key for a date-ranged request.
///
/// `ranged_cache_key(Schedule, 2024-01-01, 2024-01-07)` yields
/// `"schedule_2024-01-01_2024-01-07"`.
pub fn ranged_cache_key(category: DataCategory, from: NaiveDate, to: NaiveDate) -> String {
    format!(
        "{}_{}_{}",
        category.as_str(),
        from.format("%Y-%m-%d"),
        to.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_from_str_schedule_aliases() {
        assert_eq!(DataCategory::from_str("schedule"), Some(DataCategory::Schedule));
        assert_eq!(DataCategory::from_str("Timetable"), Some(DataCategory::Schedule));
        assert_eq!(DataCategory::from_str("EDT"), Some(DataCategory::Schedule));
    }

    #[test]
    fn test_from_str_other_aliases() {
        assert_eq!(DataCategory::from_str("notes"), Some(DataCategory::Grades));
        assert_eq!(DataCategory::from_str("devoirs"), Some(DataCategory::Homework));
        assert_eq!(DataCategory::from_str(" messages "), Some(DataCategory::Messages));
    }

    #[test]
    fn test_from_str_invalid() {
        assert_eq!(DataCategory::from_str("weather"), None);
        assert_eq!(DataCategory::from_str(""), None);
    }

    #[test]
    fn test_as_str_roundtrips_through_from_str() {
        for category in DataCategory::all() {
            assert_eq!(DataCategory::from_str(category.as_str()), Some(*category));
        }
    }

    #[test]
    fn test_cache_key_is_category_name() {
        assert_eq!(cache_key(DataCategory::Grades), "grades");
    }

    #[test]
    fn test_ranged_cache_key_format() {
        let key = ranged_cache_key(DataCategory::Schedule, date(2024, 1, 1), date(2024, 1, 7));
        assert_eq!(key, "schedule_2024-01-01_2024-01-07");
    }

    #[test]
    fn test_ranged_cache_key_is_deterministic_and_distinct() {
        let a = ranged_cache_key(DataCategory::Homework, date(2024, 3, 4), date(2024, 3, 10));
        let b = ranged_cache_key(DataCategory::Homework, date(2024, 3, 4), date(2024, 3, 10));
        let c = ranged_cache_key(DataCategory::Homework, date(2024, 3, 11), date(2024, 3, 17));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
