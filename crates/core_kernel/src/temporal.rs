//! Date ranges for report queries
//!
//! Accounting reports are driven by a single temporal parameter: either a
//! date range (movement listings, income statement) or a cutoff date
//! (balance sheet). Ranges are inclusive on both ends and may be unbounded
//! on either side.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// An inclusive range of accounting dates
///
/// `None` on either side means unbounded. `DateRange::through(cutoff)` is the
/// inception-to-date range used for balance-sheet queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First date included in the range, None for unbounded
    pub start: Option<NaiveDate>,
    /// Last date included in the range, None for unbounded
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Creates a bounded range; fails if start is after end
    pub fn between(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidRange { start, end });
        }
        Ok(Self {
            start: Some(start),
            end: Some(end),
        })
    }

    /// Inception-to-date range ending at `cutoff` (inclusive)
    pub fn through(cutoff: NaiveDate) -> Self {
        Self {
            start: None,
            end: Some(cutoff),
        }
    }

    /// Range starting at `start` with no upper bound
    pub fn from(start: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// The unbounded range
    pub fn all() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Calendar-year range
    pub fn year(year: i32) -> Result<Self, TemporalError> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| TemporalError::InvalidDate(format!("year {year}")))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| TemporalError::InvalidDate(format!("year {year}")))?;
        Self::between(start, end)
    }

    /// Returns true if `date` falls within the range
    pub fn contains(&self, date: NaiveDate) -> bool {
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (Some(s), Some(e)) => write!(f, "{s}..={e}"),
            (Some(s), None) => write!(f, "{s}.."),
            (None, Some(e)) => write!(f, "..={e}"),
            (None, None) => write!(f, ".."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_between_validates_order() {
        let range = DateRange::between(d(2024, 1, 1), d(2024, 12, 31)).unwrap();
        assert!(range.contains(d(2024, 6, 15)));

        let err = DateRange::between(d(2024, 12, 31), d(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, TemporalError::InvalidRange { .. }));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let range = DateRange::between(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        assert!(range.contains(d(2024, 1, 1)));
        assert!(range.contains(d(2024, 1, 31)));
        assert!(!range.contains(d(2023, 12, 31)));
        assert!(!range.contains(d(2024, 2, 1)));
    }

    #[test]
    fn test_through_is_unbounded_below() {
        let range = DateRange::through(d(2024, 6, 30));
        assert!(range.contains(d(1990, 1, 1)));
        assert!(range.contains(d(2024, 6, 30)));
        assert!(!range.contains(d(2024, 7, 1)));
    }

    #[test]
    fn test_year() {
        let range = DateRange::year(2024).unwrap();
        assert!(range.contains(d(2024, 1, 1)));
        assert!(range.contains(d(2024, 12, 31)));
        assert!(!range.contains(d(2025, 1, 1)));
    }

    #[test]
    fn test_all_contains_everything() {
        assert!(DateRange::all().contains(d(1900, 1, 1)));
        assert!(DateRange::all().contains(d(2100, 12, 31)));
    }
}
