//! Shared value types for treatline.
//!
//! Clinical records rarely carry full calendar dates for historical treatments. A line of therapy
//! may be recorded as "2021", "May 2021", or with no date at all. [`PartialDate`] captures that
//! directly: both the year and the month are optional, and the month is validated whenever it is
//! present.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Errors that can occur when creating validated date types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    /// The month was outside 1..=12
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),
    /// The text could not be read as `YYYY`, `YYYY-MM`, `?-MM` or `unknown`
    #[error("invalid partial date '{0}' (expected YYYY-MM, YYYY, ?-MM or unknown)")]
    Unparseable(String),
}

/// A (year, month) pair where either part may be unknown.
///
/// Ordering follows specificity: an unknown year sorts before any known year, and within the same
/// (or both unknown) year an unknown month sorts before any known month. Two dates with identical
/// parts compare equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "PartialDateParts", into = "PartialDateParts")]
pub struct PartialDate {
    year: Option<i32>,
    month: Option<u32>,
}

impl PartialDate {
    /// A date with neither year nor month known.
    pub const UNKNOWN: PartialDate = PartialDate {
        year: None,
        month: None,
    };

    /// Creates a new `PartialDate`, validating the month when present.
    ///
    /// # Errors
    ///
    /// Returns `DateError::InvalidMonth` if `month` is outside 1..=12.
    pub fn new(year: Option<i32>, month: Option<u32>) -> Result<Self, DateError> {
        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                return Err(DateError::InvalidMonth(m));
            }
        }
        Ok(Self { year, month })
    }

    /// A date where only the year is known.
    pub fn of_year(year: i32) -> Self {
        Self {
            year: Some(year),
            month: None,
        }
    }

    /// A date with both year and month known.
    pub fn year_month(year: i32, month: u32) -> Result<Self, DateError> {
        Self::new(Some(year), Some(month))
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    /// True when neither the year nor the month is known.
    pub fn is_unknown(&self) -> bool {
        self.year.is_none() && self.month.is_none()
    }
}

impl Ord for PartialDate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Option orders None before Some, which is exactly "less specific sorts first".
        self.year
            .cmp(&other.year)
            .then_with(|| self.month.cmp(&other.month))
    }
}

impl PartialOrd for PartialDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PartialDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.year, self.month) {
            (Some(y), Some(m)) => write!(f, "{y:04}-{m:02}"),
            (Some(y), None) => write!(f, "{y:04}"),
            (None, Some(m)) => write!(f, "?-{m:02}"),
            (None, None) => write!(f, "unknown"),
        }
    }
}

impl FromStr for PartialDate {
    type Err = DateError;

    /// Parses `YYYY-MM`, `YYYY`, `?-MM`, or an empty string / `unknown` (fully unknown).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "unknown" {
            return Ok(Self::UNKNOWN);
        }

        let unparseable = || DateError::Unparseable(trimmed.to_owned());
        // A leading '-' is the sign of a negative year, not the year/month separator.
        let separator = trimmed
            .get(1..)
            .and_then(|rest| rest.find('-'))
            .map(|index| index + 1);
        match separator.map(|index| (&trimmed[..index], &trimmed[index + 1..])) {
            Some((year, month)) => {
                let year = match year {
                    "?" => None,
                    year => Some(year.parse::<i32>().map_err(|_| unparseable())?),
                };
                let month = month.parse::<u32>().map_err(|_| unparseable())?;
                Self::new(year, Some(month))
            }
            None => trimmed
                .parse::<i32>()
                .map(Self::of_year)
                .map_err(|_| unparseable()),
        }
    }
}

/// Serde carrier so deserialized dates pass through month validation.
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialDateParts {
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    month: Option<u32>,
}

impl TryFrom<PartialDateParts> for PartialDate {
    type Error = DateError;

    fn try_from(parts: PartialDateParts) -> Result<Self, Self::Error> {
        PartialDate::new(parts.year, parts.month)
    }
}

impl From<PartialDate> for PartialDateParts {
    fn from(date: PartialDate) -> Self {
        Self {
            year: date.year,
            month: date.month,
        }
    }
}
