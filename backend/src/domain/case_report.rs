//! Case and policy report types.
//!
//! Reports answer point-in-time questions about one country: how many cases
//! were confirmed over a date range, and how the policy stringency score moved
//! between two dates.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Message returned for malformed or unknown scope dates.
pub const SCOPE_FORMAT_MESSAGE: &str =
    "Wrong date format in scope. example of valid date: 2020-12-01-2021-01-31";

/// Inclusive date range written as `YYYY-MM-DD-YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// First date of the range.
    pub start: NaiveDate,
    /// Last date of the range.
    pub end: NaiveDate,
}

impl DateRange {
    /// Construct a range from its endpoints.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

/// Error returned when a scope string is not a valid date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Wrong date format in scope. example of valid date: 2020-12-01-2021-01-31")]
pub struct ScopeParseError;

impl FromStr for DateRange {
    type Err = ScopeParseError;

    /// Parse a scope such as `2020-12-01-2021-01-31`.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use corona_backend::domain::DateRange;
    ///
    /// let range: DateRange = "2020-12-01-2021-01-31".parse().expect("valid scope");
    /// assert_eq!(range.start, NaiveDate::from_ymd_opt(2020, 12, 1).expect("date"));
    /// assert_eq!(range.to_string(), "2020-12-01-2021-01-31");
    /// assert!("2020-12-01".parse::<DateRange>().is_err());
    /// ```
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = value.split('-').collect();
        let &[sy, sm, sd, ey, em, ed] = parts.as_slice() else {
            return Err(ScopeParseError);
        };
        let parse = |y: &str, m: &str, d: &str| {
            NaiveDate::parse_from_str(&format!("{y}-{m}-{d}"), DATE_FORMAT)
                .map_err(|_| ScopeParseError)
        };
        Ok(Self {
            start: parse(sy, sm, sd)?,
            end: parse(ey, em, ed)?,
        })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

/// Normalise a country name to title case, e.g. `nORWAY` becomes `Norway`.
///
/// Every letter following a non-alphanumeric character is capitalised, so
/// `united states` becomes `United States` and `guinea-bissau` becomes
/// `Guinea-Bissau`.
pub fn normalise_country_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut at_word_start = true;
    for ch in raw.trim().chars() {
        if at_word_start {
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
        at_word_start = !(ch.is_alphanumeric() || ch == '_');
    }
    out
}

/// Confirmed and recovered cases for one country.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryCaseReport {
    /// Normalised country name.
    pub country: String,
    /// Continent reported by the provider.
    pub continent: String,
    /// `total` or the requested `start-end` range.
    pub scope: String,
    /// Confirmed cases in scope.
    pub confirmed: i64,
    /// Recovered cases in scope.
    pub recovered: i64,
    /// Confirmed cases as a share of the population, floored to two decimals.
    pub population_percentage: f64,
}

/// Policy stringency at a date and its change over a range.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyTrendReport {
    /// Normalised country name.
    pub country: String,
    /// `latest` or the requested `start-end` range.
    pub scope: String,
    /// Stringency score on the end date.
    pub stringency: f64,
    /// End score minus start score.
    pub trend: f64,
}

/// Share of `population` represented by `confirmed`, floored to two decimals.
///
/// Returns zero when the population is unknown.
pub fn population_percentage(confirmed: f64, population: f64) -> f64 {
    if population <= 0.0 || !population.is_finite() {
        return 0.0;
    }
    (confirmed / population * 100.0 * 100.0).floor() / 100.0
}
