//! Driven port for per-country case history.
//!
//! The provider returns a cumulative series keyed by date together with
//! country metadata used by the case report.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::MetricSourceError;

/// Case series requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseStatus {
    /// Cumulative confirmed cases.
    Confirmed,
    /// Cumulative recoveries.
    Recovered,
}

impl CaseStatus {
    /// Query parameter value understood by the provider.
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Confirmed => "Confirmed",
            Self::Recovered => "Recovered",
        }
    }
}

/// Cumulative case series for one country.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaseHistory {
    /// Continent reported by the provider.
    pub continent: String,
    /// Population reported by the provider.
    pub population: f64,
    /// Cumulative count per date.
    pub dates: BTreeMap<NaiveDate, f64>,
}

impl CaseHistory {
    /// Highest value in the series with the date it was reported on.
    ///
    /// The series is not trusted to be monotonic, so the maximum is used
    /// rather than the most recent entry. Ties resolve to the earliest date.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use corona_backend::domain::ports::CaseHistory;
    ///
    /// let mut history = CaseHistory::default();
    /// let day = |d| NaiveDate::from_ymd_opt(2021, 3, d).expect("valid date");
    /// history.dates.insert(day(1), 10.0);
    /// history.dates.insert(day(2), 30.0);
    /// history.dates.insert(day(3), 25.0);
    /// assert_eq!(history.peak(), Some((day(2), 30.0)));
    /// ```
    pub fn peak(&self) -> Option<(NaiveDate, f64)> {
        self.dates
            .iter()
            .fold(None, |best: Option<(NaiveDate, f64)>, (date, value)| match best {
                Some((_, current)) if current >= *value => best,
                _ => Some((*date, *value)),
            })
    }

    /// Highest value in the series, or zero when it is empty.
    pub fn peak_value(&self) -> f64 {
        self.peak().map_or(0.0, |(_, value)| value)
    }

    /// Value reported on `date`, if present.
    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.dates.get(&date).copied()
    }
}

/// Port for fetching case history by country name.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaseHistorySource: Send + Sync {
    /// Fetch the cumulative series for `country`.
    ///
    /// Returns [`MetricSourceError::CountryNotFound`] when the provider has no
    /// data for the name.
    async fn case_history(
        &self,
        country: &str,
        status: CaseStatus,
    ) -> Result<CaseHistory, MetricSourceError>;
}

/// Fixture implementation returning an empty series.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureCaseHistorySource;

#[async_trait]
impl CaseHistorySource for FixtureCaseHistorySource {
    async fn case_history(
        &self,
        _country: &str,
        _status: CaseStatus,
    ) -> Result<CaseHistory, MetricSourceError> {
        Ok(CaseHistory::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, d).expect("valid date")
    }

    fn history(values: &[(u32, f64)]) -> CaseHistory {
        CaseHistory {
            continent: "Europe".to_owned(),
            population: 5_000_000.0,
            dates: values.iter().map(|(d, v)| (day(*d), *v)).collect(),
        }
    }

    #[rstest]
    #[case(&[], None)]
    #[case(&[(1, 5.0)], Some((1, 5.0)))]
    #[case(&[(1, 5.0), (2, 9.0), (3, 7.0)], Some((2, 9.0)))]
    #[case(&[(1, 9.0), (2, 9.0)], Some((1, 9.0)))]
    fn peak_picks_highest_value(
        #[case] values: &[(u32, f64)],
        #[case] expected: Option<(u32, f64)>,
    ) {
        let peak = history(values).peak();
        assert_eq!(peak, expected.map(|(d, v)| (day(d), v)));
    }

    #[test]
    fn peak_value_defaults_to_zero() {
        assert!(history(&[]).peak_value().abs() < f64::EPSILON);
    }

    #[test]
    fn value_on_reads_single_date() {
        let series = history(&[(1, 5.0), (2, 9.0)]);
        assert_eq!(series.value_on(day(2)), Some(9.0));
        assert_eq!(series.value_on(day(4)), None);
    }

    #[tokio::test]
    async fn fixture_returns_empty_series() {
        let series = FixtureCaseHistorySource
            .case_history("Norway", CaseStatus::Confirmed)
            .await
            .expect("fixture succeeds");
        assert!(series.dates.is_empty());
    }
}
