//! Case and policy report service.
//!
//! Implements [`CaseReportQuery`] over the upstream data provider ports.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockable::Clock;

use crate::domain::ports::{CaseHistory, CaseReportQuery, CaseStatus};
use crate::domain::subscription_service::map_metric_error;
use crate::domain::{
    CountryCaseReport, DateRange, Error, MetricResolver, PolicyTrendReport,
    SCOPE_FORMAT_MESSAGE, normalise_country_name, population_percentage,
};

/// Service answering case and policy questions for one country.
#[derive(Clone)]
pub struct CaseReportService {
    resolver: MetricResolver,
    clock: Arc<dyn Clock>,
}

impl CaseReportService {
    /// Create a service over `resolver`.
    pub fn new(resolver: MetricResolver, clock: Arc<dyn Clock>) -> Self {
        Self { resolver, clock }
    }

    async fn history(&self, country: &str, status: CaseStatus) -> Result<CaseHistory, Error> {
        self.resolver
            .sources()
            .case_history
            .case_history(country, status)
            .await
            .map_err(map_metric_error)
    }

    async fn stringency(&self, code: &str, date: NaiveDate) -> Result<f64, Error> {
        self.resolver
            .sources()
            .stringency
            .stringency(code, date)
            .await
            .map_err(map_metric_error)
    }
}

fn difference(history: &CaseHistory, range: DateRange) -> Option<f64> {
    Some(history.value_on(range.end)? - history.value_on(range.start)?)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "case counts are whole numbers well inside the i64 range"
)]
fn whole(value: f64) -> i64 {
    value as i64
}

#[async_trait]
impl CaseReportQuery for CaseReportService {
    async fn country_cases(
        &self,
        country: &str,
        scope: Option<DateRange>,
    ) -> Result<CountryCaseReport, Error> {
        let country = normalise_country_name(country);
        let confirmed_history = self.history(&country, CaseStatus::Confirmed).await?;
        let recovered_history = self.history(&country, CaseStatus::Recovered).await?;

        let (scope_label, confirmed, recovered) = match scope {
            Some(range) => {
                let confirmed = difference(&confirmed_history, range)
                    .ok_or_else(|| Error::invalid_request(SCOPE_FORMAT_MESSAGE))?;
                let recovered = difference(&recovered_history, range).unwrap_or(0.0);
                (range.to_string(), confirmed, recovered)
            }
            None => {
                let (peak_date, confirmed) = confirmed_history.peak().unwrap_or_default();
                let recovered = recovered_history.value_on(peak_date).unwrap_or(0.0);
                ("total".to_owned(), confirmed, recovered)
            }
        };

        Ok(CountryCaseReport {
            continent: confirmed_history.continent.clone(),
            population_percentage: population_percentage(
                confirmed,
                confirmed_history.population,
            ),
            country,
            scope: scope_label,
            confirmed: whole(confirmed),
            recovered: whole(recovered),
        })
    }

    async fn policy_trend(
        &self,
        country: &str,
        scope: Option<DateRange>,
    ) -> Result<PolicyTrendReport, Error> {
        let country = normalise_country_name(country);
        let code = self
            .resolver
            .sources()
            .country_codes
            .alpha3_code(&country)
            .await
            .map_err(map_metric_error)?;

        let (scope_label, range) = match scope {
            Some(range) => (range.to_string(), range),
            None => {
                let date = self.resolver.lagged_date(self.clock.utc());
                ("latest".to_owned(), DateRange::new(date, date))
            }
        };

        let stringency = self.stringency(&code, range.end).await?;
        let start = if range.start == range.end {
            stringency
        } else {
            self.stringency(&code, range.start).await?
        };

        Ok(PolicyTrendReport {
            country,
            scope: scope_label,
            stringency,
            trend: stringency - start,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::MetricSources;
    use crate::test_support::clock::MutableClock;
    use crate::test_support::upstream::ScriptedUpstream;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, d).expect("valid date")
    }

    fn series(values: &[(u32, f64)]) -> CaseHistory {
        CaseHistory {
            continent: "Europe".to_owned(),
            population: 5_000_000.0,
            dates: values
                .iter()
                .map(|(d, v)| (day(*d), *v))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn service() -> CaseReportService {
        let upstream = ScriptedUpstream::default().with_code("Norway", "NOR");
        upstream.set_history(
            "Norway",
            CaseStatus::Confirmed,
            series(&[(1, 1_000.0), (2, 1_500.0), (3, 2_500.0), (4, 2_400.0)]),
        );
        upstream.set_history(
            "Norway",
            CaseStatus::Recovered,
            series(&[(1, 100.0), (2, 300.0), (3, 900.0), (4, 950.0)]),
        );
        upstream.set_stringency("NOR", day(1), 50.0);
        upstream.set_stringency("NOR", day(3), 62.5);
        let upstream = Arc::new(upstream);
        let clock = Utc
            .with_ymd_and_hms(2021, 3, 13, 8, 0, 0)
            .single()
            .expect("valid time");
        CaseReportService::new(
            MetricResolver::new(
                MetricSources::new(upstream.clone(), upstream.clone(), upstream),
                10,
            ),
            Arc::new(MutableClock::new(clock)),
        )
    }

    #[tokio::test]
    async fn total_cases_use_peak_date() {
        let report = service()
            .country_cases("nORWAY", None)
            .await
            .expect("report");

        assert_eq!(report.country, "Norway");
        assert_eq!(report.continent, "Europe");
        assert_eq!(report.scope, "total");
        assert_eq!(report.confirmed, 2_500);
        assert_eq!(report.recovered, 900);
        assert!((report.population_percentage - 0.05).abs() < 1e-9);
    }

    #[tokio::test]
    async fn scoped_cases_use_differences() {
        let scope = DateRange::new(day(1), day(3));
        let report = service()
            .country_cases("norway", Some(scope))
            .await
            .expect("report");

        assert_eq!(report.scope, "2021-03-01-2021-03-03");
        assert_eq!(report.confirmed, 1_500);
        assert_eq!(report.recovered, 800);
    }

    #[tokio::test]
    async fn scope_outside_series_is_rejected() {
        let scope = DateRange::new(day(1), day(20));
        let err = service()
            .country_cases("Norway", Some(scope))
            .await
            .expect_err("date missing");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), SCOPE_FORMAT_MESSAGE);
    }

    #[tokio::test]
    async fn unknown_country_is_rejected() {
        let err = service()
            .country_cases("Atlantis", None)
            .await
            .expect_err("unknown");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn policy_trend_over_scope() {
        let scope = DateRange::new(day(1), day(3));
        let report = service()
            .policy_trend("norway", Some(scope))
            .await
            .expect("report");

        assert_eq!(report.country, "Norway");
        assert_eq!(report.scope, "2021-03-01-2021-03-03");
        assert!((report.stringency - 62.5).abs() < f64::EPSILON);
        assert!((report.trend - 12.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn policy_without_scope_uses_lagged_date() {
        let report = service()
            .policy_trend("Norway", None)
            .await
            .expect("report");

        assert_eq!(report.scope, "latest");
        assert!((report.stringency - 62.5).abs() < f64::EPSILON);
        assert!(report.trend.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn missing_stringency_is_an_upstream_failure() {
        let scope = DateRange::new(day(2), day(3));
        let err = service()
            .policy_trend("Norway", Some(scope))
            .await
            .expect_err("no data for start date");
        assert_eq!(err.code(), ErrorCode::UpstreamUnavailable);
    }
}
