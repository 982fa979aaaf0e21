//! Driving port for per-country case and policy reports.

use async_trait::async_trait;

use crate::domain::{CountryCaseReport, DateRange, Error, PolicyTrendReport};

/// Domain use-case port answering case and policy questions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaseReportQuery: Send + Sync {
    /// Confirmed and recovered cases, in total or over `scope`.
    async fn country_cases(
        &self,
        country: &str,
        scope: Option<DateRange>,
    ) -> Result<CountryCaseReport, Error>;

    /// Stringency at the end of `scope` (or the lagged date) and its trend.
    async fn policy_trend(
        &self,
        country: &str,
        scope: Option<DateRange>,
    ) -> Result<PolicyTrendReport, Error>;
}

/// Fixture query returning empty reports for any country.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCaseReportQuery;

#[async_trait]
impl CaseReportQuery for FixtureCaseReportQuery {
    async fn country_cases(
        &self,
        country: &str,
        scope: Option<DateRange>,
    ) -> Result<CountryCaseReport, Error> {
        Ok(CountryCaseReport {
            country: country.to_owned(),
            continent: String::new(),
            scope: scope.map_or_else(|| "total".to_owned(), |range| range.to_string()),
            confirmed: 0,
            recovered: 0,
            population_percentage: 0.0,
        })
    }

    async fn policy_trend(
        &self,
        country: &str,
        scope: Option<DateRange>,
    ) -> Result<PolicyTrendReport, Error> {
        Ok(PolicyTrendReport {
            country: country.to_owned(),
            scope: scope.map_or_else(|| "latest".to_owned(), |range| range.to_string()),
            stringency: 0.0,
            trend: 0.0,
        })
    }
}
