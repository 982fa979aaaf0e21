//! Driven port for government policy stringency scores.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::MetricSourceError;

/// Port for fetching the stringency score of a country on a date.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StringencySource: Send + Sync {
    /// Fetch the score for the ISO alpha-3 `country_code` on `date`.
    async fn stringency(
        &self,
        country_code: &str,
        date: NaiveDate,
    ) -> Result<f64, MetricSourceError>;
}

/// Fixture implementation returning a constant score.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureStringencySource;

#[async_trait]
impl StringencySource for FixtureStringencySource {
    async fn stringency(
        &self,
        _country_code: &str,
        _date: NaiveDate,
    ) -> Result<f64, MetricSourceError> {
        Ok(0.0)
    }
}
