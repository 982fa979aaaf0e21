//! Resolve the current value of a monitored metric.
//!
//! Stringency scores are published with a delay, so the resolver looks them
//! up for a date a configurable number of days in the past. Confirmed cases
//! use the peak of the cumulative series.

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use tracing::debug;

use crate::domain::MonitoredField;
use crate::domain::ports::{
    CaseHistorySource, CaseStatus, CountryCodeLookup, MetricSourceError, StringencySource,
};

/// Default delay applied to stringency lookups.
pub const DEFAULT_STRINGENCY_LAG_DAYS: u32 = 10;

/// Upstream data provider ports shared by metric consumers.
#[derive(Clone)]
pub struct MetricSources {
    /// Country name to alpha-3 code resolver.
    pub country_codes: Arc<dyn CountryCodeLookup>,
    /// Policy stringency provider.
    pub stringency: Arc<dyn StringencySource>,
    /// Case history provider.
    pub case_history: Arc<dyn CaseHistorySource>,
}

impl MetricSources {
    /// Bundle the provider ports.
    pub fn new(
        country_codes: Arc<dyn CountryCodeLookup>,
        stringency: Arc<dyn StringencySource>,
        case_history: Arc<dyn CaseHistorySource>,
    ) -> Self {
        Self {
            country_codes,
            stringency,
            case_history,
        }
    }
}

/// Fetches the current value of a [`MonitoredField`] for a country.
#[derive(Clone)]
pub struct MetricResolver {
    sources: MetricSources,
    stringency_lag_days: u32,
}

impl MetricResolver {
    /// Create a resolver with the given stringency lag.
    pub fn new(sources: MetricSources, stringency_lag_days: u32) -> Self {
        Self {
            sources,
            stringency_lag_days,
        }
    }

    /// Provider ports backing this resolver.
    pub fn sources(&self) -> &MetricSources {
        &self.sources
    }

    /// Date used for stringency lookups at `now`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use chrono::{NaiveDate, TimeZone, Utc};
    /// use corona_backend::domain::ports::{
    ///     FixtureCaseHistorySource, FixtureCountryCodeLookup, FixtureStringencySource,
    /// };
    /// use corona_backend::domain::{MetricResolver, MetricSources};
    ///
    /// let resolver = MetricResolver::new(
    ///     MetricSources::new(
    ///         Arc::new(FixtureCountryCodeLookup),
    ///         Arc::new(FixtureStringencySource),
    ///         Arc::new(FixtureCaseHistorySource),
    ///     ),
    ///     10,
    /// );
    /// let now = Utc.with_ymd_and_hms(2021, 3, 11, 0, 30, 0).single().expect("valid time");
    /// assert_eq!(
    ///     resolver.lagged_date(now),
    ///     NaiveDate::from_ymd_opt(2021, 3, 1).expect("valid date")
    /// );
    /// ```
    pub fn lagged_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.checked_sub_days(Days::new(u64::from(self.stringency_lag_days)))
            .unwrap_or(now)
            .date_naive()
    }

    /// Stringency score for `country` on `date`.
    pub async fn stringency_on(
        &self,
        country: &str,
        date: NaiveDate,
    ) -> Result<f64, MetricSourceError> {
        let code = self.sources.country_codes.alpha3_code(country).await?;
        self.sources.stringency.stringency(&code, date).await
    }

    /// Current value of `field` for `country`.
    ///
    /// # Errors
    /// Propagates provider failures, including an unknown country.
    pub async fn current_value(
        &self,
        field: MonitoredField,
        country: &str,
        now: DateTime<Utc>,
    ) -> Result<f64, MetricSourceError> {
        let value = match field {
            MonitoredField::Stringency => {
                self.stringency_on(country, self.lagged_date(now)).await?
            }
            MonitoredField::Confirmed => self
                .sources
                .case_history
                .case_history(country, CaseStatus::Confirmed)
                .await?
                .peak_value(),
        };
        debug!(%field, country, value, "resolved current metric value");
        Ok(value)
    }
}
