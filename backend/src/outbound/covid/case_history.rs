//! Reqwest-backed case history adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use super::dto::CaseHistoryResponseDto;
use super::http::{build_client, endpoint, get_json};
use crate::domain::ports::{CaseHistory, CaseHistorySource, CaseStatus, MetricSourceError};

/// Case history source querying `{base}/history?country=..&status=..`.
pub struct HttpCaseHistorySource {
    client: Client,
    base: Url,
}

impl HttpCaseHistorySource {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(timeout)?,
            base,
        })
    }

    pub(super) fn history_url(
        base: &Url,
        country: &str,
        status: CaseStatus,
    ) -> Result<Url, MetricSourceError> {
        let mut url = endpoint(base, &["history"])?;
        url.query_pairs_mut()
            .append_pair("country", country)
            .append_pair("status", status.as_query_value());
        Ok(url)
    }
}

fn into_history(
    country: &str,
    response: Option<CaseHistoryResponseDto>,
) -> Result<CaseHistory, MetricSourceError> {
    let all = response
        .and_then(|dto| dto.all)
        .ok_or_else(|| MetricSourceError::country_not_found(country))?;
    all.into_domain().map_err(MetricSourceError::decode)
}

#[async_trait]
impl CaseHistorySource for HttpCaseHistorySource {
    async fn case_history(
        &self,
        country: &str,
        status: CaseStatus,
    ) -> Result<CaseHistory, MetricSourceError> {
        let url = Self::history_url(&self.base, country, status)?;
        let response = get_json::<CaseHistoryResponseDto>(&self.client, url).await?;
        let history = into_history(country, response)?;
        debug!(
            country,
            status = status.as_query_value(),
            points = history.dates.len(),
            "case history fetched"
        );
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn decode(body: &str) -> Option<CaseHistoryResponseDto> {
        Some(serde_json::from_str(body).expect("valid JSON"))
    }

    #[rstest]
    fn builds_history_query() {
        let base = Url::parse("https://covid-api.mmediagroup.fr/v1/").expect("url");
        let url = HttpCaseHistorySource::history_url(&base, "South Africa", CaseStatus::Recovered)
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://covid-api.mmediagroup.fr/v1/history?country=South+Africa&status=Recovered"
        );
    }

    #[rstest]
    fn decodes_history_payload() {
        let body = r#"{"All": {
            "country": "Norway",
            "population": 5337962,
            "continent": "Europe",
            "dates": {"2021-03-02": 75000, "2021-03-01": 74000}
        }}"#;

        let history = into_history("Norway", decode(body)).expect("decodes");

        assert_eq!(history.continent, "Europe");
        assert!((history.population - 5_337_962.0).abs() < f64::EPSILON);
        let day = NaiveDate::from_ymd_opt(2021, 3, 2).expect("date");
        assert_eq!(history.peak(), Some((day, 75_000.0)));
    }

    #[rstest]
    #[case::empty_object(decode("{}"))]
    #[case::not_found(None)]
    fn missing_all_means_unknown_country(#[case] response: Option<CaseHistoryResponseDto>) {
        let err = into_history("Atlantis", response).expect_err("unknown");
        assert_eq!(err, MetricSourceError::country_not_found("Atlantis"));
    }

    #[rstest]
    fn malformed_dates_are_decode_errors() {
        let body = r#"{"All": {"dates": {"yesterday": 1}}}"#;
        let err = into_history("Norway", decode(body)).expect_err("bad key");
        assert!(matches!(err, MetricSourceError::Decode { .. }));
    }
}
