//! Reqwest-backed stringency adapter.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Url};

use super::dto::StringencyResponseDto;
use super::http::{build_client, endpoint, get_json};
use crate::domain::ports::{MetricSourceError, StringencySource};

/// Stringency source querying `{base}/{alpha3}/{YYYY-MM-DD}`.
pub struct HttpStringencySource {
    client: Client,
    base: Url,
}

impl HttpStringencySource {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(timeout)?,
            base,
        })
    }
}

pub(super) fn stringency_url(
    base: &Url,
    country_code: &str,
    date: NaiveDate,
) -> Result<Url, MetricSourceError> {
    let date = date.format("%Y-%m-%d").to_string();
    endpoint(base, &[country_code, date.as_str()])
}

fn into_score(
    country_code: &str,
    date: NaiveDate,
    response: Option<StringencyResponseDto>,
) -> Result<f64, MetricSourceError> {
    let data = response
        .and_then(|dto| dto.stringency_data)
        .ok_or_else(|| {
            MetricSourceError::decode(format!("no stringency data for {country_code} on {date}"))
        })?;
    data.stringency.ok_or_else(|| {
        let reason = data.msg.unwrap_or_else(|| "missing score".to_owned());
        MetricSourceError::decode(format!(
            "no stringency score for {country_code} on {date}: {reason}"
        ))
    })
}

#[async_trait]
impl StringencySource for HttpStringencySource {
    async fn stringency(
        &self,
        country_code: &str,
        date: NaiveDate,
    ) -> Result<f64, MetricSourceError> {
        let url = stringency_url(&self.base, country_code, date)?;
        let response = get_json::<StringencyResponseDto>(&self.client, url).await?;
        into_score(country_code, date, response)
    }
}
