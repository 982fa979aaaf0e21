//! Reqwest-backed country name to ISO alpha-3 lookup.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::dto::CountryDto;
use super::http::{build_client, endpoint, get_json};
use crate::domain::ports::{CountryCodeLookup, MetricSourceError};

/// Lookup querying `{base}/{name}?fullText=true`.
pub struct HttpCountryCodeLookup {
    client: Client,
    base: Url,
}

impl HttpCountryCodeLookup {
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

pub(super) fn lookup_url(base: &Url, country: &str) -> Result<Url, MetricSourceError> {
    let mut url = endpoint(base, &[country])?;
    url.query_pairs_mut().append_pair("fullText", "true");
    Ok(url)
}

fn first_code(
    country: &str,
    response: Option<Vec<CountryDto>>,
) -> Result<String, MetricSourceError> {
    response
        .unwrap_or_default()
        .into_iter()
        .map(|dto| dto.alpha3_code)
        .find(|code| !code.is_empty())
        .ok_or_else(|| MetricSourceError::country_not_found(country))
}

#[async_trait]
impl CountryCodeLookup for HttpCountryCodeLookup {
    async fn alpha3_code(&self, country: &str) -> Result<String, MetricSourceError> {
        let url = lookup_url(&self.base, country)?;
        let response = get_json::<Vec<CountryDto>>(&self.client, url).await?;
        first_code(country, response)
    }
}
