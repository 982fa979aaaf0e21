//! Reqwest-backed reachability probe for the diagnostics endpoint.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode, Url};
use tracing::warn;

use super::case_history::HttpCaseHistorySource;
use super::http::build_client;
use super::stringency::stringency_url;
use super::CovidEndpoints;
use crate::domain::ports::{CaseStatus, MetricSourceError, UpstreamProbe, UpstreamProvider};

const PROBE_COUNTRY: &str = "Norway";
const PROBE_COUNTRY_CODE: &str = "NOR";

fn probe_date() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2020, 10, 10)
}

/// Probe issuing one representative GET per provider.
pub struct HttpUpstreamProbe {
    client: Client,
    case_history: Option<Url>,
    stringency: Option<Url>,
}

impl HttpUpstreamProbe {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoints: &CovidEndpoints, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(timeout)?,
            case_history: probe_url(HttpCaseHistorySource::history_url(
                &endpoints.case_history,
                PROBE_COUNTRY,
                CaseStatus::Confirmed,
            )),
            stringency: probe_date().and_then(|date| {
                probe_url(stringency_url(&endpoints.stringency, PROBE_COUNTRY_CODE, date))
            }),
        })
    }
}

fn probe_url(url: Result<Url, MetricSourceError>) -> Option<Url> {
    url.inspect_err(|err| warn!(error = %err, "probe url unavailable"))
        .ok()
}

#[async_trait]
impl UpstreamProbe for HttpUpstreamProbe {
    async fn status_code(&self, provider: UpstreamProvider) -> u16 {
        let url = match provider {
            UpstreamProvider::CaseHistory => self.case_history.clone(),
            UpstreamProvider::Stringency => self.stringency.clone(),
        };
        let Some(url) = url else {
            return StatusCode::BAD_REQUEST.as_u16();
        };
        match self.client.get(url).send().await {
            Ok(response) => response.status().as_u16(),
            Err(err) => {
                warn!(%provider, error = %err, "upstream probe failed");
                StatusCode::BAD_REQUEST.as_u16()
            }
        }
    }
}
