//! DTOs for decoding the public COVID-19 provider payloads.
//!
//! Each adapter decodes into these transport DTOs first, then maps into the
//! domain records in one pass.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::ports::CaseHistory;

/// `GET /v1/history?country=..&status=..` from the case history provider.
///
/// An unknown country yields an empty object instead of an error status.
#[derive(Debug, Default, Deserialize)]
pub(super) struct CaseHistoryResponseDto {
    #[serde(rename = "All", default)]
    pub(super) all: Option<CaseHistoryAllDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CaseHistoryAllDto {
    #[serde(default)]
    pub(super) continent: Option<String>,
    #[serde(default)]
    pub(super) population: Option<f64>,
    #[serde(default)]
    pub(super) dates: HashMap<String, Value>,
}

impl CaseHistoryAllDto {
    /// Keep the dated numeric entries; anything else is a decode failure.
    pub(super) fn into_domain(self) -> Result<CaseHistory, String> {
        let dates = self
            .dates
            .into_iter()
            .map(|(raw_date, raw_value)| {
                let date = NaiveDate::parse_from_str(&raw_date, "%Y-%m-%d")
                    .map_err(|err| format!("invalid date key '{raw_date}': {err}"))?;
                let value = raw_value
                    .as_f64()
                    .ok_or_else(|| format!("non-numeric count on {raw_date}"))?;
                Ok((date, value))
            })
            .collect::<Result<BTreeMap<_, _>, String>>()?;

        Ok(CaseHistory {
            continent: self.continent.unwrap_or_default(),
            population: self.population.unwrap_or_default(),
            dates,
        })
    }
}

/// `GET /api/v2/stringency/actions/{code}/{date}` from the stringency
/// provider. Dates without data carry no `stringency` member.
#[derive(Debug, Default, Deserialize)]
pub(super) struct StringencyResponseDto {
    #[serde(rename = "stringencyData", default)]
    pub(super) stringency_data: Option<StringencyDataDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct StringencyDataDto {
    #[serde(default)]
    pub(super) stringency: Option<f64>,
    #[serde(default)]
    pub(super) msg: Option<String>,
}

/// One element of the country lookup response array.
#[derive(Debug, Deserialize)]
pub(super) struct CountryDto {
    #[serde(rename = "alpha3Code")]
    pub(super) alpha3_code: String,
}
