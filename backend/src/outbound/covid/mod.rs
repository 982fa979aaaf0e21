//! Outbound adapters for the public COVID-19 data providers.
//!
//! Each adapter owns transport details only: URL construction, timeout and
//! HTTP error mapping, and JSON decoding into the domain records of
//! [`crate::domain::ports`].

mod case_history;
mod country_lookup;
mod dto;
mod http;
mod probe;
mod stringency;

use reqwest::Url;

pub use case_history::HttpCaseHistorySource;
pub use country_lookup::HttpCountryCodeLookup;
pub use probe::HttpUpstreamProbe;
pub use stringency::HttpStringencySource;

/// Default case history provider base.
pub const DEFAULT_CASE_HISTORY_BASE_URL: &str = "https://covid-api.mmediagroup.fr/v1/";
/// Default stringency provider base.
pub const DEFAULT_STRINGENCY_BASE_URL: &str =
    "https://covidtrackerapi.bsg.ox.ac.uk/api/v2/stringency/actions/";
/// Default country lookup base.
pub const DEFAULT_COUNTRY_LOOKUP_BASE_URL: &str = "https://restcountries.eu/rest/v2/name/";

/// Base URLs of the three providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CovidEndpoints {
    /// Case history provider.
    pub case_history: Url,
    /// Stringency provider.
    pub stringency: Url,
    /// Country name lookup.
    pub country_lookup: Url,
}

impl CovidEndpoints {
    /// Parse the three base URLs.
    ///
    /// # Errors
    ///
    /// Returns the first URL parse failure.
    pub fn parse(
        case_history: &str,
        stringency: &str,
        country_lookup: &str,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            case_history: Url::parse(case_history)?,
            stringency: Url::parse(stringency)?,
            country_lookup: Url::parse(country_lookup)?,
        })
    }

    #[cfg(test)]
    pub(crate) fn public() -> Self {
        Self::parse(
            DEFAULT_CASE_HISTORY_BASE_URL,
            DEFAULT_STRINGENCY_BASE_URL,
            DEFAULT_COUNTRY_LOOKUP_BASE_URL,
        )
        .expect("default endpoints parse")
    }
}
