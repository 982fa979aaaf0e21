//! Driven port resolving country names to ISO alpha-3 codes.

use async_trait::async_trait;

use super::MetricSourceError;

/// Port for resolving a full country name to its alpha-3 code.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CountryCodeLookup: Send + Sync {
    /// Resolve `country` (full name, exact match) to an alpha-3 code.
    async fn alpha3_code(&self, country: &str) -> Result<String, MetricSourceError>;
}

/// Fixture implementation deriving a code from the first three letters.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureCountryCodeLookup;

#[async_trait]
impl CountryCodeLookup for FixtureCountryCodeLookup {
    async fn alpha3_code(&self, country: &str) -> Result<String, MetricSourceError> {
        let code: String = country
            .chars()
            .filter(char::is_ascii_alphabetic)
            .take(3)
            .collect();
        if code.len() < 3 {
            return Err(MetricSourceError::country_not_found(country));
        }
        Ok(code.to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_uppercases_prefix() {
        let code = FixtureCountryCodeLookup
            .alpha3_code("Norway")
            .await
            .expect("fixture lookup");
        assert_eq!(code, "NOR");
    }

    #[tokio::test]
    async fn fixture_rejects_short_names() {
        let err = FixtureCountryCodeLookup
            .alpha3_code("X")
            .await
            .expect_err("too short");
        assert!(err.is_country_not_found());
    }
}
