//! Error shared by the upstream data provider ports.

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while fetching metrics from an upstream provider.
    pub enum MetricSourceError {
        /// The provider does not know the requested country.
        CountryNotFound { country: String } =>
            "Can't find country with name: {country}",
        /// Network transport failed or the provider answered with an error status.
        Transport { message: String } =>
            "upstream transport failed: {message}",
        /// The provider did not answer within the configured timeout.
        Timeout { message: String } =>
            "upstream timeout: {message}",
        /// The provider response could not be decoded.
        Decode { message: String } =>
            "upstream response decode failed: {message}",
    }
}

impl MetricSourceError {
    /// Whether the failure is attributable to the caller's input.
    pub fn is_country_not_found(&self) -> bool {
        matches!(self, Self::CountryNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(MetricSourceError::country_not_found("Atlantis"), true)]
    #[case(MetricSourceError::transport("connection refused"), false)]
    #[case(MetricSourceError::timeout("15s elapsed"), false)]
    #[case(MetricSourceError::decode("missing field"), false)]
    fn classifies_country_not_found(#[case] err: MetricSourceError, #[case] expected: bool) {
        assert_eq!(err.is_country_not_found(), expected);
    }

    #[test]
    fn country_not_found_names_the_country() {
        let err = MetricSourceError::country_not_found("Atlantis");
        assert_eq!(err.to_string(), "Can't find country with name: Atlantis");
    }
}
