//! Service configuration loaded via OrthoConfig.
//!
//! Values come from `CORONA_*` environment variables, command-line flags, or
//! an optional configuration file. Every field is optional; the accessors
//! supply the defaults.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DEFAULT_STRINGENCY_LAG_DAYS;
use crate::outbound::covid::{
    DEFAULT_CASE_HISTORY_BASE_URL, DEFAULT_COUNTRY_LOOKUP_BASE_URL, DEFAULT_STRINGENCY_BASE_URL,
};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 3600;
const DEFAULT_MAX_CONCURRENT_EVALUATIONS: usize = 4;
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 15;

/// Runtime settings for the HTTP server and notification scheduler.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CORONA")]
pub struct ServiceSettings {
    /// TCP port to listen on.
    pub port: Option<u16>,
    /// Interface to bind.
    pub bind_host: Option<IpAddr>,
    /// PostgreSQL connection string; absent selects the in-memory store.
    pub database_url: Option<String>,
    /// Seconds slept between scheduler ticks.
    pub poll_interval_secs: Option<u64>,
    /// Upper bound on subscriptions evaluated concurrently per tick.
    pub max_concurrent_evaluations: Option<usize>,
    /// Request timeout for upstream providers and webhook callbacks.
    pub upstream_timeout_secs: Option<u64>,
    /// Days subtracted from today when reading the latest stringency.
    pub stringency_lag_days: Option<u32>,
    /// Base URL of the case history provider.
    pub case_history_base_url: Option<String>,
    /// Base URL of the stringency provider.
    pub stringency_base_url: Option<String>,
    /// Base URL of the country name lookup.
    pub country_lookup_base_url: Option<String>,
}

impl ServiceSettings {
    /// Socket address the HTTP server binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.bind_host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Sleep between scheduler ticks; at least one second.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(
            self.poll_interval_secs
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
                .max(1),
        )
    }

    /// Concurrency bound for one tick; never below one.
    pub fn max_concurrent_evaluations(&self) -> usize {
        self.max_concurrent_evaluations
            .unwrap_or(DEFAULT_MAX_CONCURRENT_EVALUATIONS)
            .max(1)
    }

    /// Request timeout for outbound HTTP; at least one second.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(
            self.upstream_timeout_secs
                .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS)
                .max(1),
        )
    }

    /// Days subtracted from today for stringency lookups.
    pub fn stringency_lag_days(&self) -> u32 {
        self.stringency_lag_days
            .unwrap_or(DEFAULT_STRINGENCY_LAG_DAYS)
    }

    /// Case history provider base URL.
    pub fn case_history_base_url(&self) -> &str {
        self.case_history_base_url
            .as_deref()
            .unwrap_or(DEFAULT_CASE_HISTORY_BASE_URL)
    }

    /// Stringency provider base URL.
    pub fn stringency_base_url(&self) -> &str {
        self.stringency_base_url
            .as_deref()
            .unwrap_or(DEFAULT_STRINGENCY_BASE_URL)
    }

    /// Country lookup base URL.
    pub fn country_lookup_base_url(&self) -> &str {
        self.country_lookup_base_url
            .as_deref()
            .unwrap_or(DEFAULT_COUNTRY_LOOKUP_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 10] = [
        "CORONA_PORT",
        "CORONA_BIND_HOST",
        "CORONA_DATABASE_URL",
        "CORONA_POLL_INTERVAL_SECS",
        "CORONA_MAX_CONCURRENT_EVALUATIONS",
        "CORONA_UPSTREAM_TIMEOUT_SECS",
        "CORONA_STRINGENCY_LAG_DAYS",
        "CORONA_CASE_HISTORY_BASE_URL",
        "CORONA_STRINGENCY_BASE_URL",
        "CORONA_COUNTRY_LOOKUP_BASE_URL",
    ];

    fn load_from_empty_args() -> ServiceSettings {
        ServiceSettings::load_from_iter([OsString::from("corona-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert!(settings.database_url().is_none());
        assert_eq!(settings.poll_interval(), Duration::from_secs(3600));
        assert_eq!(settings.max_concurrent_evaluations(), 4);
        assert_eq!(settings.upstream_timeout(), Duration::from_secs(15));
        assert_eq!(settings.stringency_lag_days(), 10);
        assert_eq!(
            settings.case_history_base_url(),
            DEFAULT_CASE_HISTORY_BASE_URL
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("CORONA_PORT", Some("9090".to_owned())),
            ("CORONA_BIND_HOST", Some("127.0.0.1".to_owned())),
            (
                "CORONA_DATABASE_URL",
                Some("postgres://corona@localhost/corona".to_owned()),
            ),
            ("CORONA_POLL_INTERVAL_SECS", Some("60".to_owned())),
            ("CORONA_MAX_CONCURRENT_EVALUATIONS", Some("0".to_owned())),
            ("CORONA_UPSTREAM_TIMEOUT_SECS", Some("5".to_owned())),
            ("CORONA_STRINGENCY_LAG_DAYS", Some("3".to_owned())),
            (
                "CORONA_CASE_HISTORY_BASE_URL",
                Some("http://127.0.0.1:9000/v1/".to_owned()),
            ),
            ("CORONA_STRINGENCY_BASE_URL", None),
            ("CORONA_COUNTRY_LOOKUP_BASE_URL", None),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), SocketAddr::from(([127, 0, 0, 1], 9090)));
        assert_eq!(
            settings.database_url(),
            Some("postgres://corona@localhost/corona")
        );
        assert_eq!(settings.poll_interval(), Duration::from_secs(60));
        assert_eq!(settings.max_concurrent_evaluations(), 1);
        assert_eq!(settings.upstream_timeout(), Duration::from_secs(5));
        assert_eq!(settings.stringency_lag_days(), 3);
        assert_eq!(settings.case_history_base_url(), "http://127.0.0.1:9000/v1/");
        assert_eq!(settings.stringency_base_url(), DEFAULT_STRINGENCY_BASE_URL);
    }

    #[rstest]
    #[case(Some("   "))]
    #[case(None)]
    fn blank_database_url_selects_memory_store(#[case] url: Option<&str>) {
        let settings = ServiceSettings {
            database_url: url.map(str::to_owned),
            ..ServiceSettings::default()
        };
        assert!(settings.database_url().is_none());
    }
}
