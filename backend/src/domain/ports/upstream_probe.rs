//! Driven port reporting upstream provider reachability.

use std::fmt;

use async_trait::async_trait;

/// Upstream provider checked by the diagnostics endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamProvider {
    /// Case history provider.
    CaseHistory,
    /// Policy stringency provider.
    Stringency,
}

impl fmt::Display for UpstreamProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CaseHistory => "case_history",
            Self::Stringency => "stringency",
        })
    }
}

/// Port issuing a representative request to an upstream provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpstreamProbe: Send + Sync {
    /// HTTP status returned by the provider, or `400` when unreachable.
    async fn status_code(&self, provider: UpstreamProvider) -> u16;
}

/// Fixture implementation reporting every provider as healthy.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureUpstreamProbe;

#[async_trait]
impl UpstreamProbe for FixtureUpstreamProbe {
    async fn status_code(&self, _provider: UpstreamProvider) -> u16 {
        200
    }
}
