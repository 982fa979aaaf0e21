//! Driving port for the service diagnostics summary.

use async_trait::async_trait;

use crate::domain::Error;

/// Snapshot of upstream reachability and service state.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics {
    /// HTTP status of the case history provider probe.
    pub case_history_status: u16,
    /// HTTP status of the stringency provider probe.
    pub stringency_status: u16,
    /// Number of stored subscriptions.
    pub registered: usize,
    /// API version label.
    pub version: &'static str,
    /// Seconds since the service started.
    pub uptime_secs: f64,
}

/// Domain use-case port producing [`Diagnostics`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiagnosticsQuery: Send + Sync {
    /// Probe upstream providers and summarise service state.
    async fn diagnostics(&self) -> Result<Diagnostics, Error>;
}

/// Fixture query reporting a healthy, empty service.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDiagnosticsQuery;

#[async_trait]
impl DiagnosticsQuery for FixtureDiagnosticsQuery {
    async fn diagnostics(&self) -> Result<Diagnostics, Error> {
        Ok(Diagnostics {
            case_history_status: 200,
            stringency_status: 200,
            registered: 0,
            version: "v1",
            uptime_secs: 0.0,
        })
    }
}
