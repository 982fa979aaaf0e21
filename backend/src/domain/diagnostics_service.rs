//! Diagnostics summary service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;

use crate::domain::Error;
use crate::domain::ports::{
    Diagnostics, DiagnosticsQuery, SubscriptionRepository, UpstreamProbe, UpstreamProvider,
};
use crate::domain::subscription_service::map_repository_error;

/// API version reported by the diagnostics endpoint.
pub const API_VERSION: &str = "v1";

/// Service reporting upstream reachability, subscription count, and uptime.
#[derive(Clone)]
pub struct DiagnosticsService<R: ?Sized> {
    repository: Arc<R>,
    probe: Arc<dyn UpstreamProbe>,
    clock: Arc<dyn Clock>,
    started_at: DateTime<Utc>,
}

impl<R: ?Sized> DiagnosticsService<R> {
    /// Create a service; uptime is measured from the clock's current time.
    pub fn new(repository: Arc<R>, probe: Arc<dyn UpstreamProbe>, clock: Arc<dyn Clock>) -> Self {
        let started_at = clock.utc();
        Self {
            repository,
            probe,
            clock,
            started_at,
        }
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "uptime in milliseconds stays far below 2^52"
)]
fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds().max(0) as f64 / 1000.0
}

#[async_trait]
impl<R> DiagnosticsQuery for DiagnosticsService<R>
where
    R: SubscriptionRepository + ?Sized,
{
    async fn diagnostics(&self) -> Result<Diagnostics, Error> {
        let (case_history_status, stringency_status, subscriptions) = tokio::join!(
            self.probe.status_code(UpstreamProvider::CaseHistory),
            self.probe.status_code(UpstreamProvider::Stringency),
            self.repository.list(),
        );
        let registered = subscriptions.map_err(map_repository_error)?.len();

        Ok(Diagnostics {
            case_history_status,
            stringency_status,
            registered,
            version: API_VERSION,
            uptime_secs: seconds_between(self.started_at, self.clock.utc()),
        })
    }
}
