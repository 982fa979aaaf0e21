//! Builders wiring adapters into the HTTP state and the notification scheduler.
//!
//! The subscription store is constructed once and shared by the services
//! behind the HTTP handlers and by the scheduler.

use std::sync::Arc;

use corona_backend::domain::ports::SubscriptionRepository;
use corona_backend::domain::{
    CaseReportService, DiagnosticsService, MetricResolver, MetricSources, NotificationScheduler,
    NotificationSchedulerConfig, NotificationSchedulerPorts, SubscriptionService,
};
use corona_backend::inbound::http::state::HttpState;
use corona_backend::outbound::covid::{
    CovidEndpoints, HttpCaseHistorySource, HttpCountryCodeLookup, HttpStringencySource,
    HttpUpstreamProbe,
};
use corona_backend::outbound::persistence::{
    DbPool, DieselSubscriptionRepository, InMemorySubscriptionRepository,
};
use corona_backend::outbound::webhook::HttpNotificationDispatcher;
use corona_backend::settings::ServiceSettings;
use mockable::{Clock, DefaultClock};
use tracing::warn;

/// Failure to construct an outbound adapter.
#[derive(Debug, thiserror::Error)]
pub enum StateBuildError {
    #[error("invalid upstream base URL: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Everything the binary runs: handler state plus the polling loop.
pub struct AppRuntime {
    /// Driving ports shared by the HTTP workers.
    pub http_state: HttpState,
    /// Background notification loop.
    pub scheduler: NotificationScheduler,
}

fn build_repository(pool: Option<DbPool>) -> Arc<dyn SubscriptionRepository> {
    match pool {
        Some(pool) => Arc::new(DieselSubscriptionRepository::new(pool)),
        None => {
            warn!("no database configured; subscriptions are kept in memory only");
            Arc::new(InMemorySubscriptionRepository::new())
        }
    }
}

fn build_metric_sources(
    endpoints: &CovidEndpoints,
    settings: &ServiceSettings,
) -> Result<MetricSources, StateBuildError> {
    let timeout = settings.upstream_timeout();
    Ok(MetricSources::new(
        Arc::new(HttpCountryCodeLookup::new(
            endpoints.country_lookup.clone(),
            timeout,
        )?),
        Arc::new(HttpStringencySource::new(
            endpoints.stringency.clone(),
            timeout,
        )?),
        Arc::new(HttpCaseHistorySource::new(
            endpoints.case_history.clone(),
            timeout,
        )?),
    ))
}

/// Build the HTTP state and scheduler over one shared subscription store.
///
/// Uses the Diesel store when a pool is supplied, otherwise an in-memory map.
///
/// # Errors
/// Returns [`StateBuildError`] when an upstream base URL does not parse or a
/// reqwest client cannot be built.
pub fn build_runtime(
    settings: &ServiceSettings,
    pool: Option<DbPool>,
) -> Result<AppRuntime, StateBuildError> {
    let endpoints = CovidEndpoints::parse(
        settings.case_history_base_url(),
        settings.stringency_base_url(),
        settings.country_lookup_base_url(),
    )?;
    let resolver = MetricResolver::new(
        build_metric_sources(&endpoints, settings)?,
        settings.stringency_lag_days(),
    );
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let repository = build_repository(pool);

    let subscriptions = Arc::new(SubscriptionService::new(
        repository.clone(),
        resolver.clone(),
        clock.clone(),
    ));
    let reports = Arc::new(CaseReportService::new(resolver.clone(), clock.clone()));
    let probe = Arc::new(HttpUpstreamProbe::new(
        &endpoints,
        settings.upstream_timeout(),
    )?);
    let diagnostics = Arc::new(DiagnosticsService::new(
        repository.clone(),
        probe,
        clock.clone(),
    ));
    let http_state = HttpState::new(subscriptions.clone(), subscriptions, reports, diagnostics);

    let dispatcher = Arc::new(HttpNotificationDispatcher::new(
        settings.upstream_timeout(),
    )?);
    let scheduler = NotificationScheduler::new(
        NotificationSchedulerPorts::new(repository, dispatcher),
        resolver,
        clock,
        NotificationSchedulerConfig {
            poll_interval: settings.poll_interval(),
            max_concurrent_evaluations: settings.max_concurrent_evaluations(),
        },
    );

    Ok(AppRuntime {
        http_state,
        scheduler,
    })
}
