//! Backend entry-point: loads settings, prepares the subscription store, and
//! runs the REST API alongside the notification scheduler.

mod server;

use std::io;

use actix_web::web;
use ortho_config::OrthoConfig;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use corona_backend::inbound::http::health::HealthState;
use corona_backend::outbound::persistence::{
    DbPool, MigrationError, PoolConfig, PoolError, run_migrations,
};
use corona_backend::settings::ServiceSettings;

#[cfg(feature = "metrics")]
use server::initialize_metrics;
use server::{ServerConfig, StateBuildError, build_runtime, create_server};

/// Failures that abort start-up.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("failed to load settings: {0}")]
    Settings(String),
    #[error(transparent)]
    Migrations(#[from] MigrationError),
    #[error("failed to build database pool: {0}")]
    Pool(#[from] PoolError),
    #[error(transparent)]
    State(#[from] StateBuildError),
}

impl From<StartupError> for io::Error {
    fn from(value: StartupError) -> Self {
        io::Error::other(value)
    }
}

async fn connect_store(settings: &ServiceSettings) -> Result<Option<DbPool>, StartupError> {
    let Some(url) = settings.database_url() else {
        return Ok(None);
    };
    run_migrations(url).await?;
    let pool = DbPool::new(PoolConfig::new(url)).await?;
    info!("connected to subscription database");
    Ok(Some(pool))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        ServiceSettings::load().map_err(|err| StartupError::Settings(err.to_string()))?;
    let pool = connect_store(&settings).await?;
    let runtime = build_runtime(&settings, pool).map_err(StartupError::from)?;

    let config = ServerConfig::new(settings.bind_addr());
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(initialize_metrics());

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), runtime.http_state, config)?;
    info!(bind_addr = %settings.bind_addr(), "listening");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = runtime.scheduler;
    let scheduler_task = actix_web::rt::spawn(async move { scheduler.run(shutdown_rx).await });

    let outcome = server.await;
    health_state.mark_unhealthy();
    shutdown_tx.send_replace(true);
    if let Err(err) = scheduler_task.await {
        error!(error = %err, "notification scheduler task failed");
    }
    outcome
}
