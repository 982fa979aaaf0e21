//! Health probes under `/health`.
//!
//! `ready` reports whether the listener has been bound; `live` flips to
//! failing once the process starts shutting down.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};

/// Probe flags shared by the bootstrap code and the probe handlers.
///
/// Starts alive but not ready. [`HealthState::mark_ready`]
/// is called by server construction; `mark_unhealthy` after the server stops.
#[derive(Debug)]
pub struct HealthState {
    accepting: AtomicBool,
    shutting_down: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            accepting: AtomicBool::new(false),
            shutting_down: AtomicBool::new(false),
        }
    }
}

impl HealthState {
    /// Fresh state: alive, not yet ready.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start passing the readiness probe.
    pub fn mark_ready(&self) {
        self.accepting.store(true, Ordering::Release);
    }

    /// Start failing the liveness probe.
    pub fn mark_unhealthy(&self) {
        self.shutting_down.store(true, Ordering::Release);
    }

    /// Whether requests are being accepted.
    pub fn is_ready(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    /// Whether shutdown has not started yet.
    pub fn is_alive(&self) -> bool {
        !self.shutting_down.load(Ordering::Acquire)
    }
}

fn probe_outcome(passing: bool) -> HttpResponse {
    let (mut builder, body) = if passing {
        (HttpResponse::Ok(), "ok")
    } else {
        (HttpResponse::ServiceUnavailable(), "unavailable")
    };
    builder
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .content_type("text/plain; charset=utf-8")
        .body(body)
}

/// Readiness of the HTTP listener.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Listener bound, requests accepted", body = String),
        (status = 503, description = "Still starting", body = String)
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    probe_outcome(state.is_ready())
}

/// Liveness of the process.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Process running", body = String),
        (status = 503, description = "Shutdown in progress", body = String)
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    probe_outcome(state.is_alive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;

    async fn hit(state: HealthState, uri: &str) -> (StatusCode, Option<String>, String) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(ready)
                .service(live),
        )
        .await;
        let response =
            test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = response.status();
        let cache = response
            .headers()
            .get(header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = test::read_body(response).await;
        (status, cache, String::from_utf8_lossy(&body).into_owned())
    }

    #[rstest]
    #[case(false, StatusCode::SERVICE_UNAVAILABLE, "unavailable")]
    #[case(true, StatusCode::OK, "ok")]
    #[actix_web::test]
    async fn readiness_tracks_listener(
        #[case] bound: bool,
        #[case] expected: StatusCode,
        #[case] text: &str,
    ) {
        let state = HealthState::new();
        if bound {
            state.mark_ready();
        }

        let (status, cache, body) = hit(state, "/health/ready").await;

        assert_eq!(status, expected);
        assert_eq!(cache.as_deref(), Some("no-store"));
        assert_eq!(body, text);
    }

    #[rstest]
    #[case(false, StatusCode::OK)]
    #[case(true, StatusCode::SERVICE_UNAVAILABLE)]
    #[actix_web::test]
    async fn liveness_fails_during_shutdown(#[case] stopping: bool, #[case] expected: StatusCode) {
        let state = HealthState::new();
        if stopping {
            state.mark_unhealthy();
        }

        let (status, _, _) = hit(state, "/health/live").await;

        assert_eq!(status, expected);
    }
}
