//! Service diagnostics handler.

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::ports::Diagnostics;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Upstream reachability and service state.
///
/// Provider statuses are rendered as strings, e.g. `"200"`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DiagnosticsResponse {
    /// Status of the case history provider probe.
    #[schema(example = "200")]
    pub mmediagroupapi: String,
    /// Status of the stringency provider probe.
    #[schema(example = "200")]
    pub covidtrackerapi: String,
    /// Number of registered webhooks.
    pub registered: usize,
    #[schema(example = "v1")]
    pub version: String,
    /// Seconds since start-up.
    pub uptime: f64,
}

impl From<Diagnostics> for DiagnosticsResponse {
    fn from(value: Diagnostics) -> Self {
        Self {
            mmediagroupapi: value.case_history_status.to_string(),
            covidtrackerapi: value.stringency_status.to_string(),
            registered: value.registered,
            version: value.version.to_owned(),
            uptime: value.uptime_secs,
        }
    }
}

/// Report upstream reachability, webhook count, and uptime.
#[utoipa::path(
    get,
    path = "/corona/v1/diag",
    responses(
        (status = 200, description = "Diagnostics", body = DiagnosticsResponse),
        (status = 503, description = "Subscription store unavailable", body = Error)
    ),
    tags = ["diagnostics"],
    operation_id = "diagnostics"
)]
#[get("/diag")]
pub async fn diagnostics(state: web::Data<HttpState>) -> ApiResult<web::Json<DiagnosticsResponse>> {
    let snapshot = state.diagnostics.diagnostics().await?;
    Ok(web::Json(snapshot.into()))
}
