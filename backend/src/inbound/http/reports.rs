//! Country case and policy report handlers.
//!
//! ```text
//! GET /corona/v1/country/{country_name}?scope=2020-12-01-2021-01-31
//! GET /corona/v1/policy/{country_name}?scope=2020-12-01-2021-01-31
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{CountryCaseReport, DateRange, Error, PolicyTrendReport};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Optional `scope` query parameter.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScopeQuery {
    /// Inclusive range written as `YYYY-MM-DD-YYYY-MM-DD`.
    #[param(example = "2020-12-01-2021-01-31")]
    pub scope: Option<String>,
}

impl ScopeQuery {
    /// Parse the scope; absent or blank means no range.
    fn range(&self) -> Result<Option<DateRange>, Error> {
        match self.scope.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<DateRange>()
                .map(Some)
                .map_err(|err| Error::invalid_request(err.to_string())),
        }
    }
}

/// Case counts for one country.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CountryCasesResponse {
    #[schema(example = "Norway")]
    pub country: String,
    #[schema(example = "Europe")]
    pub continent: String,
    #[schema(example = "total")]
    pub scope: String,
    pub confirmed: i64,
    pub recovered: i64,
    #[schema(example = 1.45)]
    pub population_percentage: f64,
}

impl From<CountryCaseReport> for CountryCasesResponse {
    fn from(value: CountryCaseReport) -> Self {
        Self {
            country: value.country,
            continent: value.continent,
            scope: value.scope,
            confirmed: value.confirmed,
            recovered: value.recovered,
            population_percentage: value.population_percentage,
        }
    }
}

/// Policy stringency and its change for one country.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PolicyTrendResponse {
    #[schema(example = "Norway")]
    pub country: String,
    #[schema(example = "latest")]
    pub scope: String,
    #[schema(example = 44.44)]
    pub stringency: f64,
    pub trend: f64,
}

impl From<PolicyTrendReport> for PolicyTrendResponse {
    fn from(value: PolicyTrendReport) -> Self {
        Self {
            country: value.country,
            scope: value.scope,
            stringency: value.stringency,
            trend: value.trend,
        }
    }
}

/// Confirmed and recovered cases, in total or across a scope.
#[utoipa::path(
    get,
    path = "/corona/v1/country/{country_name}",
    params(
        ("country_name" = String, Path, description = "Country name, any letter case"),
        ScopeQuery
    ),
    responses(
        (status = 200, description = "Case report", body = CountryCasesResponse),
        (status = 400, description = "Malformed scope or unknown country", body = Error),
        (status = 502, description = "Upstream provider unavailable", body = Error)
    ),
    tags = ["reports"],
    operation_id = "countryCases"
)]
#[get("/country/{country_name}")]
pub async fn country_cases(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<ScopeQuery>,
) -> ApiResult<web::Json<CountryCasesResponse>> {
    let scope = query.range()?;
    let report = state.reports.country_cases(&path, scope).await?;
    Ok(web::Json(report.into()))
}

/// Policy stringency at the end of a scope and its trend.
#[utoipa::path(
    get,
    path = "/corona/v1/policy/{country_name}",
    params(
        ("country_name" = String, Path, description = "Country name, any letter case"),
        ScopeQuery
    ),
    responses(
        (status = 200, description = "Policy report", body = PolicyTrendResponse),
        (status = 400, description = "Malformed scope or unknown country", body = Error),
        (status = 502, description = "Upstream provider unavailable", body = Error)
    ),
    tags = ["reports"],
    operation_id = "policyTrend"
)]
#[get("/policy/{country_name}")]
pub async fn policy_trend(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<ScopeQuery>,
) -> ApiResult<web::Json<PolicyTrendResponse>> {
    let scope = query.range()?;
    let report = state.reports.policy_trend(&path, scope).await?;
    Ok(web::Json(report.into()))
}
