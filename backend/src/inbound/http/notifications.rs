//! Webhook subscription handlers.
//!
//! ```text
//! POST   /corona/v1/notifications       {"url","timeout","field","country","trigger"}
//! GET    /corona/v1/notifications
//! GET    /corona/v1/notifications/{id}
//! DELETE /corona/v1/notifications/{id}
//! ```

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, SubscriptionDocument, SubscriptionId, SubscriptionRegistration};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Text returned by `DELETE`, whether or not the subscription existed.
pub const DELETE_CONFIRMATION: &str = "If the webhook existed, it is now deleted";

/// Registration body for `POST /corona/v1/notifications`.
///
/// Absent or `null` members decode to their empty value so validation can
/// name the offending field.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct RegistrationRequest {
    /// Callback URL receiving notifications.
    #[schema(example = "https://hooks.example.com/covid")]
    pub url: Option<String>,
    /// Minimum minutes between notifications.
    #[schema(example = 60.0)]
    pub timeout: Option<f64>,
    /// `stringency` or `confirmed`.
    #[schema(example = "confirmed")]
    pub field: Option<String>,
    #[schema(example = "Norway")]
    pub country: Option<String>,
    /// `ON_CHANGE`, `ON_TIMEOUT`, or `ON_UPDATE`.
    #[schema(example = "ON_CHANGE")]
    pub trigger: Option<String>,
}

impl From<RegistrationRequest> for SubscriptionRegistration {
    fn from(value: RegistrationRequest) -> Self {
        Self {
            url: value.url.unwrap_or_default(),
            timeout: value.timeout.unwrap_or_default(),
            field: value.field.unwrap_or_default(),
            country: value.country.unwrap_or_default(),
            trigger: value.trigger.unwrap_or_default(),
        }
    }
}

fn text(body: impl Into<String>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(body.into())
}

fn parse_id(raw: &str) -> Option<SubscriptionId> {
    raw.parse().ok()
}

/// Register a webhook subscription and return its identifier as plain text.
#[utoipa::path(
    post,
    path = "/corona/v1/notifications",
    request_body = RegistrationRequest,
    responses(
        (status = 200, description = "Subscription identifier", body = String, content_type = "text/plain"),
        (status = 400, description = "Invalid registration or unknown country", body = Error),
        (status = 502, description = "Upstream provider unavailable", body = Error),
        (status = 503, description = "Subscription store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "registerNotification"
)]
#[post("/notifications")]
pub async fn register_notification(
    state: web::Data<HttpState>,
    payload: web::Json<RegistrationRequest>,
) -> ApiResult<HttpResponse> {
    let id = state
        .subscriptions
        .register(payload.into_inner().into())
        .await?;
    Ok(text(id.to_string()))
}

/// List every registered subscription.
#[utoipa::path(
    get,
    path = "/corona/v1/notifications",
    responses(
        (status = 200, description = "Subscriptions", body = [SubscriptionDocument]),
        (status = 503, description = "Subscription store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<SubscriptionDocument>>> {
    let subscriptions = state.subscriptions_query.list().await?;
    Ok(web::Json(
        subscriptions.iter().map(SubscriptionDocument::from).collect(),
    ))
}

/// Fetch one subscription.
#[utoipa::path(
    get,
    path = "/corona/v1/notifications/{id}",
    params(("id" = String, Path, description = "Subscription identifier")),
    responses(
        (status = 200, description = "Subscription", body = SubscriptionDocument),
        (status = 404, description = "No such subscription", body = Error),
        (status = 503, description = "Subscription store unavailable", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "getNotification"
)]
#[get("/notifications/{id}")]
pub async fn get_notification(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<SubscriptionDocument>> {
    let raw = path.into_inner();
    let id = parse_id(&raw)
        .ok_or_else(|| Error::not_found(format!("subscription {raw} not found")))?;
    let subscription = state.subscriptions_query.get(&id).await?;
    Ok(web::Json(SubscriptionDocument::from(&subscription)))
}

/// Delete a subscription; succeeds whether or not it existed.
#[utoipa::path(
    delete,
    path = "/corona/v1/notifications/{id}",
    params(("id" = String, Path, description = "Subscription identifier")),
    responses(
        (status = 200, description = "Deletion acknowledged", body = String, content_type = "text/plain"),
        (status = 503, description = "Subscription store unavailable", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "deleteNotification"
)]
#[delete("/notifications/{id}")]
pub async fn delete_notification(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    // Malformed identifiers cannot name a stored subscription.
    if let Some(id) = parse_id(&path) {
        state.subscriptions.delete(&id).await?;
    }
    Ok(text(DELETE_CONFIRMATION))
}

#[cfg(test)]
#[path = "notifications_tests.rs"]
mod tests;
