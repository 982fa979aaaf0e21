//! HTTP inbound adapter exposing REST endpoints.

use actix_web::{HttpResponse, web};

use crate::domain::Error;

pub mod diag;
pub mod error;
pub mod health;
pub mod notifications;
pub mod reports;
pub mod state;

pub use error::ApiResult;

/// Path prefix shared by every API route.
pub const API_BASE_PATH: &str = "/corona/v1";

/// Register the API scope with its handlers and JSON body configuration.
///
/// Health probes and the fallback route are attached by the application
/// builder because they live outside the scope.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use corona_backend::inbound::http::{configure_api, not_valid_url, state::HttpState};
///
/// let _app = App::new()
///     .app_data(web::Data::new(HttpState::fixtures()))
///     .configure(configure_api)
///     .default_service(web::to(not_valid_url));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    let json = web::JsonConfig::default()
        .content_type_required(false)
        .error_handler(error::json_error_handler);
    cfg.service(
        web::scope(API_BASE_PATH)
            .app_data(json)
            .service(notifications::register_notification)
            .service(notifications::list_notifications)
            .service(notifications::get_notification)
            .service(notifications::delete_notification)
            .service(reports::country_cases)
            .service(reports::policy_trend)
            .service(diag::diagnostics),
    );
}

/// Message returned for any route outside the API surface.
pub const NOT_VALID_URL: &str = "not valid url";

/// Fallback handler for unmatched routes.
///
/// Registered as the application's `default_service`; every unknown path or
/// method answers `400 invalid_request`.
pub async fn not_valid_url() -> ApiResult<HttpResponse> {
    Err(Error::invalid_request(NOT_VALID_URL))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test, web};
    use serde_json::Value;

    use super::*;

    #[actix_web::test]
    async fn unknown_paths_are_bad_requests() {
        let app = actix_test::init_service(
            App::new().default_service(web::to(not_valid_url)),
        )
        .await;
        let request = actix_test::TestRequest::get()
            .uri("/corona/v2/anything")
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], NOT_VALID_URL);
    }
}
