//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST handler under `/corona/v1` plus the health
//! probes. Request and response bodies reference the domain types that derive
//! `ToSchema` and the handler DTOs.
//!
//! The generated document backs Swagger UI (debug builds) and is exported by
//! `cargo run --bin openapi-dump` for external tooling.

use utoipa::openapi::Server;
use utoipa::{Modify, OpenApi};

use crate::inbound::http::API_BASE_PATH;

/// Append a server entry describing the versioned API prefix.
struct ApiPrefixAddon;

impl Modify for ApiPrefixAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut server = Server::new("/");
        server.description = Some(format!(
            "Relative to the deployment base URL; API routes live under {API_BASE_PATH}"
        ));
        openapi.servers = Some(vec![server]);
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&ApiPrefixAddon),
    info(
        title = "Corona webhook API",
        description = "COVID-19 case counts, policy stringency, and webhook notifications on change.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    paths(
        crate::inbound::http::notifications::register_notification,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::get_notification,
        crate::inbound::http::notifications::delete_notification,
        crate::inbound::http::reports::country_cases,
        crate::inbound::http::reports::policy_trend,
        crate::inbound::http::diag::diagnostics,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        crate::domain::Error,
        crate::domain::ErrorCode,
        crate::domain::SubscriptionDocument,
        crate::domain::MonitoredField,
        crate::domain::NotificationTrigger,
        crate::inbound::http::notifications::RegistrationRequest,
        crate::inbound::http::reports::CountryCasesResponse,
        crate::inbound::http::reports::PolicyTrendResponse,
        crate::inbound::http::diag::DiagnosticsResponse,
    )),
    tags(
        (name = "notifications", description = "Webhook subscription management"),
        (name = "reports", description = "Per-country case and policy reports"),
        (name = "diagnostics", description = "Upstream reachability and service state"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
