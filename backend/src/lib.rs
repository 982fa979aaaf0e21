//! Backend library modules.
//!
//! Hexagonal layout: [`domain`] owns the subscription rules and ports,
//! [`inbound`] adapts HTTP requests onto driving ports, and [`outbound`]
//! implements driven ports against PostgreSQL, the public COVID-19 data
//! providers, and webhook callbacks.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
