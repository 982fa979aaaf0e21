//! Domain primitives, services, and ports.
//!
//! Purpose: Define the strongly typed vocabulary of the service (webhook
//! subscriptions, case and policy reports, diagnostics) and the services that
//! implement the driving ports over the driven ports in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic failure payload.
//! - Subscription and friends: registered webhook interests.
//! - `NotificationScheduler`: background loop that fires due webhooks.
//! - `SubscriptionService`, `CaseReportService`, `DiagnosticsService`: port
//!   implementations consumed by the inbound adapters.

pub mod case_report;
pub mod case_report_service;
pub mod diagnostics_service;
pub mod error;
pub mod metric_resolver;
pub mod notification_policy;
pub mod notification_scheduler;
pub mod ports;
pub mod subscription;
pub mod subscription_service;
pub mod trace_id;

pub use self::case_report::{
    CountryCaseReport, DateRange, PolicyTrendReport, SCOPE_FORMAT_MESSAGE, ScopeParseError,
    normalise_country_name, population_percentage,
};
pub use self::case_report_service::CaseReportService;
pub use self::diagnostics_service::{API_VERSION, DiagnosticsService};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::metric_resolver::{DEFAULT_STRINGENCY_LAG_DAYS, MetricResolver, MetricSources};
pub use self::notification_policy::{NotificationDecision, decide};
pub use self::notification_scheduler::{
    NotificationScheduler, NotificationSchedulerConfig, NotificationSchedulerPorts,
    SchedulerSleeper, TickReport, TokioSleeper,
};
pub use self::subscription::{
    MonitoredField, NewSubscription, NotificationTrigger, Observation, ParseMonitoredFieldError,
    ParseNotificationTriggerError, Subscription, SubscriptionDocument, SubscriptionId,
    SubscriptionRegistration, SubscriptionValidationError, ValidatedRegistration,
    validate_registration,
};
pub use self::subscription_service::SubscriptionService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
