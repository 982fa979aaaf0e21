//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports describe what the domain needs from the outside world (the
//! subscription store, the upstream data providers, webhook delivery).
//! Driving ports describe the use cases inbound adapters may invoke.

mod macros;
pub(crate) use macros::define_port_error;

mod case_history_source;
mod case_report_query;
mod country_code_lookup;
mod diagnostics_query;
mod metric_source_error;
mod notification_dispatcher;
mod stringency_source;
mod subscription_command;
mod subscription_query;
mod subscription_repository;
mod upstream_probe;

#[cfg(test)]
pub use case_history_source::MockCaseHistorySource;
pub use case_history_source::{
    CaseHistory, CaseHistorySource, CaseStatus, FixtureCaseHistorySource,
};
#[cfg(test)]
pub use case_report_query::MockCaseReportQuery;
pub use case_report_query::{CaseReportQuery, FixtureCaseReportQuery};
#[cfg(test)]
pub use country_code_lookup::MockCountryCodeLookup;
pub use country_code_lookup::{CountryCodeLookup, FixtureCountryCodeLookup};
#[cfg(test)]
pub use diagnostics_query::MockDiagnosticsQuery;
pub use diagnostics_query::{Diagnostics, DiagnosticsQuery, FixtureDiagnosticsQuery};
pub use metric_source_error::MetricSourceError;
#[cfg(test)]
pub use notification_dispatcher::MockNotificationDispatcher;
pub use notification_dispatcher::{
    FixtureNotificationDispatcher, NotificationDispatchError, NotificationDispatcher,
};
#[cfg(test)]
pub use stringency_source::MockStringencySource;
pub use stringency_source::{FixtureStringencySource, StringencySource};
#[cfg(test)]
pub use subscription_command::MockSubscriptionCommand;
pub use subscription_command::{FixtureSubscriptionCommand, SubscriptionCommand};
#[cfg(test)]
pub use subscription_query::MockSubscriptionQuery;
pub use subscription_query::{FixtureSubscriptionQuery, SubscriptionQuery};
#[cfg(test)]
pub use subscription_repository::MockSubscriptionRepository;
pub use subscription_repository::{
    FixtureSubscriptionRepository, SubscriptionRepository, SubscriptionRepositoryError,
};
#[cfg(test)]
pub use upstream_probe::MockUpstreamProbe;
pub use upstream_probe::{FixtureUpstreamProbe, UpstreamProbe, UpstreamProvider};
