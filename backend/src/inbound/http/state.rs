//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CaseReportQuery, DiagnosticsQuery, FixtureCaseReportQuery, FixtureDiagnosticsQuery,
    FixtureSubscriptionCommand, FixtureSubscriptionQuery, SubscriptionCommand, SubscriptionQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub subscriptions: Arc<dyn SubscriptionCommand>,
    pub subscriptions_query: Arc<dyn SubscriptionQuery>,
    pub reports: Arc<dyn CaseReportQuery>,
    pub diagnostics: Arc<dyn DiagnosticsQuery>,
}

impl HttpState {
    /// Construct state from explicit port implementations.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use corona_backend::domain::ports::{
    ///     FixtureCaseReportQuery, FixtureDiagnosticsQuery, FixtureSubscriptionCommand,
    ///     FixtureSubscriptionQuery,
    /// };
    /// use corona_backend::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(FixtureSubscriptionCommand),
    ///     Arc::new(FixtureSubscriptionQuery),
    ///     Arc::new(FixtureCaseReportQuery),
    ///     Arc::new(FixtureDiagnosticsQuery),
    /// );
    /// let _reports = state.reports.clone();
    /// ```
    pub fn new(
        subscriptions: Arc<dyn SubscriptionCommand>,
        subscriptions_query: Arc<dyn SubscriptionQuery>,
        reports: Arc<dyn CaseReportQuery>,
        diagnostics: Arc<dyn DiagnosticsQuery>,
    ) -> Self {
        Self {
            subscriptions,
            subscriptions_query,
            reports,
            diagnostics,
        }
    }

    /// State wired entirely with fixture ports.
    pub fn fixtures() -> Self {
        Self::new(
            Arc::new(FixtureSubscriptionCommand),
            Arc::new(FixtureSubscriptionQuery),
            Arc::new(FixtureCaseReportQuery),
            Arc::new(FixtureDiagnosticsQuery),
        )
    }

    /// Replace the subscription command port.
    #[must_use]
    pub fn with_subscriptions(mut self, port: Arc<dyn SubscriptionCommand>) -> Self {
        self.subscriptions = port;
        self
    }

    /// Replace the subscription query port.
    #[must_use]
    pub fn with_subscriptions_query(mut self, port: Arc<dyn SubscriptionQuery>) -> Self {
        self.subscriptions_query = port;
        self
    }

    /// Replace the case report port.
    #[must_use]
    pub fn with_reports(mut self, port: Arc<dyn CaseReportQuery>) -> Self {
        self.reports = port;
        self
    }

    /// Replace the diagnostics port.
    #[must_use]
    pub fn with_diagnostics(mut self, port: Arc<dyn DiagnosticsQuery>) -> Self {
        self.diagnostics = port;
        self
    }
}
