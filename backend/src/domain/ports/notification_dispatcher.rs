//! Driven port delivering fired notifications to subscriber callbacks.

use async_trait::async_trait;

use crate::domain::SubscriptionDocument;

use super::define_port_error;

define_port_error! {
    /// Errors raised while delivering a notification.
    pub enum NotificationDispatchError {
        /// The callback URL could not be used to build a request.
        InvalidUrl { message: String } =>
            "callback url rejected: {message}",
        /// Network transport failed before a response arrived.
        Transport { message: String } =>
            "callback transport failed: {message}",
        /// The subscriber did not answer within the configured timeout.
        Timeout { message: String } =>
            "callback timed out: {message}",
        /// The subscriber answered with a non-success status.
        Status { status: u16, body: String } =>
            "callback returned status {status}: {body}",
        /// The response body could not be read.
        Body { message: String } =>
            "callback response body unreadable: {message}",
    }
}

/// Port for posting a notification payload to its callback URL.
///
/// Delivery is best effort: no retries are attempted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// POST `document` as JSON to `document.url`.
    async fn dispatch(
        &self,
        document: &SubscriptionDocument,
    ) -> Result<(), NotificationDispatchError>;
}

/// Fixture implementation that accepts every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureNotificationDispatcher;

#[async_trait]
impl NotificationDispatcher for FixtureNotificationDispatcher {
    async fn dispatch(
        &self,
        _document: &SubscriptionDocument,
    ) -> Result<(), NotificationDispatchError> {
        Ok(())
    }
}
