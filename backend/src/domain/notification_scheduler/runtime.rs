//! Port and runtime dependency bundles for the notification scheduler.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ports::{NotificationDispatcher, SubscriptionRepository};

use super::SchedulerSleeper;

/// Port bundle required by the notification scheduler.
pub struct NotificationSchedulerPorts {
    /// Subscription store.
    pub repository: Arc<dyn SubscriptionRepository>,
    /// Webhook delivery adapter.
    pub dispatcher: Arc<dyn NotificationDispatcher>,
}

impl NotificationSchedulerPorts {
    /// Build a strongly-typed scheduler port bundle.
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl SchedulerSleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
