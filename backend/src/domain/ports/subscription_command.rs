//! Driving port for subscription mutations.
//!
//! Inbound adapters register and remove webhook subscriptions through this
//! port without touching persistence or upstream providers directly.

use async_trait::async_trait;

use crate::domain::{Error, SubscriptionId, SubscriptionRegistration};

/// Domain use-case port for registering and deleting subscriptions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionCommand: Send + Sync {
    /// Validate a registration, snapshot the current metric, and persist it.
    async fn register(
        &self,
        registration: SubscriptionRegistration,
    ) -> Result<SubscriptionId, Error>;

    /// Delete a subscription. Deleting an unknown id succeeds.
    async fn delete(&self, id: &SubscriptionId) -> Result<(), Error>;
}

/// Fixture command that accepts every registration without storing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSubscriptionCommand;

#[async_trait]
impl SubscriptionCommand for FixtureSubscriptionCommand {
    async fn register(
        &self,
        _registration: SubscriptionRegistration,
    ) -> Result<SubscriptionId, Error> {
        Ok(SubscriptionId::random())
    }

    async fn delete(&self, _id: &SubscriptionId) -> Result<(), Error> {
        Ok(())
    }
}
