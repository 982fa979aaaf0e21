//! Driving port for subscription reads.

use async_trait::async_trait;

use crate::domain::{Error, Subscription, SubscriptionId};

/// Domain use-case port for reading subscriptions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionQuery: Send + Sync {
    /// Fetch one subscription, failing with a not-found error when absent.
    async fn get(&self, id: &SubscriptionId) -> Result<Subscription, Error>;

    /// Fetch every subscription.
    async fn list(&self) -> Result<Vec<Subscription>, Error>;
}

/// Fixture query over an empty store.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSubscriptionQuery;

#[async_trait]
impl SubscriptionQuery for FixtureSubscriptionQuery {
    async fn get(&self, id: &SubscriptionId) -> Result<Subscription, Error> {
        Err(Error::not_found(format!("subscription {id} not found")))
    }

    async fn list(&self) -> Result<Vec<Subscription>, Error> {
        Ok(Vec::new())
    }
}
