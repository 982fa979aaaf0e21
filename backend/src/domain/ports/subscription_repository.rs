//! Port for webhook subscription persistence.
//!
//! The store assigns identifiers, returns records by id, lists every record
//! for the scheduler, and replaces the observation of one record at a time.
//! Updates are atomic per record; concurrent writers resolve last write wins.

use async_trait::async_trait;

use crate::domain::{NewSubscription, Observation, Subscription, SubscriptionId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by subscription repository adapters.
    pub enum SubscriptionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "subscription repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "subscription repository query failed: {message}",
        /// A stored record could not be decoded into a subscription.
        Decode { message: String } =>
            "subscription record decode failed: {message}",
    }
}

/// Port for subscription storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Persist a new subscription under a freshly generated identifier.
    async fn create(
        &self,
        subscription: NewSubscription,
    ) -> Result<Subscription, SubscriptionRepositoryError>;

    /// Fetch one subscription, or `None` when it does not exist.
    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, SubscriptionRepositoryError>;

    /// Fetch every subscription.
    async fn list(&self) -> Result<Vec<Subscription>, SubscriptionRepositoryError>;

    /// Replace the observation of one subscription.
    ///
    /// Updating a subscription that was deleted meanwhile is not an error.
    async fn record_observation(
        &self,
        id: &SubscriptionId,
        observation: Observation,
    ) -> Result<(), SubscriptionRepositoryError>;

    /// Remove a subscription. Removing an unknown id succeeds.
    async fn delete(&self, id: &SubscriptionId) -> Result<(), SubscriptionRepositoryError>;
}

/// Fixture implementation that stores nothing.
///
/// `create` echoes the subscription back with a random id and lookups always
/// miss. Use it where persistence is not under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSubscriptionRepository;

#[async_trait]
impl SubscriptionRepository for FixtureSubscriptionRepository {
    async fn create(
        &self,
        subscription: NewSubscription,
    ) -> Result<Subscription, SubscriptionRepositoryError> {
        Ok(subscription.into_subscription(SubscriptionId::random()))
    }

    async fn find_by_id(
        &self,
        _id: &SubscriptionId,
    ) -> Result<Option<Subscription>, SubscriptionRepositoryError> {
        Ok(None)
    }

    async fn list(&self) -> Result<Vec<Subscription>, SubscriptionRepositoryError> {
        Ok(Vec::new())
    }

    async fn record_observation(
        &self,
        _id: &SubscriptionId,
        _observation: Observation,
    ) -> Result<(), SubscriptionRepositoryError> {
        Ok(())
    }

    async fn delete(&self, _id: &SubscriptionId) -> Result<(), SubscriptionRepositoryError> {
        Ok(())
    }
}
