//! Process-local `SubscriptionRepository` used when no database is configured
//! and by tests.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::ports::{SubscriptionRepository, SubscriptionRepositoryError};
use crate::domain::{NewSubscription, Observation, Subscription, SubscriptionId};

/// Subscriptions held in a `RwLock`-guarded map. Contents are lost on exit.
#[derive(Debug, Default)]
pub struct InMemorySubscriptionRepository {
    records: RwLock<HashMap<SubscriptionId, Subscription>>,
}

impl InMemorySubscriptionRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> SubscriptionRepositoryError {
    SubscriptionRepositoryError::connection("subscription map lock poisoned")
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn create(
        &self,
        subscription: NewSubscription,
    ) -> Result<Subscription, SubscriptionRepositoryError> {
        let created = subscription.into_subscription(SubscriptionId::random());
        self.records
            .write()
            .map_err(poisoned)?
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, SubscriptionRepositoryError> {
        Ok(self.records.read().map_err(poisoned)?.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Subscription>, SubscriptionRepositoryError> {
        Ok(self
            .records
            .read()
            .map_err(poisoned)?
            .values()
            .cloned()
            .collect())
    }

    async fn record_observation(
        &self,
        id: &SubscriptionId,
        observation: Observation,
    ) -> Result<(), SubscriptionRepositoryError> {
        if let Some(record) = self.records.write().map_err(poisoned)?.get_mut(id) {
            record.observation = observation;
        }
        Ok(())
    }

    async fn delete(&self, id: &SubscriptionId) -> Result<(), SubscriptionRepositoryError> {
        self.records.write().map_err(poisoned)?.remove(id);
        Ok(())
    }
}
