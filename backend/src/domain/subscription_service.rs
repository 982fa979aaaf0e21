//! Webhook subscription domain services.
//!
//! This module implements the subscription driving ports: registration runs
//! validation, takes the initial metric snapshot, and persists the record.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    MetricSourceError, SubscriptionCommand, SubscriptionQuery, SubscriptionRepository,
    SubscriptionRepositoryError,
};
use crate::domain::{
    Error, MetricResolver, NewSubscription, Observation, Subscription, SubscriptionId,
    SubscriptionRegistration, SubscriptionValidationError, validate_registration,
};

/// Map a store failure onto the transport-agnostic error taxonomy.
pub(crate) fn map_repository_error(error: SubscriptionRepositoryError) -> Error {
    match error {
        SubscriptionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("subscription store unavailable: {message}"))
        }
        SubscriptionRepositoryError::Query { message } => {
            Error::internal(format!("subscription store error: {message}"))
        }
        SubscriptionRepositoryError::Decode { message } => {
            Error::internal(format!("subscription record invalid: {message}"))
        }
    }
}

/// Map an upstream provider failure onto the error taxonomy.
///
/// Unknown countries are the caller's fault; everything else is upstream.
pub(crate) fn map_metric_error(error: MetricSourceError) -> Error {
    match error {
        MetricSourceError::CountryNotFound { .. } => Error::invalid_request(error.to_string())
            .with_details(json!({ "field": "country", "code": "country_not_found" })),
        MetricSourceError::Transport { .. }
        | MetricSourceError::Timeout { .. }
        | MetricSourceError::Decode { .. } => Error::upstream_unavailable(error.to_string()),
    }
}

fn map_validation_error(error: &SubscriptionValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field_name(),
        "code": "invalid_registration",
    }))
}

/// Subscription service implementing the driving ports.
#[derive(Clone)]
pub struct SubscriptionService<R: ?Sized> {
    repository: Arc<R>,
    resolver: MetricResolver,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized> SubscriptionService<R> {
    /// Create a new service over the given store and metric resolver.
    pub fn new(repository: Arc<R>, resolver: MetricResolver, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            resolver,
            clock,
        }
    }
}

#[async_trait]
impl<R> SubscriptionCommand for SubscriptionService<R>
where
    R: SubscriptionRepository + ?Sized,
{
    async fn register(
        &self,
        registration: SubscriptionRegistration,
    ) -> Result<SubscriptionId, Error> {
        let validated =
            validate_registration(&registration).map_err(|err| map_validation_error(&err))?;

        let now = self.clock.utc();
        let occurrences = self
            .resolver
            .current_value(validated.field, &validated.country, now)
            .await
            .map_err(map_metric_error)?;

        let created = self
            .repository
            .create(NewSubscription {
                registration: validated,
                observation: Observation::new(occurrences, now),
            })
            .await
            .map_err(map_repository_error)?;

        info!(
            subscription_id = %created.id,
            country = %created.country,
            field = %created.field,
            trigger = %created.trigger,
            occurrences,
            "subscription registered"
        );
        Ok(created.id)
    }

    async fn delete(&self, id: &SubscriptionId) -> Result<(), Error> {
        self.repository
            .delete(id)
            .await
            .map_err(map_repository_error)?;
        info!(subscription_id = %id, "subscription deleted");
        Ok(())
    }
}

#[async_trait]
impl<R> SubscriptionQuery for SubscriptionService<R>
where
    R: SubscriptionRepository + ?Sized,
{
    async fn get(&self, id: &SubscriptionId) -> Result<Subscription, Error> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("subscription {id} not found")))
    }

    async fn list(&self) -> Result<Vec<Subscription>, Error> {
        self.repository.list().await.map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "subscription_service_tests.rs"]
mod tests;
