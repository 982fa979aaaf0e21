//! PostgreSQL-backed `SubscriptionRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{debug, warn};

use crate::domain::ports::{SubscriptionRepository, SubscriptionRepositoryError};
use crate::domain::{NewSubscription, Observation, Subscription, SubscriptionId};

use super::models::{ObservationUpdate, SubscriptionRow};
use super::pool::{DbPool, PoolError};
use super::schema::subscriptions;

/// Diesel-backed implementation of the `SubscriptionRepository` port.
///
/// Every operation touches a single row, so PostgreSQL row locking provides
/// the per-record atomicity the port requires.
#[derive(Clone)]
pub struct DieselSubscriptionRepository {
    pool: DbPool,
}

impl DieselSubscriptionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SubscriptionRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            SubscriptionRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> SubscriptionRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            SubscriptionRepositoryError::connection("database connection error")
        }
        DieselError::DeserializationError(err) => {
            SubscriptionRepositoryError::decode(err.to_string())
        }
        DieselError::QueryBuilderError(_) => {
            SubscriptionRepositoryError::query("database query error")
        }
        _ => SubscriptionRepositoryError::query("database error"),
    }
}

/// Decode listed rows, dropping the ones that fail to decode.
///
/// A corrupt record is logged and left out so the remaining subscriptions
/// stay visible to the scheduler.
fn decode_listed_rows(rows: Vec<SubscriptionRow>) -> Vec<Subscription> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match Subscription::try_from(row) {
                Ok(subscription) => Some(subscription),
                Err(err) => {
                    warn!(subscription_id = %id, error = %err, "skipping undecodable subscription");
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl SubscriptionRepository for DieselSubscriptionRepository {
    async fn create(
        &self,
        subscription: NewSubscription,
    ) -> Result<Subscription, SubscriptionRepositoryError> {
        let created = subscription.into_subscription(SubscriptionId::random());
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(subscriptions::table)
            .values(SubscriptionRow::from(&created))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(created)
    }

    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = subscriptions::table
            .filter(subscriptions::id.eq(*id.as_uuid()))
            .select(SubscriptionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(Subscription::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Subscription>, SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<SubscriptionRow> = subscriptions::table
            .select(SubscriptionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(decode_listed_rows(rows))
    }

    async fn record_observation(
        &self,
        id: &SubscriptionId,
        observation: Observation,
    ) -> Result<(), SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let target = subscriptions::table.filter(subscriptions::id.eq(*id.as_uuid()));
        let updated = diesel::update(target)
            .set(ObservationUpdate::from(observation))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            debug!(subscription_id = %id, "observation for missing subscription dropped");
        }
        Ok(())
    }

    async fn delete(&self, id: &SubscriptionId) -> Result<(), SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(subscriptions::table.filter(subscriptions::id.eq(*id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
