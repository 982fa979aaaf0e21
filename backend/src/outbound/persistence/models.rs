//! Internal Diesel row structs for the subscriptions table.
//!
//! Rows never leave the persistence module. Conversion into domain types is
//! fallible: a row carrying an unknown `field` or `trigger_kind` is reported
//! as a decode error rather than coerced.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::SubscriptionRepositoryError;
use crate::domain::{Observation, Subscription, SubscriptionId};

use super::schema::subscriptions;

/// Row read from and written to `subscriptions`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = subscriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SubscriptionRow {
    pub id: Uuid,
    pub callback_url: String,
    pub timeout_minutes: f64,
    pub field: String,
    pub country: String,
    pub trigger_kind: String,
    pub occurrences: f64,
    pub last_observed_at: DateTime<Utc>,
}

/// Observation columns updated after a notification fires.
#[derive(Debug, Clone, Copy, AsChangeset)]
#[diesel(table_name = subscriptions)]
pub(crate) struct ObservationUpdate {
    pub occurrences: f64,
    pub last_observed_at: DateTime<Utc>,
}

impl From<&Subscription> for SubscriptionRow {
    fn from(subscription: &Subscription) -> Self {
        Self {
            id: *subscription.id.as_uuid(),
            callback_url: subscription.callback_url.clone(),
            timeout_minutes: subscription.timeout_minutes,
            field: subscription.field.as_str().to_owned(),
            country: subscription.country.clone(),
            trigger_kind: subscription.trigger.as_str().to_owned(),
            occurrences: subscription.occurrences(),
            last_observed_at: subscription.last_observed_at(),
        }
    }
}

impl From<Observation> for ObservationUpdate {
    fn from(observation: Observation) -> Self {
        Self {
            occurrences: observation.occurrences,
            last_observed_at: observation.observed_at,
        }
    }
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = SubscriptionRepositoryError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let field = row.field.parse().map_err(|_| {
            SubscriptionRepositoryError::decode(format!(
                "subscription {} has unknown field '{}'",
                row.id, row.field
            ))
        })?;
        let trigger = row.trigger_kind.parse().map_err(|_| {
            SubscriptionRepositoryError::decode(format!(
                "subscription {} has unknown trigger '{}'",
                row.id, row.trigger_kind
            ))
        })?;
        if !row.timeout_minutes.is_finite() || row.timeout_minutes <= 0.0 {
            return Err(SubscriptionRepositoryError::decode(format!(
                "subscription {} has invalid timeout {}",
                row.id, row.timeout_minutes
            )));
        }

        Ok(Self {
            id: SubscriptionId::from_uuid(row.id),
            callback_url: row.callback_url,
            timeout_minutes: row.timeout_minutes,
            field,
            country: row.country,
            trigger,
            observation: Observation::new(row.occurrences, row.last_observed_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MonitoredField, NotificationTrigger};
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn row() -> SubscriptionRow {
        SubscriptionRow {
            id: Uuid::new_v4(),
            callback_url: "https://hooks.example.invalid/covid".to_owned(),
            timeout_minutes: 30.0,
            field: "stringency".to_owned(),
            country: "Norway".to_owned(),
            trigger_kind: "ON_UPDATE".to_owned(),
            occurrences: 63.89,
            last_observed_at: Utc
                .with_ymd_and_hms(2021, 3, 1, 12, 0, 0)
                .single()
                .expect("valid time"),
        }
    }

    #[rstest]
    fn valid_row_decodes(row: SubscriptionRow) {
        let subscription = Subscription::try_from(row.clone()).expect("decodes");

        assert_eq!(subscription.id.as_uuid(), &row.id);
        assert_eq!(subscription.field, MonitoredField::Stringency);
        assert_eq!(subscription.trigger, NotificationTrigger::OnUpdate);
        assert_eq!(subscription.last_observed_at(), row.last_observed_at);
        let back = SubscriptionRow::from(&subscription);
        assert_eq!(back.trigger_kind, "ON_UPDATE");
        assert_eq!(back.field, "stringency");
    }

    #[rstest]
    #[case::field(|row: &mut SubscriptionRow| row.field = "deaths".to_owned(), "field")]
    #[case::trigger(|row: &mut SubscriptionRow| row.trigger_kind = "on_change".to_owned(), "trigger")]
    #[case::timeout(|row: &mut SubscriptionRow| row.timeout_minutes = 0.0, "timeout")]
    fn invalid_row_is_a_decode_error(
        mut row: SubscriptionRow,
        #[case] corrupt: fn(&mut SubscriptionRow),
        #[case] mentions: &str,
    ) {
        corrupt(&mut row);

        let err = Subscription::try_from(row).expect_err("must not decode");

        assert!(matches!(err, SubscriptionRepositoryError::Decode { .. }));
        assert!(err.to_string().contains(mentions));
    }
}
