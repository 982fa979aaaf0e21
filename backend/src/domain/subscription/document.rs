//! JSON document shape shared by the listing endpoint and webhook callbacks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{MonitoredField, NotificationTrigger, Observation, Subscription, SubscriptionId};

/// Serialisable view of a [`Subscription`].
///
/// The field names match the registration payload (`url`, `timeout`) with
/// the observation flattened into `time` and `occurrences`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionDocument {
    pub id: SubscriptionId,
    pub url: String,
    pub timeout: f64,
    pub time: DateTime<Utc>,
    pub field: MonitoredField,
    pub country: String,
    pub trigger: NotificationTrigger,
    pub occurrences: f64,
}

impl From<&Subscription> for SubscriptionDocument {
    fn from(value: &Subscription) -> Self {
        Self {
            id: value.id,
            url: value.callback_url.clone(),
            timeout: value.timeout_minutes,
            time: value.last_observed_at(),
            field: value.field,
            country: value.country.clone(),
            trigger: value.trigger,
            occurrences: value.occurrences(),
        }
    }
}

impl From<SubscriptionDocument> for Subscription {
    fn from(value: SubscriptionDocument) -> Self {
        Self {
            id: value.id,
            callback_url: value.url,
            timeout_minutes: value.timeout,
            field: value.field,
            country: value.country,
            trigger: value.trigger,
            observation: Observation::new(value.occurrences, value.time),
        }
    }
}
