//! Webhook subscription domain types.
//!
//! A subscription records one registered interest: which metric to watch for
//! which country, how to decide when to notify, and where to deliver the
//! notification. The comparison baseline and its timestamp travel together as
//! an [`Observation`] so they can never be updated independently.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

mod document;
mod validation;

pub use document::SubscriptionDocument;
pub use validation::{
    SubscriptionRegistration, SubscriptionValidationError, ValidatedRegistration,
    validate_registration,
};

/// Opaque identifier assigned by the subscription store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubscriptionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Metric monitored by a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MonitoredField {
    /// Government policy stringency score.
    Stringency,
    /// Cumulative confirmed case count.
    Confirmed,
}

impl MonitoredField {
    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stringency => "stringency",
            Self::Confirmed => "confirmed",
        }
    }
}

/// Error returned when parsing a [`MonitoredField`] from string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseMonitoredFieldError;

impl fmt::Display for MonitoredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ParseMonitoredFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid monitored field")
    }
}

impl std::error::Error for ParseMonitoredFieldError {}

impl FromStr for MonitoredField {
    type Err = ParseMonitoredFieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "stringency" => Ok(Self::Stringency),
            "confirmed" => Ok(Self::Confirmed),
            _ => Err(ParseMonitoredFieldError),
        }
    }
}

/// Firing policy attached to a subscription.
///
/// `OnChange` and `OnUpdate` currently share the same semantics: notify when
/// the observed value differs from the baseline once the timeout elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationTrigger {
    /// Fire when the value moved and the timeout elapsed.
    OnChange,
    /// Fire every time the timeout elapses.
    OnTimeout,
    /// Same as `OnChange`.
    OnUpdate,
}

impl NotificationTrigger {
    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnChange => "ON_CHANGE",
            Self::OnTimeout => "ON_TIMEOUT",
            Self::OnUpdate => "ON_UPDATE",
        }
    }

    /// Whether the trigger fires regardless of value changes.
    pub fn ignores_value(self) -> bool {
        matches!(self, Self::OnTimeout)
    }
}

/// Error returned when parsing a [`NotificationTrigger`] from string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseNotificationTriggerError;

impl fmt::Display for NotificationTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ParseNotificationTriggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid notification trigger")
    }
}

impl std::error::Error for ParseNotificationTriggerError {}

impl FromStr for NotificationTrigger {
    type Err = ParseNotificationTriggerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ON_CHANGE" => Ok(Self::OnChange),
            "ON_TIMEOUT" => Ok(Self::OnTimeout),
            "ON_UPDATE" => Ok(Self::OnUpdate),
            _ => Err(ParseNotificationTriggerError),
        }
    }
}

/// Metric value observed at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Observed metric value.
    pub occurrences: f64,
    /// When the value was recorded.
    pub observed_at: DateTime<Utc>,
}

impl Observation {
    /// Pair a value with its observation time.
    pub fn new(occurrences: f64, observed_at: DateTime<Utc>) -> Self {
        Self {
            occurrences,
            observed_at,
        }
    }
}

/// Persisted webhook subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    /// Store-assigned identifier.
    pub id: SubscriptionId,
    /// Callback receiving fired notifications.
    pub callback_url: String,
    /// Minimum minutes between notifications.
    pub timeout_minutes: f64,
    /// Metric being watched.
    pub field: MonitoredField,
    /// Country name as supplied at registration.
    pub country: String,
    /// Firing policy.
    pub trigger: NotificationTrigger,
    /// Comparison baseline and the time it was recorded.
    pub observation: Observation,
}

impl Subscription {
    /// Last observed metric value.
    pub fn occurrences(&self) -> f64 {
        self.observation.occurrences
    }

    /// Timestamp anchoring the timeout window.
    pub fn last_observed_at(&self) -> DateTime<Utc> {
        self.observation.observed_at
    }

    /// Earliest instant after which a notification may fire.
    ///
    /// Saturates to the maximum representable time when the timeout overflows.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeDelta, TimeZone, Utc};
    /// use corona_backend::domain::{
    ///     MonitoredField, NotificationTrigger, Observation, Subscription, SubscriptionId,
    /// };
    ///
    /// let t0 = Utc.with_ymd_and_hms(2021, 3, 1, 12, 0, 0).single().expect("valid time");
    /// let subscription = Subscription {
    ///     id: SubscriptionId::random(),
    ///     callback_url: "https://example.invalid/hook".to_owned(),
    ///     timeout_minutes: 10.0,
    ///     field: MonitoredField::Confirmed,
    ///     country: "Norway".to_owned(),
    ///     trigger: NotificationTrigger::OnTimeout,
    ///     observation: Observation::new(100.0, t0),
    /// };
    /// assert_eq!(subscription.due_at(), t0 + TimeDelta::minutes(10));
    /// ```
    pub fn due_at(&self) -> DateTime<Utc> {
        let millis = (self.timeout_minutes * 60_000.0).round();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "float to int casts saturate and the result is range checked below"
        )]
        let millis = millis as i64;
        TimeDelta::try_milliseconds(millis)
            .and_then(|delta| self.last_observed_at().checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Return a copy carrying a new observation.
    pub fn with_observation(mut self, observation: Observation) -> Self {
        self.observation = observation;
        self
    }
}

/// Subscription data handed to the store before an identifier exists.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscription {
    /// Validated registration fields.
    pub registration: ValidatedRegistration,
    /// Initial metric snapshot.
    pub observation: Observation,
}

impl NewSubscription {
    /// Attach a store-assigned identifier.
    pub fn into_subscription(self, id: SubscriptionId) -> Subscription {
        let ValidatedRegistration {
            callback_url,
            timeout_minutes,
            field,
            country,
            trigger,
        } = self.registration;
        Subscription {
            id,
            callback_url,
            timeout_minutes,
            field,
            country,
            trigger,
            observation: self.observation,
        }
    }
}
