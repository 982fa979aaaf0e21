//! Registration validation for webhook subscriptions.

use std::str::FromStr;

use super::{MonitoredField, NotificationTrigger};

/// Raw registration fields as supplied by a client.
///
/// Missing fields are represented by their empty or zero value so each one
/// surfaces as its own validation error.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubscriptionRegistration {
    /// Callback URL.
    pub url: String,
    /// Timeout in minutes.
    pub timeout: f64,
    /// Monitored field name.
    pub field: String,
    /// Country name.
    pub country: String,
    /// Trigger name.
    pub trigger: String,
}

/// Registration that passed validation, with typed enums.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRegistration {
    /// Trimmed, non-empty callback URL.
    pub callback_url: String,
    /// Finite, positive timeout in minutes.
    pub timeout_minutes: f64,
    /// Parsed monitored field.
    pub field: MonitoredField,
    /// Non-blank country name.
    pub country: String,
    /// Parsed trigger.
    pub trigger: NotificationTrigger,
}

/// First violation found while validating a registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubscriptionValidationError {
    /// Callback URL is blank.
    #[error("Missing or invalid url data")]
    MissingUrl,
    /// Timeout is not a finite positive number.
    #[error("Missing or invalid timeout data")]
    InvalidTimeout,
    /// Field is not a known metric.
    #[error("Missing or invalid field data")]
    InvalidField,
    /// Country is blank.
    #[error("Missing or invalid country data")]
    MissingCountry,
    /// Trigger is not a known policy.
    #[error("Missing or invalid trigger data")]
    InvalidTrigger,
}

impl SubscriptionValidationError {
    /// Name of the offending registration field.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::MissingUrl => "url",
            Self::InvalidTimeout => "timeout",
            Self::InvalidField => "field",
            Self::MissingCountry => "country",
            Self::InvalidTrigger => "trigger",
        }
    }
}

/// Validate a registration, reporting the first violation.
///
/// Checks run in a fixed order: url, timeout, field, country, trigger.
///
/// # Examples
/// ```
/// use corona_backend::domain::{
///     SubscriptionRegistration, SubscriptionValidationError, validate_registration,
/// };
///
/// let registration = SubscriptionRegistration {
///     url: "https://example.invalid/hook".to_owned(),
///     timeout: 0.0,
///     field: "confirmed".to_owned(),
///     country: "Norway".to_owned(),
///     trigger: "ON_CHANGE".to_owned(),
/// };
/// assert_eq!(
///     validate_registration(&registration),
///     Err(SubscriptionValidationError::InvalidTimeout)
/// );
/// ```
pub fn validate_registration(
    registration: &SubscriptionRegistration,
) -> Result<ValidatedRegistration, SubscriptionValidationError> {
    let callback_url = registration.url.trim();
    if callback_url.is_empty() {
        return Err(SubscriptionValidationError::MissingUrl);
    }
    if !registration.timeout.is_finite() || registration.timeout <= 0.0 {
        return Err(SubscriptionValidationError::InvalidTimeout);
    }
    let field = MonitoredField::from_str(registration.field.as_str())
        .map_err(|_| SubscriptionValidationError::InvalidField)?;
    if registration.country.trim().is_empty() {
        return Err(SubscriptionValidationError::MissingCountry);
    }
    let trigger = NotificationTrigger::from_str(registration.trigger.as_str())
        .map_err(|_| SubscriptionValidationError::InvalidTrigger)?;

    Ok(ValidatedRegistration {
        callback_url: callback_url.to_owned(),
        timeout_minutes: registration.timeout,
        field,
        country: registration.country.clone(),
        trigger,
    })
}

impl TryFrom<SubscriptionRegistration> for ValidatedRegistration {
    type Error = SubscriptionValidationError;

    fn try_from(value: SubscriptionRegistration) -> Result<Self, Self::Error> {
        validate_registration(&value)
    }
}
