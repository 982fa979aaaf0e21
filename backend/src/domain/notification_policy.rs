//! Trigger policy deciding whether a subscription fires.

use chrono::{DateTime, Utc};

use crate::domain::{Observation, Subscription};

/// Outcome of evaluating one subscription against a fresh value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NotificationDecision {
    /// Notify the subscriber and adopt `observation` as the new baseline.
    Fire { observation: Observation },
    /// Leave the subscription untouched.
    Hold,
}

impl NotificationDecision {
    /// Whether the decision fires.
    pub fn fires(&self) -> bool {
        matches!(self, Self::Fire { .. })
    }
}

/// Decide whether `subscription` fires given the `current` value at `now`.
///
/// Nothing fires until `now` is strictly past the subscription's due time.
/// After that `ON_TIMEOUT` always fires, while `ON_CHANGE` and `ON_UPDATE`
/// fire only when `current` differs from the stored baseline.
///
/// # Examples
/// ```
/// use chrono::{TimeDelta, TimeZone, Utc};
/// use corona_backend::domain::{
///     MonitoredField, NotificationDecision, NotificationTrigger, Observation, Subscription,
///     SubscriptionId, decide,
/// };
///
/// let t0 = Utc.with_ymd_and_hms(2021, 3, 1, 12, 0, 0).single().expect("valid time");
/// let subscription = Subscription {
///     id: SubscriptionId::random(),
///     callback_url: "https://example.invalid/hook".to_owned(),
///     timeout_minutes: 5.0,
///     field: MonitoredField::Confirmed,
///     country: "Norway".to_owned(),
///     trigger: NotificationTrigger::OnChange,
///     observation: Observation::new(50.0, t0),
/// };
/// assert_eq!(
///     decide(&subscription, 50.0, t0 + TimeDelta::minutes(6)),
///     NotificationDecision::Hold
/// );
/// ```
pub fn decide(
    subscription: &Subscription,
    current: f64,
    now: DateTime<Utc>,
) -> NotificationDecision {
    if now <= subscription.due_at() {
        return NotificationDecision::Hold;
    }
    if subscription.trigger.ignores_value() || current != subscription.occurrences() {
        NotificationDecision::Fire {
            observation: Observation::new(current, now),
        }
    } else {
        NotificationDecision::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MonitoredField, NotificationTrigger, SubscriptionId};
    use chrono::{TimeDelta, TimeZone};
    use rstest::rstest;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 1, 12, 0, 0)
            .single()
            .expect("valid time")
    }

    fn subscription(trigger: NotificationTrigger, occurrences: f64, timeout: f64) -> Subscription {
        Subscription {
            id: SubscriptionId::random(),
            callback_url: "https://hooks.example.invalid/covid".to_owned(),
            timeout_minutes: timeout,
            field: MonitoredField::Confirmed,
            country: "Norway".to_owned(),
            trigger,
            observation: Observation::new(occurrences, t0()),
        }
    }

    fn fire(current: f64, minutes: i64) -> NotificationDecision {
        NotificationDecision::Fire {
            observation: Observation::new(current, t0() + TimeDelta::minutes(minutes)),
        }
    }

    #[rstest]
    #[case::timeout_same_value(NotificationTrigger::OnTimeout, 100.0, 11, fire(100.0, 11))]
    #[case::timeout_new_value(NotificationTrigger::OnTimeout, 120.0, 11, fire(120.0, 11))]
    #[case::timeout_before_due(NotificationTrigger::OnTimeout, 120.0, 9, NotificationDecision::Hold)]
    #[case::timeout_exactly_due(NotificationTrigger::OnTimeout, 120.0, 10, NotificationDecision::Hold)]
    #[case::change_same_value(NotificationTrigger::OnChange, 100.0, 30, NotificationDecision::Hold)]
    #[case::change_new_value(NotificationTrigger::OnChange, 101.0, 30, fire(101.0, 30))]
    #[case::change_before_due(NotificationTrigger::OnChange, 101.0, 5, NotificationDecision::Hold)]
    #[case::update_same_value(NotificationTrigger::OnUpdate, 100.0, 30, NotificationDecision::Hold)]
    #[case::update_new_value(NotificationTrigger::OnUpdate, 99.5, 30, fire(99.5, 30))]
    fn applies_trigger_policy(
        #[case] trigger: NotificationTrigger,
        #[case] current: f64,
        #[case] minutes_later: i64,
        #[case] expected: NotificationDecision,
    ) {
        let subscription = subscription(trigger, 100.0, 10.0);
        let now = t0() + TimeDelta::minutes(minutes_later);
        assert_eq!(decide(&subscription, current, now), expected);
    }

    #[test]
    fn change_trigger_holds_then_fires() {
        let subscription = subscription(NotificationTrigger::OnChange, 50.0, 5.0);

        let first = decide(&subscription, 50.0, t0() + TimeDelta::minutes(6));
        assert_eq!(first, NotificationDecision::Hold);

        let second = decide(&subscription, 75.0, t0() + TimeDelta::minutes(20));
        assert_eq!(second, fire(75.0, 20));
        assert!(second.fires());
    }

    #[test]
    fn signed_zero_is_not_a_change() {
        let subscription = subscription(NotificationTrigger::OnChange, 0.0, 1.0);
        let decision = decide(&subscription, -0.0, t0() + TimeDelta::minutes(2));
        assert_eq!(decision, NotificationDecision::Hold);
    }

    #[test]
    fn nan_baseline_is_replaced() {
        let subscription = subscription(NotificationTrigger::OnChange, f64::NAN, 1.0);
        let decision = decide(&subscription, 3.0, t0() + TimeDelta::minutes(2));
        assert!(decision.fires());
    }
}
