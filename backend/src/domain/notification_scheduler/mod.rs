//! Periodic evaluation of webhook subscriptions.
//!
//! The scheduler owns the polling loop: each tick loads every subscription,
//! resolves the current metric value, applies the trigger policy, and for
//! each fire delivers the notification before persisting the new baseline.
//! One subscription failing never prevents the others from being evaluated.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::{StreamExt, stream};
use mockable::Clock;
use tokio::sync::watch;
use tracing::{Instrument, error, info, info_span, warn};

use crate::domain::ports::{
    NotificationDispatcher, SubscriptionRepository, SubscriptionRepositoryError,
};
use crate::domain::{
    MetricResolver, NotificationDecision, Subscription, SubscriptionDocument, TraceId, decide,
};

mod runtime;
#[cfg(test)]
mod tests;

pub use runtime::{NotificationSchedulerPorts, TokioSleeper};

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSchedulerConfig {
    /// Pause between the end of one tick and the start of the next.
    pub poll_interval: Duration,
    /// Upper bound on subscriptions evaluated concurrently within a tick.
    pub max_concurrent_evaluations: usize,
}

impl Default for NotificationSchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3600),
            max_concurrent_evaluations: 4,
        }
    }
}

/// Async sleeping abstraction so tests can drive the loop without waiting.
#[async_trait]
pub trait SchedulerSleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Per-tick counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Subscriptions whose metric was resolved.
    pub evaluated: usize,
    /// Subscriptions that fired.
    pub fired: usize,
    /// Subscriptions that held.
    pub held: usize,
    /// Subscriptions skipped because the metric lookup failed.
    pub skipped: usize,
    /// Fired notifications whose delivery failed.
    pub delivery_failures: usize,
    /// Fired notifications whose new baseline could not be stored.
    pub store_failures: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Evaluation {
    Skipped,
    Held,
    Fired { delivered: bool, persisted: bool },
}

impl TickReport {
    fn record(mut self, evaluation: Evaluation) -> Self {
        match evaluation {
            Evaluation::Skipped => self.skipped += 1,
            Evaluation::Held => {
                self.evaluated += 1;
                self.held += 1;
            }
            Evaluation::Fired {
                delivered,
                persisted,
            } => {
                self.evaluated += 1;
                self.fired += 1;
                if !delivered {
                    self.delivery_failures += 1;
                }
                if !persisted {
                    self.store_failures += 1;
                }
            }
        }
        self
    }
}

/// Domain-owned notification scheduler.
pub struct NotificationScheduler {
    repository: Arc<dyn SubscriptionRepository>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    resolver: MetricResolver,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn SchedulerSleeper>,
    config: NotificationSchedulerConfig,
}

impl NotificationScheduler {
    /// Build a scheduler that sleeps on the Tokio timer.
    pub fn new(
        ports: NotificationSchedulerPorts,
        resolver: MetricResolver,
        clock: Arc<dyn Clock>,
        config: NotificationSchedulerConfig,
    ) -> Self {
        Self::with_sleeper(ports, resolver, clock, Arc::new(TokioSleeper), config)
    }

    /// Build a scheduler with an injected sleeper.
    pub fn with_sleeper(
        ports: NotificationSchedulerPorts,
        resolver: MetricResolver,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn SchedulerSleeper>,
        config: NotificationSchedulerConfig,
    ) -> Self {
        Self {
            repository: ports.repository,
            dispatcher: ports.dispatcher,
            resolver,
            clock,
            sleeper,
            config,
        }
    }

    /// Run ticks until `shutdown` becomes `true` or its sender is dropped.
    ///
    /// The signal is checked before each tick and raced against the sleep
    /// between ticks. A tick in progress always runs to completion.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            max_concurrent = self.config.max_concurrent_evaluations,
            "notification scheduler started"
        );
        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            let trace_id = TraceId::generate();
            let span = info_span!("notification_tick", trace_id = %trace_id);
            match TraceId::scope(trace_id, self.tick().instrument(span)).await {
                Ok(report) => info!(
                    %trace_id,
                    evaluated = report.evaluated,
                    fired = report.fired,
                    held = report.held,
                    skipped = report.skipped,
                    delivery_failures = report.delivery_failures,
                    store_failures = report.store_failures,
                    "notification tick finished"
                ),
                Err(error) => error!(
                    %trace_id,
                    %error,
                    "failed to list subscriptions; skipping tick"
                ),
            }

            let stop = tokio::select! {
                () = self.sleeper.sleep(self.config.poll_interval) => false,
                changed = shutdown.changed() => changed.is_err(),
            };
            if stop {
                break;
            }
        }
        info!("notification scheduler stopped");
    }

    /// Evaluate every stored subscription once.
    ///
    /// # Errors
    /// Returns the store error when subscriptions cannot be listed. Failures
    /// for individual subscriptions are counted in the [`TickReport`] instead.
    pub async fn tick(&self) -> Result<TickReport, SubscriptionRepositoryError> {
        let subscriptions = self.repository.list().await?;
        let now = self.clock.utc();
        let limit = self.config.max_concurrent_evaluations.max(1);

        let report = stream::iter(subscriptions)
            .map(|subscription| self.evaluate(subscription, now))
            .buffer_unordered(limit)
            .fold(TickReport::default(), |report, evaluation| async move {
                report.record(evaluation)
            })
            .await;
        Ok(report)
    }

    async fn evaluate(&self, subscription: Subscription, now: DateTime<Utc>) -> Evaluation {
        let current = match self
            .resolver
            .current_value(subscription.field, &subscription.country, now)
            .await
        {
            Ok(value) => value,
            Err(error) => {
                warn!(
                    subscription_id = %subscription.id,
                    country = %subscription.country,
                    field = %subscription.field,
                    %error,
                    "metric lookup failed; subscription skipped this tick"
                );
                return Evaluation::Skipped;
            }
        };

        let NotificationDecision::Fire { observation } = decide(&subscription, current, now)
        else {
            return Evaluation::Held;
        };

        let updated = subscription.with_observation(observation);
        let document = SubscriptionDocument::from(&updated);
        let delivered = match self.dispatcher.dispatch(&document).await {
            Ok(()) => true,
            Err(error) => {
                warn!(
                    subscription_id = %updated.id,
                    callback_url = %updated.callback_url,
                    %error,
                    "notification delivery failed"
                );
                false
            }
        };

        let persisted = match self
            .repository
            .record_observation(&updated.id, observation)
            .await
        {
            Ok(()) => true,
            Err(error) => {
                error!(
                    subscription_id = %updated.id,
                    %error,
                    "failed to store new observation"
                );
                false
            }
        };

        info!(
            subscription_id = %updated.id,
            occurrences = observation.occurrences,
            delivered,
            persisted,
            "notification fired"
        );
        Evaluation::Fired {
            delivered,
            persisted,
        }
    }
}
