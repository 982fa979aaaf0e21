//! Unit tests for the notification scheduler.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rstest::{fixture, rstest};
use tokio::sync::watch;

use super::{
    NotificationScheduler, NotificationSchedulerConfig, NotificationSchedulerPorts, TickReport,
};
use crate::domain::ports::{
    MockSubscriptionRepository, SubscriptionRepository, SubscriptionRepositoryError,
};
use crate::domain::{
    MetricResolver, MetricSources, MonitoredField, NewSubscription, NotificationTrigger,
    Observation, Subscription, SubscriptionId, ValidatedRegistration,
};
use crate::outbound::persistence::InMemorySubscriptionRepository;
use crate::test_support::clock::MutableClock;
use crate::test_support::scheduler::RecordingSleeper;
use crate::test_support::upstream::{RecordingDispatcher, ScriptedUpstream};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 3, 1, 12, 0, 0)
        .single()
        .expect("valid time")
}

struct Harness {
    repository: Arc<InMemorySubscriptionRepository>,
    upstream: Arc<ScriptedUpstream>,
    dispatcher: Arc<RecordingDispatcher>,
    clock: Arc<MutableClock>,
}

impl Harness {
    fn resolver(&self) -> MetricResolver {
        MetricResolver::new(
            MetricSources::new(
                self.upstream.clone(),
                self.upstream.clone(),
                self.upstream.clone(),
            ),
            10,
        )
    }

    fn scheduler(&self, repository: Arc<dyn SubscriptionRepository>) -> NotificationScheduler {
        NotificationScheduler::with_sleeper(
            NotificationSchedulerPorts::new(repository, self.dispatcher.clone()),
            self.resolver(),
            self.clock.clone(),
            Arc::new(RecordingSleeper::default()),
            NotificationSchedulerConfig::default(),
        )
    }

    fn default_scheduler(&self) -> NotificationScheduler {
        self.scheduler(self.repository.clone())
    }

    async fn subscribe(
        &self,
        country: &str,
        trigger: NotificationTrigger,
        timeout_minutes: f64,
        occurrences: f64,
    ) -> Subscription {
        self.repository
            .create(NewSubscription {
                registration: ValidatedRegistration {
                    callback_url: format!("https://hooks.example.invalid/{country}"),
                    timeout_minutes,
                    field: MonitoredField::Confirmed,
                    country: country.to_owned(),
                    trigger,
                },
                observation: Observation::new(occurrences, t0()),
            })
            .await
            .expect("create subscription")
    }

    async fn stored(&self, id: &SubscriptionId) -> Subscription {
        self.repository
            .find_by_id(id)
            .await
            .expect("lookup")
            .expect("subscription present")
    }
}

#[fixture]
fn harness() -> Harness {
    Harness {
        repository: Arc::new(InMemorySubscriptionRepository::new()),
        upstream: Arc::new(ScriptedUpstream::default()),
        dispatcher: Arc::new(RecordingDispatcher::default()),
        clock: Arc::new(MutableClock::new(t0())),
    }
}

#[rstest]
#[tokio::test]
async fn timeout_trigger_fires_and_persists_fire_time(harness: Harness) {
    let subscription = harness
        .subscribe("Norway", NotificationTrigger::OnTimeout, 10.0, 100.0)
        .await;
    harness.upstream.set_confirmed("Norway", 100.0);
    harness.clock.advance_minutes(11);

    let report = harness.default_scheduler().tick().await.expect("tick");

    assert_eq!(
        report,
        TickReport {
            evaluated: 1,
            fired: 1,
            ..TickReport::default()
        }
    );
    let fire_time = t0() + TimeDelta::minutes(11);
    let delivered = harness.dispatcher.delivered();
    assert_eq!(delivered.len(), 1);
    let document = delivered.first().expect("one delivery");
    assert_eq!(document.id, subscription.id);
    assert!((document.occurrences - 100.0).abs() < f64::EPSILON);
    assert_eq!(document.time, fire_time);

    let stored = harness.stored(&subscription.id).await;
    assert_eq!(stored.last_observed_at(), fire_time);
    assert!((stored.occurrences() - 100.0).abs() < f64::EPSILON);
}

#[rstest]
#[tokio::test]
async fn change_trigger_holds_until_value_moves(harness: Harness) {
    let subscription = harness
        .subscribe("Norway", NotificationTrigger::OnChange, 5.0, 50.0)
        .await;
    let scheduler = harness.default_scheduler();

    harness.upstream.set_confirmed("Norway", 50.0);
    harness.clock.advance_minutes(6);
    let first = scheduler.tick().await.expect("first tick");
    assert_eq!(first.held, 1);
    assert!(harness.dispatcher.delivered().is_empty());
    assert_eq!(harness.stored(&subscription.id).await.last_observed_at(), t0());

    harness.upstream.set_confirmed("Norway", 75.0);
    harness.clock.set(t0() + TimeDelta::minutes(20));
    let second = scheduler.tick().await.expect("second tick");
    assert_eq!(second.fired, 1);

    let stored = harness.stored(&subscription.id).await;
    assert!((stored.occurrences() - 75.0).abs() < f64::EPSILON);
    assert_eq!(stored.last_observed_at(), t0() + TimeDelta::minutes(20));
}

#[rstest]
#[tokio::test]
async fn timeout_trigger_does_not_fire_before_due(harness: Harness) {
    harness
        .subscribe("Norway", NotificationTrigger::OnTimeout, 10.0, 100.0)
        .await;
    harness.upstream.set_confirmed("Norway", 100.0);
    harness.clock.advance_minutes(10);

    let report = harness.default_scheduler().tick().await.expect("tick");

    assert_eq!(report.held, 1);
    assert!(harness.dispatcher.delivered().is_empty());
}

#[rstest]
#[tokio::test]
async fn failing_upstream_does_not_block_other_subscriptions(harness: Harness) {
    for country in ["Norway", "Sweden", "Denmark"] {
        harness
            .subscribe(country, NotificationTrigger::OnTimeout, 1.0, 10.0)
            .await;
        harness.upstream.set_confirmed(country, 10.0);
    }
    harness.upstream.fail_country("Sweden");
    harness.clock.advance_minutes(2);

    let report = harness.default_scheduler().tick().await.expect("tick");

    assert_eq!(report.evaluated, 2);
    assert_eq!(report.fired, 2);
    assert_eq!(report.skipped, 1);
    let mut delivered: Vec<String> = harness
        .dispatcher
        .delivered()
        .into_iter()
        .map(|document| document.country)
        .collect();
    delivered.sort();
    assert_eq!(delivered, vec!["Denmark".to_owned(), "Norway".to_owned()]);
}

#[rstest]
#[tokio::test]
async fn delivery_failure_still_updates_baseline(harness: Harness) {
    let subscription = harness
        .subscribe("Norway", NotificationTrigger::OnChange, 1.0, 10.0)
        .await;
    harness.dispatcher.reject_url(&subscription.callback_url);
    harness.upstream.set_confirmed("Norway", 12.0);
    harness.clock.advance_minutes(2);

    let report = harness.default_scheduler().tick().await.expect("tick");

    assert_eq!(report.fired, 1);
    assert_eq!(report.delivery_failures, 1);
    let stored = harness.stored(&subscription.id).await;
    assert!((stored.occurrences() - 12.0).abs() < f64::EPSILON);
}

#[rstest]
#[tokio::test]
async fn store_failure_is_counted_per_subscription(harness: Harness) {
    let subscription = Subscription {
        id: SubscriptionId::random(),
        callback_url: "https://hooks.example.invalid/norway".to_owned(),
        timeout_minutes: 1.0,
        field: MonitoredField::Confirmed,
        country: "Norway".to_owned(),
        trigger: NotificationTrigger::OnTimeout,
        observation: Observation::new(10.0, t0()),
    };
    let mut repository = MockSubscriptionRepository::new();
    let listed = subscription.clone();
    repository
        .expect_list()
        .times(1)
        .return_once(move || Ok(vec![listed]));
    repository
        .expect_record_observation()
        .times(1)
        .return_once(|_, _| Err(SubscriptionRepositoryError::query("disk full")));
    harness.upstream.set_confirmed("Norway", 10.0);
    harness.clock.advance_minutes(5);

    let report = harness
        .scheduler(Arc::new(repository))
        .tick()
        .await
        .expect("tick");

    assert_eq!(report.fired, 1);
    assert_eq!(report.store_failures, 1);
    assert_eq!(harness.dispatcher.delivered().len(), 1);
}

#[rstest]
#[tokio::test]
async fn list_failure_fails_the_tick(harness: Harness) {
    let mut repository = MockSubscriptionRepository::new();
    repository
        .expect_list()
        .return_once(|| Err(SubscriptionRepositoryError::connection("refused")));

    let err = harness
        .scheduler(Arc::new(repository))
        .tick()
        .await
        .expect_err("tick should fail");

    assert_eq!(err, SubscriptionRepositoryError::connection("refused"));
}

#[rstest]
#[tokio::test]
async fn single_evaluation_slot_still_processes_everything(harness: Harness) {
    for country in ["Norway", "Sweden", "Denmark", "Finland"] {
        harness
            .subscribe(country, NotificationTrigger::OnTimeout, 1.0, 1.0)
            .await;
        harness.upstream.set_confirmed(country, 1.0);
    }
    harness.clock.advance_minutes(2);
    let scheduler = NotificationScheduler::with_sleeper(
        NotificationSchedulerPorts::new(harness.repository.clone(), harness.dispatcher.clone()),
        harness.resolver(),
        harness.clock.clone(),
        Arc::new(RecordingSleeper::default()),
        NotificationSchedulerConfig {
            poll_interval: Duration::from_secs(1),
            max_concurrent_evaluations: 1,
        },
    );

    let report = scheduler.tick().await.expect("tick");

    assert_eq!(report.fired, 4);
}

#[rstest]
#[tokio::test]
async fn run_sleeps_between_ticks_until_shutdown(harness: Harness) {
    let (tx, rx) = watch::channel(false);
    let sleeper = Arc::new(RecordingSleeper::stopping_after(2, tx));
    let mut repository = MockSubscriptionRepository::new();
    repository.expect_list().times(2).returning(|| Ok(Vec::new()));
    let scheduler = NotificationScheduler::with_sleeper(
        NotificationSchedulerPorts::new(Arc::new(repository), harness.dispatcher.clone()),
        harness.resolver(),
        harness.clock.clone(),
        sleeper.clone(),
        NotificationSchedulerConfig::default(),
    );

    tokio::time::timeout(Duration::from_secs(5), scheduler.run(rx))
        .await
        .expect("scheduler stops");

    assert_eq!(
        sleeper.calls(),
        vec![Duration::from_secs(3600), Duration::from_secs(3600)]
    );
}

#[rstest]
#[tokio::test]
async fn run_returns_immediately_when_already_shut_down(harness: Harness) {
    let (tx, rx) = watch::channel(true);
    let mut repository = MockSubscriptionRepository::new();
    repository.expect_list().never();
    let scheduler = harness.scheduler(Arc::new(repository));

    tokio::time::timeout(Duration::from_secs(5), scheduler.run(rx))
        .await
        .expect("scheduler stops");
    drop(tx);
}

#[rstest]
#[tokio::test]
async fn run_survives_list_failures(harness: Harness) {
    let (tx, rx) = watch::channel(false);
    let sleeper = Arc::new(RecordingSleeper::stopping_after(2, tx));
    let mut repository = MockSubscriptionRepository::new();
    repository
        .expect_list()
        .times(2)
        .returning(|| Err(SubscriptionRepositoryError::connection("refused")));
    let scheduler = NotificationScheduler::with_sleeper(
        NotificationSchedulerPorts::new(Arc::new(repository), harness.dispatcher.clone()),
        harness.resolver(),
        harness.clock.clone(),
        sleeper.clone(),
        NotificationSchedulerConfig::default(),
    );

    tokio::time::timeout(Duration::from_secs(5), scheduler.run(rx))
        .await
        .expect("scheduler stops");

    assert_eq!(sleeper.calls().len(), 2);
}
