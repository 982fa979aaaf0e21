//! Test utilities for the backend crate.
//!
//! This module provides shared doubles for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled for tests or with the
//! `test-support` feature.

pub mod clock {
    //! Controllable clock for time-dependent tests.

    use std::sync::{Mutex, MutexGuard};

    use chrono::{DateTime, Local, TimeDelta, Utc};
    use mockable::Clock;

    /// Clock whose current time only moves when told to.
    #[derive(Debug)]
    pub struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        /// Start the clock at `now`.
        pub fn new(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        /// Move the clock forward by `minutes`.
        pub fn advance_minutes(&self, minutes: i64) {
            *self.lock_clock() += TimeDelta::minutes(minutes);
        }

        /// Jump to an absolute time.
        pub fn set(&self, now: DateTime<Utc>) {
            *self.lock_clock() = now;
        }

        fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
            match self.0.lock() {
                Ok(guard) => guard,
                Err(_) => panic!("clock mutex"),
            }
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.lock_clock()
        }
    }
}

pub mod scheduler {
    //! Sleepers for driving the notification loop without waiting.

    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::watch;

    use crate::domain::SchedulerSleeper;

    /// Sleeper that returns immediately and records each requested duration.
    ///
    /// When constructed with [`RecordingSleeper::stopping_after`], it flips the
    /// shutdown signal once the given number of sleeps has been requested.
    #[derive(Debug, Default)]
    pub struct RecordingSleeper {
        calls: Mutex<Vec<Duration>>,
        stop_after: Option<(usize, watch::Sender<bool>)>,
    }

    impl RecordingSleeper {
        /// Signal shutdown through `shutdown` on the `sleeps`-th sleep.
        pub fn stopping_after(sleeps: usize, shutdown: watch::Sender<bool>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                stop_after: Some((sleeps, shutdown)),
            }
        }

        /// Durations requested so far.
        pub fn calls(&self) -> Vec<Duration> {
            match self.calls.lock() {
                Ok(calls) => calls.clone(),
                Err(_) => panic!("sleeper mutex"),
            }
        }
    }

    #[async_trait]
    impl SchedulerSleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            let count = {
                let mut calls = match self.calls.lock() {
                    Ok(calls) => calls,
                    Err(_) => panic!("sleeper mutex"),
                };
                calls.push(duration);
                calls.len()
            };
            if let Some((limit, shutdown)) = &self.stop_after {
                if count >= *limit {
                    shutdown.send_replace(true);
                    std::future::pending::<()>().await;
                }
            }
        }
    }
}

pub mod upstream {
    //! Scripted upstream providers and a recording webhook dispatcher.

    use std::collections::{BTreeMap, HashMap, HashSet};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use crate::domain::SubscriptionDocument;
    use crate::domain::ports::{
        CaseHistory, CaseHistorySource, CaseStatus, CountryCodeLookup, MetricSourceError,
        NotificationDispatchError, NotificationDispatcher, StringencySource,
    };

    fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
        match mutex.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("test double mutex"),
        }
    }

    /// Upstream double answering from in-memory tables.
    ///
    /// Implements every data provider port. Countries without an entry are
    /// reported as unknown; countries marked failing return a transport error.
    #[derive(Debug, Default)]
    pub struct ScriptedUpstream {
        codes: Mutex<HashMap<String, String>>,
        stringency: Mutex<HashMap<(String, NaiveDate), f64>>,
        cases: Mutex<HashMap<(String, CaseStatus), CaseHistory>>,
        failing: Mutex<HashSet<String>>,
    }

    impl ScriptedUpstream {
        /// Register an alpha-3 code for `country`.
        pub fn with_code(self, country: &str, code: &str) -> Self {
            lock(&self.codes).insert(country.to_owned(), code.to_owned());
            self
        }

        /// Set the stringency score for `code` on `date`.
        pub fn set_stringency(&self, code: &str, date: NaiveDate, value: f64) {
            lock(&self.stringency).insert((code.to_owned(), date), value);
        }

        /// Replace the confirmed series for `country` with a single value.
        pub fn set_confirmed(&self, country: &str, value: f64) {
            let date = NaiveDate::MIN;
            self.set_history(
                country,
                CaseStatus::Confirmed,
                CaseHistory {
                    continent: "Europe".to_owned(),
                    population: 0.0,
                    dates: BTreeMap::from([(date, value)]),
                },
            );
        }

        /// Replace the series of `status` for `country`.
        pub fn set_history(&self, country: &str, status: CaseStatus, history: CaseHistory) {
            lock(&self.cases).insert((country.to_owned(), status), history);
        }

        /// Make every lookup for `country` fail with a transport error.
        pub fn fail_country(&self, country: &str) {
            lock(&self.failing).insert(country.to_owned());
        }

        fn check_failing(&self, country: &str) -> Result<(), MetricSourceError> {
            if lock(&self.failing).contains(country) {
                return Err(MetricSourceError::transport(format!(
                    "scripted failure for {country}"
                )));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CountryCodeLookup for ScriptedUpstream {
        async fn alpha3_code(&self, country: &str) -> Result<String, MetricSourceError> {
            self.check_failing(country)?;
            lock(&self.codes)
                .get(country)
                .cloned()
                .ok_or_else(|| MetricSourceError::country_not_found(country))
        }
    }

    #[async_trait]
    impl StringencySource for ScriptedUpstream {
        async fn stringency(
            &self,
            country_code: &str,
            date: NaiveDate,
        ) -> Result<f64, MetricSourceError> {
            lock(&self.stringency)
                .get(&(country_code.to_owned(), date))
                .copied()
                .ok_or_else(|| {
                    MetricSourceError::decode(format!("no stringency for {country_code} on {date}"))
                })
        }
    }

    #[async_trait]
    impl CaseHistorySource for ScriptedUpstream {
        async fn case_history(
            &self,
            country: &str,
            status: CaseStatus,
        ) -> Result<CaseHistory, MetricSourceError> {
            self.check_failing(country)?;
            lock(&self.cases)
                .get(&(country.to_owned(), status))
                .cloned()
                .ok_or_else(|| MetricSourceError::country_not_found(country))
        }
    }

    /// Dispatcher double recording every delivered document.
    #[derive(Debug, Default)]
    pub struct RecordingDispatcher {
        delivered: Mutex<Vec<SubscriptionDocument>>,
        rejecting: Mutex<HashSet<String>>,
    }

    impl RecordingDispatcher {
        /// Answer deliveries to `url` with a 500 status.
        pub fn reject_url(&self, url: &str) {
            lock(&self.rejecting).insert(url.to_owned());
        }

        /// Documents delivered so far, including rejected attempts.
        pub fn delivered(&self) -> Vec<SubscriptionDocument> {
            lock(&self.delivered).clone()
        }
    }

    #[async_trait]
    impl NotificationDispatcher for RecordingDispatcher {
        async fn dispatch(
            &self,
            document: &SubscriptionDocument,
        ) -> Result<(), NotificationDispatchError> {
            lock(&self.delivered).push(document.clone());
            if lock(&self.rejecting).contains(&document.url) {
                return Err(NotificationDispatchError::status(500_u16, "scripted rejection"));
            }
            Ok(())
        }
    }
}
