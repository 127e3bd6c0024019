// Test doubles shared by the unit tests: loaders that count their calls and a
// receiver that writes down everything it is told.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;

use crate::constraints::DateConstraints;
use crate::error::{LoaderError, SharedLoaderError};
use crate::loaders::{ContestsLoader, ContestsLoaderMultiple};
use crate::models::{Contest, LoaderType, Platform};
use crate::receiver::ContestsReceiver;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn constraints() -> DateConstraints {
    DateConstraints::around(now(), Duration::days(30), Duration::days(7), Duration::days(14))
}

/// A two-hour contest tomorrow.
pub fn contest(platform: Platform, id: &str) -> Contest {
    Contest::new(platform, id, format!("Contest {id}"), now() + Duration::days(1), Duration::hours(2))
}

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub struct FakeLoader {
    loader_type: LoaderType,
    outcome: Result<Vec<Contest>, String>,
    delay: StdDuration,
    calls: AtomicUsize,
    log: Option<CallLog>,
}

impl FakeLoader {
    pub fn ok(loader_type: LoaderType, contests: Vec<Contest>) -> Self {
        Self {
            loader_type,
            outcome: Ok(contests),
            delay: StdDuration::ZERO,
            calls: AtomicUsize::new(0),
            log: None,
        }
    }

    pub fn failing(loader_type: LoaderType, message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            ..Self::ok(loader_type, Vec::new())
        }
    }

    pub fn with_delay(mut self, delay: StdDuration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn note(&self, what: &str) {
        if let Some(log) = &self.log {
            log.lock().push(format!("{} {what}", self.loader_type));
        }
    }
}

#[async_trait]
impl ContestsLoader for FakeLoader {
    fn loader_type(&self) -> LoaderType {
        self.loader_type
    }

    async fn load_contests(
        &self,
        _platform: Platform,
        _constraints: &DateConstraints,
    ) -> Result<Vec<Contest>, LoaderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.note("start");
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.note("end");
        self.outcome.clone().map_err(LoaderError::Backend)
    }
}

/// Batched loader that counts calls and remembers what it was asked for.
pub struct SpyMultipleLoader {
    contests: Vec<Contest>,
    failure: Option<String>,
    delay: StdDuration,
    calls: AtomicUsize,
    requested: Mutex<Vec<Vec<Platform>>>,
    log: Option<CallLog>,
}

impl SpyMultipleLoader {
    pub fn new(contests: Vec<Contest>) -> Self {
        Self {
            contests,
            failure: None,
            delay: StdDuration::ZERO,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
            log: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(Vec::new())
        }
    }

    pub fn with_delay(mut self, delay: StdDuration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn note(&self, what: &str) {
        if let Some(log) = &self.log {
            log.lock().push(format!("{} {what}", LoaderType::ClistApi));
        }
    }

    pub fn requested(&self) -> Vec<Vec<Platform>> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl ContestsLoaderMultiple for SpyMultipleLoader {
    fn loader_type(&self) -> LoaderType {
        LoaderType::ClistApi
    }

    async fn load_contests(
        &self,
        platforms: &[Platform],
        _constraints: &DateConstraints,
    ) -> Result<Vec<Contest>, LoaderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().push(platforms.to_vec());
        self.note("start");
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.note("end");
        match &self.failure {
            Some(message) => Err(LoaderError::Backend(message.clone())),
            None => Ok(self.contests.clone()),
        }
    }
}

/// What a receiver was told, with results flattened to contest ids / error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start(Platform),
    Result(Platform, LoaderType, Result<Vec<String>, String>),
    Finish(Platform),
}

#[derive(Default)]
pub struct RecordingReceiver {
    events: Mutex<Vec<Event>>,
}

impl RecordingReceiver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn events_for(&self, platform: Platform) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| match e {
                Event::Start(p) | Event::Finish(p) | Event::Result(p, _, _) => *p == platform,
            })
            .collect()
    }
}

#[async_trait]
impl ContestsReceiver for RecordingReceiver {
    async fn on_start_loading(&self, platform: Platform) {
        self.events.lock().push(Event::Start(platform));
    }

    async fn on_result(
        &self,
        platform: Platform,
        loader_type: LoaderType,
        result: Result<Vec<Contest>, SharedLoaderError>,
    ) {
        let flat = result
            .map(|contests| contests.into_iter().map(|c| c.id).collect())
            .map_err(|e| e.to_string());
        self.events.lock().push(Event::Result(platform, loader_type, flat));
    }

    async fn on_finish(&self, platform: Platform) {
        self.events.lock().push(Event::Finish(platform));
    }
}
