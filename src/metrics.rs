// ═══════════════════════════════════════════════════════════════
// METRICS - Because if you can't count it, it didn't load
// ═══════════════════════════════════════════════════════════════
//
// Atomic counters for one pass, fed by a receiver decorator that sits in
// front of the real receiver. The engine itself knows nothing about metrics:
// wrap whatever receiver you have in an InstrumentedReceiver and every
// callback gets counted and logged before being forwarded.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::SharedLoaderError;
use crate::models::{Contest, LoaderType, Platform};
use crate::receiver::ContestsReceiver;

/// What gets serialized at the end of a pass.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub platforms_started: u64,
    pub platforms_finished: u64,
    pub platforms_exhausted: u64,
    pub attempts_succeeded: u64,
    pub attempts_failed: u64,
    pub contests_received: u64,
    pub elapsed_ms: u64,
}

pub struct LoadingMetrics {
    platforms_started: AtomicU64,
    platforms_finished: AtomicU64,
    platforms_exhausted: AtomicU64,
    attempts_succeeded: AtomicU64,
    attempts_failed: AtomicU64,
    contests_received: AtomicU64,
    // platforms that saw at least one success; checked at on_finish
    succeeded: Mutex<HashSet<Platform>>,
    start_time: Instant,
}

impl LoadingMetrics {
    pub fn new() -> Self {
        Self {
            platforms_started: AtomicU64::new(0),
            platforms_finished: AtomicU64::new(0),
            platforms_exhausted: AtomicU64::new(0),
            attempts_succeeded: AtomicU64::new(0),
            attempts_failed: AtomicU64::new(0),
            contests_received: AtomicU64::new(0),
            succeeded: Mutex::new(HashSet::new()),
            start_time: Instant::now(),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            platforms_started: self.platforms_started.load(Ordering::Relaxed),
            platforms_finished: self.platforms_finished.load(Ordering::Relaxed),
            platforms_exhausted: self.platforms_exhausted.load(Ordering::Relaxed),
            attempts_succeeded: self.attempts_succeeded.load(Ordering::Relaxed),
            attempts_failed: self.attempts_failed.load(Ordering::Relaxed),
            contests_received: self.contests_received.load(Ordering::Relaxed),
            elapsed_ms: saturating_millis(self.start_time.elapsed()),
        }
    }
}

fn saturating_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

impl Default for LoadingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts and logs every callback, then hands it to `inner`.
pub struct InstrumentedReceiver<R> {
    inner: R,
    metrics: Arc<LoadingMetrics>,
}

impl<R: ContestsReceiver> InstrumentedReceiver<R> {
    pub fn new(inner: R, metrics: Arc<LoadingMetrics>) -> Self {
        Self { inner, metrics }
    }
}

#[async_trait]
impl<R: ContestsReceiver> ContestsReceiver for InstrumentedReceiver<R> {
    async fn on_start_loading(&self, platform: Platform) {
        self.metrics.platforms_started.fetch_add(1, Ordering::Relaxed);
        info!(platform = %platform, "📡 Loading contests");
        self.inner.on_start_loading(platform).await;
    }

    async fn on_result(
        &self,
        platform: Platform,
        loader_type: LoaderType,
        result: Result<Vec<Contest>, SharedLoaderError>,
    ) {
        match &result {
            Ok(contests) => {
                self.metrics.attempts_succeeded.fetch_add(1, Ordering::Relaxed);
                self.metrics
                    .contests_received
                    .fetch_add(contests.len() as u64, Ordering::Relaxed);
                self.metrics.succeeded.lock().insert(platform);
                info!(
                    platform = %platform,
                    loader = %loader_type,
                    contests = contests.len(),
                    "✅ Loaded contests"
                );
            }
            Err(e) => {
                self.metrics.attempts_failed.fetch_add(1, Ordering::Relaxed);
                warn!(platform = %platform, loader = %loader_type, error = %e, "❌ Loader attempt failed");
            }
        }
        self.inner.on_result(platform, loader_type, result).await;
    }

    async fn on_finish(&self, platform: Platform) {
        self.metrics.platforms_finished.fetch_add(1, Ordering::Relaxed);
        if !self.metrics.succeeded.lock().contains(&platform) {
            self.metrics.platforms_exhausted.fetch_add(1, Ordering::Relaxed);
            warn!(platform = %platform, "Every loader failed, stored contests left as they were");
        }
        self.inner.on_finish(platform).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoaderError;
    use crate::testing::{contest, Event, RecordingReceiver};

    #[tokio::test]
    async fn test_counts_attempts_and_exhausted_platforms() {
        let recorder = RecordingReceiver::new();
        let metrics = Arc::new(LoadingMetrics::new());
        let receiver = InstrumentedReceiver::new(Arc::clone(&recorder), Arc::clone(&metrics));

        let failure: SharedLoaderError = Arc::new(LoaderError::Backend("nope".into()));

        receiver.on_start_loading(Platform::Codeforces).await;
        receiver
            .on_result(Platform::Codeforces, LoaderType::CodeforcesApi, Err(Arc::clone(&failure)))
            .await;
        receiver
            .on_result(
                Platform::Codeforces,
                LoaderType::ClistApi,
                Ok(vec![contest(Platform::Codeforces, "1"), contest(Platform::Codeforces, "2")]),
            )
            .await;
        receiver.on_finish(Platform::Codeforces).await;

        receiver.on_start_loading(Platform::Dmoj).await;
        receiver.on_result(Platform::Dmoj, LoaderType::DmojApi, Err(failure)).await;
        receiver.on_finish(Platform::Dmoj).await;

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.platforms_started, 2);
        assert_eq!(snapshot.platforms_finished, 2);
        assert_eq!(snapshot.platforms_exhausted, 1);
        assert_eq!(snapshot.attempts_succeeded, 1);
        assert_eq!(snapshot.attempts_failed, 2);
        assert_eq!(snapshot.contests_received, 2);

        assert!(snapshot.elapsed_ms < 60_000);

        // everything was forwarded
        assert_eq!(recorder.events().len(), 7);
        assert_eq!(recorder.events().last(), Some(&Event::Finish(Platform::Dmoj)));
    }

    #[test]
    fn test_elapsed_millis_saturate() {
        assert_eq!(saturating_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(saturating_millis(Duration::MAX), u64::MAX);
    }
}
