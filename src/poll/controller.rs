//! Polling Controller
//!
//! One ticker task per page. States:
//!
//! ```text
//! Idle ──mount()──► Active ──unmount()──► Idle
//!                     │
//!                     └─ fetch now, then every interval
//! ```
//!
//! Every fetch draws a generation number when it starts; only a result newer
//! than the last published one reaches subscribers. Unmount bumps an epoch
//! so fetches still in flight publish nothing.

use crate::fetch::{Fetched, ResourceFetcher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Active,
}

type Slot<T> = Option<Fetched<T>>;

/// Shortest accepted polling period; `tokio::time::interval` panics on zero
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

struct Shared<F: ResourceFetcher> {
    fetcher: F,
    tx: watch::Sender<Slot<F::Output>>,
    next_generation: AtomicU64,
    /// Bumped on every unmount; fetches started under an older epoch are dropped
    epoch: AtomicU64,
    last_published: Mutex<u64>,
}

impl<F: ResourceFetcher> Shared<F> {
    async fn run_once(&self) -> Fetched<F::Output> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let started = Instant::now();

        let fetched = self.fetcher.load().await;

        tracing::debug!(
            fetcher = self.fetcher.name(),
            generation,
            source = %fetched.source,
            duration_ms = started.elapsed().as_millis() as u64,
            "Fetch complete"
        );
        self.publish(epoch, generation, &fetched);
        fetched
    }

    fn publish(&self, epoch: u64, generation: u64, fetched: &Fetched<F::Output>) -> bool {
        let mut last = self.last_published.lock().unwrap_or_else(|e| e.into_inner());
        if self.epoch.load(Ordering::SeqCst) != epoch {
            tracing::debug!(fetcher = self.fetcher.name(), generation, "Dropping result after unmount");
            return false;
        }
        if generation <= *last {
            tracing::debug!(
                fetcher = self.fetcher.name(),
                generation,
                published = *last,
                "Dropping superseded result"
            );
            return false;
        }
        *last = generation;
        self.tx.send_replace(Some(fetched.clone()));
        true
    }
}

/// Periodically reloads one page while mounted
pub struct PollingController<F: ResourceFetcher + 'static> {
    shared: Arc<Shared<F>>,
    interval: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<F: ResourceFetcher + 'static> PollingController<F> {
    /// Intervals shorter than [`MIN_INTERVAL`] are raised to it
    pub fn new(fetcher: F, interval: Duration) -> Self {
        let interval = if interval < MIN_INTERVAL {
            tracing::warn!(
                fetcher = fetcher.name(),
                requested_ms = interval.as_millis() as u64,
                "Polling interval too short, using {}s",
                MIN_INTERVAL.as_secs()
            );
            MIN_INTERVAL
        } else {
            interval
        };
        let (tx, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                fetcher,
                tx,
                next_generation: AtomicU64::new(0),
                epoch: AtomicU64::new(0),
                last_published: Mutex::new(0),
            }),
            interval,
            task: Mutex::new(None),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.shared.fetcher
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> PollState {
        let task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        match task.as_ref() {
            Some(handle) if !handle.is_finished() => PollState::Active,
            _ => PollState::Idle,
        }
    }

    /// Fetch now and then every `interval`. Returns false if already mounted.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(&self) -> bool {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if matches!(task.as_ref(), Some(handle) if !handle.is_finished()) {
            return false;
        }

        let shared = Arc::clone(&self.shared);
        let period = self.interval;
        tracing::info!(
            fetcher = shared.fetcher.name(),
            interval_secs = period.as_secs(),
            "Polling started"
        );

        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // The first tick completes immediately
                ticker.tick().await;
                shared.run_once().await;
            }
        }));
        true
    }

    /// Stop the ticker. Results of fetches still in flight are discarded.
    pub fn unmount(&self) {
        let handle = self.task.lock().unwrap_or_else(|e| e.into_inner()).take();
        {
            let _guard = self
                .shared
                .last_published
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(handle) = handle {
            handle.abort();
            tracing::info!(fetcher = self.shared.fetcher.name(), "Polling stopped");
        }
    }

    /// Out-of-band reload; the ticker schedule is left alone
    pub async fn refresh(&self) -> Fetched<F::Output> {
        self.shared.run_once().await
    }

    pub fn subscribe(&self) -> watch::Receiver<Slot<F::Output>> {
        self.shared.tx.subscribe()
    }

    pub fn latest(&self) -> Slot<F::Output> {
        self.shared.tx.borrow().clone()
    }
}

impl<F: ResourceFetcher + 'static> Drop for PollingController<F> {
    fn drop(&mut self) {
        if let Some(handle) = self
            .task
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            handle.abort();
        }
    }
}
