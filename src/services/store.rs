//! Process-wide bundle state with a subscriber-scoped refresh timer.
//!
//! The timer starts with the first [`Subscription`] and is aborted when the
//! last one is dropped. Stale bundles keep being served while a refresh runs.

use crate::services::provider::{DataProvider, ProvidedBundle};
use crate::sources::RedisBundleCache;
use crate::types::{BundleOrigin, IndicatorBundle};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, Mutex as AsyncMutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// A bundle as held by the store.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub bundle: Arc<IndicatorBundle>,
    pub origin: BundleOrigin,
    pub fetched_at: DateTime<Utc>,
    received: Instant,
}

impl Snapshot {
    fn new(provided: ProvidedBundle) -> Self {
        Self {
            bundle: Arc::new(provided.bundle),
            origin: provided.origin,
            fetched_at: Utc::now(),
            received: Instant::now(),
        }
    }

    /// Time since the bundle was fetched.
    pub fn age(&self) -> Duration {
        self.received.elapsed()
    }
}

#[derive(Default)]
struct State {
    snapshot: Option<Snapshot>,
    applied_seq: u64,
}

#[derive(Default)]
struct Timer {
    subscribers: usize,
    task: Option<JoinHandle<()>>,
}

/// Decrements the in-flight counter even if the fetch is cancelled.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Holds the latest bundle and drives periodic refreshes.
pub struct BundleStore {
    provider: DataProvider,
    write_through: Option<RedisBundleCache>,
    refresh_interval: Duration,
    stale_after: Duration,
    state: RwLock<State>,
    next_seq: AtomicU64,
    /// Sequence of the last bundle sent to Redis. Held across the write so
    /// writes land in sequence order.
    written_seq: AsyncMutex<u64>,
    in_flight: AtomicUsize,
    revalidating: AtomicBool,
    timer: Mutex<Timer>,
    tx: broadcast::Sender<Snapshot>,
}

impl BundleStore {
    pub fn new(provider: DataProvider, refresh_interval: Duration, stale_after: Duration) -> Arc<Self> {
        Self::build(provider, None, refresh_interval, stale_after)
    }

    /// Store that also writes live bundles to Redis.
    pub fn with_write_through(
        provider: DataProvider,
        cache: RedisBundleCache,
        refresh_interval: Duration,
        stale_after: Duration,
    ) -> Arc<Self> {
        Self::build(provider, Some(cache), refresh_interval, stale_after)
    }

    fn build(
        provider: DataProvider,
        write_through: Option<RedisBundleCache>,
        refresh_interval: Duration,
        stale_after: Duration,
    ) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(16);
        Arc::new(Self {
            provider,
            write_through,
            refresh_interval,
            stale_after,
            state: RwLock::new(State::default()),
            next_seq: AtomicU64::new(0),
            written_seq: AsyncMutex::new(0),
            in_flight: AtomicUsize::new(0),
            revalidating: AtomicBool::new(false),
            timer: Mutex::new(Timer::default()),
            tx,
        })
    }

    fn timer(&self) -> std::sync::MutexGuard<'_, Timer> {
        self.timer.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register interest in the bundle. The first subscriber starts the
    /// refresh timer. Must be called from within a Tokio runtime.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let mut timer = self.timer();
        timer.subscribers += 1;

        if timer.subscribers == 1 {
            info!(
                "Starting bundle refresh every {}s from {}",
                self.refresh_interval.as_secs(),
                self.provider.source_name()
            );
            timer.task = Some(tokio::spawn(refresh_loop(
                Arc::downgrade(self),
                self.refresh_interval,
            )));
        }

        Subscription {
            store: Arc::clone(self),
        }
    }

    fn unsubscribe(&self) {
        let mut timer = self.timer();
        timer.subscribers = timer.subscribers.saturating_sub(1);

        if timer.subscribers == 0 {
            if let Some(task) = timer.task.take() {
                info!("Last subscriber gone, stopping bundle refresh");
                task.abort();
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.timer().subscribers
    }

    /// Whether the refresh timer task is alive.
    pub fn is_refreshing_periodically(&self) -> bool {
        self.timer()
            .task
            .as_ref()
            .map(|t| !t.is_finished())
            .unwrap_or(false)
    }

    /// Fetch now and apply the result.
    ///
    /// A result is applied only if no newer fetch has already landed and the
    /// store still has subscribers. Returns the snapshot in effect afterwards.
    pub async fn refresh(&self) -> Option<Snapshot> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let provided = {
            let _guard = InFlight::start(&self.in_flight);
            self.provider.fetch().await
        };

        if self.subscriber_count() == 0 {
            debug!("Discarding bundle #{} fetched after teardown", seq);
            return None;
        }

        let snapshot = Snapshot::new(provided);
        {
            let mut state = self.state.write().await;
            if seq <= state.applied_seq {
                debug!(
                    "Discarding bundle #{}, #{} already applied",
                    seq, state.applied_seq
                );
                return state.snapshot.clone();
            }
            state.applied_seq = seq;
            state.snapshot = Some(snapshot.clone());
        }

        match &snapshot.origin {
            BundleOrigin::Live { source } => {
                info!("Applied live bundle #{} from {}", seq, source);
                self.write_through(seq, &snapshot.bundle).await;
            }
            BundleOrigin::Synthetic { .. } => {
                info!("Applied synthetic bundle #{}", seq);
            }
        }

        // No receivers is fine
        let _ = self.tx.send(snapshot.clone());

        Some(snapshot)
    }

    /// Write a live bundle to Redis unless a newer one already went out.
    /// Returns whether a write was attempted.
    async fn write_through(&self, seq: u64, bundle: &IndicatorBundle) -> bool {
        let Some(cache) = &self.write_through else {
            return false;
        };

        let mut written = self.written_seq.lock().await;
        if seq <= *written {
            debug!("Skipping Redis write for bundle #{}, #{} already written", seq, *written);
            return false;
        }
        *written = seq;

        if let Err(e) = cache.store_bundle(bundle).await {
            warn!("Failed to write bundle to Redis: {}", e);
        }
        true
    }

    /// Latest snapshot, if any.
    pub async fn current(&self) -> Option<Snapshot> {
        self.state.read().await.snapshot.clone()
    }

    /// Any fetch in progress.
    pub fn is_fetching(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// First fetch in progress with nothing to show yet.
    pub async fn is_loading(&self) -> bool {
        self.is_fetching() && self.state.read().await.snapshot.is_none()
    }

    /// True when there is no snapshot or it is older than the stale window.
    pub async fn is_stale(&self) -> bool {
        match &self.state.read().await.snapshot {
            Some(snapshot) => snapshot.age() > self.stale_after,
            None => true,
        }
    }

    /// Current snapshot; kicks off a background refresh when it is stale.
    pub async fn get_or_revalidate(self: &Arc<Self>) -> Option<Snapshot> {
        let current = self.current().await;

        let stale = current
            .as_ref()
            .map(|s| s.age() > self.stale_after)
            .unwrap_or(true);

        if stale
            && !self.is_fetching()
            && self.subscriber_count() > 0
            && self
                .revalidating
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
        {
            debug!("Bundle is stale, revalidating in background");
            let store = Arc::clone(self);
            tokio::spawn(async move {
                store.refresh().await;
                store.revalidating.store(false, Ordering::SeqCst);
            });
        }

        current
    }

    /// Receive every applied snapshot.
    pub fn updates(&self) -> broadcast::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    pub fn source_name(&self) -> &'static str {
        self.provider.source_name()
    }
}

async fn refresh_loop(store: Weak<BundleStore>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        let Some(store) = store.upgrade() else {
            break;
        };
        store.refresh().await;
    }
}

/// Keeps the refresh timer running while held.
pub struct Subscription {
    store: Arc<BundleStore>,
}

impl Subscription {
    pub fn store(&self) -> &Arc<BundleStore> {
        &self.store
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.store.unsubscribe();
    }
}
