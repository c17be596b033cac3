//! Synchronization Cache.
//!
//! One [`CacheEntry`] per [`QueryKey`], observable through a [`Subscription`]. The cache
//! de-duplicates in-flight requests, refreshes observed entries on a per-key timer, keeps the
//! previous data visible while refreshing or after a failure, and discards responses that
//! complete after a newer response for the same key was already applied.
//!
//! The key map sits behind a single [`parking_lot::Mutex`]; every read-modify-write of an
//! entry happens under that lock. Fetches run as spawned tokio tasks and re-acquire the lock
//! only to apply their result.

use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Weak},
};

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::{debug, warn};

use crate::{
    error::FetchError,
    query::{QueryKey, QueryPolicy},
};

/// Lifecycle of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryStatus {
    /// Created but never fetched (disabled on creation).
    Idle,
    /// First fetch outstanding and no data yet.
    Loading,
    Success,
    Error,
}

/// Observable state of one query.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub data: Option<T>,
    pub status: QueryStatus,
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub error: Option<FetchError>,
    /// A fetch for this key is outstanding (initial load or background refresh).
    pub is_fetching: bool,
}

impl<T> CacheEntry<T> {
    fn idle() -> Self {
        Self {
            data: None,
            status: QueryStatus::Idle,
            last_fetched_at: None,
            error: None,
            is_fetching: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }
}

/// Produces one fetch future per invocation.
pub type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, FetchError>> + Send + Sync>;

/// Wrap an async closure as a [`Fetcher`].
pub fn fetcher_fn<T, F, Fut>(fetch: F) -> Fetcher<T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
{
    Arc::new(move || Box::pin(fetch()))
}

struct Slot<T> {
    tx: watch::Sender<CacheEntry<T>>,
    fetcher: Fetcher<T>,
    policy: QueryPolicy,
    observers: usize,
    issued_seq: u64,
    applied_seq: u64,
    in_flight: usize,
    fetched_at: Option<Instant>,
    timer: Option<JoinHandle<()>>,
}

impl<T> Slot<T> {
    fn new(fetcher: Fetcher<T>, policy: QueryPolicy) -> Self {
        let (tx, _) = watch::channel(CacheEntry::idle());
        Self {
            tx,
            fetcher,
            policy,
            observers: 0,
            issued_seq: 0,
            applied_seq: 0,
            in_flight: 0,
            fetched_at: None,
            timer: None,
        }
    }

    fn is_stale(&self, now: Instant) -> bool {
        match self.fetched_at {
            None => true,
            Some(at) => self
                .policy
                .refresh_interval
                .is_some_and(|interval| now.duration_since(at) >= interval),
        }
    }

    fn should_poll(&self) -> bool {
        self.policy.is_polling() && self.observers > 0
    }

    fn is_armed(&self) -> bool {
        self.timer.as_ref().is_some_and(|timer| !timer.is_finished())
    }

    fn disarm(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

struct Inner<T> {
    name: &'static str,
    slots: Mutex<HashMap<QueryKey, Slot<T>>>,
}

impl<T> Inner<T> {
    fn release(&self, key: &QueryKey) {
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.get_mut(key) {
            slot.observers = slot.observers.saturating_sub(1);
            if slot.observers == 0 {
                slot.disarm();
            }
        }
    }
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        for slot in self.slots.get_mut().values_mut() {
            slot.disarm();
        }
    }
}

impl<T> Inner<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start a fetch for `key`. Must be called with the slot lock held.
    fn issue(self: &Arc<Self>, key: &QueryKey, slot: &mut Slot<T>) -> u64 {
        slot.issued_seq += 1;
        slot.in_flight += 1;
        let seq = slot.issued_seq;

        slot.tx.send_modify(|entry| {
            entry.is_fetching = true;
            if entry.data.is_none() && entry.status != QueryStatus::Error {
                entry.status = QueryStatus::Loading;
            }
        });

        debug!(cache = self.name, %key, seq, "fetch issued");

        let fetcher = Arc::clone(&slot.fetcher);
        let cache = Arc::downgrade(self);
        let key = key.clone();
        tokio::spawn(async move {
            let result = fetcher().await;
            if let Some(inner) = cache.upgrade() {
                inner.complete(&key, seq, result);
            }
        });

        seq
    }

    fn complete(&self, key: &QueryKey, seq: u64, result: Result<T, FetchError>) {
        let mut slots = self.slots.lock();
        let Some(slot) = slots.get_mut(key) else {
            return;
        };

        slot.in_flight = slot.in_flight.saturating_sub(1);
        let still_fetching = slot.in_flight > 0;

        if seq < slot.applied_seq {
            debug!(
                cache = self.name,
                %key,
                seq,
                applied = slot.applied_seq,
                "stale response discarded"
            );
            slot.tx
                .send_modify(|entry| entry.is_fetching = still_fetching);
            return;
        }
        slot.applied_seq = seq;

        match result {
            Ok(data) => {
                debug!(cache = self.name, %key, seq, "fetch applied");
                slot.fetched_at = Some(Instant::now());
                slot.tx.send_modify(|entry| {
                    entry.data = Some(data);
                    entry.status = QueryStatus::Success;
                    entry.last_fetched_at = Some(Utc::now());
                    entry.error = None;
                    entry.is_fetching = still_fetching;
                });
            }
            Err(error) => {
                warn!(cache = self.name, %key, seq, %error, "fetch failed");
                slot.tx.send_modify(|entry| {
                    entry.status = QueryStatus::Error;
                    entry.error = Some(error);
                    entry.is_fetching = still_fetching;
                });
            }
        }
    }

    /// Spawn the refresh timer for `key` unless one is already running.
    fn arm(self: &Arc<Self>, key: &QueryKey, slot: &mut Slot<T>) {
        if slot.is_armed() {
            return;
        }
        let Some(period) = slot.policy.refresh_interval else {
            return;
        };

        debug!(cache = self.name, %key, ?period, "refresh timer armed");

        let cache = Arc::downgrade(self);
        let key = key.clone();
        slot.timer = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = cache.upgrade() else {
                    break;
                };
                if !inner.refresh_due(&key) {
                    break;
                }
            }
        }));
    }

    /// Timer callback. Returns `false` when the timer should stop re-arming.
    fn refresh_due(self: &Arc<Self>, key: &QueryKey) -> bool {
        let mut slots = self.slots.lock();
        let Some(slot) = slots.get_mut(key) else {
            return false;
        };

        if !slot.should_poll() {
            debug!(cache = self.name, %key, "refresh timer stopped");
            slot.timer = None;
            return false;
        }

        if slot.in_flight == 0 {
            self.issue(key, slot);
        } else {
            debug!(cache = self.name, %key, "refresh skipped, fetch in flight");
        }
        true
    }
}

/// Per-key query cache for one resource type.
pub struct QueryCache<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for QueryCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("name", &self.inner.name)
            .field("entries", &self.inner.slots.lock().len())
            .finish()
    }
}

impl<T> QueryCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an empty cache. `name` only labels log output.
    pub fn new(name: &'static str) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                slots: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Subscribe to `key`, creating its entry on first use.
    ///
    /// A fetch is issued only when the entry is enabled, has nothing in flight, and is stale
    /// (never fetched, or older than its refresh interval). Concurrent subscribers therefore
    /// share a single request. The latest `fetcher` and `policy` replace earlier ones.
    pub fn get_or_fetch(
        &self,
        key: QueryKey,
        fetcher: Fetcher<T>,
        policy: QueryPolicy,
    ) -> Subscription<T> {
        let mut slots = self.inner.slots.lock();
        let slot = slots
            .entry(key.clone())
            .or_insert_with(|| Slot::new(Arc::clone(&fetcher), policy));

        slot.fetcher = fetcher;
        slot.policy = policy;
        slot.observers += 1;
        let rx = slot.tx.subscribe();

        if policy.enabled && slot.in_flight == 0 && slot.is_stale(Instant::now()) {
            self.inner.issue(&key, slot);
        }

        if slot.should_poll() {
            self.inner.arm(&key, slot);
        } else {
            slot.disarm();
        }
        drop(slots);

        Subscription {
            key,
            rx,
            cache: Arc::downgrade(&self.inner),
        }
    }

    /// Enable or disable fetching for `key`.
    ///
    /// Disabling stops the refresh timer but lets an in-flight fetch complete and apply.
    /// Enabling resumes the timer and, if the entry is observed and stale, refetches at once
    /// in the background.
    pub fn set_enabled(&self, key: &QueryKey, enabled: bool) {
        let mut slots = self.inner.slots.lock();
        let Some(slot) = slots.get_mut(key) else {
            return;
        };
        if slot.policy.enabled == enabled {
            return;
        }

        slot.policy.enabled = enabled;
        debug!(cache = self.inner.name, %key, enabled, "query gate changed");

        if !enabled {
            slot.disarm();
            return;
        }

        if slot.observers > 0 && slot.in_flight == 0 && slot.is_stale(Instant::now()) {
            self.inner.issue(key, slot);
        }
        if slot.should_poll() {
            self.inner.arm(key, slot);
        }
    }

    /// Force a new fetch for an enabled key, even while another is in flight.
    ///
    /// Returns the sequence number of the new fetch.
    pub fn refetch(&self, key: &QueryKey) -> Option<u64> {
        let mut slots = self.inner.slots.lock();
        let slot = slots.get_mut(key)?;
        if !slot.policy.enabled {
            return None;
        }
        Some(self.inner.issue(key, slot))
    }

    /// Current entry for `key` without subscribing.
    pub fn entry(&self, key: &QueryKey) -> Option<CacheEntry<T>> {
        self.inner
            .slots
            .lock()
            .get(key)
            .map(|slot| slot.tx.borrow().clone())
    }

    pub fn observers(&self, key: &QueryKey) -> usize {
        self.inner
            .slots
            .lock()
            .get(key)
            .map_or(0, |slot| slot.observers)
    }

    /// Whether a refresh timer is currently running for `key`.
    pub fn is_scheduled(&self, key: &QueryKey) -> bool {
        self.inner
            .slots
            .lock()
            .get(key)
            .is_some_and(|slot| slot.is_armed())
    }

    pub fn len(&self) -> usize {
        self.inner.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Observer handle onto one cache entry.
///
/// Dropping the last subscription of a key stops its refresh timer; the entry stays cached.
pub struct Subscription<T> {
    key: QueryKey,
    rx: watch::Receiver<CacheEntry<T>>,
    cache: Weak<Inner<T>>,
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .finish()
    }
}

impl<T: Clone> Subscription<T> {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Snapshot of the entry.
    pub fn current(&self) -> CacheEntry<T> {
        self.rx.borrow().clone()
    }

    /// Wait until the entry satisfies `predicate`. `None` once the cache is gone.
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&CacheEntry<T>) -> bool,
    ) -> Option<CacheEntry<T>> {
        self.rx.wait_for(predicate).await.ok().map(|entry| entry.clone())
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.cache.upgrade() {
            inner.release(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        collections::VecDeque,
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };
    use tokio::sync::oneshot;

    const INTERVAL: Duration = Duration::from_secs(10);

    fn key() -> QueryKey {
        QueryKey::stocks(1, 10, "")
    }

    /// Fetcher answering from a script, counting invocations. Falls back to `Ok(0)`.
    fn scripted(
        calls: Arc<AtomicUsize>,
        script: Vec<Result<u32, FetchError>>,
    ) -> Fetcher<u32> {
        let script = Arc::new(Mutex::new(VecDeque::from(script)));
        fetcher_fn(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            let next = script.lock().pop_front().unwrap_or(Ok(0));
            async move { next }
        })
    }

    /// Fetcher whose n-th call resolves when the n-th sender fires.
    fn gated(count: usize) -> (Fetcher<u32>, Vec<oneshot::Sender<Result<u32, FetchError>>>) {
        let (senders, receivers): (Vec<_>, VecDeque<_>) =
            (0..count).map(|_| oneshot::channel()).unzip();
        let receivers = Arc::new(Mutex::new(receivers));
        let fetcher = fetcher_fn(move || {
            let rx = receivers.lock().pop_front();
            async move {
                match rx {
                    Some(rx) => rx
                        .await
                        .unwrap_or_else(|_| Err(FetchError::Network("cancelled".to_string()))),
                    None => Err(FetchError::Network("unscripted call".to_string())),
                }
            }
        });
        (fetcher, senders)
    }

    /// Let every runnable task finish under the paused clock.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_fetch_loading_then_success() {
        let cache = QueryCache::new("test");
        let (fetcher, mut senders) = gated(1);

        let mut sub = cache.get_or_fetch(key(), fetcher, QueryPolicy::default());

        let entry = sub.current();
        assert_eq!(entry.status, QueryStatus::Loading);
        assert!(entry.is_fetching);
        assert_eq!(entry.data, None);

        senders.remove(0).send(Ok(7)).unwrap();
        let entry = sub.wait_for(|entry| entry.status == QueryStatus::Success).await.unwrap();

        assert_eq!(entry.data, Some(7));
        assert!(entry.last_fetched_at.is_some());
        assert!(entry.error.is_none());
        assert!(!entry.is_fetching);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_subscribers_share_one_fetch() {
        let cache = QueryCache::new("test");
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache.get_or_fetch(key(), scripted(calls.clone(), vec![Ok(1)]), QueryPolicy::default());
        let mut second = cache.get_or_fetch(key(), scripted(calls.clone(), vec![Ok(2)]), QueryPolicy::default());

        let entry = second.wait_for(|entry| entry.has_data()).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(entry.data, Some(1));
        assert_eq!(first.current().data, Some(1));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.observers(&key()), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let cache = QueryCache::new("test");
        let (fetcher, mut senders) = gated(2);

        // Fetch A
        let mut sub = cache.get_or_fetch(key(), fetcher, QueryPolicy::default());
        // Fetch B, issued before A resolves
        assert_eq!(cache.refetch(&key()), Some(2));

        let send_a = senders.remove(0);
        let send_b = senders.remove(0);

        send_b.send(Ok(200)).unwrap();
        let entry = sub.wait_for(|entry| entry.data == Some(200)).await.unwrap();
        assert!(entry.is_fetching, "A is still outstanding");

        send_a.send(Ok(100)).unwrap();
        settle().await;

        let entry = sub.current();
        assert_eq!(entry.data, Some(200));
        assert_eq!(entry.status, QueryStatus::Success);
        assert!(!entry.is_fetching);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_error_does_not_override_newer_success() {
        let cache = QueryCache::new("test");
        let (fetcher, mut senders) = gated(2);

        let mut sub = cache.get_or_fetch(key(), fetcher, QueryPolicy::default());
        cache.refetch(&key());

        let send_a = senders.remove(0);
        senders.remove(0).send(Ok(5)).unwrap();
        sub.wait_for(|entry| entry.has_data()).await.unwrap();

        send_a
            .send(Err(FetchError::server(500, "late failure")))
            .unwrap();
        settle().await;

        assert_eq!(sub.current().status, QueryStatus::Success);
        assert!(sub.current().error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_retains_data() {
        let cache = QueryCache::new("test");
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = scripted(
            calls.clone(),
            vec![Ok(42), Err(FetchError::Network("connection reset".to_string()))],
        );

        let mut sub = cache.get_or_fetch(key(), fetcher, QueryPolicy::polling(INTERVAL));
        sub.wait_for(|entry| entry.status == QueryStatus::Success).await.unwrap();

        tokio::time::sleep(INTERVAL).await;
        let entry = sub.wait_for(|entry| entry.is_error()).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(entry.data, Some(42));
        assert_eq!(
            entry.error,
            Some(FetchError::Network("connection reset".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_refresh_keeps_data_visible() {
        let cache = QueryCache::new("test");
        let (fetcher, mut senders) = gated(2);

        let mut sub = cache.get_or_fetch(key(), fetcher, QueryPolicy::default());
        senders.remove(0).send(Ok(1)).unwrap();
        sub.wait_for(|entry| entry.has_data()).await.unwrap();

        cache.refetch(&key());
        let entry = sub.current();
        assert_eq!(entry.status, QueryStatus::Success);
        assert_eq!(entry.data, Some(1));
        assert!(entry.is_fetching);

        senders.remove(0).send(Ok(2)).unwrap();
        let entry = sub.wait_for(|entry| entry.data == Some(2)).await.unwrap();
        assert!(!entry.is_fetching);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_interval_refetches() {
        let cache = QueryCache::new("test");
        let calls = Arc::new(AtomicUsize::new(0));

        let _sub = cache.get_or_fetch(key(), scripted(calls.clone(), vec![]), QueryPolicy::polling(INTERVAL));
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_scheduled(&key()));

        tokio::time::sleep(INTERVAL).await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        tokio::time::sleep(INTERVAL * 3).await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_key_is_not_refreshed_until_enabled() {
        let cache = QueryCache::new("test");
        let calls = Arc::new(AtomicUsize::new(0));

        let sub = cache.get_or_fetch(key(), scripted(calls.clone(), vec![Ok(9)]), QueryPolicy::polling(INTERVAL));
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.set_enabled(&key(), false);
        assert!(!cache.is_scheduled(&key()));

        tokio::time::sleep(INTERVAL * 4).await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Stale on return: data stays visible while a background refetch runs
        cache.set_enabled(&key(), true);
        let entry = sub.current();
        assert_eq!(entry.status, QueryStatus::Success);
        assert_eq!(entry.data, Some(9));
        assert!(entry.is_fetching);
        assert!(cache.is_scheduled(&key()));

        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_fetch_applies_after_disable() {
        let cache = QueryCache::new("test");
        let (fetcher, mut senders) = gated(1);

        let mut sub = cache.get_or_fetch(key(), fetcher, QueryPolicy::polling(INTERVAL));
        cache.set_enabled(&key(), false);

        senders.remove(0).send(Ok(3)).unwrap();
        let entry = sub.wait_for(|entry| entry.has_data()).await.unwrap();
        assert_eq!(entry.data, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_on_creation_stays_idle() {
        let cache = QueryCache::new("test");
        let calls = Arc::new(AtomicUsize::new(0));

        let sub = cache.get_or_fetch(
            key(),
            scripted(calls.clone(), vec![]),
            QueryPolicy::polling(INTERVAL).with_enabled(false),
        );
        tokio::time::sleep(INTERVAL * 2).await;

        assert_eq!(sub.current().status, QueryStatus::Idle);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(cache.refetch(&key()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_observer_drop_stops_timer_and_keeps_entry() {
        let cache = QueryCache::new("test");
        let calls = Arc::new(AtomicUsize::new(0));

        let sub = cache.get_or_fetch(key(), scripted(calls.clone(), vec![Ok(4)]), QueryPolicy::polling(INTERVAL));
        settle().await;
        drop(sub);

        assert_eq!(cache.observers(&key()), 0);
        assert!(!cache.is_scheduled(&key()));

        tokio::time::sleep(INTERVAL * 3).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.entry(&key()).unwrap().data, Some(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_entry_is_reused_without_refetch() {
        let cache = QueryCache::new("test");
        let calls = Arc::new(AtomicUsize::new(0));

        let sub = cache.get_or_fetch(key(), scripted(calls.clone(), vec![Ok(1)]), QueryPolicy::polling(INTERVAL));
        settle().await;
        drop(sub);

        // Returning within the interval shows cached data and does not fetch
        tokio::time::sleep(INTERVAL / 2).await;
        let sub = cache.get_or_fetch(key(), scripted(calls.clone(), vec![]), QueryPolicy::polling(INTERVAL));
        assert_eq!(sub.current().data, Some(1));
        assert!(!sub.current().is_fetching);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Returning after the interval shows cached data while refetching
        drop(sub);
        tokio::time::sleep(INTERVAL).await;
        let sub = cache.get_or_fetch(key(), scripted(calls.clone(), vec![Ok(2)]), QueryPolicy::polling(INTERVAL));
        assert_eq!(sub.current().data, Some(1));
        assert!(sub.current().is_fetching);
        settle().await;
        assert_eq!(sub.current().data, Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
