//! Time-to-live map with a background expiry sweep.
//!
//! Every entry is stamped with its insertion time on tokio's clock. Once an
//! entry's age reaches the TTL it is invisible to [`TtlCache::get`] and
//! [`TtlCache::remove`]; the sweep is the only path that removes it, and the
//! only path that fires its expiry callback. That split is what lets a caller
//! treat "remove returned `None`" as "the sweep owns this entry now".

use std::fmt;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, warn};

use boxoffice_core::error::{AppError, ErrorKind};
use boxoffice_core::result::AppResult;

/// Callback invoked with an entry's value when the sweep expires it.
///
/// Callbacks run while the sweep lock is held, so they must be short and
/// must never call back into the cache that invokes them.
pub type ExpiryCallback<V> = Box<dyn FnOnce(V) -> AppResult<()> + Send + Sync>;

/// A stored value plus its bookkeeping.
struct Entry<V> {
    /// The cached value.
    value: V,
    /// When the entry was inserted (or last overwritten).
    inserted_at: Instant,
    /// Fired once if the entry is removed by expiration.
    on_expire: Option<ExpiryCallback<V>>,
}

/// State shared between the cache handle and its sweep task.
struct Inner<K, V> {
    /// Fixed lifetime of every entry.
    ttl: Duration,
    /// Per-shard locked store; explicit operations only touch one shard.
    store: DashMap<K, Entry<V>>,
    /// Serializes sweeps. Held across callback invocation.
    sweep_lock: Mutex<()>,
}

impl<K, V> Inner<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn is_expired(&self, entry: &Entry<V>, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) >= self.ttl
    }

    fn purge_expired(&self) -> usize {
        let _sweep = self.sweep_lock.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();

        let candidates: Vec<K> = self
            .store
            .iter()
            .filter(|entry| self.is_expired(entry.value(), now))
            .map(|entry| entry.key().clone())
            .collect();

        let mut swept = 0usize;
        for key in candidates {
            // Re-check under the shard lock: the entry may have been
            // overwritten since the scan.
            let Some((key, entry)) = self
                .store
                .remove_if(&key, |_, entry| self.is_expired(entry, now))
            else {
                continue;
            };
            swept += 1;

            if let Some(callback) = entry.on_expire {
                fire(&key, callback, entry.value);
            }
        }

        if swept > 0 {
            debug!(swept, remaining = self.store.len(), "Expired cache entries swept");
        }
        swept
    }
}

/// Run one expiry callback, isolating its failure from the rest of the batch.
fn fire<K: fmt::Debug, V>(key: &K, callback: ExpiryCallback<V>, value: V) {
    match panic::catch_unwind(AssertUnwindSafe(move || callback(value))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(key = ?key, error = %e, "Expiry callback failed"),
        Err(_) => error!(key = ?key, "Expiry callback panicked"),
    }
}

async fn run_sweeper<K, V>(inner: Weak<Inner<K, V>>, every: Duration)
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(inner) = inner.upgrade() else {
            break;
        };
        inner.purge_expired();
    }
}

/// Concurrent key/value map whose entries expire a fixed TTL after insertion.
///
/// Reads never extend an entry's lifetime. A background task spawned on the
/// current tokio runtime sweeps expired entries every `sweep_interval`; it
/// stops when the cache is dropped.
pub struct TtlCache<K, V> {
    /// Store shared with the sweep task.
    inner: Arc<Inner<K, V>>,
    /// Handle of the sweep task, aborted on drop.
    sweeper: JoinHandle<()>,
}

impl<K: Eq + Hash, V> fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.inner.ttl)
            .field("entries", &self.inner.store.len())
            .finish()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache and start its sweep task.
    ///
    /// Fails with a configuration error if `ttl` or `sweep_interval` is
    /// zero, or if no tokio runtime is available to host the sweep.
    pub fn new(ttl: Duration, sweep_interval: Duration) -> AppResult<Self> {
        if ttl.is_zero() {
            return Err(AppError::configuration("Cache TTL must be positive"));
        }
        if sweep_interval.is_zero() {
            return Err(AppError::configuration(
                "Cache sweep interval must be positive",
            ));
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                "TtlCache must be created inside a tokio runtime",
                e,
            )
        })?;

        let inner = Arc::new(Inner {
            ttl,
            store: DashMap::new(),
            sweep_lock: Mutex::new(()),
        });
        let sweeper = runtime.spawn(run_sweeper(Arc::downgrade(&inner), sweep_interval));

        Ok(Self { inner, sweeper })
    }

    /// The fixed lifetime of every entry.
    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Insert or overwrite an entry with no expiry callback.
    pub fn put(&self, key: K, value: V) {
        self.insert(key, value, None);
    }

    /// Insert or overwrite an entry whose expiration fires `on_expire`.
    ///
    /// Overwriting discards the previous entry, including its callback,
    /// without firing it.
    pub fn put_with_callback<F>(&self, key: K, value: V, on_expire: F)
    where
        F: FnOnce(V) -> AppResult<()> + Send + Sync + 'static,
    {
        self.insert(key, value, Some(Box::new(on_expire)));
    }

    fn insert(&self, key: K, value: V, on_expire: Option<ExpiryCallback<V>>) {
        self.inner.store.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
                on_expire,
            },
        );
    }

    /// Look up a live entry. Expired entries read as absent.
    pub fn get(&self, key: &K) -> Option<V> {
        let entry = self.inner.store.get(key)?;
        if self.inner.is_expired(entry.value(), Instant::now()) {
            return None;
        }
        Some(entry.value().value.clone())
    }

    /// Returns `true` if a live entry exists for `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Remove a live entry without firing its callback.
    ///
    /// An entry that has already expired is left for the sweep (so its
    /// callback still fires) and `None` is returned.
    pub fn remove(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        self.inner
            .store
            .remove_if(key, |_, entry| !self.inner.is_expired(entry, now))
            .map(|(_, entry)| entry.value)
    }

    /// Number of stored entries, including expired ones awaiting the sweep.
    pub fn len(&self) -> usize {
        self.inner.store.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.inner.store.is_empty()
    }

    /// Run one sweep now and return the number of entries it expired.
    pub fn purge_expired(&self) -> usize {
        self.inner.purge_expired()
    }
}

impl<K, V> Drop for TtlCache<K, V> {
    fn drop(&mut self) {
        self.sweeper.abort();
    }
}
