use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use metrics::counter;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval;

/// Snapshot of one polled resource as seen by subscribers.
///
/// `data` and `error` can coexist: a failed refresh keeps the last good
/// value and surfaces the error beside it (stale-while-error).
#[derive(Debug)]
pub struct PollState<T> {
    pub data: Option<Arc<T>>,
    pub error: Option<String>,
    pub is_fetching: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl<T> Clone for PollState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            is_fetching: self.is_fetching,
            last_updated: self.last_updated,
        }
    }
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_fetching: false,
            last_updated: None,
        }
    }
}

impl<T> PollState<T> {
    /// True before the first result of any kind has arrived.
    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.error.is_none()
    }
}

/// Scheduling parameters, set by tier policy.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Age after which a `read()` triggers a background refetch.
    pub stale_time: Duration,
    /// Proactive refetch period, independent of reads.
    pub refetch_interval: Duration,
}

struct FetchGuard {
    in_flight: bool,
    /// Last-issued request token. A completion whose token no longer
    /// matches has been superseded and must not touch the cache.
    generation: u64,
}

type Fetcher<T> = dyn Fn() -> BoxFuture<'static, Result<T, String>> + Send + Sync;

struct Inner<T> {
    key: String,
    cfg: PollConfig,
    tx: watch::Sender<PollState<T>>,
    guard: Mutex<FetchGuard>,
    fetcher: Box<Fetcher<T>>,
}

impl<T: Send + Sync + 'static> Inner<T> {
    /// Run one fetch cycle. `force` bypasses the stale_time gate (interval
    /// ticks and manual refreshes); the at-most-one-in-flight rule always
    /// holds. The check-and-set happens under a single lock acquisition with
    /// no await point in between.
    async fn run_fetch(&self, force: bool) {
        let generation = {
            let mut guard = self.guard.lock().expect("poller guard poisoned");
            if guard.in_flight {
                return;
            }
            if !force && !self.is_stale() {
                return;
            }
            guard.in_flight = true;
            guard.generation += 1;
            guard.generation
        };

        self.tx.send_modify(|s| s.is_fetching = true);
        counter!("cache_refetch_total").increment(1);

        let result = (self.fetcher)().await;

        let superseded = {
            let mut guard = self.guard.lock().expect("poller guard poisoned");
            let stale = guard.generation != generation;
            if !stale {
                guard.in_flight = false;
            }
            stale
        };

        if superseded {
            counter!("stale_responses_dropped_total").increment(1);
            tracing::debug!(key = %self.key, generation, "Dropped superseded poll response");
            // Only the owning request clears the fetching flag; if nothing
            // newer is in flight, clear it here so reads can trigger again.
            let idle = !self.guard.lock().expect("poller guard poisoned").in_flight;
            if idle {
                self.tx.send_modify(|s| s.is_fetching = false);
            }
            return;
        }

        match result {
            Ok(value) => {
                self.tx.send_modify(|s| {
                    s.data = Some(Arc::new(value));
                    s.error = None;
                    s.is_fetching = false;
                    s.last_updated = Some(Utc::now());
                });
            }
            Err(e) => {
                counter!("feed_errors_total").increment(1);
                tracing::warn!(key = %self.key, error = %e, "Poll fetch failed; keeping stale data");
                self.tx.send_modify(|s| {
                    s.error = Some(e);
                    s.is_fetching = false;
                });
            }
        }
    }

    fn is_stale(&self) -> bool {
        let state = self.tx.borrow();
        match state.last_updated {
            None => true,
            Some(at) => {
                let age = Utc::now().signed_duration_since(at);
                age.to_std().map(|a| a >= self.cfg.stale_time).unwrap_or(true)
            }
        }
    }
}

/// A periodically-refreshed cache entry for one request key.
///
/// Owns the background interval task; dropping the poller aborts it, so a
/// torn-down consumer leaves no orphaned timer behind.
pub struct Poller<T> {
    inner: Arc<Inner<T>>,
    ticker: JoinHandle<()>,
}

impl<T: Send + Sync + 'static> Poller<T> {
    pub fn spawn<F, Fut, E>(key: impl Into<String>, cfg: PollConfig, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: std::fmt::Display,
    {
        let fetcher: Box<Fetcher<T>> =
            Box::new(move || fetch().map(|r| r.map_err(|e| e.to_string())).boxed());

        let (tx, _) = watch::channel(PollState::default());
        let inner = Arc::new(Inner {
            key: key.into(),
            cfg,
            tx,
            guard: Mutex::new(FetchGuard {
                in_flight: false,
                generation: 0,
            }),
            fetcher,
        });

        let tick_inner = Arc::clone(&inner);
        let ticker = tokio::spawn(async move {
            let mut ticker = interval(cfg.refetch_interval);
            loop {
                ticker.tick().await;
                tick_inner.run_fetch(true).await;
            }
        });

        Self { inner, ticker }
    }

    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Current snapshot; triggers a background refetch when the cached value
    /// has outlived `stale_time`. Never blocks on the network.
    pub fn read(&self) -> PollState<T> {
        let state = self.inner.tx.borrow().clone();
        if !state.is_fetching {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move { inner.run_fetch(false).await });
        }
        state
    }

    /// Explicit refresh: bypasses `stale_time`, still coalesces with any
    /// request already in flight.
    pub async fn refetch(&self) {
        self.inner.run_fetch(true).await;
    }

    /// Invalidate whatever is currently in flight. The pending response,
    /// if any, is discarded on arrival; the next tick or refetch starts a
    /// fresh request. Used when the inputs behind the key have changed.
    pub fn invalidate(&self) {
        let mut guard = self.inner.guard.lock().expect("poller guard poisoned");
        guard.generation += 1;
        guard.in_flight = false;
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState<T>> {
        self.inner.tx.subscribe()
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}
