//! Keyed read-cache with staleness windows, request de-duplication, and
//! mutation-driven invalidation.
//!
//! Entries hold a JSON snapshot of the last successful fetch. A query is
//! served from cache while its snapshot is fresh; otherwise the caller's
//! fetch runs and the snapshot is replaced. Concurrent callers for the same
//! key share one fetch; the losers wait on a watch channel instead of
//! issuing duplicates. A failed refetch leaves any stale snapshot in place.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;

use crate::error::{Error, Result};

/// Identifies one cached query: a scope plus an optional parameter.
/// Invalidation targets whole scopes (`urls` covers every search term).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    scope: &'static str,
    param: Option<String>,
}

impl QueryKey {
    /// Key for a parameterless query.
    #[must_use]
    pub fn of(scope: &'static str) -> Self {
        Self { scope, param: None }
    }

    /// Key for a parameterized query (search term, record id, page).
    #[must_use]
    pub fn with(scope: &'static str, param: impl ToString) -> Self {
        Self {
            scope,
            param: Some(param.to_string()),
        }
    }

    #[must_use]
    pub fn scope(&self) -> &str {
        self.scope
    }
}

/// Observable lifecycle of one cache slot:
/// `Idle → Fetching → {Fresh | Stale}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Never fetched.
    Idle,
    /// A fetch for this key is in flight.
    Fetching,
    /// Cached and inside its staleness window.
    Fresh,
    /// Cached but expired or invalidated; the next read refetches.
    Stale,
}

struct Entry {
    value: serde_json::Value,
    fetched_at: Instant,
    stale_after: Duration,
    invalidated: bool,
}

impl Entry {
    fn is_fresh(&self) -> bool {
        !self.invalidated && self.fetched_at.elapsed() < self.stale_after
    }
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<QueryKey, Entry>,
    in_flight: HashMap<QueryKey, watch::Receiver<()>>,
}

/// Shared query cache. Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct QueryCache {
    inner: Arc<Mutex<CacheInner>>,
}

enum Step {
    Hit(serde_json::Value),
    Wait(watch::Receiver<()>),
    Fetch(watch::Sender<()>),
}

/// Removes the in-flight marker even when the fetching future is dropped
/// mid-await, so waiters can take over instead of parking forever.
struct InFlightGuard {
    inner: Arc<Mutex<CacheInner>>,
    key: QueryKey,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.inner.lock().in_flight.remove(&self.key);
    }
}

impl QueryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `key` from cache while fresh, otherwise run `fetch` and store
    /// the result under `key` with the given staleness window.
    ///
    /// # Errors
    ///
    /// Propagates the fetch error; the previous snapshot (if any) stays
    /// available for later reads.
    pub async fn query<T, F, Fut>(
        &self,
        key: QueryKey,
        stale_after: Duration,
        mut fetch: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        loop {
            let step = {
                let mut inner = self.inner.lock();
                let fresh_value = match inner.entries.get(&key) {
                    Some(entry) if entry.is_fresh() => Some(entry.value.clone()),
                    _ => None,
                };
                if let Some(value) = fresh_value {
                    Step::Hit(value)
                } else if let Some(rx) = inner.in_flight.get(&key) {
                    Step::Wait(rx.clone())
                } else {
                    let (tx, rx) = watch::channel(());
                    inner.in_flight.insert(key.clone(), rx);
                    Step::Fetch(tx)
                }
            };

            match step {
                Step::Hit(value) => {
                    return serde_json::from_value(value).map_err(|e| Error::Decode(e.to_string()))
                }
                Step::Wait(mut rx) => {
                    // Err means the fetcher died without sending; loop and
                    // re-examine either way.
                    let _ = rx.changed().await;
                }
                Step::Fetch(tx) => {
                    let guard = InFlightGuard {
                        inner: Arc::clone(&self.inner),
                        key: key.clone(),
                    };
                    let outcome = match fetch().await {
                        Ok(value) => match serde_json::to_value(&value) {
                            Ok(json) => {
                                self.inner.lock().entries.insert(
                                    key.clone(),
                                    Entry {
                                        value: json,
                                        fetched_at: Instant::now(),
                                        stale_after,
                                        invalidated: false,
                                    },
                                );
                                Ok(value)
                            }
                            Err(e) => Err(Error::Decode(e.to_string())),
                        },
                        Err(e) => Err(e),
                    };
                    drop(guard);
                    let _ = tx.send(());
                    return outcome;
                }
            }
        }
    }

    /// Mark every entry in `scope` stale so the next read refetches.
    /// Scopes with no entries are an error-free no-op.
    pub fn invalidate(&self, scope: &str) {
        let mut inner = self.inner.lock();
        for (key, entry) in inner.entries.iter_mut() {
            if key.scope == scope {
                entry.invalidated = true;
            }
        }
    }

    /// Current lifecycle state of one slot.
    #[must_use]
    pub fn status(&self, key: &QueryKey) -> QueryStatus {
        let inner = self.inner.lock();
        if inner.in_flight.contains_key(key) {
            return QueryStatus::Fetching;
        }
        match inner.entries.get(key) {
            Some(entry) if entry.is_fresh() => QueryStatus::Fresh,
            Some(_) => QueryStatus::Stale,
            None => QueryStatus::Idle,
        }
    }
}
