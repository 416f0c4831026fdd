// src/cache.rs
//
// Explicit time-to-live memoization of load results, keyed by source
// identifier. Replaces the original framework-level cache decorator with a
// structure tests can drive directly. There is no concurrent writer in this
// pipeline; the mutex only provides interior mutability behind a shared
// reference.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::ScrapeError;

pub struct TtlCache<T> {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, Arc<T>)>>,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        TtlCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key` if younger than the TTL; otherwise
    /// run `loader` and cache its result. A failed load caches nothing and
    /// leaves any stale entry removed, so the next call retries.
    pub fn get_or_load<F>(&self, key: &str, loader: F) -> Result<Arc<T>, ScrapeError>
    where
        F: FnOnce() -> Result<T, ScrapeError>,
    {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        if let Some((stamp, value)) = entries.get(key) {
            if stamp.elapsed() <= self.ttl {
                debug!(key, "cache hit");
                return Ok(Arc::clone(value));
            }
            debug!(key, "cache entry expired");
        }
        entries.remove(key);
        match loader() {
            Ok(value) => {
                let value = Arc::new(value);
                entries.insert(key.to_string(), (Instant::now(), Arc::clone(&value)));
                info!(key, "cache refreshed");
                Ok(value)
            }
            Err(e) => Err(e),
        }
    }

    /// Forget one entry so the next access reloads.
    pub fn invalidate(&self, key: &str) {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .remove(key);
    }

    /// Forget everything.
    pub fn invalidate_all(&self) {
        self.entries.lock().expect("cache lock poisoned").clear();
    }
}
