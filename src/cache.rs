//! Content hashing and the in-process plan cache.
//!
//! The cache key is a SHA-256 digest of the *parsed* wizard answers, so
//! two clients sending the same answers with different JSON key order hit
//! the same entry, while array order (subscriptions, required categories)
//! stays significant -- intentional, since order changes the generated
//! plans.
//!
//! The cache is an explicit injectable service: constructed once per
//! process and shared by `Arc`, never a bare module-level map, so it can
//! be swapped for a distributed store without touching the pipeline.
//! Concurrent misses on the same key may both regenerate; the transform is
//! idempotent and the last writer overwrites with an equivalent value.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::schema::canonical::PlanSet;

/// Default entry lifetime.
pub const DEFAULT_TTL_SECONDS: u64 = 3_600;
/// Default entry capacity.
pub const DEFAULT_CAPACITY: usize = 200;

/// Compute the stable content hash of a serializable value as lowercase
/// hex.
///
/// Struct field order is fixed at compile time, so hashing a parsed value
/// is deterministic; repeated calls on the same value always agree.
///
/// # Errors
///
/// Returns the underlying serialization error when the value cannot be
/// rendered as JSON.
pub fn content_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(value)?;
    let digest = Sha256::digest(&bytes);
    Ok(hex::encode(digest))
}

/// One cached plan set with its creation time.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached deliverable.
    pub plans: PlanSet,
    /// When the entry was computed; drives TTL expiry and eviction order.
    pub cached_at: DateTime<Utc>,
}

/// Bounded, TTL-expiring plan cache.
///
/// Entries older than the TTL are treated as absent and evicted on access;
/// when the store is full, the oldest entry by timestamp is evicted before
/// an insert.
#[derive(Debug)]
pub struct PlanCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl Default for PlanCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_SECONDS, DEFAULT_CAPACITY)
    }
}

impl PlanCache {
    /// Create a cache with the given TTL and capacity.
    pub fn new(ttl_seconds: u64, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: Duration::seconds(i64::try_from(ttl_seconds).unwrap_or(i64::MAX)),
            capacity: capacity.max(1),
        }
    }

    /// Look up a fresh entry, evicting it if expired.
    pub fn get(&self, key: &str) -> Option<PlanSet> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if self.is_fresh(entry) => Some(entry.plans.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert a freshly computed plan set under `key`.
    pub fn put(&self, key: impl Into<String>, plans: PlanSet) {
        self.insert_entry(
            key,
            CacheEntry {
                plans,
                cached_at: Utc::now(),
            },
        );
    }

    /// Insert a pre-built entry, evicting the oldest entry first when at
    /// capacity. Public so tests can backdate timestamps.
    pub fn insert_entry(&self, key: impl Into<String>, entry: CacheEntry) {
        let key = key.into();
        let mut entries = self.lock();

        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.cached_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest_key) = oldest {
                tracing::debug!(key = %oldest_key, "evicting oldest cache entry at capacity");
                entries.remove(&oldest_key);
            }
        }

        entries.insert(key, entry);
    }

    /// Number of live (possibly stale) entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        Utc::now().signed_duration_since(entry.cached_at) <= self.ttl
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A poisoned lock only means another thread panicked mid-write;
        // the map itself is still structurally sound.
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
