//! In-memory result cache with a fixed absolute TTL.
//!
//! Entries are evicted lazily: the first lookup that sees `now > expires_at`
//! deletes the entry and reports a miss. There is no background sweep.
//! Values are stored as opaque JSON; decoding them is the caller's business.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Fixed TTL for every entry (7 days).
pub const CACHE_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Value,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct ResultCache {
    inner: Mutex<HashMap<String, CacheEntry>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ttl() -> Duration {
        Duration::seconds(CACHE_TTL_SECS)
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // Poisoning is ignored: every insert/remove is a single map operation.
        match self.inner.lock() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_at(key, Utc::now())
    }

    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<Value> {
        let mut map = self.entries();
        let expired = match map.get(key) {
            None => return None,
            Some(entry) => now > entry.expires_at,
        };
        if expired {
            map.remove(key);
            return None;
        }
        map.get(key).map(|e| e.value.clone())
    }

    pub fn set(&self, key: &str, value: Value) {
        self.set_at(key, value, Utc::now());
    }

    /// Overwrites unconditionally; `expires_at = now + 7 days`.
    pub fn set_at(&self, key: &str, value: Value, now: DateTime<Utc>) {
        let entry = CacheEntry {
            value,
            expires_at: now + Self::ttl(),
        };
        self.entries().insert(key.to_string(), entry);
    }

    pub fn remove(&self, key: &str) {
        self.entries().remove(key);
    }

    /// Number of stored entries, expired-but-unobserved ones included.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cache key for a topic's ranked videos.
pub fn videos_key(topic_id: &str) -> String {
    format!("videos:{topic_id}")
}
