//! In-memory TTL cache for source responses
//!
//! Values are stored as JSON so one cache can hold every record type.
//! Entries are replaced whole on write; concurrent writers on the same key
//! resolve as last-writer-wins.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::SourceError;

#[derive(Debug)]
struct Entry {
    stored_at: Instant,
    value: serde_json::Value,
}

#[derive(Debug)]
pub struct ResponseCache {
    entries: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
    enabled: bool,
}

impl ResponseCache {
    pub fn new(ttl: Duration, enabled: bool) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            enabled,
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Fresh value stored under `key`, if any
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if !self.enabled {
            return None;
        }

        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(key).filter(|e| e.stored_at.elapsed() < self.ttl);
        match entry {
            Some(entry) => {
                tracing::debug!(key = %key, "Cache hit");
                serde_json::from_value(entry.value.clone()).ok()
            }
            None => {
                tracing::debug!(key = %key, "Cache miss");
                None
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: impl Into<String>, value: &T) {
        if !self.enabled {
            return;
        }

        let key = key.into();
        match serde_json::to_value(value) {
            Ok(value) => {
                let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
                entries.insert(
                    key,
                    Entry {
                        stored_at: Instant::now(),
                        value,
                    },
                );
            }
            Err(e) => tracing::warn!(key = %key, "Failed to cache value: {}", e),
        }
    }

    pub fn remove(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::info!("Cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the cached value for `key` or compute, store and return it
    ///
    /// Errors are never cached.
    pub async fn with_cache<T, F, Fut>(&self, key: String, fetch: F) -> Result<T, SourceError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }

        let value = fetch().await?;
        self.set(key, &value);
        Ok(value)
    }
}
