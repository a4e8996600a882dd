//! Process-wide cache for contract view reads.
//!
//! Entries are keyed by `(function, args)` so every consumer of the same read
//! observes the same value. Each key carries a generation counter:
//! invalidation bumps it, and a read that started before the bump discards
//! its own result instead of resurrecting stale data.

use crate::types::ReadValue;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Cache key: function name plus encoded argument bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Contract function name
    pub function: &'static str,
    /// Hex of the encoded arguments (empty for zero-arg reads)
    pub args: String,
}

impl CacheKey {
    /// Build a key for a function call
    pub fn new(function: &'static str, args: impl Into<String>) -> Self {
        Self {
            function,
            args: args.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.function, self.args)
    }
}

#[derive(Debug, Default)]
struct Entry {
    generation: u64,
    value: Option<serde_json::Value>,
}

/// Shared read cache with generation-based stale-response discard
#[derive(Clone, Default)]
pub struct ReadCache {
    inner: Arc<RwLock<HashMap<CacheKey, Entry>>>,
}

impl ReadCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached value for a key, if loaded
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> ReadValue<T> {
        let map = self.inner.read().expect("cache lock poisoned");
        match map.get(key).and_then(|entry| entry.value.as_ref()) {
            Some(value) => match serde_json::from_value(value.clone()) {
                Ok(typed) => ReadValue::Loaded(typed),
                Err(_) => ReadValue::NotLoaded,
            },
            None => ReadValue::NotLoaded,
        }
    }

    /// Record that a read is starting; returns the generation the result
    /// must be applied against.
    pub fn begin(&self, key: &CacheKey) -> u64 {
        let mut map = self.inner.write().expect("cache lock poisoned");
        map.entry(key.clone()).or_default().generation
    }

    /// Store a completed read. Returns false (and stores nothing) if the key
    /// was invalidated after the read began.
    pub fn complete<T: Serialize>(&self, key: &CacheKey, generation: u64, value: &T) -> bool {
        let mut map = self.inner.write().expect("cache lock poisoned");
        let entry = map.entry(key.clone()).or_default();
        if entry.generation != generation {
            debug!("discarding stale read for {}", key);
            return false;
        }
        entry.value = serde_json::to_value(value).ok();
        true
    }

    /// Drop the value for one key and bump its generation
    pub fn invalidate(&self, key: &CacheKey) {
        let mut map = self.inner.write().expect("cache lock poisoned");
        let entry = map.entry(key.clone()).or_default();
        entry.generation += 1;
        entry.value = None;
        debug!("invalidated {}", key);
    }

    /// Invalidate every cached read of a function, regardless of arguments.
    /// This is the event-driven path: handlers invalidate coarsely and stay
    /// idempotent under repeated delivery.
    pub fn invalidate_function(&self, function: &str) {
        let mut map = self.inner.write().expect("cache lock poisoned");
        let mut count = 0;
        for (key, entry) in map.iter_mut() {
            if key.function == function {
                entry.generation += 1;
                entry.value = None;
                count += 1;
            }
        }
        if count > 0 {
            debug!("invalidated {} entries for {}", count, function);
        }
    }

    /// Drop everything
    pub fn clear(&self) {
        let mut map = self.inner.write().expect("cache lock poisoned");
        for entry in map.values_mut() {
            entry.generation += 1;
            entry.value = None;
        }
    }
}
