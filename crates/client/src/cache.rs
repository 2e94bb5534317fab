//! Keyed request cache for read operations.
//!
//! Entries are keyed by the descriptor key joined with the request URL.
//! Concurrent fetches for one key collapse into a single network send, and a
//! forced refetch replaces the stored value only once it succeeds, so the
//! previous value stays visible throughout. Eviction is manual (exact or
//! prefix invalidation); nothing expires on its own.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::Mutex as AsyncMutex;

use aula_core::ApiResult;

/// Cache key: an ordered list of string segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(Vec<String>);

impl CacheKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// This key with one more trailing segment (reads append the request
    /// URL so the same logical key with different query strings stays
    /// distinct).
    pub fn joined(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &CacheKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }
}

struct Entry {
    /// Serializes fetches for one key. A call queued behind an identical
    /// in-flight fetch re-checks the stored value once that fetch settles
    /// instead of sending again.
    gate: AsyncMutex<()>,
    value: Mutex<Option<Value>>,
}

impl Entry {
    fn new() -> Self {
        Self {
            gate: AsyncMutex::new(()),
            value: Mutex::new(None),
        }
    }
}

/// Process-wide memoization substrate for read operations.
#[derive(Default)]
pub struct RequestCache {
    entries: Mutex<HashMap<CacheKey, Arc<Entry>>>,
}

impl RequestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch through the cache.
    ///
    /// Without `force`, a stored value short-circuits the load entirely.
    /// With `force`, the load always runs; the stored value is replaced only
    /// on success, never cleared by a failure.
    pub async fn fetch<F, Fut>(&self, key: &CacheKey, force: bool, load: F) -> ApiResult<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<Value>>,
    {
        let entry = self.entry(key);
        let _serialized = entry.gate.lock().await;

        if !force {
            if let Some(value) = lock(&entry.value).clone() {
                return Ok(value);
            }
        }

        let value = load().await?;
        *lock(&entry.value) = Some(value.clone());
        Ok(value)
    }

    /// Last stored value for a key, if any.
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        let entry = lock(&self.entries).get(key).cloned()?;
        let value = lock(&entry.value).clone();
        value
    }

    /// Drop the entry for exactly this key; the next fetch goes to the
    /// network again.
    pub fn invalidate(&self, key: &CacheKey) {
        lock(&self.entries).remove(key);
    }

    /// Drop every entry whose key starts with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &CacheKey) {
        lock(&self.entries).retain(|key, _| !key.starts_with(prefix));
    }

    fn entry(&self, key: &CacheKey) -> Arc<Entry> {
        lock(&self.entries)
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Entry::new()))
            .clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
