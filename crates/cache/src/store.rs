//! Keyed query cache with snapshot/restore.
//!
//! [`QueryCache`] is an explicit object shared via `Arc`; nothing about it
//! is global, so each test can build its own. Mutations use
//! [`begin_mutation`](QueryCache::begin_mutation) to pause, snapshot and
//! optimistically write their keys under a single write guard, which keeps
//! two mutations on the same key from interleaving.

use std::collections::HashMap;
use std::time::Duration;

use tasklists_core::types::EntityKind;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::key::{CacheKey, CacheValue};

/// A cached value plus bookkeeping.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: CacheValue,
    stale: bool,
    fetched_at: Instant,
    last_access: Instant,
}

impl CacheEntry {
    fn new(value: CacheValue) -> Self {
        let now = Instant::now();
        Self {
            value,
            stale: false,
            fetched_at: now,
            last_access: now,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<CacheKey, CacheEntry>,
    /// Number of in-flight mutations holding each key. A key may be paused
    /// before it has any entry (e.g. the first optimistic insert).
    paused: HashMap<CacheKey, usize>,
    /// Bumped whenever a mutation or an invalidation touches the key. A
    /// fetch result is only accepted if the generation it started under is
    /// still current.
    generations: HashMap<CacheKey, u64>,
}

impl Inner {
    fn is_paused(&self, key: &CacheKey) -> bool {
        self.paused.get(key).is_some_and(|n| *n > 0)
    }

    fn generation(&self, key: &CacheKey) -> u64 {
        self.generations.get(key).copied().unwrap_or(0)
    }

    fn bump(&mut self, key: &CacheKey) {
        *self.generations.entry(key.clone()).or_insert(0) += 1;
    }

    fn write_value(&mut self, key: &CacheKey, value: CacheValue) {
        match self.entries.get_mut(key) {
            Some(entry) => entry.value = value,
            None => {
                self.entries.insert(key.clone(), CacheEntry::new(value));
            }
        }
    }
}

/// Immutable copy of some keys' values, taken before an optimistic write.
///
/// A `None` value records that the key was absent; restoring removes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSnapshot {
    entries: Vec<(CacheKey, Option<CacheValue>)>,
}

impl CacheSnapshot {
    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn get(&self, key: &CacheKey) -> Option<&CacheValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, value)| value.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct QueryCache {
    inner: RwLock<Inner>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a value, refreshing its last-access time.
    pub async fn get(&self, key: &CacheKey) -> Option<CacheValue> {
        let mut inner = self.inner.write().await;
        let entry = inner.entries.get_mut(key)?;
        entry.last_access = Instant::now();
        Some(entry.value.clone())
    }

    /// Write a value directly, bypassing the pause check.
    pub async fn insert(&self, key: CacheKey, value: CacheValue) {
        self.inner
            .write()
            .await
            .entries
            .insert(key, CacheEntry::new(value));
    }

    /// Current generation of `key`. Capture it before loading and pass it
    /// to [`populate`](Self::populate).
    pub async fn generation(&self, key: &CacheKey) -> u64 {
        self.inner.read().await.generation(key)
    }

    /// Store a freshly fetched value that was loaded under generation `seen`.
    ///
    /// Returns `false` and leaves the entry untouched while a mutation holds
    /// the key, or when a mutation or invalidation touched the key after the
    /// load started. A refetch that began before a mutation can therefore
    /// neither overwrite the optimistic value nor resurrect pre-mutation
    /// data once the mutation has settled.
    pub async fn populate(&self, key: CacheKey, value: CacheValue, seen: u64) -> bool {
        let mut inner = self.inner.write().await;
        if inner.is_paused(&key) {
            tracing::debug!(%key, "Discarding fetch result for paused key");
            return false;
        }
        if inner.generation(&key) != seen {
            tracing::debug!(%key, seen, "Discarding fetch result loaded before a later change");
            return false;
        }
        inner.entries.insert(key, CacheEntry::new(value));
        true
    }

    /// `true` if `key` holds a value that is neither stale nor older than
    /// `stale_time`.
    pub async fn is_fresh(&self, key: &CacheKey, stale_time: Duration) -> bool {
        let inner = self.inner.read().await;
        inner
            .entries
            .get(key)
            .is_some_and(|e| !e.stale && e.fetched_at.elapsed() < stale_time)
    }

    pub async fn is_stale(&self, key: &CacheKey) -> bool {
        let inner = self.inner.read().await;
        inner.entries.get(key).is_some_and(|e| e.stale)
    }

    pub async fn is_paused(&self, key: &CacheKey) -> bool {
        self.inner.read().await.is_paused(key)
    }

    pub async fn keys(&self) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self.inner.read().await.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Mark every key of `entity` stale. Returns the keys marked.
    pub async fn invalidate(&self, entity: EntityKind) -> Vec<CacheKey> {
        let mut inner = self.inner.write().await;
        let mut marked: Vec<CacheKey> = inner
            .entries
            .iter_mut()
            .filter(|(key, _)| key.entity() == entity)
            .map(|(key, entry)| {
                entry.stale = true;
                key.clone()
            })
            .collect();
        for key in &marked {
            inner.bump(key);
        }
        marked.sort();
        tracing::debug!(%entity, count = marked.len(), "Invalidated cache keys");
        marked
    }

    /// Stale keys of `entity` that no mutation currently holds.
    pub async fn stale_keys(&self, entity: EntityKind) -> Vec<CacheKey> {
        let inner = self.inner.read().await;
        let mut keys: Vec<CacheKey> = inner
            .entries
            .iter()
            .filter(|(key, entry)| {
                entry.stale && key.entity() == entity && !inner.is_paused(key)
            })
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Copy the current values of `keys`.
    pub async fn snapshot(&self, keys: &[CacheKey]) -> CacheSnapshot {
        let inner = self.inner.read().await;
        CacheSnapshot {
            entries: keys
                .iter()
                .map(|key| (key.clone(), inner.entries.get(key).map(|e| e.value.clone())))
                .collect(),
        }
    }

    /// Put every key in `snapshot` back the way it was.
    pub async fn restore(&self, snapshot: CacheSnapshot) {
        let mut inner = self.inner.write().await;
        for (key, value) in snapshot.entries {
            match value {
                Some(value) => inner.write_value(&key, value),
                None => {
                    inner.entries.remove(&key);
                }
            }
        }
    }

    /// Pause, snapshot and optimistically rewrite a set of keys atomically.
    ///
    /// `plan` receives the currently cached keys and returns the keys the
    /// mutation affects. For each of them `apply` gets the current value and
    /// returns the new one, or `None` to leave the key unchanged. Returns
    /// the affected keys and the pre-apply snapshot.
    pub async fn begin_mutation<P, A>(&self, plan: P, apply: A) -> (Vec<CacheKey>, CacheSnapshot)
    where
        P: FnOnce(&[CacheKey]) -> Vec<CacheKey>,
        A: Fn(&CacheKey, Option<&CacheValue>) -> Option<CacheValue>,
    {
        let mut inner = self.inner.write().await;

        let cached: Vec<CacheKey> = inner.entries.keys().cloned().collect();
        let keys = plan(&cached);

        let mut entries = Vec::with_capacity(keys.len());
        for key in &keys {
            *inner.paused.entry(key.clone()).or_insert(0) += 1;
            inner.bump(key);

            let before = inner.entries.get(key).map(|e| e.value.clone());
            if let Some(after) = apply(key, before.as_ref()) {
                inner.write_value(key, after);
            }
            entries.push((key.clone(), before));
        }

        (keys, CacheSnapshot { entries })
    }

    /// Release the pause taken by [`begin_mutation`](Self::begin_mutation).
    pub async fn end_mutation(&self, keys: &[CacheKey]) {
        let mut inner = self.inner.write().await;
        for key in keys {
            if let Some(count) = inner.paused.get_mut(key) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    inner.paused.remove(key);
                }
            }
        }
    }

    /// Drop entries nobody has read for `gc_time`. Paused keys are kept.
    pub async fn evict_expired(&self, gc_time: Duration) -> usize {
        let mut inner = self.inner.write().await;
        let expired: Vec<CacheKey> = inner
            .entries
            .iter()
            .filter(|(key, entry)| entry.last_access.elapsed() >= gc_time && !inner.is_paused(key))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            inner.entries.remove(key);
        }
        if !expired.is_empty() {
            tracing::debug!(count = expired.len(), "Evicted idle cache entries");
        }
        expired.len()
    }
}
