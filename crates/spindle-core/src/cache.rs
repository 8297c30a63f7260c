// ── Snapshot cache ──
//
// Short-lived cache of the last-known snapshots, shared across views so
// a freshly opened console renders instantly while the first poll is
// still in flight. Expiry is the sole invalidation rule: the store does
// the TTL arithmetic, callers never compare timestamps inline.
//
// The cache is an optimization, never a correctness dependency -- every
// failure on the write path is swallowed after a debug log.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::model::{DiskSnapshot, StatusSnapshot};

/// Snapshots older than this are never served.
pub const SNAPSHOT_TTL: Duration = Duration::from_millis(120_000);

const STATUS_KEY: &str = "raid.status";
const DISKS_KEY: &str = "raid.disks";

/// Failure from a concrete store backend (quota, I/O, ...).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store rejected write: {0}")]
    Rejected(String),
}

/// A value plus the instant it was captured.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub value: serde_json::Value,
    pub captured_at: DateTime<Utc>,
}

/// Generic typed key-value store with TTL expiry inside the store.
///
/// `get` returns nothing for a key whose entry is older than the
/// caller-supplied TTL; expired entries are dropped, not returned.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str, ttl: Duration) -> Option<StoredEntry>;
    fn set(&self, key: &str, entry: StoredEntry) -> Result<(), StoreError>;
    fn remove(&self, key: &str);
}

/// True while `captured_at` is strictly within `ttl` of `now`.
fn is_fresh(captured_at: DateTime<Utc>, ttl: Duration, now: DateTime<Utc>) -> bool {
    let age_ms = (now - captured_at).num_milliseconds();
    u128::try_from(age_ms).is_ok_and(|age| age < ttl.as_millis())
}

/// In-memory store backend.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, StoredEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str, ttl: Duration) -> Option<StoredEntry> {
        let entry = self.entries.get(key)?.clone();
        if is_fresh(entry.captured_at, ttl, Utc::now()) {
            Some(entry)
        } else {
            self.entries.remove(key);
            None
        }
    }

    fn set(&self, key: &str, entry: StoredEntry) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), entry);
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}

/// Typed facade over a [`KeyValueStore`] with fixed keys for the two
/// snapshot kinds. `write_*` unconditionally overwrites.
#[derive(Clone)]
pub struct SnapshotCache {
    store: Arc<dyn KeyValueStore>,
}

impl SnapshotCache {
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
        }
    }

    pub fn with_store(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn read_status(&self) -> Option<StatusSnapshot> {
        self.read(STATUS_KEY)
    }

    pub fn write_status(&self, snapshot: &StatusSnapshot) {
        self.write(STATUS_KEY, snapshot, snapshot.captured_at);
    }

    pub fn read_disks(&self) -> Option<DiskSnapshot> {
        self.read(DISKS_KEY)
    }

    pub fn write_disks(&self, snapshot: &DiskSnapshot) {
        self.write(DISKS_KEY, snapshot, snapshot.captured_at);
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.store.get(key, SNAPSHOT_TTL)?;
        match serde_json::from_value(entry.value) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(key, error = %e, "cached snapshot unreadable, treating as cold");
                self.store.remove(key);
                None
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T, captured_at: DateTime<Utc>) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                debug!(key, error = %e, "snapshot serialization failed, skipping cache write");
                return;
            }
        };
        if let Err(e) = self.store.set(key, StoredEntry { value, captured_at }) {
            debug!(key, error = %e, "cache write failed, snapshot still rendered from poll");
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    use crate::model::SpeedLimits;

    fn snapshot_at(captured_at: DateTime<Utc>) -> StatusSnapshot {
        StatusSnapshot {
            captured_at,
            arrays: Vec::new(),
            speed_limits: SpeedLimits::default(),
        }
    }

    #[test]
    fn fresh_within_ttl_boundary() {
        let now = Utc::now();
        let ttl = SNAPSHOT_TTL;

        let just_inside = now - TimeDelta::milliseconds(119_999);
        assert!(is_fresh(just_inside, ttl, now));

        let just_outside = now - TimeDelta::milliseconds(120_001);
        assert!(!is_fresh(just_outside, ttl, now));
    }

    #[test]
    fn exact_ttl_age_is_expired() {
        let now = Utc::now();
        let at_ttl = now - TimeDelta::milliseconds(120_000);
        assert!(!is_fresh(at_ttl, SNAPSHOT_TTL, now));
    }

    #[test]
    fn future_capture_time_is_served() {
        // Clock skew between writes and reads must not blank the view.
        let now = Utc::now();
        let future = now + TimeDelta::milliseconds(500);
        assert!(is_fresh(future, SNAPSHOT_TTL, now));
    }

    #[test]
    fn roundtrip_through_memory_store() {
        let cache = SnapshotCache::in_memory();
        assert!(cache.read_status().is_none());

        let snapshot = snapshot_at(Utc::now());
        cache.write_status(&snapshot);

        let read_back = cache.read_status().expect("fresh snapshot");
        assert_eq!(read_back.captured_at, snapshot.captured_at);
    }

    #[test]
    fn expired_entry_not_served() {
        let cache = SnapshotCache::in_memory();
        let stale = snapshot_at(Utc::now() - TimeDelta::milliseconds(240_000));
        cache.write_status(&stale);
        assert!(cache.read_status().is_none());
    }

    #[test]
    fn write_overwrites_unconditionally() {
        let cache = SnapshotCache::in_memory();
        let older = snapshot_at(Utc::now() - TimeDelta::milliseconds(60_000));
        let newer = snapshot_at(Utc::now());

        cache.write_status(&newer);
        cache.write_status(&older);

        let read_back = cache.read_status().expect("snapshot");
        assert_eq!(read_back.captured_at, older.captured_at);
    }

    #[test]
    fn failing_store_is_swallowed() {
        struct BrokenStore;
        impl KeyValueStore for BrokenStore {
            fn get(&self, _key: &str, _ttl: Duration) -> Option<StoredEntry> {
                None
            }
            fn set(&self, _key: &str, _entry: StoredEntry) -> Result<(), StoreError> {
                Err(StoreError::Rejected("quota exceeded".into()))
            }
            fn remove(&self, _key: &str) {}
        }

        let cache = SnapshotCache::with_store(Arc::new(BrokenStore));
        // Must not panic or surface the error.
        cache.write_status(&snapshot_at(Utc::now()));
        assert!(cache.read_status().is_none());
    }
}
