//! Per-key lock registry
//!
//! Maps each key to its own async mutex so that mutations for one key are
//! serialized while mutations for different keys never wait on each other.
//!
//! # Design
//!
//! Locks live in a `DashMap`. Creation goes through `entry().or_insert_with()`,
//! which holds the shard lock for the duration of the insert, so concurrent
//! first-time accesses for the same key always converge on one mutex.
//!
//! The mutexes are `tokio::sync::Mutex`, which queues waiters in FIFO order.
//! Under sustained contention on one key every waiter is eventually served.
//!
//! Entries are never evicted.

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Lazily populated map from key to mutual-exclusion primitive
#[derive(Debug)]
pub struct KeyLockRegistry<K>
where
    K: Eq + Hash,
{
    locks: DashMap<K, Arc<Mutex<()>>>,
}

impl<K> KeyLockRegistry<K>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Get the lock for `key`, creating it on first use
    ///
    /// Every caller asking for the same key receives a handle to the same mutex.
    pub fn lock_for(&self, key: &K) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.get(key) {
            return Arc::clone(lock.value());
        }

        let entry = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())));
        Arc::clone(entry.value())
    }

    /// Whether a lock has been created for `key`
    pub fn contains(&self, key: &K) -> bool {
        self.locks.contains_key(key)
    }

    /// Number of keys that have a lock
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl<K> Default for KeyLockRegistry<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
