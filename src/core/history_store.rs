//! Thread-safe in-memory history store
//!
//! Entries are kept per user in insertion order. Ids come from a single
//! atomic sequence starting at 1, so they are unique and increase over the
//! whole store; within one user they increase as long as appends for that
//! user are serialized (which the ledger guarantees).

use crate::core::traits::HistoryStore;
use crate::types::{HistoryEntry, HistoryId, Points, StoreError, TransactionKind, UserId};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// In-memory append-only history store
#[derive(Debug)]
pub struct InMemoryHistoryStore {
    /// Entries by user ID, oldest first
    entries: DashMap<UserId, Vec<HistoryEntry>>,

    /// Next id to hand out
    next_id: AtomicU64,

    /// Delay applied before each call
    latency: Option<Duration>,
}

impl InMemoryHistoryStore {
    /// Create a new empty store with no latency
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_id: AtomicU64::new(1),
            latency: None,
        }
    }

    /// Create a store that sleeps for `latency` before every call
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::new()
        }
    }

    /// Total number of entries across all users
    pub fn len(&self) -> usize {
        self.entries.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn allocate_id(&self) -> HistoryId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(
        &self,
        user: UserId,
        amount: Points,
        kind: TransactionKind,
        timestamp: i64,
    ) -> Result<HistoryEntry, StoreError> {
        self.simulate_latency().await;

        let mut user_entries = self.entries.entry(user).or_default();
        let entry = HistoryEntry {
            id: self.allocate_id(),
            user,
            amount,
            kind,
            timestamp,
        };
        user_entries.push(entry.clone());
        Ok(entry)
    }

    async fn find_all(&self, user: UserId) -> Result<Vec<HistoryEntry>, StoreError> {
        self.simulate_latency().await;

        Ok(self
            .entries
            .get(&user)
            .map(|entries| entries.value().clone())
            .unwrap_or_default())
    }
}
