//! Thread-safe in-memory balance store
//!
//! `InMemoryBalanceStore` keeps one Balance snapshot per user in a `DashMap`,
//! giving per-call atomicity for a single read or a single write. It provides
//! no cross-call transaction; that is the ledger's job.

use crate::core::traits::BalanceStore;
use crate::types::{Balance, Points, StoreError, UserId};
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;

/// In-memory balance store
///
/// An optional simulated latency is awaited before every call, which widens
/// the window between a read and the following write. Tests use it to make
/// lost updates observable if callers skip the ledger's per-user lock.
#[derive(Debug, Default)]
pub struct InMemoryBalanceStore {
    /// Latest balance snapshot by user ID
    balances: DashMap<UserId, Balance>,

    /// Delay applied before each call
    latency: Option<Duration>,
}

impl InMemoryBalanceStore {
    /// Create a new empty store with no latency
    pub fn new() -> Self {
        Self {
            balances: DashMap::new(),
            latency: None,
        }
    }

    /// Create a store that sleeps for `latency` before every call
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            balances: DashMap::new(),
            latency: Some(latency),
        }
    }

    /// Number of users with a stored balance
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl BalanceStore for InMemoryBalanceStore {
    async fn find(&self, user: UserId) -> Result<Balance, StoreError> {
        self.simulate_latency().await;

        // Unseen users get a zero balance, created on first read
        let balance = self
            .balances
            .entry(user)
            .or_insert_with(|| Balance::empty(user))
            .clone();
        Ok(balance)
    }

    async fn save(&self, user: UserId, amount: Points) -> Result<Balance, StoreError> {
        self.simulate_latency().await;

        let balance = Balance::new(user, amount);
        self.balances.insert(user, balance.clone());
        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_find_unseen_user_returns_zero() {
        let store = InMemoryBalanceStore::new();

        let balance = store.find(1).await.unwrap();

        assert_eq!(balance.user, 1);
        assert_eq!(balance.amount, 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_save_then_find() {
        let store = InMemoryBalanceStore::new();

        let saved = store.save(1, 1500).await.unwrap();
        let found = store.find(1).await.unwrap();

        assert_eq!(saved.amount, 1500);
        assert_eq!(found, saved);
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = InMemoryBalanceStore::new();

        store.save(1, 100).await.unwrap();
        store.save(1, 40).await.unwrap();

        assert_eq!(store.find(1).await.unwrap().amount, 40);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_users_are_independent() {
        let store = InMemoryBalanceStore::new();

        store.save(1, 100).await.unwrap();
        store.save(2, 200).await.unwrap();

        assert_eq!(store.find(1).await.unwrap().amount, 100);
        assert_eq!(store.find(2).await.unwrap().amount, 200);
        assert_eq!(store.find(3).await.unwrap().amount, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_applied() {
        let store = InMemoryBalanceStore::with_latency(Duration::from_millis(50));
        let start = tokio::time::Instant::now();

        store.find(1).await.unwrap();
        store.save(1, 10).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_different_users() {
        let store = Arc::new(InMemoryBalanceStore::new());
        let mut handles = vec![];

        for user in 0u64..10 {
            let store_clone = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store_clone.save(user, (user as Points + 1) * 100).await.unwrap();
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        for user in 0u64..10 {
            let expected = (user as Points + 1) * 100;
            assert_eq!(store.find(user).await.unwrap().amount, expected);
        }
    }
}
