//! Collaborator traits for balance and history persistence
//!
//! The ledger only talks to storage through these traits, so in-memory,
//! database-backed, or test-double stores can be swapped freely. Each store is
//! expected to make a single call atomic; the ledger, not the store, owns the
//! read-validate-write-append critical section.

use crate::types::{Balance, HistoryEntry, Points, StoreError, TransactionKind, UserId};
use async_trait::async_trait;

/// Trait for reading and persisting balances
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Current balance for `user`
    ///
    /// Returns a zero balance for a user that has never been seen; "not found"
    /// is not an error.
    async fn find(&self, user: UserId) -> Result<Balance, StoreError>;

    /// Upsert the balance for `user` and return the persisted snapshot
    async fn save(&self, user: UserId, amount: Points) -> Result<Balance, StoreError>;
}

/// Trait for the append-only mutation history
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append one entry, assigning its id
    async fn append(
        &self,
        user: UserId,
        amount: Points,
        kind: TransactionKind,
        timestamp: i64,
    ) -> Result<HistoryEntry, StoreError>;

    /// All entries for `user` in insertion order (empty if none)
    async fn find_all(&self, user: UserId) -> Result<Vec<HistoryEntry>, StoreError>;
}
