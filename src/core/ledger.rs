//! Concurrency-safe point ledger
//!
//! This module provides the `Ledger`, which serializes balance mutations per
//! user while letting different users proceed fully in parallel.
//!
//! # Architecture
//!
//! ```text
//! Ledger
//!     ├── Arc<B: BalanceStore>     (current balance per user)
//!     ├── Arc<H: HistoryStore>     (append-only mutation history)
//!     └── KeyLockRegistry<UserId>  (one FIFO mutex per user)
//! ```
//!
//! # Mutation Protocol
//!
//! Every charge or use runs the same critical section under the user's lock:
//!
//! 1. Read the current balance
//! 2. Validate and compute the new snapshot (pure, may fail)
//! 3. Persist the new balance
//! 4. Append the history entry with the exact requested amount
//!
//! A validation failure returns before step 3, so it leaves no trace. The
//! lock is released only after step 4, so any completed mutation is fully
//! visible to readers, never half-visible.
//!
//! Store failures are returned as-is and never retried: replaying a
//! half-committed balance write plus history append without an idempotency
//! token could duplicate history entries.
//!
//! Reads (`get_balance`, `get_history`) never take the lock.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use super::balance_store::InMemoryBalanceStore;
use super::history_store::InMemoryHistoryStore;
use super::lock_registry::KeyLockRegistry;
use super::traits::{BalanceStore, HistoryStore};
use crate::types::{
    now_millis, Balance, HistoryEntry, LedgerError, Points, StoreError, TransactionKind, UserId,
};

/// Ledger configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Upper bound on waiting for a user's lock
    ///
    /// `None` waits indefinitely. A timed-out mutation fails with
    /// `LedgerError::Timeout` before reading or writing anything.
    pub lock_timeout: Option<Duration>,
}

impl LedgerConfig {
    /// Set the lock wait bound
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }
}

/// Ledger backed by the in-memory stores
pub type InMemoryLedger = Ledger<InMemoryBalanceStore, InMemoryHistoryStore>;

/// Per-user serialized balance ledger
///
/// Safe to share across tasks and threads behind an `Arc`.
#[derive(Debug)]
pub struct Ledger<B, H> {
    balances: Arc<B>,
    history: Arc<H>,
    locks: KeyLockRegistry<UserId>,
    config: LedgerConfig,
}

impl InMemoryLedger {
    /// Create a ledger over fresh in-memory stores
    pub fn in_memory(config: LedgerConfig) -> Self {
        Ledger::with_config(
            Arc::new(InMemoryBalanceStore::new()),
            Arc::new(InMemoryHistoryStore::new()),
            config,
        )
    }
}

impl<B, H> Ledger<B, H>
where
    B: BalanceStore,
    H: HistoryStore,
{
    /// Create a ledger with the default configuration
    pub fn new(balances: Arc<B>, history: Arc<H>) -> Self {
        Self::with_config(balances, history, LedgerConfig::default())
    }

    /// Create a ledger with an explicit configuration
    pub fn with_config(balances: Arc<B>, history: Arc<H>, config: LedgerConfig) -> Self {
        Self {
            balances,
            history,
            locks: KeyLockRegistry::new(),
            config,
        }
    }

    /// Current balance for `user`
    ///
    /// Does not wait for in-flight mutations. Callers that need the value
    /// produced by their own mutation should use the return value of
    /// `charge`/`use_points` instead.
    pub async fn get_balance(&self, user: UserId) -> Result<Balance, LedgerError> {
        Ok(self.balances.find(user).await?)
    }

    /// History of `user`, oldest first
    pub async fn get_history(&self, user: UserId) -> Result<Vec<HistoryEntry>, LedgerError> {
        Ok(self.history.find_all(user).await?)
    }

    /// Credit `amount` points to `user`
    ///
    /// # Returns
    ///
    /// * `Ok(Balance)` - The persisted balance after the charge
    /// * `Err(LedgerError::InvalidAmount)` - If `amount <= 0`
    /// * `Err(LedgerError::LimitExceeded)` - If the result would exceed `MAX_AMOUNT`
    /// * `Err(LedgerError::StoreUnavailable)` - If a store call failed
    /// * `Err(LedgerError::Timeout)` - If the lock wait bound elapsed
    pub async fn charge(&self, user: UserId, amount: Points) -> Result<Balance, LedgerError> {
        self.apply(user, TransactionKind::Charge, amount).await
    }

    /// Debit `amount` points from `user`
    ///
    /// # Returns
    ///
    /// * `Ok(Balance)` - The persisted balance after the use
    /// * `Err(LedgerError::InvalidAmount)` - If `amount <= 0`
    /// * `Err(LedgerError::InsufficientBalance)` - If `amount` exceeds the balance
    /// * `Err(LedgerError::StoreUnavailable)` - If a store call failed
    /// * `Err(LedgerError::Timeout)` - If the lock wait bound elapsed
    pub async fn use_points(&self, user: UserId, amount: Points) -> Result<Balance, LedgerError> {
        self.apply(user, TransactionKind::Use, amount).await
    }

    /// Run one mutation of the given kind under the user's lock
    pub async fn apply(
        &self,
        user: UserId,
        kind: TransactionKind,
        amount: Points,
    ) -> Result<Balance, LedgerError> {
        let lock = self.locks.lock_for(&user);
        let _guard = self.acquire(user, &lock).await?;

        let current = self
            .balances
            .find(user)
            .await
            .map_err(|e| store_failure(user, kind, e))?;

        let next = match current.apply(kind, amount) {
            Ok(next) => next,
            Err(e) => {
                debug!(user, %kind, amount, error = %e, "mutation rejected");
                return Err(e);
            }
        };

        let saved = self
            .balances
            .save(user, next.amount)
            .await
            .map_err(|e| store_failure(user, kind, e))?;

        let entry = self
            .history
            .append(user, amount, kind, now_millis())
            .await
            .map_err(|e| store_failure(user, kind, e))?;

        debug!(
            user,
            %kind,
            amount,
            balance = saved.amount,
            history_id = entry.id,
            "mutation committed"
        );
        Ok(saved)
    }

    /// Number of users that have had a mutation attempted
    pub fn tracked_users(&self) -> usize {
        self.locks.len()
    }

    async fn acquire<'a>(
        &self,
        user: UserId,
        lock: &'a Mutex<()>,
    ) -> Result<MutexGuard<'a, ()>, LedgerError> {
        match self.config.lock_timeout {
            None => Ok(lock.lock().await),
            Some(limit) => tokio::time::timeout(limit, lock.lock())
                .await
                .map_err(|_| {
                    let err = LedgerError::timeout(user, limit);
                    warn!(user, error = %err, "lock wait timed out");
                    err
                }),
        }
    }
}

fn store_failure(user: UserId, kind: TransactionKind, error: StoreError) -> LedgerError {
    warn!(user, %kind, error = %error, "store call failed during mutation");
    LedgerError::StoreUnavailable(error)
}
