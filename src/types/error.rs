//! Error types for the point ledger
//!
//! This module defines all error types that can occur while mutating or reading
//! balances. Errors carry structured fields plus a human-readable message so an
//! adapter layer can map them to its own status codes.
//!
//! # Error Categories
//!
//! - **Validation Errors**: Invalid amount, limit exceeded, insufficient balance.
//!   Deterministic, never retried, and never leave a side effect.
//! - **Store Errors**: A balance or history collaborator failed. Propagated unchanged.
//! - **Timeout**: The per-user lock could not be acquired within the configured bound.

use super::balance::{Points, UserId, MAX_AMOUNT};
use super::history::TransactionKind;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by a storage collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not serve the request
    #[error("{store} store unavailable: {message}")]
    Unavailable {
        /// Which store failed ("balance" or "history")
        store: String,
        /// Description of the underlying cause
        message: String,
    },
}

impl StoreError {
    /// Create an Unavailable error
    pub fn unavailable(store: &str, message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            store: store.to_string(),
            message: message.into(),
        }
    }
}

/// Stable classification of a LedgerError
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidAmount,
    LimitExceeded,
    InsufficientBalance,
    StoreUnavailable,
    Timeout,
}

/// Main error type for the ledger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Requested amount is zero or negative
    #[error("Invalid {kind} amount {amount} for user {user}: amount must be positive")]
    InvalidAmount {
        /// Operation that was requested
        kind: TransactionKind,
        /// User ID
        user: UserId,
        /// The rejected amount
        amount: Points,
    },

    /// Charge would push the balance above the maximum
    #[error("Charging {requested} to user {user} would exceed the limit of {limit} (current balance {current})")]
    LimitExceeded {
        /// User ID
        user: UserId,
        /// Balance before the charge
        current: Points,
        /// Requested charge amount
        requested: Points,
        /// Maximum balance
        limit: Points,
    },

    /// Use amount is larger than the current balance
    #[error("Insufficient balance for user {user}: available {available}, requested {requested}")]
    InsufficientBalance {
        /// User ID
        user: UserId,
        /// Current balance
        available: Points,
        /// Requested use amount
        requested: Points,
    },

    /// A storage collaborator failed
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// The per-user lock was not acquired in time
    #[error("Timed out after {waited_ms}ms waiting for the lock of user {user}")]
    Timeout {
        /// User ID
        user: UserId,
        /// Configured wait bound in milliseconds
        waited_ms: u64,
    },
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an InvalidAmount error
    pub fn invalid_amount(kind: TransactionKind, user: UserId, amount: Points) -> Self {
        LedgerError::InvalidAmount { kind, user, amount }
    }

    /// Create a LimitExceeded error against `MAX_AMOUNT`
    pub fn limit_exceeded(user: UserId, current: Points, requested: Points) -> Self {
        LedgerError::LimitExceeded {
            user,
            current,
            requested,
            limit: MAX_AMOUNT,
        }
    }

    /// Create an InsufficientBalance error
    pub fn insufficient_balance(user: UserId, available: Points, requested: Points) -> Self {
        LedgerError::InsufficientBalance {
            user,
            available,
            requested,
        }
    }

    /// Create a Timeout error
    pub fn timeout(user: UserId, waited: Duration) -> Self {
        LedgerError::Timeout {
            user,
            waited_ms: u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Classification for adapters
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            LedgerError::LimitExceeded { .. } => ErrorKind::LimitExceeded,
            LedgerError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            LedgerError::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            LedgerError::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    /// True for expected user-input errors (as opposed to infrastructure failures)
    pub fn is_validation(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidAmount | ErrorKind::LimitExceeded | ErrorKind::InsufficientBalance
        )
    }
}
