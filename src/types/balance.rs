//! Balance-related types for the point ledger
//!
//! This module defines the Balance snapshot and the two pure rules that
//! produce a new snapshot from an existing one: charge (credit) and use (debit).

use super::error::LedgerError;
use super::history::TransactionKind;

/// User identifier
///
/// Opaque key that scopes a balance and its history.
pub type UserId = u64;

/// Point amount
///
/// Signed so that non-positive requests can be represented and rejected
/// with `InvalidAmount` instead of failing at parse time.
pub type Points = i64;

/// Upper bound a balance may ever reach
pub const MAX_AMOUNT: Points = 1_000_000;

/// Current wall-clock time in milliseconds since the Unix epoch
///
/// Informational only; never used for ordering decisions.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Immutable snapshot of a user's point balance
///
/// Mutations never touch the receiver. `charge` and `use_points` return a new
/// snapshot, so a prior snapshot can be read safely while a write is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    /// The user this balance belongs to
    pub user: UserId,

    /// Points held, always within `0..=MAX_AMOUNT`
    pub amount: Points,

    /// Last update time in epoch milliseconds
    pub updated_at: i64,
}

impl Balance {
    /// Create a snapshot with the given amount, stamped with the current time
    pub fn new(user: UserId, amount: Points) -> Self {
        Balance {
            user,
            amount,
            updated_at: now_millis(),
        }
    }

    /// Zero balance for a user that has never been seen
    pub fn empty(user: UserId) -> Self {
        Self::new(user, 0)
    }

    /// Credit `amount` points
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` if `amount <= 0`
    /// * `LimitExceeded` if the result would be above `MAX_AMOUNT`
    pub fn charge(&self, amount: Points) -> Result<Balance, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::invalid_amount(
                TransactionKind::Charge,
                self.user,
                amount,
            ));
        }

        // checked_add keeps absurdly large requests from wrapping past the limit check
        let next = self
            .amount
            .checked_add(amount)
            .filter(|next| *next <= MAX_AMOUNT)
            .ok_or_else(|| LedgerError::limit_exceeded(self.user, self.amount, amount))?;

        Ok(Balance::new(self.user, next))
    }

    /// Debit `amount` points
    ///
    /// Using exactly the full balance is allowed and yields zero.
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` if `amount <= 0`
    /// * `InsufficientBalance` if `amount` is greater than the current balance
    pub fn use_points(&self, amount: Points) -> Result<Balance, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::invalid_amount(
                TransactionKind::Use,
                self.user,
                amount,
            ));
        }

        if amount > self.amount {
            return Err(LedgerError::insufficient_balance(
                self.user,
                self.amount,
                amount,
            ));
        }

        Ok(Balance::new(self.user, self.amount - amount))
    }

    /// Apply the rule matching `kind`
    pub fn apply(&self, kind: TransactionKind, amount: Points) -> Result<Balance, LedgerError> {
        match kind {
            TransactionKind::Charge => self.charge(amount),
            TransactionKind::Use => self.use_points(amount),
        }
    }
}
